use std::f32::consts::{PI, TAU};

use glam::{Quat, Vec3};

/// Wrap an angle into (-π, π].
pub fn wrap_angle(a: f32) -> f32 {
    let r = (a + PI).rem_euclid(TAU) - PI;
    if r <= -PI {
        r + TAU
    } else {
        r
    }
}

/// The player's local axes in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl Basis {
    /// Express a (forward, right, up) offset in world axes.
    pub fn apply(&self, local: Vec3) -> Vec3 {
        self.forward * local.x + self.right * local.y + self.up * local.z
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub position: Vec3,
    pub rotation: Quat,
    pub yaw: f32,
    pub target_yaw: f32,
}

impl Player {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            yaw: 0.0,
            target_yaw: 0.0,
        }
    }

    /// The model faces its local -X; local +Y is its right hand.
    pub fn basis(&self) -> Basis {
        Basis {
            forward: -(self.rotation * Vec3::X),
            right: self.rotation * Vec3::Y,
            up: self.rotation * Vec3::Z,
        }
    }

    /// Step yaw toward `target_yaw` by at most `turn_rate`, along the
    /// shorter way round, then rebuild the rotation about +Z.
    pub fn turn_toward_target(&mut self, turn_rate: f32) {
        let diff = wrap_angle(self.target_yaw - self.yaw);
        if diff.abs() < turn_rate {
            self.yaw = self.target_yaw;
        } else if diff > 0.0 {
            self.yaw = wrap_angle(self.yaw + turn_rate);
        } else {
            self.yaw = wrap_angle(self.yaw - turn_rate);
        }
        self.rotation = yaw_rotation(self.yaw);
    }
}

/// Half-angle quaternion about the vertical axis: `w = cos(yaw/2)`, `z = sin(yaw/2)`.
pub fn yaw_rotation(yaw: f32) -> Quat {
    Quat::from_xyzw(0.0, 0.0, (yaw / 2.0).sin(), (yaw / 2.0).cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_angle_range() {
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(-PI) - PI).abs() < 1e-5, "-π maps to π");
        assert!((wrap_angle(0.5) - 0.5).abs() < 1e-6);
        assert!((wrap_angle(-2.0 * PI + 0.25) - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_identity_basis() {
        let p = Player::new(Vec3::ZERO);
        let b = p.basis();
        assert_eq!(b.forward, Vec3::NEG_X);
        assert_eq!(b.right, Vec3::Y);
        assert_eq!(b.up, Vec3::Z);
        assert_eq!(b.apply(Vec3::new(0.55, 0.0, 0.85)), Vec3::new(-0.55, 0.0, 0.85));
    }

    #[test]
    fn test_turn_takes_short_way_across_pi() {
        let mut p = Player::new(Vec3::ZERO);
        p.yaw = 3.0;
        p.target_yaw = -3.0;
        p.turn_toward_target(0.15);
        // Short way from 3.0 to -3.0 goes up through π and wraps.
        assert!((p.yaw - (3.15 - TAU)).abs() < 1e-5, "yaw was {}", p.yaw);
    }

    #[test]
    fn test_turn_snaps_when_close() {
        let mut p = Player::new(Vec3::ZERO);
        p.target_yaw = 0.1;
        p.turn_toward_target(0.15);
        assert_eq!(p.yaw, 0.1);
        assert_eq!(p.rotation, yaw_rotation(0.1));
    }
}
