use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::config::{CameraTuning, GameArea, PlayerTuning};
use crate::model::{Camera, Player};

/// Pitch bound just short of straight up/down so the look-at basis never
/// degenerates.
pub const PITCH_LIMIT: f32 = 1.5533;

/// Third-person orbit around the player. Input writes yaw, pitch and
/// distance; the scene camera is recomputed from them.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraRig {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    /// Set when the floor clamp engaged; further downward pitch is refused.
    limit_pitch: bool,
    tuning: CameraTuning,
}

impl CameraRig {
    pub fn new(tuning: CameraTuning) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance: tuning.distance.clamp(tuning.min_distance, tuning.max_distance),
            limit_pitch: false,
            tuning,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.tuning.clone());
    }

    pub fn pitch_limited(&self) -> bool {
        self.limit_pitch
    }

    /// Apply a relative pointer motion in pixels. Deltas are normalised by
    /// window height and scaled by the field of view so sensitivity feels
    /// the same at any resolution.
    pub fn apply_look(&mut self, dx: f32, dy: f32, window_height: u32, fov_y: f32) {
        let h = window_height.max(1) as f32;
        let motion = Vec2::new(dx / h, -dy / h);

        self.yaw += self.tuning.yaw_sensitivity * -motion.x * fov_y;
        self.yaw = (self.yaw + PI).rem_euclid(TAU) - PI;

        let new_pitch = self.pitch + self.tuning.pitch_sensitivity * -motion.y * fov_y;
        if new_pitch > self.pitch || !self.limit_pitch {
            self.pitch = new_pitch;
            self.limit_pitch = false;
        }
        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// One wheel notch moves the camera one unit in or out.
    pub fn zoom(&mut self, delta_y: f32) {
        if delta_y > 0.0 && self.distance > self.tuning.min_distance {
            self.distance -= 1.0;
        } else if delta_y < 0.0 && self.distance < self.tuning.max_distance {
            self.distance += 1.0;
        }
        self.distance = self.distance.clamp(self.tuning.min_distance, self.tuning.max_distance);
    }

    /// The point the camera orbits and looks at.
    pub fn focus(&self, player: &Player) -> Vec3 {
        player.position + player.basis().apply(self.tuning.offset)
    }

    pub fn update_camera(&mut self, camera: &mut Camera, player: &Player, area: &GameArea) {
        let focus = self.focus(player);
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let mut position = focus + Vec3::new(cos_yaw * cos_pitch, sin_yaw * cos_pitch, sin_pitch) * self.distance;

        if position.z < self.tuning.floor {
            position.z = self.tuning.floor;
            self.limit_pitch = true;
        }
        camera.position = area.clamp(position);
        camera.look_at(focus, Vec3::Z);
    }
}

/// Ground movement and facing for the player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerController {
    tuning: PlayerTuning,
}

impl PlayerController {
    pub fn new(tuning: PlayerTuning) -> Self {
        Self { tuning }
    }

    pub fn tuning(&self) -> &PlayerTuning {
        &self.tuning
    }

    /// Move the player by `axes` = (right, forward) for `elapsed` seconds and
    /// clamp to the play area. Outside look mode the player's own frame is
    /// used; in look mode the camera's, flattened onto the ground. Returns
    /// whether there was any movement intent.
    pub fn step(
        &self,
        player: &mut Player,
        axes: Vec2,
        looking: bool,
        camera: &Camera,
        area: &GameArea,
        elapsed: f32,
    ) -> bool {
        if axes == Vec2::ZERO {
            player.position = area.clamp(player.position);
            return false;
        }
        let step = axes.normalize() * self.tuning.speed * elapsed;

        if looking {
            let flat = |v: Vec3| Vec3::new(v.x, v.y, 0.0).normalize_or_zero();
            let right = flat(camera.right());
            let back = flat(camera.back());
            player.position += step.x * right - step.y * back;
        } else {
            let basis = player.basis();
            player.position += step.x * basis.right + step.y * basis.forward;
        }
        player.position = area.clamp(player.position);
        true
    }

    /// Ease the player's heading. Only called on frames with movement; in
    /// look mode the heading chases the camera yaw.
    pub fn face(&self, player: &mut Player, looking: bool, camera_yaw: f32) {
        if looking {
            player.target_yaw = camera_yaw;
        }
        player.turn_toward_target(self.tuning.turn_rate);
    }

    /// Where a carried bowl is drawn.
    pub fn hold_point(&self, player: &Player) -> Vec3 {
        player.position + player.basis().apply(self.tuning.hold_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(60f32.to_radians(), 0.1, 100.0)
    }

    #[test]
    fn test_rest_pose_sits_behind_player() {
        let mut rig = CameraRig::new(CameraTuning::default());
        let mut cam = camera();
        let player = Player::new(Vec3::ZERO);
        rig.update_camera(&mut cam, &player, &GameArea::default());

        assert!((cam.position - Vec3::new(10.0, 0.0, 1.0)).length() < 1e-4, "got {:?}", cam.position);
        assert!((-cam.back() - Vec3::NEG_X).length() < 1e-4, "camera looks along the player's forward");
    }

    #[test]
    fn test_yaw_wraps_into_half_open_range() {
        let mut rig = CameraRig::new(CameraTuning::default());
        rig.yaw = 3.1;
        let fov = 1.0;
        // dx = -h * 0.1 turns yaw by +2.5 * 0.1 = 0.25.
        rig.apply_look(-100.0, 0.0, 1000, fov);
        assert!(rig.yaw >= -PI && rig.yaw < PI);
        assert!((rig.yaw - (3.35 - TAU)).abs() < 1e-4, "yaw was {}", rig.yaw);
    }

    #[test]
    fn test_floor_engages_soft_pitch_limit() {
        let mut rig = CameraRig::new(CameraTuning::default());
        let mut cam = camera();
        let player = Player::new(Vec3::ZERO);

        // Looking steeply down from below the focus: the floor catches it.
        rig.pitch = -0.5;
        rig.update_camera(&mut cam, &player, &GameArea::default());
        assert_eq!(cam.position.z, 0.1);
        assert!(rig.pitch_limited());

        // Tilting further down is refused.
        rig.apply_look(0.0, -50.0, 500, 1.0);
        assert_eq!(rig.pitch, -0.5);
        assert!(rig.pitch_limited());

        // Tilting up is accepted and lifts the limit.
        rig.apply_look(0.0, 50.0, 500, 1.0);
        assert!(rig.pitch > -0.5);
        assert!(!rig.pitch_limited());
    }

    #[test]
    fn test_pitch_clamped() {
        let mut rig = CameraRig::new(CameraTuning::default());
        rig.apply_look(0.0, 100_000.0, 500, 1.0);
        assert_eq!(rig.pitch, PITCH_LIMIT);
    }

    #[test]
    fn test_camera_clamped_to_area() {
        let mut rig = CameraRig::new(CameraTuning::default());
        let mut cam = camera();
        let player = Player::new(Vec3::new(8.0, 0.0, 0.0));
        rig.update_camera(&mut cam, &player, &GameArea::default());
        assert_eq!(cam.position.x, 12.0);
    }

    #[test]
    fn test_zoom_steps_within_range() {
        let mut rig = CameraRig::new(CameraTuning::default());
        rig.zoom(-1.0);
        assert_eq!(rig.distance, 10.0, "already at max");
        for _ in 0..20 {
            rig.zoom(1.0);
        }
        assert_eq!(rig.distance, 2.0);
        rig.zoom(-3.0);
        assert_eq!(rig.distance, 3.0);
    }

    #[test]
    fn test_walk_along_player_frame() {
        let controller = PlayerController::new(PlayerTuning::default());
        let mut player = Player::new(Vec3::ZERO);
        let moved = controller.step(&mut player, Vec2::new(0.0, 1.0), false, &camera(), &GameArea::default(), 0.1);
        assert!(moved);
        assert!((player.position - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_diagonal_is_not_faster() {
        let controller = PlayerController::new(PlayerTuning::default());
        let mut player = Player::new(Vec3::ZERO);
        controller.step(&mut player, Vec2::new(1.0, 1.0), false, &camera(), &GameArea::default(), 0.1);
        assert!((player.position.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_clamped_exactly_at_x_max() {
        let controller = PlayerController::new(PlayerTuning::default());
        let area = GameArea::default();
        let mut player = Player::new(Vec3::new(11.9, 0.0, 0.0));
        // Backward is +X for an unrotated player.
        controller.step(&mut player, Vec2::new(0.0, -1.0), false, &camera(), &area, 1.0);
        assert_eq!(player.position.x, area.x_max);
    }

    #[test]
    fn test_look_mode_moves_in_camera_frame() {
        let controller = PlayerController::new(PlayerTuning::default());
        let mut rig = CameraRig::new(CameraTuning::default());
        let mut cam = camera();
        let mut player = Player::new(Vec3::ZERO);
        rig.yaw = std::f32::consts::FRAC_PI_2;
        rig.update_camera(&mut cam, &player, &GameArea::default());

        // Camera sits at +Y looking toward -Y; forward should follow it.
        controller.step(&mut player, Vec2::new(0.0, 1.0), true, &cam, &GameArea::default(), 0.1);
        assert!((player.position - Vec3::new(0.0, -1.0, 0.0)).length() < 1e-4, "got {:?}", player.position);

        controller.face(&mut player, true, rig.yaw);
        assert_eq!(player.target_yaw, rig.yaw);
        assert!((player.yaw - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_hold_point_in_front_of_player() {
        let controller = PlayerController::new(PlayerTuning::default());
        let player = Player::new(Vec3::new(1.0, 1.0, 0.0));
        assert!((controller.hold_point(&player) - Vec3::new(0.45, 1.0, 0.85)).length() < 1e-5);
    }
}
