use glam::{Mat4, Quat, Vec3};

/// Scene camera. Position and rotation are written by the camera rig every
/// frame; projection parameters come from the scene file.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub rotation: Quat,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(fov_y: f32, z_near: f32, z_far: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            fov_y,
            aspect: 1.0,
            z_near,
            z_far,
        }
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Camera-space +X in world space.
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Camera-space +Z in world space; the camera looks down -Z.
    pub fn back(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Turn to face `target`. The stored rotation is the inverse of the
    /// look-at view rotation. Leaves the rotation alone when `target`
    /// coincides with the camera or sits straight along `up`.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let dir = target - self.position;
        if dir.length_squared() < 1e-8 || dir.normalize().cross(up).length_squared() < 1e-8 {
            return;
        }
        let view = Mat4::look_at_rh(self.position, target, up);
        self.rotation = Quat::from_mat4(&view).conjugate().normalize();
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    pub fn view_proj(&self) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far);
        proj * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_look_at_faces_target() {
        let mut cam = Camera::new(60f32.to_radians(), 0.1, 100.0);
        cam.position = Vec3::new(10.0, 0.0, 1.0);
        cam.look_at(Vec3::new(0.0, 0.0, 1.0), Vec3::Z);

        let forward = -cam.back();
        assert!((forward - Vec3::NEG_X).length() < 1e-5, "forward was {forward:?}");
        assert!((cam.rotation * Vec3::Y - Vec3::Z).length() < 1e-5, "camera up should be world up");
    }

    #[test]
    fn test_view_maps_target_onto_negative_z() {
        let mut cam = Camera::new(60f32.to_radians(), 0.1, 100.0);
        cam.position = Vec3::new(3.0, 4.0, 5.0);
        let target = Vec3::new(0.0, 0.0, 1.0);
        cam.look_at(target, Vec3::Z);

        let in_view = cam.view().transform_point3(target);
        assert!(in_view.x.abs() < 1e-4 && in_view.y.abs() < 1e-4, "got {in_view:?}");
        assert!(in_view.z < 0.0);
    }

    #[test]
    fn test_degenerate_look_at_keeps_rotation() {
        let mut cam = Camera::new(1.0, 0.1, 100.0);
        cam.rotation = Quat::from_rotation_z(0.5);
        cam.position = Vec3::ONE;
        cam.look_at(Vec3::ONE, Vec3::Z);
        assert_eq!(cam.rotation, Quat::from_rotation_z(0.5));
    }
}
