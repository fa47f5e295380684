use glam::{Mat4, Vec3};

pub struct Camera {
    pub position: Vec3,
    pub direction: Vec3,

    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.5, 5.0),
            direction: Vec3::NEG_Z,

            fov: 45.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    pub fn with_viewport(width: u32, height: u32) -> Self {
        let mut camera = Self::default();
        camera.set_aspect(width as f32, height as f32);
        camera
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.direction, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Returns false and keeps the previous aspect when the viewport is
    /// degenerate.
    pub fn set_aspect(&mut self, width: f32, height: f32) -> bool {
        if height <= 0.0 || width <= 0.0 {
            return false;
        }
        self.aspect = width / height;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_tracks_viewport() {
        let mut camera = Camera::with_viewport(800, 600);
        assert_eq!(camera.aspect, 800.0 / 600.0);
        assert!(camera.set_aspect(400.0, 300.0));
        assert_eq!(camera.aspect, 400.0 / 300.0);
    }

    #[test]
    fn zero_height_keeps_previous_aspect() {
        let mut camera = Camera::with_viewport(800, 600);
        assert!(!camera.set_aspect(800.0, 0.0));
        assert_eq!(camera.aspect, 800.0 / 600.0);
        assert!(camera.projection_matrix().is_finite());
    }

    #[test]
    fn origin_projects_near_screen_center() {
        let camera = Camera::with_viewport(800, 600);
        let clip = camera.view_projection_matrix() * glam::Vec4::new(0.0, 0.5, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
