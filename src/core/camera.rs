use crate::core::math::{self, Mat4, Vec3};

#[derive(Debug, Clone, Copy)]
enum Projection {
    /// Perspective projection derived from a lens focal length in
    /// millimetres over a 24mm sensor height.
    Lens { focal_length_mm: f32 },
    Perspective { fov_deg: f32 },
    /// Symmetric orthographic projection, `half_height` world units tall.
    Ortho { half_height: f32 },
}

/// A camera owned by one view: a look-at transform plus a projection that
/// is recomputed whenever the viewport aspect ratio changes.
pub struct Camera {
    position: Vec3,
    view: Mat4,
    projection: Projection,
    projection_matrix: Mat4,
    aspect: f32,
    near: f32,
    far: f32,
    aperture: f32,
    shutter_speed: f32,
    sensitivity: f32,
}

impl Camera {
    pub fn with_lens(focal_length_mm: f32, near: f32, far: f32) -> Self {
        Self::new(Projection::Lens { focal_length_mm }, near, far)
    }

    pub fn with_fov(fov_deg: f32, near: f32, far: f32) -> Self {
        Self::new(Projection::Perspective { fov_deg }, near, far)
    }

    pub fn with_ortho(half_height: f32, near: f32, far: f32) -> Self {
        Self::new(Projection::Ortho { half_height }, near, far)
    }

    fn new(projection: Projection, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position: Vec3::new(0.0, 0.0, 0.0),
            view: Mat4::identity(),
            projection,
            projection_matrix: Mat4::identity(),
            aspect: 1.0,
            near,
            far,
            aperture: 16.0,
            shutter_speed: 1.0 / 125.0,
            sensitivity: 100.0,
        };
        camera.rebuild_projection();
        camera
    }

    pub fn look_at(&mut self, eye: Vec3, center: Vec3, up: Vec3) {
        self.position = eye;
        self.view = math::look_at(&eye, &center, &up);
    }

    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        self.aspect = aspect.max(f32::EPSILON);
        self.rebuild_projection();
    }

    pub fn set_focal_length(&mut self, focal_length_mm: f32) {
        self.projection = Projection::Lens { focal_length_mm };
        self.rebuild_projection();
    }

    pub fn set_exposure(&mut self, aperture: f32, shutter_speed: f32, sensitivity: f32) {
        self.aperture = aperture;
        self.shutter_speed = shutter_speed;
        self.sensitivity = sensitivity;
    }

    pub fn position(&self) -> &Vec3 {
        &self.position
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn view_matrix(&self) -> &Mat4 {
        &self.view
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view
    }

    pub fn fov_degrees(&self) -> f32 {
        match self.projection {
            Projection::Lens { focal_length_mm } => math::fov_for_focal_length(focal_length_mm),
            Projection::Perspective { fov_deg } => fov_deg,
            Projection::Ortho { .. } => 0.0,
        }
    }

    /// Photometric exposure scale for the current aperture, shutter speed
    /// and sensitivity.
    pub fn exposure(&self) -> f32 {
        let ev100 = f32::log2(
            self.aperture * self.aperture / self.shutter_speed * 100.0 / self.sensitivity,
        );

        1.0 / 2.0f32.powf(ev100) * 1.2
    }

    fn rebuild_projection(&mut self) {
        self.projection_matrix = match self.projection {
            Projection::Lens { focal_length_mm } => glm_perspective(
                self.aspect,
                math::fov_for_focal_length(focal_length_mm),
                self.near,
                self.far,
            ),
            Projection::Perspective { fov_deg } => {
                glm_perspective(self.aspect, fov_deg, self.near, self.far)
            }
            Projection::Ortho { half_height } => {
                let half_width = half_height * self.aspect;
                math::orthographic(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    self.near,
                    self.far,
                )
            }
        };
    }
}

fn glm_perspective(aspect: f32, fov_deg: f32, near: f32, far: f32) -> Mat4 {
    nalgebra_glm::perspective(aspect, fov_deg.to_radians(), near, far)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::Vec4;

    #[test]
    fn lens_projection_follows_the_focal_length() {
        let mut wide = Camera::with_lens(28.0, 0.1, 100.0);
        let mut tele = Camera::with_lens(90.0, 0.1, 100.0);
        wide.set_aspect_ratio(16.0 / 9.0);
        tele.set_aspect_ratio(16.0 / 9.0);

        // m11 = 1 / tan(fov/2): a longer lens gives a narrower fov and a
        // larger vertical scale.
        assert!(tele.projection_matrix()[(1, 1)] > wide.projection_matrix()[(1, 1)]);
    }

    #[test]
    fn look_at_places_the_eye_at_the_view_space_origin() {
        let mut camera = Camera::with_fov(45.0, 0.1, 100.0);
        camera.look_at(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );

        let eye = camera.view_matrix() * Vec4::new(1.0, 2.0, 3.0, 1.0);
        assert!(eye.xyz().norm() < 1e-5);
    }

    #[test]
    fn default_exposure_matches_a_sunny_day() {
        // f/16, 1/125s, ISO 100 is the photographic sunny 16 baseline.
        let camera = Camera::with_lens(28.0, 0.1, 100.0);
        let exposure = camera.exposure();
        assert!(exposure > 0.0 && exposure < 1e-3, "exposure {}", exposure);
    }

    #[test]
    fn ortho_projection_is_aspect_corrected() {
        let mut camera = Camera::with_ortho(3.0, -50.0, 50.0);
        camera.set_aspect_ratio(2.0);

        let corner = camera.projection_matrix() * Vec4::new(6.0, 3.0, 0.0, 1.0);
        assert!((corner.x - 1.0).abs() < 1e-5);
        assert!((corner.y - 1.0).abs() < 1e-5);
    }
}
