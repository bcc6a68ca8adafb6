pub use matrix::*;
pub use quaternion::*;
pub use vector::*;

pub mod vector {
    use nalgebra_glm as glm;

    pub type Vec2 = glm::Vec2;
    pub type UVec2 = glm::UVec2;
    pub type IVec2 = glm::IVec2;

    pub type Vec3 = glm::Vec3;
    pub type UVec3 = glm::UVec3;
    pub type IVec3 = glm::IVec3;

    pub type Vec4 = glm::Vec4;
    pub type UVec4 = glm::UVec4;
    pub type IVec4 = glm::IVec4;

    pub fn vec3_lerp(a: &Vec3, b: &Vec3, t: f32) -> Vec3 {
        glm::lerp(a, b, t)
    }

    pub struct Axes;

    impl Axes {
        pub fn up() -> Vec3 {
            Vec3::new(0.0, 1.0, 0.0)
        }

        pub fn right() -> Vec3 {
            Vec3::new(1.0, 0.0, 0.0)
        }

        pub fn forward() -> Vec3 {
            Vec3::new(0.0, 0.0, 1.0)
        }
    }
}

pub mod quaternion {
    use crate::core::math::vector::Axes;
    use crate::core::math::{Mat4, Vec3};
    use nalgebra_glm as glm;

    pub type Quat = glm::Quat;

    pub fn from_euler(yaw: f32, pitch: f32, roll: f32) -> Quat {
        let y = glm::quat_angle_axis(yaw.to_radians(), &Axes::up());
        let p = glm::quat_angle_axis(pitch.to_radians(), &Axes::right());
        let r = glm::quat_angle_axis(roll.to_radians(), &Axes::forward());

        glm::quat_normalize(&(y * p * r))
    }

    pub fn to_mat4(quat: &Quat) -> Mat4 {
        glm::quat_to_mat4(quat)
    }

    pub fn slerp(a: &Quat, b: &Quat, t: f32) -> Quat {
        glm::quat_normalize(&glm::quat_slerp(a, b, t))
    }

    pub fn rotate_vec3(quat: &Quat, vec: &Vec3) -> Vec3 {
        glm::quat_rotate_vec3(quat, vec)
    }
}

pub mod matrix {
    use super::vector::Vec3;
    use nalgebra_glm as glm;

    pub type Mat4 = glm::Mat4;

    pub fn translate(matrix: &Mat4, position: &Vec3) -> Mat4 {
        glm::translate(matrix, position)
    }

    pub fn rotate(matrix: &Mat4, angle_deg: f32, axis: &Vec3) -> Mat4 {
        glm::rotate(matrix, angle_deg.to_radians(), axis)
    }

    pub fn scale(matrix: &Mat4, scale: &Vec3) -> Mat4 {
        glm::scale(matrix, scale)
    }

    pub fn perspective(win_width: u32, win_height: u32, fov_deg: f32, near: f32, far: f32) -> Mat4 {
        glm::perspective(
            win_width as f32 / win_height as f32,
            fov_deg.to_radians(),
            near,
            far,
        )
    }

    pub fn orthographic(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Mat4 {
        glm::ortho(left, right, bottom, top, near, far)
    }

    pub fn look_at(position: &Vec3, target: &Vec3, up: &Vec3) -> Mat4 {
        glm::look_at(position, target, up)
    }

    pub fn inverse(mat: &Mat4) -> Mat4 {
        glm::inverse(mat)
    }
}

pub mod utilities {
    use super::{Mat4, Vec4};

    pub fn value_ptr(v: &Vec4) -> *const f32 {
        v.as_ptr()
    }

    pub fn mat4_value_ptr(m: &Mat4) -> *const f32 {
        m.as_ptr()
    }
}

use nalgebra_glm as glm;

pub fn clamp_scalar(x: f32, min: f32, max: f32) -> f32 {
    glm::clamp_scalar(x, min, max)
}

pub fn lerp_scalar(a: f32, b: f32, t: f32) -> f32 {
    glm::lerp_scalar(a, b, t)
}

/// Vertical field of view in degrees for a lens of the given focal length
/// over a 24mm (full frame) sensor height.
pub fn fov_for_focal_length(focal_length_mm: f32) -> f32 {
    2.0 * (12.0 / focal_length_mm).atan().to_degrees()
}

/// Intersection parameter of a ray with the horizontal plane `y = height`.
/// Returns `None` when the ray is parallel to or points away from the plane.
pub fn raycast_plane(origin: &Vec3, direction: &Vec3, height: f32) -> Option<f32> {
    if direction.y.abs() <= f32::EPSILON {
        return None;
    }

    let t = (height - origin.y) / direction.y;
    if t > 0.0 {
        Some(t)
    } else {
        None
    }
}

/// Axis aligned bounding box. The default box is empty and absorbs the
/// first point merged into it.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self {
            min: Vec3::new(f32::MAX, f32::MAX, f32::MAX),
            max: Vec3::new(f32::MIN, f32::MIN, f32::MIN),
        }
    }
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    pub fn merge_point(&mut self, point: &Vec3) {
        self.min = glm::min2(&self.min, point);
        self.max = glm::max2(&self.max, point);
    }

    pub fn merge(&mut self, other: &Aabb) {
        if !other.is_empty() {
            let (min, max) = (other.min, other.max);
            self.merge_point(&min);
            self.merge_point(&max);
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extent(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn transform(&self, matrix: &Mat4) -> Aabb {
        let mut out = Aabb::default();
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            let transformed = matrix * Vec4::new(corner.x, corner.y, corner.z, 1.0);
            out.merge_point(&transformed.xyz());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focal_length_to_field_of_view() {
        // A 28mm wide angle lens covers roughly 46 degrees vertically on a
        // full frame sensor.
        let fov = fov_for_focal_length(28.0);
        assert!((fov - 46.4).abs() < 0.1, "fov was {}", fov);

        assert!(fov_for_focal_length(50.0) < fov);
    }

    #[test]
    fn ray_hits_ground_plane() {
        let origin = Vec3::new(0.0, 4.0, 0.0);
        let t = raycast_plane(&origin, &Vec3::new(0.0, -1.0, 0.0), 0.0).unwrap();
        assert!((t - 4.0).abs() < 1e-6);

        assert!(raycast_plane(&origin, &Vec3::new(1.0, 0.0, 0.0), 0.0).is_none());
        assert!(raycast_plane(&origin, &Vec3::new(0.0, 1.0, 0.0), 0.0).is_none());
    }

    #[test]
    fn aabb_merge_and_extents() {
        let mut aabb = Aabb::default();
        assert!(aabb.is_empty());

        aabb.merge_point(&Vec3::new(-1.0, 0.0, 2.0));
        aabb.merge_point(&Vec3::new(3.0, -2.0, 0.0));

        assert!(!aabb.is_empty());
        assert_eq!(aabb.center(), Vec3::new(1.0, -1.0, 1.0));
        assert_eq!(aabb.half_extent(), Vec3::new(2.0, 1.0, 1.0));
    }

    #[test]
    fn aabb_transform_covers_all_corners() {
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let rotated = aabb.transform(&matrix::rotate(&Mat4::identity(), 45.0, &Axes::up()));

        let expected = 2.0f32.sqrt();
        assert!((rotated.max.x - expected).abs() < 1e-5);
        assert!((rotated.max.z - expected).abs() < 1e-5);
        assert!((rotated.max.y - 1.0).abs() < 1e-5);
    }
}
