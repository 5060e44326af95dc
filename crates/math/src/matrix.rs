use crate::Vector3;
use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// 4x4 float matrix stored column-major: element (row, col) lives at `m[col * 4 + row]`.
///
/// Composition applies right-to-left, so `translate(t) * rotate_y(a)` rotates first
/// and then translates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix4 {
    pub m: [f32; 16],
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix4 {
    #[rustfmt::skip]
    pub const IDENTITY: Self = Self {
        m: [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub const fn from_cols_array(m: [f32; 16]) -> Self {
        Self { m }
    }

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// Element at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.m[col * 4 + row]
    }

    /// Standard matrix product `a * b`.
    pub fn multiply(a: &Self, b: &Self) -> Self {
        let mut out = [0.0; 16];
        for col in 0..4 {
            for row in 0..4 {
                out[col * 4 + row] = (0..4)
                    .map(|k| a.m[k * 4 + row] * b.m[col * 4 + k])
                    .sum();
            }
        }
        Self { m: out }
    }

    pub fn translate(v: Vector3) -> Self {
        let mut out = Self::IDENTITY;
        out.m[12] = v.x;
        out.m[13] = v.y;
        out.m[14] = v.z;
        out
    }

    pub fn scale(v: Vector3) -> Self {
        let mut out = Self::IDENTITY;
        out.m[0] = v.x;
        out.m[5] = v.y;
        out.m[10] = v.z;
        out
    }

    pub fn rotate_x(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        let mut out = Self::IDENTITY;
        out.m[5] = c;
        out.m[6] = s;
        out.m[9] = -s;
        out.m[10] = c;
        out
    }

    pub fn rotate_y(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        let mut out = Self::IDENTITY;
        out.m[0] = c;
        out.m[2] = -s;
        out.m[8] = s;
        out.m[10] = c;
        out
    }

    pub fn rotate_z(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        let mut out = Self::IDENTITY;
        out.m[0] = c;
        out.m[1] = s;
        out.m[4] = -s;
        out.m[5] = c;
        out
    }

    /// Symmetric right-handed perspective projection with OpenGL clip depth (-1..1).
    ///
    /// Requires `0 < fov_radians < PI`, `aspect > 0` and `0 < near < far`; results
    /// are undefined otherwise.
    pub fn perspective(fov_radians: f32, aspect: f32, near: f32, far: f32) -> Self {
        debug_assert!(fov_radians > 0.0 && fov_radians < std::f32::consts::PI);
        debug_assert!(aspect > 0.0);
        debug_assert!(near > 0.0 && near < far);

        let f = 1.0 / (fov_radians * 0.5).tan();
        let mut m = [0.0; 16];
        m[0] = f / aspect;
        m[5] = f;
        m[10] = (far + near) / (near - far);
        m[11] = -1.0;
        m[14] = (2.0 * far * near) / (near - far);
        Self { m }
    }

    /// Right-handed view matrix looking from `eye` towards `target`.
    ///
    /// Degenerates (zero right axis) when the view direction is parallel to `world_up`.
    pub fn look_at(eye: Vector3, target: Vector3, world_up: Vector3) -> Self {
        let forward = (target - eye).normalize();
        let right = forward.cross(world_up).normalize();
        let up = right.cross(forward);

        #[rustfmt::skip]
        let m = [
            right.x, up.x, -forward.x, 0.0,
            right.y, up.y, -forward.y, 0.0,
            right.z, up.z, -forward.z, 0.0,
            -right.dot(eye), -up.dot(eye), forward.dot(eye), 1.0,
        ];
        Self { m }
    }

    /// Transform a point (implicit w = 1), ignoring the projective row.
    pub fn transform_point(&self, p: Vector3) -> Vector3 {
        let m = &self.m;
        Vector3::new(
            m[0] * p.x + m[4] * p.y + m[8] * p.z + m[12],
            m[1] * p.x + m[5] * p.y + m[9] * p.z + m[13],
            m[2] * p.x + m[6] * p.y + m[10] * p.z + m[14],
        )
    }

    /// Transform a direction (implicit w = 0).
    pub fn transform_vector(&self, v: Vector3) -> Vector3 {
        let m = &self.m;
        Vector3::new(
            m[0] * v.x + m[4] * v.y + m[8] * v.z,
            m[1] * v.x + m[5] * v.y + m[9] * v.z,
            m[2] * v.x + m[6] * v.y + m[10] * v.z,
        )
    }

    /// Copy with the translation column cleared. Used for skybox views.
    pub fn without_translation(&self) -> Self {
        let mut out = *self;
        out.m[12] = 0.0;
        out.m[13] = 0.0;
        out.m[14] = 0.0;
        out
    }

    pub fn translation(&self) -> Vector3 {
        Vector3::new(self.m[12], self.m[13], self.m[14])
    }

    pub fn to_cols_array(&self) -> [f32; 16] {
        self.m
    }

    pub fn to_cols_array_2d(&self) -> [[f32; 4]; 4] {
        let m = &self.m;
        [
            [m[0], m[1], m[2], m[3]],
            [m[4], m[5], m[6], m[7]],
            [m[8], m[9], m[10], m[11]],
            [m[12], m[13], m[14], m[15]],
        ]
    }

    /// Element-wise comparison within `tolerance`.
    pub fn abs_diff_eq(&self, other: &Self, tolerance: f32) -> bool {
        self.m
            .iter()
            .zip(other.m.iter())
            .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

impl Mul for Matrix4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Matrix4::multiply(&self, &rhs)
    }
}

impl From<Matrix4> for glam::Mat4 {
    fn from(m: Matrix4) -> Self {
        glam::Mat4::from_cols_array(&m.m)
    }
}

impl From<glam::Mat4> for Matrix4 {
    fn from(m: glam::Mat4) -> Self {
        Self::from_cols_array(m.to_cols_array())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const TOL: f32 = 1e-5;

    fn sample() -> Matrix4 {
        Matrix4::translate(Vector3::new(1.0, -2.0, 3.0))
            * Matrix4::rotate_y(0.7)
            * Matrix4::rotate_x(-0.3)
            * Matrix4::scale(Vector3::new(2.0, 0.5, 1.5))
    }

    #[test]
    fn identity_is_neutral_on_both_sides() {
        let m = sample();
        assert!((Matrix4::identity() * m).abs_diff_eq(&m, TOL));
        assert!((m * Matrix4::identity()).abs_diff_eq(&m, TOL));
    }

    #[test]
    fn translations_compose_additively() {
        let t1 = Vector3::new(1.0, 2.0, 3.0);
        let t2 = Vector3::new(-4.0, 0.5, 10.0);
        let combined = Matrix4::translate(t1) * Matrix4::translate(t2);
        assert!(combined.abs_diff_eq(&Matrix4::translate(t1 + t2), TOL));
    }

    #[test]
    fn translate_after_rotate_rotates_first() {
        let model = Matrix4::translate(Vector3::new(5.0, 0.0, 0.0)) * Matrix4::rotate_y(FRAC_PI_2);
        // +X rotated a quarter turn about Y lands on -Z, then shifts by +5 X.
        let p = model.transform_point(Vector3::X);
        assert!((p - Vector3::new(5.0, 0.0, -1.0)).length() < TOL, "{p:?}");
    }

    #[test]
    fn rotations_match_glam() {
        for angle in [0.0_f32, 0.4, -1.2, 3.0] {
            let pairs = [
                (Matrix4::rotate_x(angle), glam::Mat4::from_rotation_x(angle)),
                (Matrix4::rotate_y(angle), glam::Mat4::from_rotation_y(angle)),
                (Matrix4::rotate_z(angle), glam::Mat4::from_rotation_z(angle)),
            ];
            for (ours, theirs) in pairs {
                assert!(ours.abs_diff_eq(&theirs.into(), TOL), "angle {angle}");
            }
        }
    }

    #[test]
    fn multiply_matches_glam() {
        let a = sample();
        let b = Matrix4::rotate_z(0.9) * Matrix4::translate(Vector3::new(0.0, 4.0, -1.0));
        let expected = glam::Mat4::from(a) * glam::Mat4::from(b);
        assert!((a * b).abs_diff_eq(&expected.into(), TOL));
    }

    #[test]
    fn perspective_matches_glam_gl_convention() {
        let ours = Matrix4::perspective(45_f32.to_radians(), 16.0 / 9.0, 0.1, 100.0);
        let theirs = glam::Mat4::perspective_rh_gl(45_f32.to_radians(), 16.0 / 9.0, 0.1, 100.0);
        assert!(ours.abs_diff_eq(&theirs.into(), TOL));
    }

    #[test]
    fn look_at_maps_eye_to_origin() {
        let eye = Vector3::new(3.0, 1.5, -2.0);
        let forward = Vector3::new(0.3, -0.2, -1.0).normalize();
        let view = Matrix4::look_at(eye, eye + forward, Vector3::Y);
        assert!(view.transform_point(eye).length() < TOL);
        // The look direction maps onto view-space -Z.
        let dir = view.transform_vector(forward);
        assert!((dir - Vector3::new(0.0, 0.0, -1.0)).length() < TOL, "{dir:?}");
    }

    #[test]
    fn look_at_matches_glam() {
        let eye = Vector3::new(0.0, 0.5, 4.0);
        let target = Vector3::new(1.0, 0.0, -3.0);
        let ours = Matrix4::look_at(eye, target, Vector3::Y);
        let theirs = glam::Mat4::look_at_rh(eye.into(), target.into(), glam::Vec3::Y);
        assert!(ours.abs_diff_eq(&theirs.into(), TOL));
    }

    #[test]
    fn look_at_parallel_to_up_degenerates_without_nan() {
        let view = Matrix4::look_at(Vector3::ZERO, Vector3::Y, Vector3::Y);
        assert!(view.m.iter().all(|v| v.is_finite()));
        assert_eq!(view.get(0, 0), 0.0);
    }

    #[test]
    fn without_translation_keeps_rotation() {
        let view = Matrix4::look_at(Vector3::new(9.0, 2.0, 1.0), Vector3::ZERO, Vector3::Y);
        let sky = view.without_translation();
        assert_eq!(sky.translation(), Vector3::ZERO);
        assert_eq!(sky.get(0, 0), view.get(0, 0));
        assert_eq!(sky.get(2, 1), view.get(2, 1));
    }
}
