use cubescene_math::{Matrix4, Vector3};
use cubescene_physics::Aabb;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

/// Half-extent of the collision box around every scene object.
pub const OBJECT_HALF_EXTENT: f32 = 0.6;

/// Radians per second applied while a rotation key is held.
const ROTATION_SPEED: f32 = FRAC_PI_2;

/// A static prop: one cube at a fixed position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub position: Vector3,
    pub tint: [f32; 3],
}

impl SceneObject {
    pub const fn new(position: Vector3, tint: [f32; 3]) -> Self {
        Self { position, tint }
    }

    /// Collision box derived from the position; never stored.
    pub fn collision_box(&self) -> Aabb {
        Aabb::from_center_half_extent(self.position, OBJECT_HALF_EXTENT)
    }
}

/// Horizontal ground quad.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundPlane {
    pub height: f32,
    pub half_size: f32,
}

impl Default for GroundPlane {
    fn default() -> Self {
        Self {
            height: -0.5,
            half_size: 50.0,
        }
    }
}

impl GroundPlane {
    /// Model matrix mapping the unit XZ quad (-1..1) onto the ground.
    pub fn model_matrix(&self) -> Matrix4 {
        Matrix4::translate(Vector3::new(0.0, self.height, 0.0))
            * Matrix4::scale(Vector3::new(self.half_size, 1.0, self.half_size))
    }
}

/// Fixed scene contents, built once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    objects: Vec<SceneObject>,
    pub ground: GroundPlane,
}

#[rustfmt::skip]
const DEMO_OBJECTS: [SceneObject; 10] = [
    SceneObject::new(Vector3::new( 0.0, 0.0,   0.0), [1.00, 1.00, 1.00]),
    SceneObject::new(Vector3::new( 2.0, 0.0,  -5.0), [1.00, 0.55, 0.55]),
    SceneObject::new(Vector3::new(-1.5, 0.0,  -2.5), [0.55, 1.00, 0.55]),
    SceneObject::new(Vector3::new(-3.8, 0.0, -12.3), [0.55, 0.55, 1.00]),
    SceneObject::new(Vector3::new( 2.4, 0.0,  -3.5), [1.00, 1.00, 0.55]),
    SceneObject::new(Vector3::new(-1.7, 0.0,  -7.5), [1.00, 0.55, 1.00]),
    SceneObject::new(Vector3::new( 1.3, 0.0,  -1.5), [0.55, 1.00, 1.00]),
    SceneObject::new(Vector3::new( 1.3, 1.2,  -1.5), [0.90, 0.75, 0.50]),
    SceneObject::new(Vector3::new( 4.0, 0.0,  -8.0), [0.70, 0.70, 0.70]),
    SceneObject::new(Vector3::new(-4.0, 0.0,  -4.0), [0.80, 0.60, 0.90]),
];

impl Scene {
    pub fn new(objects: Vec<SceneObject>, ground: GroundPlane) -> Self {
        Self { objects, ground }
    }

    /// The hand-placed demo layout: ten cubes ahead of the start position.
    pub fn demo() -> Self {
        Self::new(DEMO_OBJECTS.to_vec(), GroundPlane::default())
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn collision_boxes(&self) -> Vec<Aabb> {
        self.objects.iter().map(SceneObject::collision_box).collect()
    }
}

/// Rotation shared by every scene object, accumulated from the rotation keys.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectRotation {
    /// Angles about X, Y, Z in radians.
    pub angles: [f32; 3],
}

impl ObjectRotation {
    /// Advance each axis by `input[i] * speed * dt`.
    pub fn apply(&mut self, input: [f32; 3], dt: f32) {
        for (angle, dir) in self.angles.iter_mut().zip(input) {
            *angle += dir * ROTATION_SPEED * dt;
        }
    }

    /// `translate(position) * rotate_y * rotate_x * rotate_z`.
    pub fn model_matrix(&self, position: Vector3) -> Matrix4 {
        let [ax, ay, az] = self.angles;
        Matrix4::translate(position)
            * Matrix4::rotate_y(ay)
            * Matrix4::rotate_x(ax)
            * Matrix4::rotate_z(az)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraState;

    #[test]
    fn demo_scene_is_populated() {
        let scene = Scene::demo();
        assert_eq!(scene.objects().len(), 10);
        assert_eq!(scene.collision_boxes().len(), 10);
    }

    #[test]
    fn start_position_is_clear_of_every_box() {
        let scene = Scene::demo();
        let cam = CameraState::default();
        for b in scene.collision_boxes() {
            assert!(!b.intersects_sphere(cam.position, 0.3), "{b:?}");
        }
    }

    #[test]
    fn start_position_rests_on_ground() {
        let scene = Scene::demo();
        let cam = CameraState::default();
        assert_eq!(cam.position.y - 1.0, scene.ground.height);
    }

    #[test]
    fn collision_box_tracks_position() {
        let obj = SceneObject::new(Vector3::new(2.0, 0.0, -5.0), [1.0; 3]);
        let b = obj.collision_box();
        assert!((b.min - Vector3::new(1.4, -0.6, -5.6)).length() < 1e-5);
        assert!((b.max - Vector3::new(2.6, 0.6, -4.4)).length() < 1e-5);
    }

    #[test]
    fn rotation_does_not_move_cube_center() {
        let mut rot = ObjectRotation::default();
        rot.apply([1.0, -1.0, 1.0], 0.5);
        let pos = Vector3::new(3.0, 0.0, -2.0);
        let center = rot.model_matrix(pos).transform_point(Vector3::ZERO);
        assert!((center - pos).length() < 1e-5);
        assert!((rot.angles[1] + FRAC_PI_2 * 0.5).abs() < 1e-6);
    }

    #[test]
    fn ground_matrix_spans_half_size() {
        let ground = GroundPlane::default();
        let corner = ground.model_matrix().transform_point(Vector3::new(1.0, 0.0, -1.0));
        assert_eq!(corner, Vector3::new(50.0, -0.5, -50.0));
    }
}
