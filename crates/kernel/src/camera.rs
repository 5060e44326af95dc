use cubescene_math::{Matrix4, Vector3};
use cubescene_physics::VerticalMotion;
use serde::{Deserialize, Serialize};

/// Degrees of rotation per pixel of pointer motion.
pub const MOUSE_SENSITIVITY: f32 = 0.1;
/// Pitch limit in degrees, short of the poles.
pub const PITCH_LIMIT: f32 = 89.0;
pub const WORLD_UP: Vector3 = Vector3::Y;

/// First-person camera driven by yaw/pitch in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub position: Vector3,
    yaw: f32,
    pitch: f32,
    front: Vector3,
    pub up: Vector3,
    pub sensitivity: f32,
    /// Vertical velocity and ground contact; only advanced in walk mode.
    pub vertical: VerticalMotion,
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(Vector3::new(0.0, 0.5, 4.0), -90.0, 0.0)
    }
}

impl CameraState {
    pub fn new(position: Vector3, yaw: f32, pitch: f32) -> Self {
        let pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        Self {
            position,
            yaw,
            pitch,
            front: direction_from_angles(yaw, pitch),
            up: WORLD_UP,
            sensitivity: MOUSE_SENSITIVITY,
            vertical: VerticalMotion::default(),
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Unit look direction derived from yaw/pitch.
    pub fn front(&self) -> Vector3 {
        self.front
    }

    pub fn right(&self) -> Vector3 {
        self.front.cross(self.up).normalize()
    }

    /// Look direction flattened onto the ground plane.
    pub fn horizontal_front(&self) -> Vector3 {
        Vector3::new(self.front.x, 0.0, self.front.z).normalize()
    }

    /// Apply a raw pointer delta in pixels. Screen-down (`dy > 0`) looks down.
    pub fn apply_look_delta(&mut self, dx: f32, dy: f32) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        self.yaw += dx * self.sensitivity;
        self.pitch = (self.pitch - dy * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.front = direction_from_angles(self.yaw, self.pitch);
    }

    pub fn view_matrix(&self) -> Matrix4 {
        Matrix4::look_at(self.position, self.position + self.front, self.up)
    }
}

/// Spherical-to-Cartesian conversion of yaw/pitch (degrees) to a unit vector.
fn direction_from_angles(yaw: f32, pitch: f32) -> Vector3 {
    let (yaw, pitch) = (yaw.to_radians(), pitch.to_radians());
    Vector3::new(
        yaw.cos() * pitch.cos(),
        pitch.sin(),
        yaw.sin() * pitch.cos(),
    )
    .normalize()
}
