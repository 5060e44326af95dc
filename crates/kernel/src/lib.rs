//! Scene kernel: camera state, the fixed scene, and the per-frame update step.
//!
//! # Invariants
//! - Camera pitch stays within ±89 degrees, so `look_at` never sees a view
//!   direction parallel to world-up.
//! - The scene is built once and never mutated; only the shared object
//!   rotation changes over time.
//! - A blocked move leaves the camera exactly where it was.

pub mod camera;
pub mod movement;
pub mod scene;
pub mod world;

pub use camera::{CameraState, MOUSE_SENSITIVITY, PITCH_LIMIT, WORLD_UP};
pub use movement::{MoveOutcome, MovementConfig, MovementMode, movement_direction, update_movement};
pub use scene::{GroundPlane, OBJECT_HALF_EXTENT, ObjectRotation, Scene, SceneObject};
pub use world::{CameraSnapshot, FrameInput, StepReport, World};
