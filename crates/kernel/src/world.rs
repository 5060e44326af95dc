use crate::camera::CameraState;
use crate::movement::{MovementConfig, MovementMode, update_movement};
use crate::scene::{ObjectRotation, Scene};
use cubescene_input::{ActionState, MoveIntent};
use cubescene_math::Vector3;
use cubescene_physics::{Aabb, VerticalMotion};
use serde::{Deserialize, Serialize};

/// Input sampled for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameInput {
    pub intent: MoveIntent,
    /// Pointer delta in pixels since the previous frame.
    pub look_delta: (f32, f32),
    /// Rotation key input about X, Y, Z.
    pub rotation: [f32; 3],
}

impl FrameInput {
    pub fn from_actions(actions: &ActionState, look_delta: (f32, f32)) -> Self {
        Self {
            intent: actions.move_intent(),
            look_delta,
            rotation: actions.rotation_input(),
        }
    }
}

/// Summary of one [`World::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StepReport {
    pub frame: u64,
    pub moved: bool,
    pub blocked: bool,
    pub jumped: bool,
}

/// Serializable view of the camera after a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSnapshot {
    pub frame: u64,
    pub position: Vector3,
    pub yaw: f32,
    pub pitch: f32,
    pub velocity: f32,
    pub grounded: bool,
}

/// All mutable per-run state: the camera, the shared object rotation, and the
/// fixed scene with its precomputed collision boxes.
#[derive(Debug, Clone)]
pub struct World {
    camera: CameraState,
    scene: Scene,
    obstacles: Vec<Aabb>,
    rotation: ObjectRotation,
    movement: MovementConfig,
    frame: u64,
}

impl World {
    pub fn new(scene: Scene, camera: CameraState, movement: MovementConfig) -> Self {
        let obstacles = scene.collision_boxes();
        Self {
            camera,
            scene,
            obstacles,
            rotation: ObjectRotation::default(),
            movement,
            frame: 0,
        }
    }

    /// The demo scene with the default camera in the given movement mode.
    pub fn demo(mode: MovementMode) -> Self {
        let movement = MovementConfig {
            mode,
            ..MovementConfig::default()
        };
        Self::new(Scene::demo(), CameraState::default(), movement)
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn rotation(&self) -> &ObjectRotation {
        &self.rotation
    }

    pub fn movement(&self) -> &MovementConfig {
        &self.movement
    }

    /// Number of completed steps.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Switch movement mode. Vertical motion starts over, so a camera left
    /// hanging in the air by flight falls before it can jump.
    pub fn set_mode(&mut self, mode: MovementMode) {
        if self.movement.mode != mode {
            tracing::info!(?mode, "movement mode changed");
            self.movement.mode = mode;
            self.camera.vertical = VerticalMotion::airborne();
        }
    }

    /// Advance one frame: look, rotate the props, then move the camera.
    pub fn step(&mut self, input: &FrameInput, dt: f32) -> StepReport {
        let _span = tracing::trace_span!("world_step", frame = self.frame).entered();

        let (dx, dy) = input.look_delta;
        self.camera.apply_look_delta(dx, dy);
        self.rotation.apply(input.rotation, dt);

        let outcome = update_movement(
            &mut self.camera,
            &input.intent,
            &self.obstacles,
            &self.movement,
            dt,
        );

        self.frame += 1;
        StepReport {
            frame: self.frame,
            moved: outcome.moved,
            blocked: outcome.blocked,
            jumped: outcome.jumped,
        }
    }

    pub fn snapshot(&self) -> CameraSnapshot {
        CameraSnapshot {
            frame: self.frame,
            position: self.camera.position,
            yaw: self.camera.yaw(),
            pitch: self.camera.pitch(),
            velocity: self.camera.vertical.velocity,
            grounded: self.camera.vertical.grounded,
        }
    }
}
