use crate::camera::{CameraState, WORLD_UP};
use cubescene_input::MoveIntent;
use cubescene_math::Vector3;
use cubescene_physics::{Aabb, JumpConfig};
use serde::{Deserialize, Serialize};

/// How the camera body moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementMode {
    /// Free flight along the full view direction, with explicit up/down.
    Fly,
    /// Ground-bound: horizontal movement plus gravity and jumping.
    Walk,
}

/// Tunables for camera movement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementConfig {
    pub mode: MovementMode,
    /// Units per second.
    pub speed: f32,
    /// Radius of the collision sphere around the camera.
    pub radius: f32,
    /// Distance from the feet to the camera, used in walk mode.
    pub eye_height: f32,
    pub jump: JumpConfig,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            mode: MovementMode::Walk,
            speed: 3.0,
            radius: 0.3,
            eye_height: 1.0,
            jump: JumpConfig::default(),
        }
    }
}

/// What happened to the camera during one movement update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub moved: bool,
    pub blocked: bool,
    pub jumped: bool,
}

/// Normalized sum of the unit vectors selected by `intent`, or zero when idle.
///
/// Walk mode projects the view direction onto the ground and ignores the
/// vertical component, which is handled by the jump integrator instead.
pub fn movement_direction(camera: &CameraState, intent: &MoveIntent, mode: MovementMode) -> Vector3 {
    let forward = match mode {
        MovementMode::Fly => camera.front(),
        MovementMode::Walk => camera.horizontal_front(),
    };
    let mut dir = forward * intent.forward + camera.right() * intent.strafe;
    if mode == MovementMode::Fly {
        dir = dir + WORLD_UP * intent.vertical;
    }
    if dir.is_zero() {
        return Vector3::ZERO;
    }
    dir.normalize()
}

/// Advance the camera for one frame.
///
/// The horizontal candidate is rejected as a whole when the camera sphere
/// overlaps any obstacle; there is no sliding along faces. In walk mode the
/// vertical axis is integrated afterwards and checked the same way: a blocked
/// fall leaves the camera resting above the obstacle.
pub fn update_movement(
    camera: &mut CameraState,
    intent: &MoveIntent,
    obstacles: &[Aabb],
    config: &MovementConfig,
    dt: f32,
) -> MoveOutcome {
    let mut outcome = MoveOutcome::default();

    let dir = movement_direction(camera, intent, config.mode);
    if !dir.is_zero() {
        let candidate = camera.position + dir * (config.speed * dt);
        if obstacles
            .iter()
            .any(|b| b.intersects_sphere(candidate, config.radius))
        {
            tracing::debug!(
                x = candidate.x,
                y = candidate.y,
                z = candidate.z,
                "move blocked"
            );
            outcome.blocked = true;
        } else {
            camera.position = candidate;
            outcome.moved = true;
        }
    }

    if config.mode == MovementMode::Walk {
        if intent.vertical > 0.0 {
            outcome.jumped = camera.vertical.try_jump(&config.jump);
        }
        let feet = camera.position.y - config.eye_height;
        let feet = camera.vertical.integrate(feet, &config.jump, dt);
        let candidate = Vector3 {
            y: feet + config.eye_height,
            ..camera.position
        };
        if obstacles
            .iter()
            .any(|b| b.intersects_sphere(candidate, config.radius))
        {
            tracing::debug!(y = candidate.y, "vertical move blocked");
            camera.vertical.block();
        } else {
            camera.position = candidate;
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::OBJECT_HALF_EXTENT;

    const TOL: f32 = 1e-5;

    fn fly() -> MovementConfig {
        MovementConfig {
            mode: MovementMode::Fly,
            ..MovementConfig::default()
        }
    }

    fn forward() -> MoveIntent {
        MoveIntent {
            forward: 1.0,
            ..MoveIntent::default()
        }
    }

    #[test]
    fn forward_move_without_obstacles() {
        let mut cam = CameraState::new(Vector3::new(0.0, 0.0, 4.0), -90.0, 0.0);
        let outcome = update_movement(&mut cam, &forward(), &[], &fly(), 0.1);
        assert!(outcome.moved);
        assert!((cam.position - Vector3::new(0.0, 0.0, 3.7)).length() < TOL, "{:?}", cam.position);
    }

    #[test]
    fn diagonal_input_is_normalized() {
        let cam = CameraState::new(Vector3::ZERO, -90.0, 0.0);
        let intent = MoveIntent {
            forward: 1.0,
            strafe: 1.0,
            vertical: 1.0,
        };
        let dir = movement_direction(&cam, &intent, MovementMode::Fly);
        assert!((dir.length() - 1.0).abs() < TOL);
        let expected = Vector3::new(1.0, 1.0, -1.0).normalize();
        assert!((dir - expected).length() < 1e-4);
    }

    #[test]
    fn idle_direction_is_zero() {
        let cam = CameraState::default();
        let dir = movement_direction(&cam, &MoveIntent::default(), MovementMode::Fly);
        assert_eq!(dir, Vector3::ZERO);
    }

    #[test]
    fn walk_ignores_pitch_and_vertical_input() {
        let cam = CameraState::new(Vector3::ZERO, -90.0, -45.0);
        let intent = MoveIntent {
            forward: 1.0,
            strafe: 0.0,
            vertical: 1.0,
        };
        let dir = movement_direction(&cam, &intent, MovementMode::Walk);
        assert_eq!(dir.y, 0.0);
        assert!((dir - Vector3::new(0.0, 0.0, -1.0)).length() < 1e-4);
    }

    #[test]
    fn move_into_box_is_rejected() {
        let start = Vector3::new(0.0, 0.0, 1.0);
        let mut cam = CameraState::new(start, -90.0, 0.0);
        let obstacle = Aabb::from_center_half_extent(Vector3::ZERO, OBJECT_HALF_EXTENT);
        // Candidate z = 0.7, inside the 0.3 radius of the box face at 0.6.
        let outcome = update_movement(&mut cam, &forward(), &[obstacle], &fly(), 0.1);
        assert!(outcome.blocked);
        assert!(!outcome.moved);
        assert_eq!(cam.position, start);
    }

    #[test]
    fn blocked_move_does_not_slide() {
        let start = Vector3::new(0.0, 0.0, 1.0);
        // Looking diagonally: the x component alone would be free.
        let mut cam = CameraState::new(start, -45.0, 0.0);
        let obstacle = Aabb::from_center_half_extent(Vector3::ZERO, OBJECT_HALF_EXTENT);
        let outcome = update_movement(&mut cam, &forward(), &[obstacle], &fly(), 0.2);
        assert!(outcome.blocked);
        assert_eq!(cam.position, start);
    }

    #[test]
    fn walk_jump_leaves_ground() {
        let cfg = MovementConfig {
            jump: JumpConfig {
                gravity: -20.0,
                jump_impulse: 8.0,
                ground_level: 0.0,
            },
            ..MovementConfig::default()
        };
        let mut cam = CameraState::new(Vector3::new(0.0, cfg.eye_height, 0.0), -90.0, 0.0);
        let jump = MoveIntent {
            vertical: 1.0,
            ..MoveIntent::default()
        };
        let outcome = update_movement(&mut cam, &jump, &[], &cfg, 0.05);
        assert!(outcome.jumped);
        assert!(!outcome.moved);
        assert!((cam.vertical.velocity - 7.0).abs() < TOL);
        assert!(!cam.vertical.grounded);
        assert!(cam.position.y - cfg.eye_height > cfg.jump.ground_level);
    }

    #[test]
    fn walk_falls_to_ground() {
        let cfg = MovementConfig::default();
        let mut cam = CameraState::new(Vector3::new(0.0, 5.0, 0.0), -90.0, 0.0);
        cam.vertical.grounded = false;
        for _ in 0..120 {
            update_movement(&mut cam, &MoveIntent::default(), &[], &cfg, 1.0 / 60.0);
        }
        assert!(cam.vertical.grounded);
        assert!((cam.position.y - (cfg.jump.ground_level + cfg.eye_height)).abs() < TOL);
    }

    #[test]
    fn jump_over_cube_never_lands_inside_it() {
        let cfg = MovementConfig::default();
        let obstacle = Aabb::from_center_half_extent(Vector3::ZERO, OBJECT_HALF_EXTENT);
        let mut cam = CameraState::new(Vector3::new(0.0, 0.5, 2.4), -90.0, 0.0);
        let jump_forward = MoveIntent {
            forward: 1.0,
            vertical: 1.0,
            ..MoveIntent::default()
        };

        let outcome = update_movement(&mut cam, &jump_forward, &[obstacle], &cfg, 1.0 / 60.0);
        assert!(outcome.jumped);
        for _ in 0..150 {
            update_movement(&mut cam, &forward(), &[obstacle], &cfg, 1.0 / 60.0);
            assert!(
                !obstacle.intersects_sphere(cam.position, cfg.radius),
                "inside the cube at {:?}",
                cam.position
            );
        }
        // Came down on the cube, walked off the far side and back to the ground.
        assert!(cam.position.z < -2.0, "{:?}", cam.position);
        assert!(cam.vertical.grounded);
        assert!((cam.position.y - (cfg.jump.ground_level + cfg.eye_height)).abs() < TOL);
    }

    #[test]
    fn landing_on_cube_top_allows_another_jump() {
        let cfg = MovementConfig::default();
        let obstacle = Aabb::from_center_half_extent(Vector3::ZERO, OBJECT_HALF_EXTENT);
        // Above the cube, falling.
        let mut cam = CameraState::new(Vector3::new(0.0, 2.0, 0.0), -90.0, 0.0);
        cam.vertical.grounded = false;
        for _ in 0..120 {
            update_movement(&mut cam, &MoveIntent::default(), &[obstacle], &cfg, 1.0 / 60.0);
        }
        assert!(cam.vertical.grounded);
        assert!(cam.position.y > obstacle.max.y + cfg.radius - 1e-4, "{:?}", cam.position);
        let jump = MoveIntent {
            vertical: 1.0,
            ..MoveIntent::default()
        };
        assert!(update_movement(&mut cam, &jump, &[obstacle], &cfg, 1.0 / 60.0).jumped);
    }
}
