use serde::{Deserialize, Serialize};

/// Constants for the jump/gravity integrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JumpConfig {
    /// Downward acceleration in units/s² (negative).
    pub gravity: f32,
    /// Upward velocity set by a jump.
    pub jump_impulse: f32,
    /// Height of the ground plane the feet rest on.
    pub ground_level: f32,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            gravity: -20.0,
            jump_impulse: 8.0,
            ground_level: -0.5,
        }
    }
}

/// Vertical velocity and ground contact of a walking body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerticalMotion {
    pub velocity: f32,
    pub grounded: bool,
}

impl Default for VerticalMotion {
    fn default() -> Self {
        Self {
            velocity: 0.0,
            grounded: true,
        }
    }
}

impl VerticalMotion {
    /// At rest but not known to stand on anything; the next
    /// [`VerticalMotion::integrate`] decides.
    pub fn airborne() -> Self {
        Self {
            velocity: 0.0,
            grounded: false,
        }
    }

    /// Apply the jump impulse. Only succeeds while grounded.
    pub fn try_jump(&mut self, config: &JumpConfig) -> bool {
        if !self.grounded {
            return false;
        }
        self.velocity = config.jump_impulse;
        self.grounded = false;
        tracing::debug!(velocity = self.velocity, "jump");
        true
    }

    /// Advance one step and return the new feet height.
    ///
    /// Feet that would end at or below the ground are clamped to it, the
    /// velocity is zeroed and the body becomes grounded.
    pub fn integrate(&mut self, feet: f32, config: &JumpConfig, dt: f32) -> f32 {
        self.velocity += config.gravity * dt;
        let next = feet + self.velocity * dt;
        if next <= config.ground_level {
            self.velocity = 0.0;
            self.grounded = true;
            config.ground_level
        } else {
            self.grounded = false;
            next
        }
    }

    /// The last step ran into an obstacle and was undone. A falling body
    /// comes to rest on it; a rising one only loses its speed.
    pub fn block(&mut self) {
        self.grounded = self.velocity <= 0.0;
        self.velocity = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JumpConfig {
        JumpConfig {
            gravity: -20.0,
            jump_impulse: 8.0,
            ground_level: 0.0,
        }
    }

    #[test]
    fn jump_then_one_step_rises() {
        let cfg = config();
        let mut body = VerticalMotion::default();
        assert!(body.try_jump(&cfg));
        let feet = body.integrate(cfg.ground_level, &cfg, 0.05);
        assert!((body.velocity - 7.0).abs() < 1e-5);
        assert!(feet > cfg.ground_level);
        assert!((feet - 0.35).abs() < 1e-5);
        assert!(!body.grounded);
    }

    #[test]
    fn jump_refused_while_airborne() {
        let cfg = config();
        let mut body = VerticalMotion::default();
        assert!(body.try_jump(&cfg));
        body.integrate(0.0, &cfg, 0.05);
        assert!(!body.try_jump(&cfg));
        assert!((body.velocity - 7.0).abs() < 1e-5);
    }

    #[test]
    fn resting_body_stays_grounded() {
        let cfg = config();
        let mut body = VerticalMotion::default();
        for _ in 0..10 {
            let feet = body.integrate(cfg.ground_level, &cfg, 1.0 / 60.0);
            assert_eq!(feet, cfg.ground_level);
        }
        assert!(body.grounded);
        assert_eq!(body.velocity, 0.0);
    }

    #[test]
    fn jump_lands_back_on_ground() {
        let cfg = config();
        let mut body = VerticalMotion::default();
        body.try_jump(&cfg);
        let mut feet = cfg.ground_level;
        let mut peak = feet;
        for _ in 0..200 {
            feet = body.integrate(feet, &cfg, 0.01);
            peak = peak.max(feet);
            if body.grounded {
                break;
            }
        }
        assert!(body.grounded);
        assert_eq!(feet, cfg.ground_level);
        // v²/2g = 64/40 = 1.6, minus discretization loss.
        assert!(peak > 1.4 && peak < 1.65, "peak {peak}");
    }

    #[test]
    fn blocked_fall_rests_and_allows_jump() {
        let cfg = config();
        let mut body = VerticalMotion::airborne();
        body.integrate(2.0, &cfg, 0.1);
        assert!(body.velocity < 0.0);
        body.block();
        assert!(body.grounded);
        assert_eq!(body.velocity, 0.0);
        assert!(body.try_jump(&cfg));
    }

    #[test]
    fn blocked_rise_stays_airborne() {
        let cfg = config();
        let mut body = VerticalMotion::default();
        body.try_jump(&cfg);
        body.block();
        assert!(!body.grounded);
        assert_eq!(body.velocity, 0.0);
        assert!(!body.try_jump(&cfg));
    }

    #[test]
    fn airborne_body_cannot_jump() {
        let mut body = VerticalMotion::airborne();
        assert!(!body.try_jump(&config()));
    }
}
