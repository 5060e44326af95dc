use serde::{Deserialize, Serialize};

/// Linear distance fog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fog {
    pub color: [f32; 3],
    /// Distance where fog starts.
    pub start: f32,
    /// Distance where fog fully covers geometry.
    pub end: f32,
}

impl Default for Fog {
    fn default() -> Self {
        Self {
            color: [0.62, 0.74, 0.86],
            start: 6.0,
            end: 30.0,
        }
    }
}

impl Fog {
    /// Visibility at `distance`: 1 before `start`, 0 past `end`, linear between.
    pub fn factor(&self, distance: f32) -> f32 {
        let span = self.end - self.start;
        if span <= 0.0 {
            return if distance < self.end { 1.0 } else { 0.0 };
        }
        ((self.end - distance) / span).clamp(0.0, 1.0)
    }

    /// Blend a lit color towards the fog color by distance.
    pub fn apply(&self, color: [f32; 3], distance: f32) -> [f32; 3] {
        let f = self.factor(distance);
        [0, 1, 2].map(|i| self.color[i] + (color[i] - self.color[i]) * f)
    }
}

/// Variant toggles and projection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    pub skybox: bool,
    pub fog_enabled: bool,
    pub fog: Fog,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Background when fog is off.
    pub clear_color: [f32; 3],
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            skybox: true,
            fog_enabled: true,
            fog: Fog::default(),
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            clear_color: [0.1, 0.1, 0.15],
        }
    }
}

impl RenderSettings {
    /// Background color; matches the fog so distant geometry fades into it.
    pub fn background(&self) -> [f32; 3] {
        if self.fog_enabled {
            self.fog.color
        } else {
            self.clear_color
        }
    }
}
