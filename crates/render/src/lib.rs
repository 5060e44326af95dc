//! Rendering Adapter: renderer-agnostic frame description.
//!
//! # Invariants
//! - Renderers never mutate the world; they consume a [`FramePlan`].
//! - Draw order is skybox, ground, then cubes in scene order.
//! - Procedural textures are pure functions of their parameters.

mod frame;
mod renderer;
mod settings;
pub mod texture;

pub use frame::{DrawCall, DrawKind, FogUniform, FramePlan, FrameUniforms};
pub use renderer::{DebugTextRenderer, Renderer};
pub use settings::{Fog, RenderSettings};
pub use texture::{SkyCubemap, SkyGradient, TextureError, TextureImage};

pub fn crate_info() -> &'static str {
    "cubescene-render v0.1.0"
}
