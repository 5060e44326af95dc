//! wgpu backend for the cube scene.
//!
//! Draws a [`cubescene_render::FramePlan`]: sky cube map at the far plane,
//! a tiled ground quad, then instanced textured cubes, all fogged in the
//! fragment shader.
//!
//! # Invariants
//! - The renderer never mutates world state.
//! - A shader program that fails to build disables only its own draws.

mod error;
mod gpu;
mod mesh;
mod shaders;
mod textures;

pub use error::RenderError;
pub use gpu::WgpuRenderer;
