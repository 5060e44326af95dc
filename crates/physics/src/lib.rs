//! Collision and vertical motion for the camera body.
//!
//! # Invariants
//! - Collision is a pure overlap test; nothing here resolves or slides.
//! - Exact tangency between a sphere and a box is not a collision.
//! - Vertical motion integrates velocity before position (semi-implicit Euler).

pub mod collision;
pub mod vertical;

pub use collision::{Aabb, sphere_intersects_box};
pub use vertical::{JumpConfig, VerticalMotion};
