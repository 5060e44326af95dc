//! Thin 3D math layer: 3-component vectors and column-major 4x4 matrices.
//!
//! # Invariants
//! - Every operation is pure; values are `Copy` and never mutated in place.
//! - Matrices are column-major (`m[col * 4 + row]`) and transform points as `M * p`.
//! - Numeric degeneracies return zero/degenerate results instead of errors.

mod matrix;
mod vector;

pub use matrix::Matrix4;
pub use vector::{NORMALIZE_EPSILON, Vector3};
