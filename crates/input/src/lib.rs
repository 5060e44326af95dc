//! Input layer: held keyboard actions and pointer deltas, sampled once per frame.
//!
//! # Invariants
//! - The world step consumes [`MoveIntent`]s and pointer deltas, never raw key events.
//! - The first pointer sample after a reset produces no look delta.

pub mod action;
pub mod pointer;

pub use action::{Action, ActionState, MoveIntent, RotationAxis};
pub use pointer::{PointerTracker, VirtualPointer};
