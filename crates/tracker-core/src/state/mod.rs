//! Step state machine for the fulfillment checklist.
//!
//! Maps a server-reported order status onto a step vector, merges it with
//! locally advanced flags, and decides what a checkbox toggle does.

pub mod steps;

pub use steps::{derive_steps, reconcile, toggle, transition_for_index, StepError, ToggleOutcome};
