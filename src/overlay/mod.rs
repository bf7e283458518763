//! Overlay balloon collection and the pointer interaction state machine.

/// Ordered balloon collection and pointer orchestration.
pub mod engine;
/// Handles, interaction states and the clamped geometry update rules.
pub mod interact;
