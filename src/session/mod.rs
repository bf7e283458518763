//! The interactive-side session: one open document, its overlay state, and
//! the channels to the background contexts.

/// The session controller and its event stream.
pub mod controller;
