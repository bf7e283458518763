//! Background execution contexts and the message protocol between them and
//! the interactive thread.

/// The codec worker thread and its channel handle.
pub mod channel;
/// Envelopes, typed message enums, validation.
pub mod protocol;
/// The independent progress-ticker thread.
pub mod ticker;
