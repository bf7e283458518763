//! The layered document model and its codec boundary.

/// Codec adapter: decode with dialogue extraction, encode with export splice.
pub mod adapter;
/// The opaque codec contract and the concrete `.lyr` container.
pub mod codec;
/// Decoded document data model.
pub mod model;
