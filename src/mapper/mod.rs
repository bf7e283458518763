//! Pure document-space ↔ viewport-space coordinate mapping.

/// Scale factors, seeding and export mapping.
pub mod viewport;
