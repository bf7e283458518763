//! Balloon rasterization and the reusable surface pool.

/// Balloon rendering: box chrome, word wrap, SVG synthesis, rasterization.
pub mod balloon;
/// Bounded free-list of reusable raster surfaces.
pub mod pool;
