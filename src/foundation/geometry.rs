pub use kurbo::{Point, Vec2};

/// Clamp `v` into `[lo, hi]`.
///
/// Bounds are checked in order, `lo` first. With inverted bounds (`hi < lo`,
/// a box wider than its container) values below `lo` pin to the leading edge
/// while values above `hi` still pin to `hi`.
pub fn inrange(v: f64, lo: f64, hi: f64) -> f64 {
    if v < lo {
        return lo;
    }
    if v > hi {
        return hi;
    }
    v
}

/// A width/height pair in viewport pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Size {
    /// Construct a size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Explicit metrics of the container hosting the overlay boxes.
///
/// The view layer supplies these; the overlay engine and coordinate mapper
/// never look anything up themselves. `scroll_height` is the full scrollable
/// extent, which bottom-anchored resize handles clamp against, while `width`
/// is the rendered (and therefore horizontal clamping) width.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ContainerMetrics {
    /// Rendered width in pixels.
    pub width: f64,
    /// Full scrollable content height in pixels.
    pub scroll_height: f64,
}

impl ContainerMetrics {
    /// Construct container metrics.
    pub fn new(width: f64, scroll_height: f64) -> Self {
        Self {
            width,
            scroll_height,
        }
    }
}
