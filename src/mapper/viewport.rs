//! Stateless translation between document pixel space (fixed by the source
//! file) and viewport space (the on-screen rendered width).
//!
//! Positions are a straight linear map and round-trip exactly under
//! reciprocal scales. Widths and heights of seeded balloons deliberately do
//! not: they come from a constant default scaled by the inverse
//! viewport/document ratio, not from the source layer's size.

use crate::document::model::TextGroupBox;
use crate::foundation::geometry::Size;

/// Plain geometry of one box, in whichever space the caller is working in.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoxGeometry {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

/// Document → viewport scale factor.
pub fn viewport_scale(viewport_width: f64, document_width: u32) -> f64 {
    viewport_width / f64::from(document_width)
}

/// Viewport → document scale factor (reciprocal of [`viewport_scale`]).
pub fn document_scale(viewport_width: f64, document_width: u32) -> f64 {
    f64::from(document_width) / viewport_width
}

/// Default size for a seeded balloon.
///
/// A fixed constant, picked by whether the viewport is wider than the
/// document, then scaled by the inverse ratio so default boxes stay visually
/// proportionate at any zoom level.
pub fn default_balloon_size(viewport_width: f64, document_width: u32) -> Size {
    let inverse = document_scale(viewport_width, document_width);
    let (w, h) = if viewport_width > f64::from(document_width) {
        (400.0, 300.0)
    } else {
        (200.0, 150.0)
    };
    Size::new(w * inverse, h * inverse)
}

/// Place a detected dialogue anchor in viewport space.
///
/// `scale` is [`viewport_scale`]; `default_size` comes from
/// [`default_balloon_size`].
pub fn to_viewport(anchor: &TextGroupBox, scale: f64, default_size: Size) -> BoxGeometry {
    BoxGeometry {
        left: f64::from(anchor.left) * scale,
        top: f64::from(anchor.top) * scale,
        width: default_size.width,
        height: default_size.height,
    }
}

/// Map edited viewport geometry back into document space for export.
///
/// `scale` is [`document_scale`]; every field is a straight multiply.
pub fn to_document(geometry: BoxGeometry, scale: f64) -> BoxGeometry {
    BoxGeometry {
        left: geometry.left * scale,
        top: geometry.top * scale,
        width: geometry.width * scale,
        height: geometry.height * scale,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mapper/viewport.rs"]
mod tests;
