use crate::foundation::error::{ToonletterError, ToonletterResult};

/// Integer pixel rectangle of a layer in document space.
///
/// A group's bounds are not guaranteed to equal the union of its children's
/// bounds; nothing in this crate assumes that.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LayerBounds {
    /// Left edge in document pixels.
    pub left: i32,
    /// Top edge in document pixels.
    pub top: i32,
    /// Width in document pixels.
    pub width: u32,
    /// Height in document pixels.
    pub height: u32,
}

impl LayerBounds {
    /// Byte length of an RGBA8 buffer covering these bounds, or `None` when
    /// the multiply would overflow `usize`.
    pub fn raster_byte_len(self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(4))
    }
}

/// Layer payload: a raster leaf or a group of ordered children.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum LayerKind {
    /// Leaf layer with row-major RGBA8 pixels sized by its bounds.
    Raster {
        /// Pixel bytes, `bounds.width * bounds.height * 4` long.
        rgba8: Vec<u8>,
    },
    /// Group layer; child order is z-order, bottom first.
    Group {
        /// Ordered children.
        children: Vec<LayerNode>,
    },
}

/// One node of the document layer tree.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayerNode {
    /// Layer name; not guaranteed unique.
    pub name: String,
    /// Document-space bounds.
    pub bounds: LayerBounds,
    /// Raster payload or children.
    pub kind: LayerKind,
}

impl LayerNode {
    /// Construct a group node with the given children.
    pub fn group(name: impl Into<String>, bounds: LayerBounds, children: Vec<LayerNode>) -> Self {
        Self {
            name: name.into(),
            bounds,
            kind: LayerKind::Group { children },
        }
    }

    /// Construct a raster leaf; fails when the pixel length does not match
    /// the bounds.
    pub fn raster(
        name: impl Into<String>,
        bounds: LayerBounds,
        rgba8: Vec<u8>,
    ) -> ToonletterResult<Self> {
        if bounds.raster_byte_len() != Some(rgba8.len()) {
            return Err(ToonletterError::validation(format!(
                "raster layer byte length {} does not match {}x{} bounds",
                rgba8.len(),
                bounds.width,
                bounds.height
            )));
        }
        Ok(Self {
            name: name.into(),
            bounds,
            kind: LayerKind::Raster { rgba8 },
        })
    }

    /// Children of a group node, or `None` for a raster leaf.
    pub fn children(&self) -> Option<&[LayerNode]> {
        match &self.kind {
            LayerKind::Group { children } => Some(children),
            LayerKind::Raster { .. } => None,
        }
    }

    /// Total number of nodes under (and including) this one.
    pub fn node_count(&self) -> usize {
        match &self.kind {
            LayerKind::Raster { .. } => 1,
            LayerKind::Group { children } => {
                1 + children.iter().map(LayerNode::node_count).sum::<usize>()
            }
        }
    }
}

/// Flattened composite of the whole document.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CompositeImage {
    /// Document width in pixels.
    pub width: u32,
    /// Document height in pixels.
    pub height: u32,
    /// Row-major RGBA8 pixels, `width * height * 4` bytes.
    pub rgba8: Vec<u8>,
}

/// Decoded representation of a layered source file.
///
/// `width`/`height` are fixed by the source file and immutable once decoded.
/// The session controller treats the model as read-mostly; encode paths work
/// on a copy with a replaced child list rather than mutating in place.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DocumentModel {
    /// Document width in pixels.
    pub width: u32,
    /// Document height in pixels.
    pub height: u32,
    /// Flattened composite of all layers.
    pub composite: CompositeImage,
    /// Ordered top-level layers, bottom first.
    pub children: Vec<LayerNode>,
}

impl DocumentModel {
    /// Validate internal consistency (composite sized to the document).
    pub fn validate(&self) -> ToonletterResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ToonletterError::validation(
                "document dimensions must be non-zero",
            ));
        }
        if self.composite.width != self.width || self.composite.height != self.height {
            return Err(ToonletterError::validation(
                "composite dimensions do not match document",
            ));
        }
        let expected = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(4));
        if expected != Some(self.composite.rgba8.len()) {
            return Err(ToonletterError::validation(format!(
                "composite byte length {} does not match {}x{} document",
                self.composite.rgba8.len(),
                self.width,
                self.height
            )));
        }
        Ok(())
    }

    /// Total number of layer nodes in the tree.
    pub fn layer_count(&self) -> usize {
        self.children.iter().map(LayerNode::node_count).sum()
    }

    /// Shallow copy with a replaced top-level child list.
    ///
    /// Encode operations use this so the displayed document and the exported
    /// one never alias.
    pub fn with_children(&self, children: Vec<LayerNode>) -> Self {
        Self {
            width: self.width,
            height: self.height,
            composite: self.composite.clone(),
            children,
        }
    }
}

/// Lightweight projection of one child of the dialogue group.
///
/// Produced once by the decode step and immutable afterwards; positions are
/// in document space.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextGroupBox {
    /// Layer name (becomes the seeded balloon's text).
    pub name: String,
    /// Left edge in document pixels.
    pub left: i32,
    /// Top edge in document pixels.
    pub top: i32,
}

#[cfg(test)]
#[path = "../../tests/unit/document/model.rs"]
mod tests;
