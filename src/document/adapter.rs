use anyhow::Context as _;

use crate::document::codec::{EncodeVariant, LayeredCodec, LyrCodec};
use crate::document::model::{
    CompositeImage, DocumentModel, LayerBounds, LayerKind, LayerNode, TextGroupBox,
};
use crate::foundation::error::ToonletterResult;

/// Name given to the synthesized export group.
pub const EXPORT_GROUP_NAME: &str = "Script result";

/// Adapter configuration.
#[derive(Clone, Debug)]
pub struct AdapterConfig {
    /// Name of the top-level group holding dialogue text layers.
    pub dialogue_group: String,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            // The source convention names the dialogue group in Korean.
            dialogue_group: "대사".to_string(),
        }
    }
}

/// Detected dialogue layers, extracted as a side product of decoding.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DialogueSeed {
    /// Ordered projections of the dialogue group's children.
    pub boxes: Vec<TextGroupBox>,
    /// The original group node, kept for passthrough styling at export time.
    pub group: Option<LayerNode>,
}

/// Full decode result: the model plus the dialogue seed.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedDocument {
    /// Decoded document model.
    pub model: DocumentModel,
    /// Detected dialogue layers; empty when the convention is absent.
    pub dialogue: DialogueSeed,
}

/// Wraps the codec with the dialogue-group convention and the export splice.
pub struct CodecAdapter {
    codec: Box<dyn LayeredCodec>,
    config: AdapterConfig,
}

impl Default for CodecAdapter {
    fn default() -> Self {
        Self::new(Box::new(LyrCodec), AdapterConfig::default())
    }
}

impl CodecAdapter {
    /// Construct an adapter over an arbitrary codec.
    pub fn new(codec: Box<dyn LayeredCodec>, config: AdapterConfig) -> Self {
        Self { codec, config }
    }

    /// Configured dialogue group name.
    pub fn dialogue_group(&self) -> &str {
        &self.config.dialogue_group
    }

    /// Decode container bytes and extract the dialogue seed.
    ///
    /// Absence of a dialogue group is not a failure; the seed is simply
    /// empty. Decode errors carry a human-readable reason and are never
    /// retried.
    pub fn decode(&self, bytes: &[u8]) -> ToonletterResult<DecodedDocument> {
        let model = self.codec.decode(bytes)?;

        let dialogue = model
            .children
            .iter()
            .find(|node| {
                matches!(node.kind, LayerKind::Group { .. })
                    && node.name == self.config.dialogue_group
            })
            .map(|group| DialogueSeed {
                boxes: group
                    .children()
                    .unwrap_or_default()
                    .iter()
                    .map(|child| TextGroupBox {
                        name: child.name.clone(),
                        left: child.bounds.left,
                        top: child.bounds.top,
                    })
                    .collect(),
                group: Some(group.clone()),
            })
            .unwrap_or_default();

        tracing::debug!(
            width = model.width,
            height = model.height,
            layers = model.layer_count(),
            dialogue_boxes = dialogue.boxes.len(),
            "decoded document"
        );
        Ok(DecodedDocument { model, dialogue })
    }

    /// Decode a plain raster image (PNG/JPEG) as a single-layer document.
    ///
    /// This is the simplified path for non-layered drops.
    pub fn decode_flat_image(&self, bytes: &[u8]) -> ToonletterResult<DecodedDocument> {
        let rgba = image::load_from_memory(bytes)
            .context("decode image from memory")?
            .to_rgba8();
        let (width, height) = rgba.dimensions();
        let rgba8 = rgba.into_raw();

        let bounds = LayerBounds {
            left: 0,
            top: 0,
            width,
            height,
        };
        let model = DocumentModel {
            width,
            height,
            composite: CompositeImage {
                width,
                height,
                rgba8: rgba8.clone(),
            },
            children: vec![LayerNode::raster("Background", bounds, rgba8)?],
        };
        Ok(DecodedDocument {
            model,
            dialogue: DialogueSeed::default(),
        })
    }

    /// Encode `model` with rasterized balloon layers spliced in as a new
    /// export group.
    ///
    /// With an empty `balloon_layers` list the document is encoded unchanged
    /// and any pre-existing dialogue group is carried through as-is. The
    /// model itself is never mutated; the splice happens on a copy with a
    /// replaced child list.
    pub fn encode_with_export_group(
        &self,
        model: &DocumentModel,
        balloon_layers: Vec<LayerNode>,
        passthrough: Option<&LayerNode>,
        variant: EncodeVariant,
    ) -> ToonletterResult<Vec<u8>> {
        if balloon_layers.is_empty() {
            return self.codec.encode(model, variant);
        }

        // Carry the detected group's bounds so styling-adjacent metadata the
        // codec preserves stays with the new group.
        let bounds = passthrough.map(|g| g.bounds).unwrap_or_default();
        let export = LayerNode::group(EXPORT_GROUP_NAME, bounds, balloon_layers);

        let mut children = model.children.clone();
        children.push(export);
        self.codec.encode(&model.with_children(children), variant)
    }

    /// Encode without any splice (passthrough export).
    pub fn encode(
        &self,
        model: &DocumentModel,
        variant: EncodeVariant,
    ) -> ToonletterResult<Vec<u8>> {
        self.codec.encode(model, variant)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/adapter.rs"]
mod tests;
