//! Message protocol between the interactive thread and the background
//! contexts.
//!
//! Every message travels inside an [`Envelope`] carrying a shared-secret-like
//! signature (rejects foreign or malformed traffic, fails closed), a creation
//! timestamp, and the session id used to discard stale responses. Payloads
//! are exhaustive typed enums, so an unrecognized message kind is a
//! compile-time error on this side of the boundary; [`validate_raw`] covers
//! the serialized boundary where that guarantee does not reach.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::document::codec::EncodeVariant;
use crate::document::model::{CompositeImage, LayerNode, TextGroupBox};
use crate::foundation::error::{ToonletterError, ToonletterResult};
use crate::overlay::engine::OverlayBox;

/// Constant tag shared by both sides of every channel.
pub const SIGNATURE: &str = "toonletter-message";

/// Message type tags recognized on any channel.
const RECOGNIZED_TYPES: &[&str] = &[
    "ParseData",
    "WriteFile",
    "Shutdown",
    "MainImageData",
    "Group",
    "DownloadFile",
    "Error",
    "Layer",
    "Children",
    "ProgressAction",
    "Progress",
];

/// Monotonically increasing correlation id stamped on every envelope.
///
/// A new file drop advances the session; responses carrying an older id are
/// discarded by the controller instead of being applied to the wrong file.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct SessionId(pub u64);

/// Wrapper carried by every message on every channel.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Envelope<M> {
    /// Correlation id of the session this message belongs to.
    pub session: SessionId,
    /// Constant tag; also serves as a protocol version marker.
    pub signature: String,
    /// Milliseconds since the Unix epoch at creation time (not send time).
    pub timestamp_ms: u64,
    /// The typed payload.
    #[serde(flatten)]
    pub payload: M,
}

impl<M> Envelope<M> {
    /// Wrap `payload` with the current timestamp and the shared signature.
    pub fn new(session: SessionId, payload: M) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        Self {
            session,
            signature: SIGNATURE.to_string(),
            timestamp_ms,
            payload,
        }
    }

    /// Check the envelope's signature; fails closed on a mismatch.
    pub fn validate(&self) -> ToonletterResult<()> {
        if self.signature != SIGNATURE {
            return Err(ToonletterError::protocol(format!(
                "message signature '{}' does not match '{SIGNATURE}'",
                self.signature
            )));
        }
        Ok(())
    }
}

/// Interactive thread → codec worker.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Request {
    /// Parse file bytes as a layered document (or a flat raster image, by
    /// content sniffing). Ownership of the buffer moves with the message.
    ParseData {
        /// Raw file bytes.
        bytes: Vec<u8>,
    },
    /// Re-encode the original file with a rasterized balloon group.
    WriteFile {
        /// Original file bytes, re-decoded worker-side so the full layer
        /// tree is available.
        original: Vec<u8>,
        /// Current overlay boxes, in viewport space.
        boxes: Vec<OverlayBox>,
        /// Detected dialogue group for passthrough styling.
        passthrough: Option<LayerNode>,
        /// Viewport width at export time (drives the export scale).
        viewport_width: f64,
        /// Output container variant.
        variant: EncodeVariant,
        /// Download file name chosen by the user.
        file_name: String,
    },
    /// Stop the worker thread.
    Shutdown,
}

/// Codec worker → interactive thread.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Response {
    /// Flattened composite of the parsed document.
    MainImageData {
        /// Composite pixels and dimensions.
        image: CompositeImage,
        /// Total number of layers in the document.
        layer_count: usize,
    },
    /// Detected dialogue anchors used to seed overlay balloons.
    Group {
        /// Ordered dialogue anchors in document space.
        boxes: Vec<TextGroupBox>,
        /// The original dialogue group node, for passthrough.
        group: Option<LayerNode>,
        /// Document width, needed by the mapper.
        document_width: u32,
    },
    /// Encoded output ready for download.
    DownloadFile {
        /// Encoded container bytes.
        bytes: Vec<u8>,
        /// File name to save under.
        file_name: String,
    },
    /// Background work failed; the description is surfaced to the user.
    Error {
        /// Human-readable reason.
        reason: String,
    },
}

/// Interactive thread → progress ticker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ProgressCommand {
    /// Start or stop the rotating status text.
    #[serde(rename = "ProgressAction")]
    Action(ProgressAction),
}

/// Payload of a [`ProgressCommand`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressAction {
    /// Begin emitting status text, one message immediately.
    Start,
    /// Stop the rotation and reset counters.
    Stop,
}

/// Progress ticker → interactive thread.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ProgressUpdate {
    /// Rotating status text; `None` clears the indicator.
    Progress(Option<String>),
}

/// Validate a serialized message at a boundary where typed enums cannot.
///
/// Rejects anything that is not an object with the shared signature, a
/// recognized `type` tag, and a `value` field.
pub fn validate_raw(data: &serde_json::Value) -> ToonletterResult<()> {
    let obj = data
        .as_object()
        .ok_or_else(|| ToonletterError::protocol("message is not an object"))?;

    match obj.get("signature").and_then(|v| v.as_str()) {
        Some(SIGNATURE) => {}
        Some(other) => {
            return Err(ToonletterError::protocol(format!(
                "message signature '{other}' does not match '{SIGNATURE}'"
            )));
        }
        None => return Err(ToonletterError::protocol("message is missing a signature")),
    }

    let kind = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToonletterError::protocol("message is missing a type tag"))?;
    if !RECOGNIZED_TYPES.contains(&kind) {
        return Err(ToonletterError::protocol(format!(
            "unexpected message type '{kind}'"
        )));
    }

    if !obj.contains_key("value") {
        return Err(ToonletterError::protocol("message is missing a value"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/worker/protocol.rs"]
mod tests;
