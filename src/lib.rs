//! Toonletter is a lettering engine for layered image documents.
//!
//! A session decodes a layered document off the interactive thread, exposes the
//! flattened composite plus the positions of a named "dialogue" layer group,
//! lets a view layer edit resizable speech-balloon boxes aligned to the source
//! image, and re-encodes the document with one new group of rasterized
//! balloons.
//!
//! # Pipeline overview
//!
//! 1. **Decode**: `bytes -> DocumentModel` + dialogue seed (composite pixels,
//!    detected balloon anchors) inside the codec worker thread
//! 2. **Map**: document-space anchors -> viewport-space [`OverlayBox`]es via
//!    the pure coordinate mapper
//! 3. **Edit**: drag/resize/create/delete under the overlay interaction state
//!    machine, with boundary and minimum-size clamping
//! 4. **Encode**: viewport boxes -> document space -> rasterized balloon
//!    layers -> re-encoded bytes, again inside the worker thread
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **The interactive thread never blocks**: codec and raster work runs on a
//!   dedicated worker thread behind a FIFO message channel; a separate ticker
//!   thread drives progress text with no ordering guarantee across the two.
//! - **Explicit geometry**: the mapper and overlay engine take container
//!   metrics as parameters; nothing in the core reaches into a view layer.
//! - **Stale work is discarded**: every envelope carries a session id and the
//!   controller drops responses from superseded sessions.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(missing_docs_in_private_items)]

mod document;
mod foundation;
mod mapper;
mod overlay;
mod raster;
mod session;
mod worker;

pub use document::adapter::{
    AdapterConfig, CodecAdapter, DecodedDocument, DialogueSeed, EXPORT_GROUP_NAME,
};
pub use document::codec::{EncodeVariant, LayeredCodec, LyrCodec};
pub use document::model::{
    CompositeImage, DocumentModel, LayerBounds, LayerKind, LayerNode, TextGroupBox,
};
pub use foundation::error::{ToonletterError, ToonletterResult};
pub use foundation::geometry::{ContainerMetrics, Point, Size, Vec2, inrange};
pub use mapper::viewport::{
    BoxGeometry, default_balloon_size, document_scale, to_document, to_viewport, viewport_scale,
};
pub use overlay::engine::{BOUNDARY_MARGIN, BoxId, MIN_HEIGHT, MIN_WIDTH, OverlayBox, OverlayEngine};
pub use overlay::interact::{Handle, Interaction, PointerTarget};
pub use raster::balloon::{BalloonRaster, RasterizedBalloon};
pub use raster::pool::{PooledSurface, SurfacePool};
pub use session::controller::{DownloadArtifact, SessionController, SessionEvent};
pub use worker::channel::WorkerChannel;
pub use worker::protocol::{
    Envelope, ProgressAction, ProgressCommand, ProgressUpdate, Request, Response, SIGNATURE,
    SessionId, validate_raw,
};
pub use worker::ticker::TickerChannel;
