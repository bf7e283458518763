//! The interactive-side controller: owns the overlay engine, the worker and
//! ticker channels, and the single-file session invariant.
//!
//! Exactly one file is open at a time. Dropping a new file supersedes the
//! previous session entirely: overlays are cleared, the session id advances,
//! and any response still in flight for the old session is discarded when it
//! arrives.

use std::path::Path;
use std::time::Instant;

use crate::document::codec::EncodeVariant;
use crate::document::model::{CompositeImage, LayerNode};
use crate::foundation::error::{ToonletterError, ToonletterResult};
use crate::foundation::geometry::{ContainerMetrics, Point};
use crate::mapper::viewport::{default_balloon_size, viewport_scale};
use crate::overlay::engine::{BoxId, OverlayBox, OverlayEngine};
use crate::overlay::interact::PointerTarget;
use crate::worker::channel::WorkerChannel;
use crate::worker::protocol::{Envelope, ProgressUpdate, Request, Response, SessionId};
use crate::worker::ticker::TickerChannel;

/// File extensions the controller accepts on open.
const ACCEPTED_EXTENSIONS: &[&str] = &["lyr", "lyrb", "png", "jpg", "jpeg"];

/// An encoded file ready to be handed to the user.
#[derive(Clone, Debug, PartialEq)]
pub struct DownloadArtifact {
    /// Encoded container bytes.
    pub bytes: Vec<u8>,
    /// File name the export was requested under.
    pub file_name: String,
}

/// Observable outcome of one pumped message.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// The composite image of the opened file is available.
    CompositeReady {
        /// Total number of layers in the decoded document.
        layer_count: usize,
    },
    /// Dialogue anchors were seeded into the overlay.
    DialogueSeeded {
        /// Number of balloons created.
        count: usize,
    },
    /// An export finished; the artifact is also retained on the controller.
    DownloadReady(DownloadArtifact),
    /// Rotating status text changed. `None` clears the indicator.
    Progress(Option<String>),
    /// Background work failed; the session stays open.
    Failed(String),
}

/// Details of the currently open file.
#[derive(Clone, Debug)]
struct LoadedFile {
    /// File name as dropped, including extension.
    name: String,
    /// Lowercased extension.
    extension: String,
    /// Original bytes, kept so export can re-decode the full layer tree.
    bytes: Vec<u8>,
}

/// Drives one editing session over the background contexts.
pub struct SessionController {
    worker: WorkerChannel,
    ticker: TickerChannel,
    overlay: OverlayEngine,
    session: SessionId,
    viewport_width: f64,
    loaded: Option<LoadedFile>,
    composite: Option<CompositeImage>,
    passthrough: Option<LayerNode>,
    document_width: Option<u32>,
    loading: bool,
    progress: Option<String>,
    last_error: Option<String>,
    download: Option<DownloadArtifact>,
}

impl SessionController {
    /// Spawn the background contexts and construct an idle controller.
    ///
    /// `viewport_width` is the rendered width of the document on screen; it
    /// can be updated later as the layout changes.
    pub fn new(viewport_width: f64) -> Self {
        Self::with_channels(WorkerChannel::spawn(), TickerChannel::spawn(), viewport_width)
    }

    /// Construct over pre-spawned channels. Tests use this to inject a
    /// short-interval ticker.
    pub fn with_channels(worker: WorkerChannel, ticker: TickerChannel, viewport_width: f64) -> Self {
        Self {
            worker,
            ticker,
            overlay: OverlayEngine::new(),
            session: SessionId(0),
            viewport_width,
            loaded: None,
            composite: None,
            passthrough: None,
            document_width: None,
            loading: false,
            progress: None,
            last_error: None,
            download: None,
        }
    }

    /// Open a dropped file, superseding any previous one.
    ///
    /// Rejects unsupported extensions before any bytes cross a channel.
    /// On success the session id advances and a parse request is in flight.
    #[tracing::instrument(skip(self, bytes), fields(file_name, len = bytes.len()))]
    pub fn open_file(&mut self, file_name: &str, bytes: Vec<u8>) -> ToonletterResult<()> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ToonletterError::validation(format!(
                "unsupported file type '{extension}'"
            )));
        }

        self.session = SessionId(self.session.0 + 1);
        self.overlay.clear();
        self.composite = None;
        self.passthrough = None;
        self.document_width = None;
        self.last_error = None;
        self.download = None;
        self.loading = true;

        self.worker.send(Envelope::new(
            self.session,
            Request::ParseData {
                bytes: bytes.clone(),
            },
        ))?;
        self.loaded = Some(LoadedFile {
            name: file_name.to_string(),
            extension,
            bytes,
        });
        Ok(())
    }

    /// Request an export of the open document with the current balloons.
    ///
    /// `stem` is the output name without its extension; layered inputs keep
    /// their container variant, flat images export as the standard one.
    pub fn request_export(&mut self, stem: &str) -> ToonletterResult<()> {
        let loaded = self
            .loaded
            .as_ref()
            .ok_or_else(|| ToonletterError::validation("no file is open"))?;
        if self.viewport_width <= 0.0 {
            return Err(ToonletterError::validation(
                "viewport width must be positive at export time",
            ));
        }

        let variant =
            EncodeVariant::for_extension(&loaded.extension).unwrap_or(EncodeVariant::Standard);
        let extension = match variant {
            EncodeVariant::Standard => "lyr",
            EncodeVariant::Large => "lyrb",
        };
        let file_name = format!("{stem}.{extension}");

        self.worker.send(Envelope::new(
            self.session,
            Request::WriteFile {
                original: loaded.bytes.clone(),
                boxes: self.overlay.boxes().to_vec(),
                passthrough: self.passthrough.clone(),
                viewport_width: self.viewport_width,
                variant,
                file_name,
            },
        ))?;
        self.loading = true;
        self.ticker.start(self.session)?;
        Ok(())
    }

    /// Drain both channels and apply every message for the current session.
    ///
    /// Responses stamped with an older session id are dropped. Returns the
    /// events produced, in arrival order per channel.
    pub fn pump(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        for envelope in self.worker.drain() {
            match self.apply_response(envelope) {
                Some(event) => events.push(event),
                None => continue,
            }
        }
        for envelope in self.ticker.drain() {
            if let Some(event) = self.apply_progress(envelope) {
                events.push(event);
            }
        }
        events
    }

    fn apply_response(&mut self, envelope: Envelope<Response>) -> Option<SessionEvent> {
        if envelope.validate().is_err() || envelope.session != self.session {
            tracing::debug!(
                session = envelope.session.0,
                current = self.session.0,
                "discarded stale or malformed response"
            );
            return None;
        }

        match envelope.payload {
            Response::MainImageData {
                image,
                layer_count,
            } => {
                self.composite = Some(image);
                Some(SessionEvent::CompositeReady { layer_count })
            }
            Response::Group {
                boxes,
                group,
                document_width,
            } => {
                self.passthrough = group;
                self.document_width = Some(document_width);
                // The composite arrives first on this channel, so the
                // dialogue seed marks the end of loading.
                self.loading = false;

                let scale = viewport_scale(self.viewport_width, document_width);
                let default = default_balloon_size(self.viewport_width, document_width);
                self.overlay.seed_from_dialogue(&boxes, scale, default);
                Some(SessionEvent::DialogueSeeded { count: boxes.len() })
            }
            Response::DownloadFile { bytes, file_name } => {
                self.loading = false;
                let _ = self.ticker.stop(self.session);
                let artifact = DownloadArtifact { bytes, file_name };
                self.download = Some(artifact.clone());
                Some(SessionEvent::DownloadReady(artifact))
            }
            Response::Error { reason } => {
                self.loading = false;
                let _ = self.ticker.stop(self.session);
                self.last_error = Some(reason.clone());
                tracing::warn!(%reason, "background work failed");
                Some(SessionEvent::Failed(reason))
            }
        }
    }

    fn apply_progress(&mut self, envelope: Envelope<ProgressUpdate>) -> Option<SessionEvent> {
        if envelope.validate().is_err() || envelope.session != self.session {
            return None;
        }
        let ProgressUpdate::Progress(text) = envelope.payload;
        self.progress = text.clone();
        Some(SessionEvent::Progress(text))
    }

    /// Update the rendered document width after a layout change.
    pub fn set_viewport_width(&mut self, width: f64) {
        self.viewport_width = width;
    }

    /// Current session id.
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Whether a parse or export is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Composite of the open document, once decoded.
    pub fn composite(&self) -> Option<&CompositeImage> {
        self.composite.as_ref()
    }

    /// Name of the open file, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.loaded.as_ref().map(|f| f.name.as_str())
    }

    /// Latest rotating status text.
    pub fn progress(&self) -> Option<&str> {
        self.progress.as_deref()
    }

    /// Most recent background failure, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Most recent export artifact, if any.
    pub fn download(&self) -> Option<&DownloadArtifact> {
        self.download.as_ref()
    }

    /// Balloons in z-order, bottom first.
    pub fn boxes(&self) -> &[OverlayBox] {
        self.overlay.boxes()
    }

    /// Toggle click-to-create mode.
    pub fn set_add_text(&mut self, on: bool) {
        self.overlay.set_add_text(on);
    }

    /// Forward a pointer-down to the overlay engine.
    pub fn pointer_down(&mut self, target: PointerTarget, at: Point) {
        self.overlay.pointer_down(target, at);
    }

    /// Forward a pointer-move to the overlay engine.
    pub fn pointer_move(&mut self, at: Point, container: ContainerMetrics) {
        self.overlay.pointer_move(at, container);
    }

    /// Forward a pointer release to the overlay engine.
    pub fn pointer_up(&mut self, now: Instant) {
        self.overlay.pointer_up(now);
    }

    /// Forward a container click; returns the created balloon's id, if any.
    pub fn click(&mut self, at: Point, container: ContainerMetrics, now: Instant) -> Option<BoxId> {
        self.overlay.click(at, container, now)
    }

    /// Delete one balloon.
    pub fn delete(&mut self, id: BoxId) -> bool {
        self.overlay.delete(id)
    }

    /// Replace one balloon's text.
    pub fn set_text(&mut self, id: BoxId, text: impl Into<String>) -> bool {
        self.overlay.set_text(id, text)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/controller.rs"]
mod tests;
