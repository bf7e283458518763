//! The codec worker: one long-lived background thread per document session.
//!
//! All decode, rasterize and encode work happens here so the interactive
//! thread never blocks. Communication is message-passing only; large byte
//! buffers move by ownership transfer. Messages on this channel arrive in
//! send order; no ordering holds between this channel and the ticker's.

use std::thread::JoinHandle;

use flume::{Receiver, Sender};

use crate::document::adapter::CodecAdapter;
use crate::document::codec::EncodeVariant;
use crate::document::model::LayerNode;
use crate::foundation::error::{ToonletterError, ToonletterResult};
use crate::mapper::viewport::document_scale;
use crate::overlay::engine::OverlayBox;
use crate::raster::balloon::BalloonRaster;
use crate::worker::protocol::{Envelope, Request, Response, SessionId};

/// Interactive-side handle to the codec worker thread.
///
/// Dropping the handle asks the worker to shut down and joins it.
pub struct WorkerChannel {
    tx: Sender<Envelope<Request>>,
    rx: Receiver<Envelope<Response>>,
    handle: Option<JoinHandle<()>>,
}

impl WorkerChannel {
    /// Spawn the worker thread with a default codec adapter.
    pub fn spawn() -> Self {
        Self::spawn_with(CodecAdapter::default())
    }

    /// Spawn the worker thread around a specific adapter.
    pub fn spawn_with(adapter: CodecAdapter) -> Self {
        let (req_tx, req_rx) = flume::unbounded::<Envelope<Request>>();
        let (resp_tx, resp_rx) = flume::unbounded::<Envelope<Response>>();

        let handle = std::thread::spawn(move || codec_worker(&adapter, &req_rx, &resp_tx));

        Self {
            tx: req_tx,
            rx: resp_rx,
            handle: Some(handle),
        }
    }

    /// Send one request envelope to the worker.
    pub fn send(&self, envelope: Envelope<Request>) -> ToonletterResult<()> {
        self.tx
            .send(envelope)
            .map_err(|_| ToonletterError::protocol("codec worker is gone"))
    }

    /// Drain every response that has arrived, without blocking.
    pub fn drain(&self) -> Vec<Envelope<Response>> {
        self.rx.try_iter().collect()
    }

    /// Block until the next response arrives. Intended for headless drivers
    /// and tests; interactive callers use [`WorkerChannel::drain`].
    pub fn recv(&self) -> ToonletterResult<Envelope<Response>> {
        self.rx
            .recv()
            .map_err(|_| ToonletterError::protocol("codec worker is gone"))
    }
}

impl Drop for WorkerChannel {
    fn drop(&mut self) {
        let _ = self.tx.send(Envelope::new(SessionId(0), Request::Shutdown));
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Worker thread main loop.
///
/// Every failure is converted into a `Response::Error` envelope for the
/// request's session; nothing here may crash the thread.
fn codec_worker(
    adapter: &CodecAdapter,
    requests: &Receiver<Envelope<Request>>,
    responses: &Sender<Envelope<Response>>,
) {
    let raster = BalloonRaster::new();

    for envelope in requests.iter() {
        if let Err(err) = envelope.validate() {
            // A bad signature is a programming-error class; report it loudly
            // instead of silently dropping the message.
            tracing::warn!(%err, "rejected malformed message");
            let _ = responses.send(Envelope::new(
                envelope.session,
                Response::Error {
                    reason: err.to_string(),
                },
            ));
            continue;
        }

        let session = envelope.session;
        match envelope.payload {
            Request::Shutdown => break,
            Request::ParseData { bytes } => {
                if let Err(err) = handle_parse(adapter, session, &bytes, responses) {
                    let _ = responses.send(Envelope::new(
                        session,
                        Response::Error {
                            reason: err.to_string(),
                        },
                    ));
                }
            }
            Request::WriteFile {
                original,
                boxes,
                passthrough,
                viewport_width,
                variant,
                file_name,
            } => {
                match handle_write(
                    adapter,
                    &raster,
                    &original,
                    &boxes,
                    passthrough,
                    viewport_width,
                    variant,
                ) {
                    Ok(bytes) => {
                        let _ = responses.send(Envelope::new(
                            session,
                            Response::DownloadFile { bytes, file_name },
                        ));
                    }
                    Err(err) => {
                        let _ = responses.send(Envelope::new(
                            session,
                            Response::Error {
                                reason: err.to_string(),
                            },
                        ));
                    }
                }
            }
        }
    }
}

/// Decode a dropped file and answer with the composite, then the dialogue
/// seed, in that order (FIFO holds on this channel).
#[tracing::instrument(skip_all, fields(session = session.0, len = bytes.len()))]
fn handle_parse(
    adapter: &CodecAdapter,
    session: SessionId,
    bytes: &[u8],
    responses: &Sender<Envelope<Response>>,
) -> ToonletterResult<()> {
    // Content sniffing keeps the simplified flat-image path on the same
    // request kind: anything that is not the layered container is handed to
    // the plain image decoder.
    let decoded = if bytes.starts_with(b"LYRD") {
        adapter.decode(bytes)?
    } else {
        adapter.decode_flat_image(bytes)?
    };

    let layer_count = decoded.model.layer_count();
    let document_width = decoded.model.width;

    let _ = responses.send(Envelope::new(
        session,
        Response::MainImageData {
            image: decoded.model.composite,
            layer_count,
        },
    ));
    let _ = responses.send(Envelope::new(
        session,
        Response::Group {
            boxes: decoded.dialogue.boxes,
            group: decoded.dialogue.group,
            document_width,
        },
    ));
    Ok(())
}

/// Re-decode the original bytes, rasterize every balloon into document
/// space, splice the export group and encode.
#[tracing::instrument(skip_all, fields(boxes = boxes.len(), viewport_width))]
fn handle_write(
    adapter: &CodecAdapter,
    raster: &BalloonRaster,
    original: &[u8],
    boxes: &[OverlayBox],
    passthrough: Option<LayerNode>,
    viewport_width: f64,
    variant: EncodeVariant,
) -> ToonletterResult<Vec<u8>> {
    if viewport_width <= 0.0 {
        return Err(ToonletterError::validation(
            "viewport width must be positive at export time",
        ));
    }

    // The original buffer is re-decoded rather than reusing the display
    // model, so the export sees the full layer tree.
    let decoded = if original.starts_with(b"LYRD") {
        adapter.decode(original)?
    } else {
        adapter.decode_flat_image(original)?
    };

    let scale = document_scale(viewport_width, decoded.model.width);
    let balloon_layers = raster
        .rasterize_all(boxes, scale)?
        .into_iter()
        .map(|b| b.into_layer())
        .collect::<ToonletterResult<Vec<_>>>()?;

    adapter.encode_with_export_group(
        &decoded.model,
        balloon_layers,
        passthrough.as_ref(),
        variant,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/worker/channel.rs"]
mod tests;
