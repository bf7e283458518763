//! The auxiliary progress-ticker context.
//!
//! An independent background thread that, once started, emits a rotating
//! status line on a fixed interval until stopped. It runs separately from
//! the codec worker, so no ordering is guaranteed between the two channels;
//! consumers must treat progress text as purely cosmetic.

use std::thread::JoinHandle;
use std::time::Duration;

use flume::{Receiver, RecvTimeoutError, Sender};

use crate::foundation::error::{ToonletterError, ToonletterResult};
use crate::worker::protocol::{Envelope, ProgressAction, ProgressCommand, ProgressUpdate, SessionId};

/// Interval between rotating messages.
const TICK_INTERVAL: Duration = Duration::from_secs(3);

/// Rotating status messages, cycled in order.
const MESSAGES: &[&str] = &[
    "The moment of creation, currently downloading. Please wait a moment.",
    "Creation takes time. Please be patient and give it a moment.",
    "Loading the project... Grab a cup of coffee and wait a bit!",
    "Pixels and colors are meeting... Just hold on for a moment.",
    "Data transmission in progress! It will be completed shortly.",
];

/// Message emitted immediately when the ticker starts.
const OPENING: &str = "Gearing Up for Your Download…";

/// Interactive-side handle to the ticker thread.
pub struct TickerChannel {
    tx: Sender<Envelope<ProgressCommand>>,
    rx: Receiver<Envelope<ProgressUpdate>>,
    handle: Option<JoinHandle<()>>,
}

impl Default for TickerChannel {
    fn default() -> Self {
        Self::spawn()
    }
}

impl TickerChannel {
    /// Spawn the ticker with the standard 3-second interval.
    pub fn spawn() -> Self {
        Self::spawn_with_interval(TICK_INTERVAL)
    }

    /// Spawn the ticker with a custom interval (tests use a short one).
    pub fn spawn_with_interval(interval: Duration) -> Self {
        let (cmd_tx, cmd_rx) = flume::unbounded::<Envelope<ProgressCommand>>();
        let (upd_tx, upd_rx) = flume::unbounded::<Envelope<ProgressUpdate>>();

        let handle = std::thread::spawn(move || ticker_loop(&cmd_rx, &upd_tx, interval));

        Self {
            tx: cmd_tx,
            rx: upd_rx,
            handle: Some(handle),
        }
    }

    /// Start emitting rotating status text for `session`.
    pub fn start(&self, session: SessionId) -> ToonletterResult<()> {
        self.send(session, ProgressAction::Start)
    }

    /// Stop the rotation.
    pub fn stop(&self, session: SessionId) -> ToonletterResult<()> {
        self.send(session, ProgressAction::Stop)
    }

    fn send(&self, session: SessionId, action: ProgressAction) -> ToonletterResult<()> {
        self.tx
            .send(Envelope::new(session, ProgressCommand::Action(action)))
            .map_err(|_| ToonletterError::protocol("progress ticker is gone"))
    }

    /// Drain every progress update that has arrived, without blocking.
    pub fn drain(&self) -> Vec<Envelope<ProgressUpdate>> {
        self.rx.try_iter().collect()
    }

    /// Block until the next update arrives. For headless drivers and tests.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Envelope<ProgressUpdate>> {
        self.rx.recv_timeout(timeout).ok()
    }
}

impl Drop for TickerChannel {
    fn drop(&mut self) {
        // Disconnecting the command channel ends the loop.
        let tx = std::mem::replace(&mut self.tx, flume::unbounded().0);
        drop(tx);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn ticker_loop(
    commands: &Receiver<Envelope<ProgressCommand>>,
    updates: &Sender<Envelope<ProgressUpdate>>,
    interval: Duration,
) {
    let mut running: Option<SessionId> = None;
    let mut index = 0usize;

    loop {
        let command = if running.is_some() {
            match commands.recv_timeout(interval) {
                Ok(env) => Some(env),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => return,
            }
        } else {
            match commands.recv() {
                Ok(env) => Some(env),
                Err(_) => return,
            }
        };

        match command {
            Some(env) => {
                if let Err(err) = env.validate() {
                    tracing::warn!(%err, "ticker rejected malformed message");
                    continue;
                }
                let ProgressCommand::Action(action) = env.payload;
                match action {
                    ProgressAction::Start => {
                        running = Some(env.session);
                        index = 0;
                        let _ = updates.send(Envelope::new(
                            env.session,
                            ProgressUpdate::Progress(Some(OPENING.to_string())),
                        ));
                    }
                    ProgressAction::Stop => {
                        running = None;
                        index = 0;
                        let _ = updates.send(Envelope::new(
                            env.session,
                            ProgressUpdate::Progress(None),
                        ));
                    }
                }
            }
            None => {
                // Interval elapsed while running: emit the next message.
                if let Some(session) = running {
                    let _ = updates.send(Envelope::new(
                        session,
                        ProgressUpdate::Progress(Some(MESSAGES[index].to_string())),
                    ));
                    index = (index + 1) % MESSAGES.len();
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/worker/ticker.rs"]
mod tests;
