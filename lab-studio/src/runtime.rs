//! Single-task event loop driving the controller.
//!
//! The loop owns the [`SessionController`]. It takes [`Command`]s from an
//! mpsc channel and polls in-flight jobs; state is only touched between
//! those suspension points, so no locking is needed.

use std::sync::Arc;

use futures::future::LocalBoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use lab_core::UiEvent;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::controller::{SessionController, SessionSnapshot};
use crate::jobs::{JobOutcome, JobRunner};

/// Default command queue depth.
pub const DEFAULT_COMMAND_BUFFER: usize = 64;

/// Messages accepted by the event loop.
#[derive(Debug)]
pub enum Command {
    /// A front-end event.
    Event(UiEvent),
    /// Request a snapshot of the session.
    Snapshot(oneshot::Sender<SessionSnapshot>),
}

/// Handle for sending commands to a running loop.
#[derive(Debug, Clone)]
pub struct StudioHandle {
    tx: mpsc::Sender<Command>,
}

impl StudioHandle {
    /// Create a handle and the receiver the loop consumes.
    #[must_use]
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<Command>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self { tx }, rx)
    }

    /// Send a front-end event.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop has stopped.
    pub async fn send(&self, event: UiEvent) -> anyhow::Result<()> {
        self.tx
            .send(Command::Event(event))
            .await
            .map_err(|_| anyhow::anyhow!("studio loop has stopped"))
    }

    /// Fetch a snapshot of the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop has stopped.
    pub async fn snapshot(&self) -> anyhow::Result<SessionSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Snapshot(reply))
            .await
            .map_err(|_| anyhow::anyhow!("studio loop has stopped"))?;
        rx.await
            .map_err(|_| anyhow::anyhow!("studio loop dropped the snapshot request"))
    }
}

/// Run until every command sender is dropped and every job has finished.
///
/// Returns the controller so callers can inspect the final state.
pub async fn run(
    mut controller: SessionController,
    runner: Arc<JobRunner>,
    mut commands: mpsc::Receiver<Command>,
) -> SessionController {
    let mut jobs: FuturesUnordered<LocalBoxFuture<'static, JobOutcome>> = FuturesUnordered::new();
    let mut accepting = true;

    loop {
        tokio::select! {
            command = commands.recv(), if accepting => match command {
                Some(Command::Event(event)) => {
                    debug!(?event, "Event received");
                    if let Some(request) = controller.handle(event) {
                        let runner = Arc::clone(&runner);
                        jobs.push(async move { runner.run(request).await }.boxed_local());
                    }
                }
                Some(Command::Snapshot(reply)) => {
                    let _ = reply.send(controller.snapshot());
                }
                None => {
                    debug!(pending = jobs.len(), "Command channel closed");
                    accepting = false;
                }
            },
            Some(outcome) = jobs.next(), if !jobs.is_empty() => controller.finish(outcome),
            else => break,
        }
    }

    info!("Studio loop stopped");
    controller
}
