//! Background work and result hand-off
//!
//! Operations run on the tokio runtime; their results travel back over a
//! channel to the single consumer that owns the display. Background tasks
//! never touch display state themselves.

use futures::FutureExt;
use log::{debug, error};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::core::context::AppContext;
use crate::rclone::queries::refresh_quota;
use crate::utils::types::errors::Result;
use crate::utils::types::events::{Outcome, UiEvent};

/// Producer side. Cheap to clone; hand one to anything that starts work.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<UiEvent>,
}

/// Consumer side. Exactly one exists per channel.
#[derive(Debug)]
pub struct EventQueue {
    rx: mpsc::UnboundedReceiver<UiEvent>,
}

pub fn channel() -> (Dispatcher, EventQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Dispatcher { tx }, EventQueue { rx })
}

impl Dispatcher {
    /// Run `work` in the background and report its outcome as one
    /// [`UiEvent::Finished`]. A panic inside `work` is reported as a failure.
    pub fn spawn<F, T>(
        &self,
        operation: impl Into<String>,
        remote: impl Into<String>,
        work: F,
    ) -> JoinHandle<()>
    where
        F: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let operation = operation.into();
        let remote = remote.into();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let outcome = match AssertUnwindSafe(work).catch_unwind().await {
                Ok(Ok(_)) => Outcome::Success { remote },
                Ok(Err(e)) => {
                    error!("❌ {operation} {remote} failed: {e}");
                    Outcome::Failure {
                        message: e.to_string(),
                    }
                }
                Err(_) => {
                    error!("❌ {operation} {remote} panicked");
                    Outcome::Failure {
                        message: format!("{operation} of {remote} stopped unexpectedly"),
                    }
                }
            };
            if tx.send(UiEvent::Finished { operation, outcome }).is_err() {
                debug!("Event queue closed, dropping result");
            }
        })
    }

    /// Refresh `remote`'s quota in the background and report it as
    /// [`UiEvent::QuotaLoaded`].
    pub fn spawn_quota(&self, ctx: Arc<AppContext>, remote: impl Into<String>) -> JoinHandle<()> {
        let remote = remote.into();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let quota = refresh_quota(&ctx, &remote).await;
            if tx.send(UiEvent::QuotaLoaded { remote, quota }).is_err() {
                debug!("Event queue closed, dropping quota");
            }
        })
    }

    /// Send an event directly. `false` when the consumer is gone.
    pub fn send(&self, event: UiEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

impl EventQueue {
    /// Next event, or `None` once every [`Dispatcher`] is dropped and the
    /// queue is empty.
    pub async fn next(&mut self) -> Option<UiEvent> {
        self.rx.recv().await
    }

    /// Everything queued right now, without waiting.
    pub fn try_drain(&mut self) -> Vec<UiEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}
