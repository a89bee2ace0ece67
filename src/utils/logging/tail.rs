//! Log viewer backend
//!
//! The rclone mount log is tailed the simple way: read the whole file on a
//! fixed interval and keep the last N lines.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const DEFAULT_TAIL_LINES: usize = 200;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Last `max_lines` lines of `path`. A missing or unreadable file is empty.
pub async fn tail_lines(path: &Path, max_lines: usize) -> Vec<String> {
    match tokio::fs::read(path).await {
        Ok(bytes) => last_lines(&String::from_utf8_lossy(&bytes), max_lines),
        Err(e) => {
            debug!("Log file {} not readable: {e}", path.display());
            Vec::new()
        }
    }
}

fn last_lines(content: &str, max_lines: usize) -> Vec<String> {
    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].iter().map(|l| l.to_string()).collect()
}

/// Polling tailer that pushes a fresh snapshot whenever the tail changes.
pub struct LogTailer {
    pub path: PathBuf,
    pub max_lines: usize,
    pub interval: Duration,
}

impl LogTailer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_lines: DEFAULT_TAIL_LINES,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = max_lines;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Start polling. The task ends once the receiver is dropped.
    pub fn spawn(self) -> (mpsc::Receiver<Vec<String>>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(async move {
            let mut last: Option<Vec<String>> = None;
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                ticker.tick().await;
                let snapshot = tail_lines(&self.path, self.max_lines).await;
                if last.as_ref() == Some(&snapshot) {
                    if tx.is_closed() {
                        break;
                    }
                    continue;
                }
                if tx.send(snapshot.clone()).await.is_err() {
                    break;
                }
                last = Some(snapshot);
            }
            debug!("Log tailer for {} stopped", self.path.display());
        });
        (rx, handle)
    }
}
