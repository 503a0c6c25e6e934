// ==============================================================================
// error_sink.rs - Append-Only Lookup Failure Log
// ==============================================================================
// Description: Thread-safe, best-effort record of annotation failures
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Writes never fail or block the caller: lines are queued to a writer thread,
// and an unwritable destination is reported once through tracing.
// ==============================================================================

use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread::JoinHandle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

enum Command {
    Line(String),
    Flush(oneshot::Sender<()>),
}

enum Destination {
    /// Lines handed to a dedicated writer thread
    File {
        sender: Option<mpsc::UnboundedSender<Command>>,
        writer: Option<JoinHandle<()>>,
    },
    /// Keep lines in memory
    Memory(Mutex<Vec<String>>),
}

/// Shared sink for human-readable failure lines
///
/// `record` only queues the line; file I/O happens on the writer thread, so
/// callers on async workers never wait on the disk.
pub struct ErrorSink {
    destination: Destination,
    recorded: AtomicUsize,
}

impl ErrorSink {
    /// Sink appending to `path` (created on first write)
    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (sender, receiver) = mpsc::unbounded_channel();
        let writer = std::thread::spawn(move || run_writer(path, receiver));

        Self::with_destination(Destination::File {
            sender: Some(sender),
            writer: Some(writer),
        })
    }

    /// Sink holding entries in memory
    pub fn in_memory() -> Self {
        Self::with_destination(Destination::Memory(Mutex::new(Vec::new())))
    }

    fn with_destination(destination: Destination) -> Self {
        Self {
            destination,
            recorded: AtomicUsize::new(0),
        }
    }

    /// Append one failure line
    pub fn record(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        warn!("{}", message);
        self.recorded.fetch_add(1, Ordering::Relaxed);

        match &self.destination {
            Destination::File { sender, .. } => {
                let line = format!("{} {}\n", Utc::now().to_rfc3339(), message);
                if let Some(sender) = sender {
                    if sender.send(Command::Line(line)).is_err() {
                        debug!("Error log writer has stopped; dropped: {}", message);
                    }
                }
            }
            Destination::Memory(lines) => {
                lines
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .push(message.to_string());
            }
        }
    }

    /// Wait until every line recorded so far has reached the file
    pub async fn flush(&self) {
        if let Destination::File {
            sender: Some(sender),
            ..
        } = &self.destination
        {
            let (ack, done) = oneshot::channel();
            if sender.send(Command::Flush(ack)).is_ok() {
                let _ = done.await;
            }
        }
    }

    /// Number of lines recorded so far, including ones the destination dropped
    pub fn count(&self) -> usize {
        self.recorded.load(Ordering::Relaxed)
    }

    /// Snapshot of in-memory entries (empty for file sinks)
    pub fn entries(&self) -> Vec<String> {
        match &self.destination {
            Destination::Memory(lines) => lines
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone(),
            Destination::File { .. } => Vec::new(),
        }
    }
}

impl Drop for ErrorSink {
    fn drop(&mut self) {
        if let Destination::File { sender, writer } = &mut self.destination {
            // Closing the channel lets the writer drain and exit
            sender.take();
            if let Some(writer) = writer.take() {
                let _ = writer.join();
            }
        }
    }
}

/// Writer thread body; an unwritable destination is reported once
fn run_writer(path: PathBuf, mut receiver: mpsc::UnboundedReceiver<Command>) {
    let mut unwritable_reported = false;

    while let Some(command) = receiver.blocking_recv() {
        match command {
            Command::Line(line) => {
                if let Err(e) = append_line(&path, &line) {
                    if !unwritable_reported {
                        unwritable_reported = true;
                        warn!("Error log {:?} is not writable: {}", path, e);
                    } else {
                        debug!("Dropped error log line for {:?}: {}", path, e);
                    }
                }
            }
            Command::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())
}
