//! NDJSON update source.
//!
//! One [`Update`] per line. Blank lines are skipped; a line that does not
//! parse is logged and skipped, so one bad record cannot stop the stream.

use std::path::{Path, PathBuf};

use inbrief_types::update::Update;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Where updates are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateInput {
    Stdin,
    File(PathBuf),
}

impl UpdateInput {
    /// `-` means stdin, anything else is a file path.
    pub fn from_path(path: &Path) -> Self {
        if path == Path::new("-") {
            Self::Stdin
        } else {
            Self::File(path.to_path_buf())
        }
    }
}

/// Counters of one reader run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderStats {
    pub lines: usize,
    pub updates: usize,
    pub malformed: usize,
}

/// Read updates from `reader` into `updates` until EOF, cancellation, or the
/// receiver going away.
pub async fn read_updates<R>(
    reader: R,
    updates: mpsc::Sender<Update>,
    cancel: CancellationToken,
) -> std::io::Result<ReaderStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = ReaderStats::default();
    let mut lines = reader.lines();

    loop {
        let line = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            line = lines.next_line() => match line? {
                Some(line) => line,
                None => break,
            },
        };
        stats.lines += 1;

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let update = match serde_json::from_str::<Update>(line) {
            Ok(update) => update,
            Err(err) => {
                tracing::warn!(line = stats.lines, error = %err, "skipping malformed update");
                stats.malformed += 1;
                continue;
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            sent = updates.send(update) => {
                if sent.is_err() {
                    break;
                }
                stats.updates += 1;
            }
        }
    }

    tracing::debug!(?stats, "update reader stopped");
    Ok(stats)
}

/// Spawn a reader for `input` feeding a fresh channel of `capacity`.
///
/// The channel closes when the input is exhausted, which in turn ends the
/// listener consuming it.
pub fn spawn_update_reader(
    input: UpdateInput,
    capacity: usize,
    cancel: CancellationToken,
) -> (mpsc::Receiver<Update>, JoinHandle<std::io::Result<ReaderStats>>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));

    let handle = tokio::spawn(async move {
        match input {
            UpdateInput::Stdin => read_updates(BufReader::new(tokio::io::stdin()), tx, cancel).await,
            UpdateInput::File(path) => {
                let file = tokio::fs::File::open(&path).await.map_err(|e| {
                    std::io::Error::new(e.kind(), format!("{}: {e}", path.display()))
                })?;
                tracing::info!(path = %path.display(), "reading updates");
                read_updates(BufReader::new(file), tx, cancel).await
            }
        }
    });

    (rx, handle)
}
