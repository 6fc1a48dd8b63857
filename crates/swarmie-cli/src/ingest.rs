//! Newline-delimited JSON sample ingest.
//!
//! Each line is handed to [`SnapshotBridge::handle_incoming_message`], so the
//! accepted shapes are exactly the WebSocket ones. Lines that do not carry a
//! sample for this platform are counted and skipped. Reading pauses while
//! the localization node's sample lane is full.

use swarmie_middleware::SnapshotBridge;
use swarmie_types::SwarmieError;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    pub accepted: usize,
    pub ignored: usize,
}

/// Forward every line of `reader` until EOF.
pub async fn forward_lines<R>(
    reader: R,
    bridge: &SnapshotBridge,
) -> Result<IngestStats, SwarmieError>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = IngestStats::default();
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if bridge.handle_incoming_message(line).await? {
            stats.accepted += 1;
        } else {
            stats.ignored += 1;
        }
    }
    debug!(accepted = stats.accepted, ignored = stats.ignored, "ingest reached end of input");
    Ok(stats)
}
