// Background state feed
//
// Runs the one background thread of a session: connect the line client, then
// for every line parse a state vector, smooth it, and publish it to the shared
// state cell. Nothing else crosses from this thread to the UI loop.
//
// Failure policy:
// - connection failure at startup is logged once and the feed stays down for
//   the session (no reconnect)
// - malformed lines are logged and dropped, the current state is untouched
// - the peer closing the stream ends the thread cleanly
//
// Shutdown is cooperative: the shared flag is checked at the top of every
// line iteration, so a stop request takes effect after at most one more line.

use crate::config::PadConfig;
use crate::error::Result;
use crate::filter::MovingAverageFilter;
use crate::state_cell::SharedStateCell;
use crate::stream::StreamingLineClient;
use crate::types::StatePoint;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Lifecycle of the feed thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum FeedStatus {
    /// Thread started, connection in progress
    Connecting,

    /// Connected and applying lines
    Streaming,

    /// Could not connect; the session runs on manual input only
    Unavailable { reason: String },

    /// Peer closed the stream (or the read failed)
    Closed,

    /// Stopped through the shutdown flag
    Stopped,
}

/// Counters for one feed session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeedStats {
    pub lines_received: u64,
    pub lines_applied: u64,
    pub lines_dropped: u64,
}

/// Lock-free counters shared with the feed thread
#[derive(Debug, Default)]
pub struct FeedCounters {
    lines_received: AtomicU64,
    lines_applied: AtomicU64,
    lines_dropped: AtomicU64,
}

impl FeedCounters {
    pub fn snapshot(&self) -> FeedStats {
        FeedStats {
            lines_received: self.lines_received.load(Ordering::Relaxed),
            lines_applied: self.lines_applied.load(Ordering::Relaxed),
            lines_dropped: self.lines_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Why `run_feed` returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedExit {
    /// End of stream
    Closed,
    /// Shutdown flag observed
    Stopped,
}

/// Parse one record, smooth it and publish it.
///
/// Returns `Ok(false)` for a blank line, which is skipped without touching
/// the filter or the cell.
pub fn apply_line(
    line: &str,
    cell: &SharedStateCell,
    filter: &mut MovingAverageFilter,
) -> Result<bool> {
    if line.trim().is_empty() {
        return Ok(false);
    }

    let raw: StatePoint = line.parse()?;
    raw.ensure_dimensions(cell.dimensions())?;
    let smoothed = filter.process(&raw)?;
    cell.set(smoothed)?;
    Ok(true)
}

/// The feed loop: deliver lines from `client` into `cell` until the stream
/// ends or `shutdown` is raised.
pub fn run_feed<R: Read>(
    client: &mut StreamingLineClient<R>,
    cell: &SharedStateCell,
    filter: &mut MovingAverageFilter,
    shutdown: &AtomicBool,
    counters: &FeedCounters,
) -> Result<FeedExit> {
    loop {
        if shutdown.load(Ordering::Relaxed) {
            log::info!("State feed stopping on request");
            return Ok(FeedExit::Stopped);
        }

        let Some(line) = client.next_line()? else {
            log::info!("State feed closed by peer");
            return Ok(FeedExit::Closed);
        };

        counters.lines_received.fetch_add(1, Ordering::Relaxed);

        match apply_line(&line, cell, filter) {
            Ok(true) => {
                counters.lines_applied.fetch_add(1, Ordering::Relaxed);
                log::trace!("State updated from feed: {}", line.trim());
            }
            Ok(false) => {}
            Err(e) => {
                counters.lines_dropped.fetch_add(1, Ordering::Relaxed);
                log::warn!("Dropping feed line '{}': {}", line.trim(), e);
            }
        }
    }
}

/// Handle to the running feed thread.
///
/// Dropping the handle raises the shutdown flag but does not wait for the
/// thread, which may be parked in a blocking read.
pub struct FeedHandle {
    status: Arc<RwLock<FeedStatus>>,
    counters: Arc<FeedCounters>,
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl FeedHandle {
    pub fn status(&self) -> FeedStatus {
        self.status.read().clone()
    }

    pub fn stats(&self) -> FeedStats {
        self.counters.snapshot()
    }

    /// Ask the thread to stop after its current line
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map(|t| t.is_finished()).unwrap_or(true)
    }

    /// Wait for the thread to exit
    pub fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("State feed thread panicked");
            }
        }
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

pub struct StateFeed;

impl StateFeed {
    /// Start the feed thread for `config`, publishing into `cell`
    pub fn spawn(
        config: &PadConfig,
        cell: Arc<SharedStateCell>,
        filter: MovingAverageFilter,
    ) -> Result<FeedHandle> {
        let status = Arc::new(RwLock::new(FeedStatus::Connecting));
        let counters = Arc::new(FeedCounters::default());
        let shutdown = Arc::new(AtomicBool::new(false));

        let host = config.host.clone();
        let port = config.port;
        let thread_status = Arc::clone(&status);
        let thread_counters = Arc::clone(&counters);
        let thread_shutdown = Arc::clone(&shutdown);

        let thread = thread::Builder::new()
            .name("state-feed".to_string())
            .spawn(move || {
                let final_status = feed_thread_main(
                    &host,
                    port,
                    &cell,
                    filter,
                    &thread_shutdown,
                    &thread_counters,
                    &thread_status,
                );
                *thread_status.write() = final_status;
            })?;

        Ok(FeedHandle {
            status,
            counters,
            shutdown,
            thread: Some(thread),
        })
    }
}

fn feed_thread_main(
    host: &str,
    port: u16,
    cell: &SharedStateCell,
    mut filter: MovingAverageFilter,
    shutdown: &AtomicBool,
    counters: &FeedCounters,
    status: &RwLock<FeedStatus>,
) -> FeedStatus {
    let mut client = match StreamingLineClient::connect(host, port) {
        Ok(client) => client,
        Err(e) => {
            log::warn!(
                "State feed unavailable ({}); use the sliders to set the state instead",
                e
            );
            return FeedStatus::Unavailable {
                reason: e.to_string(),
            };
        }
    };

    *status.write() = FeedStatus::Streaming;

    match run_feed(&mut client, cell, &mut filter, shutdown, counters) {
        Ok(FeedExit::Closed) => FeedStatus::Closed,
        Ok(FeedExit::Stopped) => FeedStatus::Stopped,
        Err(e) => {
            log::error!("State feed read failed: {}", e);
            FeedStatus::Closed
        }
    }
}
