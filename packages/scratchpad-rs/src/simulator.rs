// Simulated sensor process
//
// Stands in for the external brain/body measurement process during
// development: serves a bounded random walk over the same newline-delimited
// wire format the feed reads.

use crate::error::Result;
use crate::types::StatePoint;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{ErrorKind, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

pub const DEFAULT_STEP: f64 = 0.05;
pub const DEFAULT_INTERVAL_MS: u64 = 200;

/// Random walk with every component kept in `[0, 1]`
pub struct StateSimulator {
    current: Vec<f64>,
    step: f64,
    interval: Duration,
    rng: StdRng,
}

impl StateSimulator {
    pub fn new(dimensions: usize, step: f64, interval: Duration) -> Self {
        Self::with_rng(dimensions, step, interval, StdRng::from_os_rng())
    }

    /// Reproducible walk
    pub fn seeded(dimensions: usize, step: f64, interval: Duration, seed: u64) -> Self {
        Self::with_rng(dimensions, step, interval, StdRng::seed_from_u64(seed))
    }

    fn with_rng(dimensions: usize, step: f64, interval: Duration, mut rng: StdRng) -> Self {
        let current = (0..dimensions).map(|_| rng.random::<f64>()).collect();
        Self {
            current,
            step: step.abs(),
            interval,
            rng,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.current.len()
    }

    /// Advance the walk one step
    pub fn next_point(&mut self) -> StatePoint {
        for value in self.current.iter_mut() {
            let delta = if self.step > 0.0 {
                self.rng.random_range(-self.step..=self.step)
            } else {
                0.0
            };
            *value = (*value + delta).clamp(0.0, 1.0);
        }
        StatePoint::new(self.current.clone())
    }

    /// Write records to one client until it disconnects, `shutdown` is
    /// raised, or `max_lines` records have been sent. Returns the number of
    /// records written.
    pub fn serve_connection(
        &mut self,
        mut stream: TcpStream,
        shutdown: &AtomicBool,
        max_lines: Option<u64>,
    ) -> Result<u64> {
        let peer = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        log::info!("Simulated feed serving {}", peer);

        let mut sent = 0u64;
        while !shutdown.load(Ordering::Relaxed) {
            if max_lines.is_some_and(|max| sent >= max) {
                break;
            }

            let record = format!("{}\n", self.next_point());
            match stream.write_all(record.as_bytes()) {
                Ok(()) => sent += 1,
                Err(e)
                    if matches!(
                        e.kind(),
                        ErrorKind::BrokenPipe | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
                    ) =>
                {
                    log::info!("Client {} disconnected after {} records", peer, sent);
                    return Ok(sent);
                }
                Err(e) => return Err(e.into()),
            }

            if !self.interval.is_zero() {
                thread::sleep(self.interval);
            }
        }

        stream.flush()?;
        log::info!("Finished serving {} ({} records)", peer, sent);
        Ok(sent)
    }

    /// Accept clients one at a time and serve each in turn.
    ///
    /// `shutdown` is only observed between records and between clients;
    /// a blocking `accept` is not interrupted.
    pub fn serve(
        &mut self,
        listener: &TcpListener,
        shutdown: &AtomicBool,
        max_lines: Option<u64>,
    ) -> Result<()> {
        log::info!("Simulated feed listening on {}", listener.local_addr()?);

        for incoming in listener.incoming() {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }
            match incoming {
                Ok(stream) => {
                    self.serve_connection(stream, shutdown, max_lines)?;
                }
                Err(e) => log::warn!("Accept failed: {}", e),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_stays_in_unit_range() {
        let mut sim = StateSimulator::seeded(4, 0.5, Duration::ZERO, 7);
        for _ in 0..500 {
            let point = sim.next_point();
            assert_eq!(point.len(), 4);
            assert!(point.components().iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn test_seeded_walk_is_reproducible() {
        let mut a = StateSimulator::seeded(3, DEFAULT_STEP, Duration::ZERO, 42);
        let mut b = StateSimulator::seeded(3, DEFAULT_STEP, Duration::ZERO, 42);
        for _ in 0..10 {
            assert_eq!(a.next_point(), b.next_point());
        }
    }

    #[test]
    fn test_zero_step_holds_still() {
        let mut sim = StateSimulator::seeded(2, 0.0, Duration::ZERO, 1);
        let first = sim.next_point();
        assert_eq!(sim.next_point(), first);
    }

    #[test]
    fn test_records_parse_back() {
        let mut sim = StateSimulator::seeded(5, DEFAULT_STEP, Duration::ZERO, 3);
        let point = sim.next_point();
        assert_eq!(point.to_string().parse::<StatePoint>().unwrap(), point);
    }
}
