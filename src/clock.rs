//! Threaded tick source
//!
//! Backs `TickSource` with real time: every schedule gets its own ticker
//! thread that forwards ticks into one shared channel. Whoever owns the
//! receiving end (the timer driver) is the single context that delivers
//! them to the timer.

use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender};
use ostinato_core::types::time::to_duration;
use ostinato_core::{TickHandle, TickSource, Time};
use std::collections::HashMap;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, trace};

/// Shortest period a ticker thread will run at
pub const MIN_PERIOD: Duration = Duration::from_micros(100);

/// A single tick from a ticker thread
#[derive(Clone, Debug)]
pub struct ClockTick {
    /// Schedule this tick belongs to
    pub handle: TickHandle,
    /// 1-based tick count within the schedule
    pub sequence: u64,
    /// The instant this tick was generated
    pub timestamp: Instant,
}

/// `TickSource` running one thread per schedule
pub struct ThreadTickSource {
    tick_tx: Sender<ClockTick>,
    next_id: u64,
    /// Dropping a stop sender ends its ticker thread
    tickers: HashMap<TickHandle, Sender<()>>,
}

impl ThreadTickSource {
    /// Create a source together with the receiver its ticks arrive on
    pub fn new() -> (Self, Receiver<ClockTick>) {
        let (tick_tx, tick_rx) = unbounded();
        let source = Self {
            tick_tx,
            next_id: 0,
            tickers: HashMap::new(),
        };
        (source, tick_rx)
    }

    /// Number of live schedules
    pub fn active_count(&self) -> usize {
        self.tickers.len()
    }
}

impl TickSource for ThreadTickSource {
    fn schedule(&mut self, interval: Time) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle::new(self.next_id);
        let period = to_duration(interval).max(MIN_PERIOD);

        let (stop_tx, stop_rx) = bounded::<()>(0);
        let tick_tx = self.tick_tx.clone();
        let spawned = thread::Builder::new()
            .name(format!("ostinato-tick-{}", handle.raw()))
            .spawn(move || run_ticker(handle, period, stop_rx, tick_tx));

        match spawned {
            Ok(_) => {
                debug!(handle = handle.raw(), ?period, "ticker started");
                self.tickers.insert(handle, stop_tx);
            }
            Err(e) => error!(handle = handle.raw(), "failed to spawn ticker thread: {}", e),
        }
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if self.tickers.remove(&handle).is_some() {
            debug!(handle = handle.raw(), "ticker cancelled");
        }
    }
}

fn run_ticker(handle: TickHandle, period: Duration, stop_rx: Receiver<()>, tick_tx: Sender<ClockTick>) {
    // crossbeam's tick keeps a fixed schedule from its start, so slow receivers don't accumulate drift
    let ticker = crossbeam_channel::tick(period);
    let mut sequence = 0;

    loop {
        select! {
            recv(stop_rx) -> _ => break,
            recv(ticker) -> msg => {
                let Ok(timestamp) = msg else { break };
                sequence += 1;
                let tick = ClockTick { handle, sequence, timestamp };
                if tick_tx.send(tick).is_err() {
                    break;
                }
            }
        }
    }

    trace!(handle = handle.raw(), sequence, "ticker thread exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use ostinato_core::types::time::time;

    #[test]
    fn test_ticks_arrive_in_sequence() {
        let (mut source, rx) = ThreadTickSource::new();
        let handle = source.schedule(time(1, 200)); // 5ms

        for expected in 1..=3 {
            let tick = rx.recv_timeout(Duration::from_secs(1)).unwrap();
            assert_eq!(tick.handle, handle);
            assert_eq!(tick.sequence, expected);
        }
        source.cancel(handle);
    }

    #[test]
    fn test_cancel_stops_ticks() {
        let (mut source, rx) = ThreadTickSource::new();
        let handle = source.schedule(time(1, 200));
        rx.recv_timeout(Duration::from_secs(1)).unwrap();

        source.cancel(handle);
        source.cancel(handle);
        assert_eq!(source.active_count(), 0);

        // Let the thread notice, then drain anything sent before it did
        thread::sleep(Duration::from_millis(30));
        while rx.try_recv().is_ok() {}
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn test_handles_are_unique() {
        let (mut source, _rx) = ThreadTickSource::new();
        let a = source.schedule(time(1, 10));
        let b = source.schedule(time(1, 10));
        assert_ne!(a, b);
        assert_eq!(source.active_count(), 2);
    }
}
