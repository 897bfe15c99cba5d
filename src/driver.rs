//! Timer driver
//!
//! Owns a `PatternTimer` on a dedicated thread, which is the single
//! execution context every timer call happens on. The thread `select!`s over
//! control commands and ticks from the `ThreadTickSource`; completed steps
//! are forwarded as `DriverEvent`s to whoever holds the event receiver.

use crate::clock::{ClockTick, ThreadTickSource, MIN_PERIOD};
use anyhow::{anyhow, bail, Context, Result};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use ostinato_core::types::time::{to_duration, to_f64};
use ostinato_core::{PatternTimer, Step, TimerConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, trace, warn};

type StepForwarder = Box<dyn FnMut(&mut Step) + Send>;

/// Events emitted by the driver thread
#[derive(Clone, Debug)]
pub enum DriverEvent {
    /// A pattern step completed
    Step(Step),
    /// The timer stopped itself at the end of its pattern
    Finished,
    /// A new configuration was applied
    Reconfigured(TimerConfig),
}

/// Snapshot of the timer, taken on the driver thread
#[derive(Clone, Debug)]
pub struct TimerStatus {
    pub config: TimerConfig,
    pub running: bool,
    pub elapsed: f64,
    pub pattern_index: usize,
    pub playback_pattern: Vec<u64>,
    pub poll_interval: Option<f64>,
}

/// Commands that can be sent to the driver
#[derive(Debug)]
pub enum DriverCommand {
    /// Reconfigure (stops the timer)
    Setup(TimerConfig, Sender<Result<()>>),
    Start,
    Stop,
    Rewind,
    Status(Sender<TimerStatus>),
    Shutdown,
}

/// Refuse configs that poll faster than a ticker thread can run
///
/// Each tick credits exactly one poll interval, so a ticker held at
/// `MIN_PERIOD` would make the timer run slow.
pub fn check_tick_rate(config: &TimerConfig) -> Result<()> {
    if let Some(interval) = config.poll_interval() {
        let period = to_duration(interval);
        if period < MIN_PERIOD {
            warn!(?period, min = ?MIN_PERIOD, "poll interval below ticker floor");
            bail!(
                "poll interval of {:?} is shorter than the {:?} minimum tick period",
                period,
                MIN_PERIOD
            );
        }
    }
    Ok(())
}

/// Handle for sending commands to the driver thread
#[derive(Clone)]
pub struct DriverHandle {
    command_tx: Sender<DriverCommand>,
    is_running: Arc<AtomicBool>,
}

impl DriverHandle {
    /// Apply a new configuration and wait for the driver to accept it
    pub fn setup(&self, config: TimerConfig) -> Result<()> {
        let (reply_tx, reply_rx) = bounded(1);
        self.send(DriverCommand::Setup(config, reply_tx))?;
        reply_rx
            .recv()
            .map_err(|_| anyhow!("timer driver did not reply"))??;
        Ok(())
    }

    /// Start (or restart) ticking
    pub fn start(&self) {
        let _ = self.command_tx.send(DriverCommand::Start);
    }

    /// Stop ticking and rewind
    pub fn stop(&self) {
        let _ = self.command_tx.send(DriverCommand::Stop);
    }

    /// Rewind progress without stopping
    pub fn rewind(&self) {
        let _ = self.command_tx.send(DriverCommand::Rewind);
    }

    /// Query the timer state
    pub fn status(&self) -> Result<TimerStatus> {
        let (reply_tx, reply_rx) = bounded(1);
        self.send(DriverCommand::Status(reply_tx))?;
        reply_rx
            .recv()
            .map_err(|_| anyhow!("timer driver did not reply"))
    }

    /// Shutdown the driver thread
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(DriverCommand::Shutdown);
    }

    /// Check if the driver thread is alive
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    fn send(&self, command: DriverCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| anyhow!("timer driver is not running"))
    }
}

/// The driver thread state
pub struct TimerDriver {
    timer: PatternTimer<ThreadTickSource, StepForwarder>,
    command_rx: Receiver<DriverCommand>,
    tick_rx: Receiver<ClockTick>,
    event_tx: Sender<DriverEvent>,
    is_running: Arc<AtomicBool>,
}

impl TimerDriver {
    /// Spawn a driver thread for `config`, returning its handle and event stream
    pub fn spawn(config: TimerConfig) -> Result<(DriverHandle, Receiver<DriverEvent>)> {
        config.validate()?;
        check_tick_rate(&config)?;

        let (command_tx, command_rx) = unbounded();
        let (event_tx, event_rx) = unbounded();
        let (source, tick_rx) = ThreadTickSource::new();

        let step_tx = event_tx.clone();
        let forward: StepForwarder = Box::new(move |step: &mut Step| {
            let _ = step_tx.send(DriverEvent::Step(step.clone()));
        });
        let timer = PatternTimer::new(config, source, forward)?;

        let is_running = Arc::new(AtomicBool::new(true));
        let driver = TimerDriver {
            timer,
            command_rx,
            tick_rx,
            event_tx,
            is_running: is_running.clone(),
        };

        thread::Builder::new()
            .name("ostinato-driver".to_string())
            .spawn(move || driver.run_loop())
            .context("failed to spawn timer driver thread")?;

        Ok((
            DriverHandle {
                command_tx,
                is_running,
            },
            event_rx,
        ))
    }

    /// Main driver loop
    fn run_loop(mut self) {
        loop {
            crossbeam_channel::select! {
                recv(self.command_rx) -> msg => match msg {
                    Ok(cmd) => {
                        if !self.handle_command(cmd) {
                            break;
                        }
                    }
                    Err(_) => break,
                },
                recv(self.tick_rx) -> msg => match msg {
                    Ok(tick) => self.process_tick(&tick),
                    Err(_) => break,
                },
            }
        }

        self.timer.stop();
        self.is_running.store(false, Ordering::Relaxed);
        debug!("timer driver exited");
    }

    /// Handle a command, returns false if should shutdown
    fn handle_command(&mut self, cmd: DriverCommand) -> bool {
        match cmd {
            DriverCommand::Setup(config, reply) => {
                let result = check_tick_rate(&config)
                    .and_then(|()| self.timer.setup(config.clone()).map_err(Into::into));
                match &result {
                    Ok(()) => {
                        let _ = self.event_tx.send(DriverEvent::Reconfigured(config));
                    }
                    Err(e) => warn!("rejected timer configuration: {}", e),
                }
                let _ = reply.send(result);
            }
            DriverCommand::Start => self.timer.start(),
            DriverCommand::Stop => self.timer.stop(),
            DriverCommand::Rewind => self.timer.rewind(),
            DriverCommand::Status(reply) => {
                let _ = reply.send(self.status());
            }
            DriverCommand::Shutdown => return false,
        }
        true
    }

    /// Deliver a tick to the timer
    fn process_tick(&mut self, tick: &ClockTick) {
        trace!(
            handle = tick.handle.raw(),
            sequence = tick.sequence,
            lag_us = tick.timestamp.elapsed().as_micros() as u64,
            "tick"
        );

        let was_running = self.timer.is_running();
        self.timer.tick(tick.handle);
        if was_running && !self.timer.is_running() {
            let _ = self.event_tx.send(DriverEvent::Finished);
        }
    }

    fn status(&self) -> TimerStatus {
        TimerStatus {
            config: self.timer.config().clone(),
            running: self.timer.is_running(),
            elapsed: self.timer.time(),
            pattern_index: self.timer.pattern_index(),
            playback_pattern: self.timer.playback_pattern(),
            poll_interval: self.timer.poll_interval().map(to_f64),
        }
    }
}
