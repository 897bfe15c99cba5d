//! Offline runs against the manual tick source
//!
//! Lets a configuration be previewed instantly: the timer runs on a
//! `ManualTickSource` for the requested span and every completed step is
//! collected, with no real waiting.

use anyhow::{bail, Result};
use colored::*;
use ostinato_core::types::time::to_f64;
use ostinato_core::{ManualTickSource, PatternTimer, Step, Time, TimerConfig};
use std::fmt::Write;

/// Most ticks a single simulation may deliver
pub const MAX_SIMULATED_TICKS: u128 = 1_000_000;

/// Result of a simulated run
#[derive(Debug, Clone)]
pub struct Simulation {
    pub config: TimerConfig,
    /// Simulated span in seconds
    pub span: f64,
    pub steps: Vec<Step>,
    /// Whether the timer was still running at the end of the span
    pub running: bool,
}

/// Number of ticks `config` would deliver over `span`
pub fn tick_count(config: &TimerConfig, span: Time) -> u128 {
    match config.poll_interval() {
        // floor(span / poll), widened so large spans and scales cannot overflow
        Some(poll) => {
            (*span.numer() as u128 * *poll.denom() as u128)
                / (*span.denom() as u128 * *poll.numer() as u128)
        }
        None => 0,
    }
}

/// Run `config` for `span` of manual time
///
/// Spans needing more than [`MAX_SIMULATED_TICKS`] ticks are refused.
pub fn simulate(config: &TimerConfig, span: Time) -> Result<Simulation> {
    let ticks = tick_count(config, span);
    if ticks > MAX_SIMULATED_TICKS {
        bail!(
            "{:.3}s needs {} ticks, more than the {} a simulation may run",
            to_f64(span),
            ticks,
            MAX_SIMULATED_TICKS
        );
    }

    let mut steps = Vec::new();
    let running = {
        let mut timer = PatternTimer::new(config.clone(), ManualTickSource::new(), |step: &mut Step| {
            steps.push(step.clone());
        })?;
        timer.start();
        timer.advance(span);
        timer.is_running()
    };

    Ok(Simulation {
        config: config.clone(),
        span: to_f64(span),
        steps,
        running,
    })
}

/// Render a simulation as one line per step
pub fn format_timeline(sim: &Simulation) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} pattern {:?}, scale {}, rule {}, {:.3}s",
        "Simulated".bright_cyan().bold(),
        sim.config.pattern,
        sim.config.time_scale,
        sim.config.rule,
        sim.span
    );

    if let Some(cycle) = sim.config.cycle_duration() {
        let _ = writeln!(out, "  one pass takes {:.3}s", to_f64(cycle));
    }

    if sim.config.is_inert() {
        let _ = writeln!(out, "  {}", "pattern has no playable steps".yellow());
        return out;
    }

    for step in &sim.steps {
        let _ = writeln!(
            out,
            "  {:>10.3}s  step {:>3}  value {:>4}  ({:.3}s)",
            step.elapsed, step.index, step.value, step.duration
        );
    }

    let state = if sim.running {
        "still running".bright_green()
    } else {
        "stopped".bright_red()
    };
    let _ = write!(out, "{} step(s), {}", sim.steps.len(), state);
    out
}
