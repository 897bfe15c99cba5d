//! Timer commands (pattern, scale, rule, transport, load, click, simulate)

use crate::commands::{CommandContext, CommandResult};
use crate::config::load_config;
use crate::driver::TimerStatus;
use crate::simulate::{format_timeline, simulate};
use colored::*;
use ostinato_core::types::config::parse_pattern;
use ostinato_core::types::time::from_f64;
use ostinato_core::{PatternRule, TimerConfig};
use std::path::PathBuf;

/// Apply `config` and describe the outcome
fn reconfigure(ctx: &mut CommandContext, config: TimerConfig, what: String) -> CommandResult {
    match ctx.apply_config(config) {
        Ok(true) => CommandResult::Message(format!("{} (restarted)", what).bright_green().to_string()),
        Ok(false) => CommandResult::Message(what.bright_green().to_string()),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `pattern [n...]` command
pub fn cmd_pattern(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Message(format!("Current pattern: {:?}", ctx.config.pattern));
    }

    match parse_pattern(args) {
        Ok(pattern) => {
            let what = format!("Pattern set to {:?}", pattern);
            let config = TimerConfig {
                pattern,
                ..ctx.config.clone()
            };
            reconfigure(ctx, config, what)
        }
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `scale [n]` command
pub fn cmd_scale(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Message(format!(
            "Current time scale: {} units per second",
            ctx.config.time_scale
        ));
    }

    match args.parse::<u64>() {
        Ok(scale) if scale > 0 => {
            let config = ctx.config.clone().with_time_scale(scale);
            reconfigure(ctx, config, format!("Time scale set to {}", scale))
        }
        _ => CommandResult::Error("Invalid time scale. Use a whole number of at least 1".to_string()),
    }
}

/// Handle `rule [rule]` command
pub fn cmd_rule(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Message(format!("Current rule: {}", ctx.config.rule));
    }

    match args.parse::<PatternRule>() {
        Ok(rule) => {
            let config = ctx.config.clone().with_rule(rule);
            reconfigure(ctx, config, format!("Rule set to {}", rule))
        }
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `start` command
pub fn cmd_start(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    if ctx.config.is_inert() {
        return CommandResult::Error("Pattern has no playable steps".to_string());
    }
    ctx.driver.start();
    CommandResult::Message("▶ Started".bright_green().to_string())
}

/// Handle `stop` command
pub fn cmd_stop(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    ctx.driver.stop();
    CommandResult::Message("⏹ Stopped".bright_yellow().to_string())
}

/// Handle `rewind` command
pub fn cmd_rewind(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    ctx.driver.rewind();
    CommandResult::Message("⏮ Rewound".bright_yellow().to_string())
}

/// Handle `status` command
pub fn cmd_status(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    match ctx.driver.status() {
        Ok(status) => CommandResult::Message(format_status(&status, ctx)),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `load <file>` command
pub fn cmd_load(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: load <file>".to_string());
    }

    let path = PathBuf::from(args);
    match load_config(&path) {
        Ok(config) => {
            ctx.config_path = Some(path);
            reconfigure(ctx, config, format!("Loaded {}", args))
        }
        Err(e) => CommandResult::Error(format!("{:#}", e)),
    }
}

/// Handle `click [on|off]` command
pub fn cmd_click(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let enable = match args {
        "" => {
            let state = if ctx.click_enabled { "on" } else { "off" };
            return CommandResult::Message(format!("Click is {}", state));
        }
        "on" => true,
        "off" => false,
        _ => return CommandResult::Error("Usage: click on|off".to_string()),
    };

    if enable && !ctx.audio_available {
        return CommandResult::Error("No audio output available".to_string());
    }
    ctx.click_enabled = enable;
    CommandResult::Success
}

/// Handle `simulate <seconds>` command
pub fn cmd_simulate(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let seconds = match args.parse::<f64>() {
        Ok(s) if s > 0.0 && s.is_finite() => s,
        _ => return CommandResult::Error("Usage: simulate <seconds>".to_string()),
    };

    match simulate(&ctx.config, from_f64(seconds)) {
        Ok(sim) => CommandResult::Message(format_timeline(&sim)),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Render a driver status snapshot
pub fn format_status(status: &TimerStatus, ctx: &CommandContext) -> String {
    let state = if status.running {
        "▶ running".bright_green()
    } else {
        "⏹ stopped".bright_red()
    };
    let poll = match status.poll_interval {
        Some(p) => format!("{:.3}s", p),
        None => "none (inert pattern)".to_string(),
    };
    let mut out = format!(
        "{}\n  pattern:  {:?}\n  playback: {:?}\n  scale:    {}\n  rule:     {}\n  poll:     {}\n  elapsed:  {:.3}s\n  step:     {}",
        state,
        status.config.pattern,
        status.playback_pattern,
        status.config.time_scale,
        status.config.rule,
        poll,
        status.elapsed,
        status.pattern_index,
    );
    if let Some(path) = &ctx.config_path {
        out.push_str(&format!("\n  file:     {}", path.display()));
    }
    out.push_str(&format!(
        "\n  click:    {}",
        if ctx.click_enabled { "on" } else { "off" }
    ));
    out
}
