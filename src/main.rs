//! Ostinato CLI
//!
//! Run a pattern timer interactively, or preview one offline.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ostinato::config::{default_config, load_config};
use ostinato::repl::{self, ReplOptions};
use ostinato::simulate::{format_timeline, simulate};
use ostinato_core::types::config::parse_pattern;
use ostinato_core::types::time::from_f64;
use ostinato_core::{PatternRule, TimerConfig};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "ostinato")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pattern-driven interval timer", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Timer config file (.toml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Step lengths, overriding the config file (e.g. "1 1 2")
    #[arg(short, long, global = true)]
    pattern: Option<String>,

    /// Base units per second, overriding the config file
    #[arg(short, long, global = true)]
    scale: Option<u64>,

    /// End-of-pattern rule: once, all, last <n>, pingpong
    #[arg(short, long, global = true)]
    rule: Option<String>,

    /// Reload the config file whenever it changes
    #[arg(short, long)]
    watch: bool,

    /// Run without the audible click
    #[arg(long)]
    no_audio: bool,

    /// Start the timer as soon as the REPL opens
    #[arg(long)]
    start: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the steps a config fires over a span, without waiting
    Simulate {
        /// Span to simulate, in seconds
        seconds: f64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = resolve_config(&cli)?;
    debug!(?config, "resolved timer config");

    match cli.command {
        Some(Commands::Simulate { seconds }) => {
            if !(seconds.is_finite() && seconds > 0.0) {
                anyhow::bail!("simulate needs a positive number of seconds");
            }
            let sim = simulate(&config, from_f64(seconds))?;
            println!("{}", format_timeline(&sim));
            Ok(())
        }
        None => {
            info!(pattern = ?config.pattern, rule = %config.rule, "starting REPL");
            let options = ReplOptions {
                config_path: cli.config.clone(),
                watch: cli.watch,
                audio: !cli.no_audio,
                autostart: cli.start,
            };
            repl::start(config, options)
        }
    }
}

/// Config file (or the default), with command-line overrides applied
fn resolve_config(cli: &Cli) -> Result<TimerConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => default_config(),
    };

    if let Some(text) = &cli.pattern {
        config.pattern = parse_pattern(text).context("Invalid --pattern")?;
    }
    if let Some(scale) = cli.scale {
        config.time_scale = scale;
    }
    if let Some(text) = &cli.rule {
        config.rule = text.parse::<PatternRule>().context("Invalid --rule")?;
    }

    config.validate()?;
    Ok(config)
}
