//! REPL (Read-Eval-Print Loop) for driving the pattern timer

use crate::audio::ClickPlayer;
use crate::commands::{create_registry, CommandContext, CommandRegistry, CommandResult};
use crate::config::load_config;
use crate::driver::{DriverEvent, TimerDriver};
use crate::repl::watcher::{is_reload_event, FileWatcher};
use anyhow::{anyhow, Result};
use colored::*;
use crossbeam_channel::{unbounded, Receiver, Sender};
use notify::Event;
use ostinato_core::{Step, TimerConfig};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::{Path, PathBuf};
use std::thread;
use tracing::{debug, warn};

pub mod watcher;

/// Types of events the REPL loop handles
enum ReplEvent {
    Input(Result<String, ReadlineError>),
}

/// Startup options for the REPL
#[derive(Debug, Clone, Default)]
pub struct ReplOptions {
    /// File the initial config came from
    pub config_path: Option<PathBuf>,
    /// Watch `config_path` from the start
    pub watch: bool,
    /// Open the audio output for clicks
    pub audio: bool,
    /// Start the timer immediately
    pub autostart: bool,
}

/// Interactive REPL for the pattern timer
pub struct Repl {
    editor: Option<DefaultEditor>,
    registry: CommandRegistry,
    ctx: CommandContext,
    click: Option<ClickPlayer>,
    options: ReplOptions,

    // Event channels
    driver_events: Receiver<DriverEvent>,
    tx_input: Sender<ReplEvent>,
    rx_input: Receiver<ReplEvent>,
    tx_watcher: Sender<notify::Result<Event>>,
    rx_watcher: Receiver<notify::Result<Event>>,

    // File watcher
    watcher: Option<FileWatcher>,
}

impl Repl {
    /// Create a new REPL instance around a fresh timer driver
    pub fn new(config: TimerConfig, options: ReplOptions) -> Result<Self> {
        let editor = DefaultEditor::new()?;
        let (driver, driver_events) = TimerDriver::spawn(config.clone())?;

        // Audio is optional; without a device the timer runs silently
        let click = if options.audio {
            match ClickPlayer::new() {
                Ok(player) => Some(player),
                Err(e) => {
                    warn!("audio output unavailable, clicks disabled: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let mut ctx = if click.is_some() {
            CommandContext::new_with_audio(driver, config)
        } else {
            CommandContext::new(driver, config)
        };
        ctx.config_path = options.config_path.clone();

        let (tx_input, rx_input) = unbounded();
        let (tx_watcher, rx_watcher) = unbounded();

        Ok(Repl {
            editor: Some(editor),
            registry: create_registry(),
            ctx,
            click,
            options,
            driver_events,
            tx_input,
            rx_input,
            tx_watcher,
            rx_watcher,
            watcher: None,
        })
    }

    /// Start the REPL loop
    pub fn run(&mut self) -> Result<()> {
        println!(
            "{} {}",
            "♩".bright_yellow(),
            "Ostinato Pattern Timer".bright_cyan().bold()
        );
        println!(
            "Try: {}, {}, {}",
            "pattern 1 1 2".cyan(),
            "rule pingpong".cyan(),
            "start".cyan()
        );
        println!(
            "Type '{}' for more information, '{}' or {} to exit.\n",
            "help".bright_green(),
            "quit".bright_red(),
            "Ctrl+C".bright_red()
        );

        if self.options.watch {
            match self.options.config_path.clone() {
                Some(path) => self.watch(&path.display().to_string()),
                None => println!("{} --watch needs --config", "Error:".red()),
            }
        }
        if self.options.autostart {
            let result = self.registry.execute("start", &mut self.ctx);
            self.print_result(result);
        }

        // Move editor to thread
        let mut editor = self
            .editor
            .take()
            .ok_or_else(|| anyhow!("REPL is already running"))?;
        let tx_input = self.tx_input.clone();

        thread::spawn(move || loop {
            let prompt = format!("{} ", "ostinato>".bright_magenta().bold());
            let readline = editor.readline(&prompt);

            match readline {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if !line.is_empty() {
                        let _ = editor.add_history_entry(&line);
                    }
                    if tx_input.send(ReplEvent::Input(Ok(line))).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    let _ = tx_input.send(ReplEvent::Input(Err(err)));
                    break;
                }
            }
        });

        loop {
            crossbeam_channel::select! {
                recv(self.rx_input) -> msg => match msg {
                    Ok(ReplEvent::Input(res)) => match res {
                        Ok(line) => {
                            if line.is_empty() {
                                continue;
                            }
                            let result = self.registry.execute(&line, &mut self.ctx);
                            if result == CommandResult::Exit {
                                println!("{} ♩", "Goodbye!".bright_cyan());
                                break;
                            }
                            self.print_result(result);
                        }
                        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                            println!("{} ♩", "Goodbye!".bright_cyan());
                            break;
                        }
                        Err(err) => {
                            println!(
                                "{} {}",
                                "Error reading input:".bright_red().bold(),
                                err.to_string().red()
                            );
                        }
                    },
                    Err(_) => break, // Channel closed
                },

                recv(self.driver_events) -> msg => match msg {
                    Ok(event) => self.handle_driver_event(event),
                    Err(_) => {
                        println!("{} timer driver stopped", "Error:".red());
                        break;
                    }
                },

                recv(self.rx_watcher) -> msg => match msg {
                    Ok(Ok(event)) => {
                        if is_reload_event(&event) {
                            for path in event.paths {
                                self.reload(&path);
                            }
                        }
                    }
                    Ok(Err(e)) => println!("{} Watch error: {}", "Error:".red(), e),
                    Err(_) => break, // Channel closed
                }
            }
        }

        self.ctx.driver.shutdown();
        if let Some(click) = &self.click {
            let _ = click.pause();
        }
        Ok(())
    }

    fn print_result(&mut self, result: CommandResult) {
        match result {
            CommandResult::Success | CommandResult::Exit => {}
            CommandResult::Message(msg) => println!("{}", msg),
            CommandResult::Error(e) => println!("{} {}", "Error:".bright_red().bold(), e.red()),
            CommandResult::Watch(path) => self.watch(&path),
            CommandResult::NotACommand => println!(
                "{} unknown command (type '{}' for a list)",
                "Error:".bright_red().bold(),
                "help".bright_green()
            ),
        }
    }

    fn handle_driver_event(&mut self, event: DriverEvent) {
        match event {
            DriverEvent::Step(step) => {
                println!("{}", format_step(&step));
                if self.ctx.click_enabled {
                    if let Some(click) = &self.click {
                        if let Err(e) = click.trigger(step.index == 0) {
                            warn!("click failed: {}", e);
                        }
                    }
                }
            }
            DriverEvent::Finished => println!("{} Pattern finished", "■".bright_yellow()),
            DriverEvent::Reconfigured(config) => {
                debug!(pattern = ?config.pattern, rule = %config.rule, "driver reconfigured");
            }
        }
    }

    fn watch(&mut self, path: &str) {
        // Initialize watcher if needed
        if self.watcher.is_none() {
            match FileWatcher::new(self.tx_watcher.clone()) {
                Ok(w) => self.watcher = Some(w),
                Err(e) => println!("{} Failed to create watcher: {}", "Error:".red(), e),
            }
        }

        if let Some(w) = &mut self.watcher {
            if let Err(e) = w.watch(path) {
                println!("{} Failed to watch {}: {}", "Error:".red(), path, e);
                for kept in w.watched() {
                    println!("Still watching {}", kept.display().to_string().bright_green());
                }
            } else {
                println!("{} Watching {} for changes...", "👀".bright_cyan(), path.bright_green());
            }
        }
    }

    /// Reload a changed config file and reconfigure the driver
    fn reload(&mut self, path: &Path) {
        println!("{} File changed: {}", "⚡".bright_yellow(), path.display());
        let result = load_config(path).and_then(|config| self.ctx.apply_config(config));
        match result {
            Ok(restarted) => {
                self.ctx.config_path = Some(path.to_path_buf());
                let note = if restarted { " (restarted)" } else { "" };
                println!("{} Reloaded successfully{}", "✓".bright_green(), note);
            }
            Err(e) => println!("{} {:#}", "Error:".red(), e),
        }
    }
}

/// One line per completed step
pub fn format_step(step: &Step) -> String {
    let marker = if step.index == 0 { "●" } else { "○" };
    format!(
        "{} {:>9.3}s  step {:<3} value {}",
        marker.bright_magenta(),
        step.elapsed,
        step.index,
        step.value
    )
}

/// Convenience function to start the REPL
pub fn start(config: TimerConfig, options: ReplOptions) -> Result<()> {
    let mut repl =
        Repl::new(config, options).map_err(|e| anyhow!("Failed to initialize REPL: {}", e))?;
    repl.run()
}
