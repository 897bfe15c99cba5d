//! Command registry for REPL commands
//!
//! Provides a clean, extensible pattern for handling REPL commands.

pub mod general;
pub mod timer;

use crate::driver::DriverHandle;
use anyhow::Result;
use ostinato_core::TimerConfig;
use std::path::PathBuf;

/// Result of executing a command
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// Command executed successfully, continue REPL
    Success,
    /// Command executed, show this message
    Message(String),
    /// Exit the REPL
    Exit,
    /// Not a command
    NotACommand,
    /// Error occurred
    Error(String),
    /// Watch a file for changes
    Watch(String),
}

/// Context passed to command handlers
pub struct CommandContext {
    pub driver: DriverHandle,
    /// Configuration last applied to the driver
    pub config: TimerConfig,
    /// File the configuration was last loaded from
    pub config_path: Option<PathBuf>,
    /// Whether an output device was opened
    pub audio_available: bool,
    pub click_enabled: bool,
}

impl CommandContext {
    pub fn new(driver: DriverHandle, config: TimerConfig) -> Self {
        Self {
            driver,
            config,
            config_path: None,
            audio_available: false,
            click_enabled: false,
        }
    }

    /// Create a context that can sound clicks
    pub fn new_with_audio(driver: DriverHandle, config: TimerConfig) -> Self {
        Self {
            audio_available: true,
            click_enabled: true,
            ..Self::new(driver, config)
        }
    }

    /// Reconfigure the driver, restarting the timer if it was running
    ///
    /// Returns whether the timer was restarted.
    pub fn apply_config(&mut self, config: TimerConfig) -> Result<bool> {
        let was_running = self.driver.status()?.running;
        self.driver.setup(config.clone())?;
        self.config = config;
        if was_running {
            self.driver.start();
        }
        Ok(was_running)
    }
}

/// A command handler function
pub type CommandHandler = fn(&str, &mut CommandContext) -> CommandResult;

/// Registry of available commands
pub struct CommandRegistry {
    /// Commands indexed by their prefix (e.g., "click on")
    /// Sorted by prefix length descending for longest-match-first lookup
    commands: Vec<(String, CommandHandler)>,
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Register a command with its prefix
    pub fn register(&mut self, prefix: &str, handler: CommandHandler) {
        self.commands.push((prefix.to_string(), handler));
        // Sort by prefix length descending for longest-match-first
        self.commands.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    /// Execute a command, returning NotACommand if no match found
    pub fn execute(&self, input: &str, ctx: &mut CommandContext) -> CommandResult {
        for (prefix, handler) in &self.commands {
            if input == prefix || input.starts_with(&format!("{} ", prefix)) {
                let args = input[prefix.len()..].trim();
                return handler(args, ctx);
            }
        }
        CommandResult::NotACommand
    }

    /// Get all registered command prefixes
    pub fn list_commands(&self) -> Vec<&str> {
        self.commands.iter().map(|(p, _)| p.as_str()).collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a fully populated command registry with all built-in commands
pub fn create_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    // Timer commands
    registry.register("pattern", timer::cmd_pattern);
    registry.register("scale", timer::cmd_scale);
    registry.register("rule", timer::cmd_rule);
    registry.register("start", timer::cmd_start);
    registry.register("stop", timer::cmd_stop);
    registry.register("rewind", timer::cmd_rewind);
    registry.register("status", timer::cmd_status);
    registry.register("load", timer::cmd_load);
    registry.register("click", timer::cmd_click);
    registry.register("simulate", timer::cmd_simulate);

    // General commands
    registry.register("help", general::cmd_help);
    registry.register("quit", general::cmd_quit);
    registry.register("exit", general::cmd_quit);
    registry.register("watch", general::cmd_watch);

    registry
}
