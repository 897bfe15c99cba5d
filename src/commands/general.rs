//! General REPL commands (help, quit, watch)

use crate::commands::{CommandContext, CommandResult};
use colored::*;

/// Handle `help` command
pub fn cmd_help(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    print_help();
    CommandResult::Success
}

/// Handle `quit` or `exit` command
pub fn cmd_quit(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    CommandResult::Exit
}

/// Handle `watch [file]` command
///
/// With no argument, watches the file the current config was loaded from.
pub fn cmd_watch(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if !args.is_empty() {
        return CommandResult::Watch(args.to_string());
    }
    match &ctx.config_path {
        Some(path) => CommandResult::Watch(path.display().to_string()),
        None => CommandResult::Error("Usage: watch <file>".to_string()),
    }
}

/// Print help information
fn print_help() {
    println!("{}", "Ostinato Help".bold());
    println!("{}", "=============".bold());
    println!();
    println!("{}", "Pattern:".green());
    println!(
        "  {}   - Set step lengths in base units",
        "pattern <n...>".cyan()
    );
    println!("  {}        - Set base units per second", "scale <n>".cyan());
    println!(
        "  {}      - Set end-of-pattern rule: once, all, last <n>, pingpong",
        "rule <rule>".cyan()
    );
    println!();
    println!("{}", "Transport:".green());
    println!("  {}            - Start (or restart) the timer", "start".cyan());
    println!("  {}             - Stop and rewind", "stop".cyan());
    println!("  {}           - Rewind without stopping", "rewind".cyan());
    println!("  {}           - Show timer state", "status".cyan());
    println!();
    println!("{}", "Files:".green());
    println!("  {}      - Load a .toml or .json config", "load <file>".cyan());
    println!(
        "  {}     - Reload the config whenever it changes",
        "watch <file>".cyan()
    );
    println!();
    println!("{}", "Other Commands:".green());
    println!("  {}   - Toggle the audible click", "click on|off".cyan());
    println!(
        "  {} - Preview steps without waiting",
        "simulate <secs>".cyan()
    );
    println!();
    println!("{}", "Examples:".green());
    println!("  ostinato> {}", "pattern 1 2 3".cyan());
    println!("  ostinato> {}", "rule pingpong".cyan());
    println!("  ostinato> {}", "simulate 12".cyan());
    println!();
    println!("  {}              - Show this help", "help".bright_green());
    println!("  {}              - Exit the REPL", "quit".bright_red());
}
