// CLI module - command-line argument parsing
//
// Without a subcommand the tool opens the TUI panel. Subcommands cover
// headless use:
// - config --show | --path | --reset
// - friends: list friends with their cooldowns
// - send <id>: send event currency to one friend
// - sync [--force]: ingest new log pages
// - stats: print cached per-friend and per-category totals

use crate::config::{Config, VERSION};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;

/// twbf - friend currency companion for timed events
#[derive(Parser, Debug)]
#[command(name = "twbf")]
#[command(version = VERSION)]
#[command(about = "Send event currency to friends and track what they sent back", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// List friends sorted by time until they can receive again
    Friends,

    /// Send event currency to a friend
    Send {
        /// Player id of the friend
        player_id: u64,
    },

    /// Download new activity log pages into the local statistics
    Sync {
        /// Fetch even if no new currency was signalled
        #[arg(long)]
        force: bool,
    },

    /// Print cached statistics
    Stats,
}

/// Handle `config` subcommands. Returns true if the command was handled.
pub fn handle_config_command(command: &Commands) -> Result<bool> {
    let Commands::Config { show, reset, path } = command else {
        return Ok(false);
    };

    if *path {
        handle_config_path()?;
    } else if *show {
        handle_config_show()?;
    } else if *reset {
        handle_config_reset()?;
    } else {
        println!("Usage: twbf config [--show|--reset|--path]");
        println!();
        println!("Options:");
        println!("  --show    Display effective configuration");
        println!("  --reset   Reset config file to defaults");
        println!("  --path    Show config file path");
    }
    Ok(true)
}

fn handle_config_path() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;
    println!("{}", path.display());
    Ok(())
}

fn handle_config_show() -> Result<()> {
    let config = Config::from_env()?;

    println!("# Effective configuration (env > file > defaults)");
    println!();
    print!("{}", config.to_toml());
    println!();
    println!(
        "# session cookie: {}",
        if config.session_cookie.is_some() { "set" } else { "missing" }
    );
    println!(
        "# token: {}",
        if config.token.is_some() { "set" } else { "missing" }
    );

    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
    Ok(())
}

fn handle_config_reset() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;

    if path.exists() {
        eprint!("Config file exists at {}. Overwrite? [y/N] ", path.display());
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Error creating directory {}", parent.display()))?;
    }
    std::fs::write(&path, Config::default().to_toml())
        .with_context(|| format!("Error writing config {}", path.display()))?;

    println!("Config reset to defaults: {}", path.display());
    Ok(())
}

/// Reject ids that are obviously not player ids before hitting the server
pub fn validate_player_id(id: u64) -> Result<u64> {
    if id == 0 {
        bail!("Player id must be positive");
    }
    Ok(id)
}
