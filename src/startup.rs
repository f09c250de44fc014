// Startup banner
//
// Printed before the panel takes over the screen (or ahead of headless
// output): version, config source, world, event and storage.

use crate::config::{Config, VERSION};

/// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
}

/// Lines describing the effective setup, without colors
pub fn summary_lines(config: &Config, event_key: &str) -> Vec<(&'static str, String)> {
    let world = if config.demo_mode {
        "demo world".to_string()
    } else {
        config.server_url.clone()
    };
    let storage = if config.demo_mode {
        "in memory".to_string()
    } else {
        config.data_dir.display().to_string()
    };

    vec![
        ("World", world),
        ("Event", event_key.to_string()),
        ("Storage", storage),
        (
            "Cooldown",
            format!("{}h", config.friends.cooldown_hours),
        ),
    ]
}

pub fn print_startup(config: &Config, event_key: &str) {
    use colors::*;

    eprintln!();
    eprintln!("  {BOLD}{CYAN}twbf{RESET} {DIM}v{VERSION}{RESET}");
    eprintln!("  {DIM}Friend currency companion{RESET}");
    eprintln!();

    if let Some(path) = Config::config_path() {
        if path.exists() {
            eprintln!("  {DIM}Config:{RESET} {GREEN}✓{RESET} {}", path.display());
        } else {
            eprintln!("  {DIM}Config:{RESET} {DIM}(using defaults){RESET}");
        }
    }
    for (label, value) in summary_lines(config, event_key) {
        eprintln!("  {DIM}{label}:{RESET} {value}");
    }
    if config.demo_mode {
        eprintln!("  {YELLOW}▸ Demo mode active{RESET} {DIM}(no server){RESET}");
    }
    eprintln!();
}
