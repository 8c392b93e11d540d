use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::Config;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load_or_default();
            config.set(&key, &value)?;
            let path = config.save()?;
            println!(
                "{} {key} = {value} ({})",
                "Saved".green().bold(),
                path.display().to_string().dimmed()
            );
            Ok(())
        }
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = Config::load_or_default();
    let defaults = config.defaults.clone().unwrap_or_default();
    let value = |v: Option<String>, fallback: &str| match v {
        Some(v) => v.normal(),
        None => format!("{fallback} (default)").dimmed(),
    };

    println!("{} {}", "Config file:".bold(), path.display());
    println!();
    println!("  defaults.theme               {}", value(defaults.theme, "light"));
    println!(
        "  defaults.start_mode          {}",
        value(defaults.start_mode, "none")
    );
    println!(
        "  defaults.transition          {}",
        value(defaults.transition, "none")
    );
    println!(
        "  defaults.transition_duration {}",
        value(defaults.transition_duration.map(|d| format!("{d}s")), "0.5s")
    );
    Ok(())
}
