//! Configuration display

use std::path::Path;

use anyhow::{Context, Result};

use tally_core::config::default_config_path;

use super::analyze::load_analytics_config;

/// Show where the analytics config comes from, and optionally every value
pub fn cmd_config(config_path: Option<&Path>, show: bool) -> Result<()> {
    let source = config_path
        .map(Path::to_path_buf)
        .or_else(default_config_path);

    println!();
    println!("⚙️  Analytics Config");
    match &source {
        Some(path) if path.exists() => println!("   Source: {}", path.display()),
        Some(path) => println!("   Source: built-in defaults ({} not found)", path.display()),
        None => println!("   Source: built-in defaults"),
    }

    let config = load_analytics_config(config_path)?;

    if show {
        let rendered =
            toml::to_string_pretty(&config).context("Failed to render analytics config")?;
        println!();
        for line in rendered.lines() {
            println!("   {}", line);
        }
    }

    Ok(())
}
