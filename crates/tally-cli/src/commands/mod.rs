//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analyze` - Input loading, period resolution and the full report
//! - `reports` - Per-section rendering and the single-section report command
//! - `config` - Effective configuration display

pub mod analyze;
pub mod config;
pub mod reports;

// Re-export command functions for main.rs
pub use analyze::*;
pub use config::*;
pub use reports::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
