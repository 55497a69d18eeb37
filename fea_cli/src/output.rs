//! Text and JSON output for CLI commands.

use serde::Serialize;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Print `item` as pretty JSON
pub fn print_json<T: Serialize>(item: &T) -> Result<(), fea_core::FeaError> {
    println!("{}", serde_json::to_string_pretty(item)?);
    Ok(())
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {}", msg);
}

/// Format a vector as `(x, y, z)` with fixed precision
pub fn vec3([x, y, z]: [f64; 3]) -> String {
    format!("({:.4}, {:.4}, {:.4})", x, y, z)
}
