//! Terminal output utilities

use owo_colors::OwoColorize;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print a labelled value, e.g. `Format: PNG`
    pub fn field(label: &str, value: impl std::fmt::Display) {
        println!("  {} {}", format!("{}:", label).dimmed(), value);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }
}

/// Format a file size for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format pixel dimensions, e.g. `1920×1080`
pub fn format_dimensions(width: u32, height: u32) -> String {
    format!("{}×{}", width, height)
}

/// Format a size change as a signed percentage of the original
pub fn format_change(original: u64, new: u64) -> String {
    if original == 0 {
        return "n/a".to_string();
    }
    let pct = (new as f64 - original as f64) / original as f64 * 100.0;
    format!("{:+.1}%", pct)
}
