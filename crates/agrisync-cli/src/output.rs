//! CLI output helpers
//!
//! Every command renders either human-readable lines or JSON, selected by
//! the global `--json` flag.

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    /// Returns true for JSON output
    pub fn is_json(&self) -> bool {
        matches!(self, OutputFormat::Json)
    }

    /// Prints a headline result
    pub fn success(&self, message: &str) {
        match self {
            OutputFormat::Human => println!("\u{2713} {}", message),
            OutputFormat::Json => println!(
                "{}",
                serde_json::json!({"success": true, "message": message})
            ),
        }
    }

    /// Prints an error to stderr
    pub fn error(&self, message: &str) {
        match self {
            OutputFormat::Human => eprintln!("\u{2717} Error: {}", message),
            OutputFormat::Json => eprintln!(
                "{}",
                serde_json::json!({"success": false, "error": message})
            ),
        }
    }

    /// Prints an indented detail line (human output only)
    pub fn line(&self, message: &str) {
        if matches!(self, OutputFormat::Human) {
            println!("  {}", message);
        }
    }

    /// Prints a JSON value (JSON output only)
    pub fn json(&self, value: &serde_json::Value) {
        if self.is_json() {
            println!(
                "{}",
                serde_json::to_string_pretty(value).unwrap_or_default()
            );
        }
    }
}
