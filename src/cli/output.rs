//! Output formatting for CLI commands

use serde::Serialize;

/// Output helper for consistent formatting.
///
/// Diagnostics go to stderr, results to stdout. This is the diagnostic
/// reporter the dispatch layer uses for pre-dispatch validation failures
/// like a missing `<id>`.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    verbose: bool,
}

impl Output {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Prints a result message
    pub fn success(&self, message: &str) {
        println!("{}", message);
    }

    /// Prints an error message
    pub fn error(&self, message: &str) {
        eprintln!("Error: {}", message);
    }

    /// Prints structured data as JSON
    pub fn data<T: Serialize>(&self, data: &T) {
        if let Ok(json) = serde_json::to_string_pretty(data) {
            println!("{}", json);
        }
    }

    /// Returns true if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Prints a verbose debug message (only when --verbose is set)
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", message);
        }
    }

    /// Prints a verbose debug message with context (only when --verbose is set)
    pub fn verbose_ctx(&self, context: &str, message: &str) {
        if self.verbose {
            eprintln!("[verbose:{}] {}", context, message);
        }
    }
}
