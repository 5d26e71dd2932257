//! Terminal output formatting and utilities.
//!
//! This module provides consistent output formatting across all commands,
//! including colors and error messages.

pub mod colors;
pub mod errors;

use colors::ColorSupport;

/// Output handler for consistent terminal formatting
pub struct OutputHandler {
    colors: ColorSupport,
}

impl OutputHandler {
    /// Create a new output handler
    pub fn new() -> Self {
        Self::with_colors(ColorSupport::detect())
    }

    /// Create an output handler with fixed color support
    pub fn with_colors(colors: ColorSupport) -> Self {
        Self { colors }
    }

    pub fn colors(&self) -> &ColorSupport {
        &self.colors
    }

    /// Print a line as is
    pub fn line(&self, message: &str) {
        println!("{}", message);
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        println!("{}", self.colors.dim(message));
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("{} {}", self.colors.green("✓"), message);
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        println!("{} {}", self.colors.yellow("⚠"), message);
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", self.colors.red("✗"), message);
    }

    /// Print a step message with emoji
    pub fn step(&self, emoji: &str, message: &str) {
        println!("{} {}", emoji, message);
    }
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new()
    }
}
