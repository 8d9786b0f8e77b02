//! Terminal styling helpers
//!
//! Colors are written through `anstream`, which strips them when stdout is not
//! a terminal.

use indicatif::ProgressStyle;
use owo_colors::{OwoColorize, Style};
use std::fmt::Display;

/// Semantic styles for CLI output
pub trait Stylize: Display {
    /// Secondary text
    fn muted(&self) -> String {
        self.paint(Style::new().dimmed())
    }

    /// Headings and key terms
    fn emphasis(&self) -> String {
        self.paint(Style::new().bold())
    }

    /// Identifiers: repositories, PR numbers, branches
    fn accent(&self) -> String {
        self.paint(Style::new().cyan())
    }

    /// Positive outcome
    fn success(&self) -> String {
        self.paint(Style::new().green())
    }

    /// Negative or uncertain outcome
    fn warn(&self) -> String {
        self.paint(Style::new().yellow())
    }

    /// Apply an arbitrary style
    fn paint(&self, style: Style) -> String {
        self.to_string().style(style).to_string()
    }
}

impl<T: Display + ?Sized> Stylize for T {}

/// Check mark for completed steps
pub fn check() -> String {
    "✓".success()
}

/// Cross mark for rejected steps
pub fn cross() -> String {
    "✗".warn()
}

/// Spinner used while talking to GitHub
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
}
