//! CLI console utilities

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// CLI console for formatted output
pub struct CLIConsole {
    verbose: bool,
    progress_bar: Option<ProgressBar>,
}

impl CLIConsole {
    /// Create a new CLI console
    pub const fn new(verbose: bool) -> Self {
        Self {
            verbose,
            progress_bar: None,
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.verbose {
            println!("{} {}", "ℹ".blue().bold(), message);
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("{} {}", "✓".green().bold(), message.green());
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        println!("{} {}", "⚠".yellow().bold(), message.yellow());
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    }

    /// Print a header
    pub fn print_header(&self, title: &str) {
        println!();
        println!("{}", title.bold().underline());
        println!("{}", "=".repeat(title.len()).dimmed());
    }

    /// Print a labelled value
    pub fn print_field(&self, label: &str, value: &str) {
        println!("  {:18} {}", format!("{label}:").dimmed(), value);
    }

    /// Start a spinner
    pub fn start_progress(&mut self, message: &str) {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        self.progress_bar = Some(pb);
    }

    /// Finish the spinner, leaving `final_message` in place
    pub fn finish_progress(&mut self, final_message: &str) {
        if let Some(pb) = self.progress_bar.take() {
            pb.finish_with_message(final_message.to_string());
        }
    }

    /// Print a table header
    pub fn print_table_header(&self, headers: &[&str]) {
        let header_line = headers
            .iter()
            .map(|h| format!("{:24}", h.bold()))
            .collect::<Vec<_>>()
            .join(" | ");

        println!("{header_line}");
        println!("{}", "-".repeat(header_line.len()).dimmed());
    }

    /// Print a table row
    pub fn print_table_row(&self, cells: &[&str]) {
        let row_line = cells
            .iter()
            .map(|c| format!("{:24}", c))
            .collect::<Vec<_>>()
            .join(" | ");

        println!("{row_line}");
    }

    /// Print JSON in a formatted way
    pub fn print_json(&self, json: &serde_json::Value) {
        match serde_json::to_string_pretty(json) {
            Ok(formatted) => println!("{formatted}"),
            Err(_) => println!("{json}"),
        }
    }
}
