//! Presentation-level configuration
//!
//! Output settings resolved from the config file and command-line flags.

use crate::cli::commands::Cli;
use council_domain::OutputFormat;

/// Output configuration for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
    /// Show the live progress display
    pub show_progress: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: true,
            show_progress: true,
        }
    }
}

impl OutputConfig {
    /// Start from the file's `[output]` values
    pub fn from_file(format: Option<OutputFormat>, color: bool, show_progress: bool) -> Self {
        Self {
            format: format.unwrap_or_default(),
            color,
            show_progress,
        }
    }

    /// Apply command-line overrides
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(format) = cli.output {
            self.format = format.into();
        }
        if cli.no_color {
            self.color = false;
        }
        if cli.quiet {
            self.show_progress = false;
        }
        self
    }
}
