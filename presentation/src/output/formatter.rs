//! Output formatter trait

use council_domain::{FinalResult, OutputFormat};

/// Trait for formatting session results
pub trait OutputFormatter {
    /// Format the complete result with the per-agent trace
    fn format(&self, result: &FinalResult) -> String;

    /// Format as JSON
    fn format_json(&self, result: &FinalResult) -> String;

    /// Format the answer only (concise output)
    fn format_content_only(&self, result: &FinalResult) -> String;

    /// Format in the requested style
    fn render(&self, result: &FinalResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => self.format(result),
            OutputFormat::Content => self.format_content_only(result),
            OutputFormat::Json => self.format_json(result),
        }
    }
}
