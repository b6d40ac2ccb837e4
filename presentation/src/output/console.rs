//! Console output formatter for session results

use crate::output::formatter::OutputFormatter;
use colored::{ColoredString, Colorize};
use council_domain::core::string::{first_line, truncate};
use council_domain::{FinalResult, FinalStatus, TaskStatus};

/// Longest excerpt of an agent's output shown in the trace
const EXCERPT_CHARS: usize = 160;

/// Formats session results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete result with the per-agent trace
    pub fn format(result: &FinalResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("LLM Council Results"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}   {} {}   {} ${:.4}\n",
            "Mode:".cyan().bold(),
            result.mode,
            "Status:".cyan().bold(),
            Self::status(result.status),
            "Cost:".cyan().bold(),
            result.cost_actual
        ));

        if let Some(disclaimer) = &result.disclaimer {
            output.push_str(&format!("{} {}\n", "Note:".yellow().bold(), disclaimer));
        }

        output.push_str(&Self::section_header("Answer"));
        output.push_str(&format!("\n{}\n", result.content));

        if let Some(rationale) = &result.rationale {
            output.push_str(&Self::section_header("How the council decided"));
            output.push_str(&format!("\n{}\n", Self::indent(rationale, "  ")));
        }

        output.push_str(&Self::section_header("Agent trace"));
        for trace in &result.per_agent_trace {
            output.push_str(&format!(
                "\n{}\n",
                format!("── {} ──", trace.agent).yellow().bold()
            ));
            if trace.phase_outputs.is_empty() {
                output.push_str(&format!("  {}\n", "not dispatched".dimmed()));
            }
            for phase in &trace.phase_outputs {
                let detail = match (&phase.text, &phase.error) {
                    (Some(text), _) => Self::excerpt(text),
                    (None, Some(error)) => error.clone(),
                    (None, None) => String::new(),
                };
                output.push_str(&format!(
                    "  {:<24} {:<10} {}\n",
                    phase.phase,
                    Self::task_status(phase.status),
                    detail
                ));
            }
        }

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(result: &FinalResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the answer only (concise output)
    pub fn format_content_only(result: &FinalResult) -> String {
        let mut output = String::new();

        output.push_str(&result.content);
        output.push('\n');

        if result.status != FinalStatus::Completed {
            output.push_str(&format!(
                "\n{} {}\n",
                format!("[{}]", result.status).yellow().bold(),
                result.disclaimer.as_deref().unwrap_or("")
            ));
        }

        output
    }

    fn status(status: FinalStatus) -> ColoredString {
        match status {
            FinalStatus::Completed => status.as_str().green().bold(),
            FinalStatus::Partial => status.as_str().yellow().bold(),
            FinalStatus::Aborted => status.as_str().red().bold(),
        }
    }

    fn task_status(status: TaskStatus) -> ColoredString {
        match status {
            TaskStatus::Done => status.as_str().green(),
            TaskStatus::TimedOut | TaskStatus::Cancelled => status.as_str().yellow(),
            TaskStatus::Failed => status.as_str().red(),
            TaskStatus::Pending | TaskStatus::Running => status.as_str().dimmed(),
        }
    }

    /// First line of `text`, shortened to [`EXCERPT_CHARS`]
    fn excerpt(text: &str) -> String {
        truncate(first_line(text), EXCERPT_CHARS)
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, result: &FinalResult) -> String {
        Self::format(result)
    }

    fn format_json(&self, result: &FinalResult) -> String {
        Self::format_json(result)
    }

    fn format_content_only(&self, result: &FinalResult) -> String {
        Self::format_content_only(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::{AgentTrace, OutputFormat, PhaseKind, PhaseOutput};

    fn sample(status: FinalStatus) -> FinalResult {
        let mut alpha = AgentTrace::new("scripted:alpha");
        alpha.phase_outputs.push(PhaseOutput {
            phase: "draft".to_string(),
            kind: PhaseKind::Draft,
            status: TaskStatus::Done,
            text: Some("Rayleigh scattering\nmore detail".to_string()),
            error: None,
            token_count: 12,
            cost: 0.001,
        });
        let mut beta = AgentTrace::new("scripted:beta");
        beta.phase_outputs.push(PhaseOutput {
            phase: "draft".to_string(),
            kind: PhaseKind::Draft,
            status: TaskStatus::TimedOut,
            text: None,
            error: Some("phase deadline reached".to_string()),
            token_count: 0,
            cost: 0.0,
        });

        FinalResult {
            session_id: "s-1".to_string(),
            mode: "round_table".to_string(),
            status,
            content: "The sky is blue because of Rayleigh scattering.".to_string(),
            rationale: Some("2 drafts considered; votes: A:1 B:0".to_string()),
            per_agent_trace: vec![alpha, beta],
            cost_actual: 0.001,
            disclaimer: (status != FinalStatus::Completed)
                .then(|| "only 1 of 2 agents contributed".to_string()),
        }
    }

    #[test]
    fn test_full_format_shows_trace() {
        let output = ConsoleFormatter::format(&sample(FinalStatus::Partial));

        assert!(output.contains("round_table"));
        assert!(output.contains("Rayleigh scattering."));
        assert!(output.contains("votes: A:1 B:0"));
        assert!(output.contains("scripted:beta"));
        assert!(output.contains("phase deadline reached"));
        assert!(output.contains("only 1 of 2 agents contributed"));
        assert!(!output.contains("more detail"));
    }

    #[test]
    fn test_content_only_for_completed_result() {
        let output = ConsoleFormatter::format_content_only(&sample(FinalStatus::Completed));
        assert_eq!(output, "The sky is blue because of Rayleigh scattering.\n");
    }

    #[test]
    fn test_content_only_flags_partial_result() {
        let output = ConsoleFormatter::format_content_only(&sample(FinalStatus::Partial));
        assert!(output.starts_with("The sky is blue"));
        assert!(output.contains("only 1 of 2 agents contributed"));
    }

    #[test]
    fn test_json_uses_camel_case_fields() {
        let output = ConsoleFormatter.render(&sample(FinalStatus::Completed), OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["status"], "completed");
        assert_eq!(value["perAgentTrace"][1]["phaseOutputs"][0]["status"], "timed_out");
        assert!(value.get("costActual").is_some());
        assert!(value.get("disclaimer").is_none());
    }

    #[test]
    fn test_excerpt_is_shortened() {
        let long = "x".repeat(EXCERPT_CHARS + 10);
        let excerpt = ConsoleFormatter::excerpt(&long);
        assert_eq!(excerpt.len(), EXCERPT_CHARS);
        assert!(excerpt.ends_with("..."));
    }
}
