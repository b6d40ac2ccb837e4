//! Progress reporting for council sessions

use colored::Colorize;
use council_application::EventPublisher;
use council_domain::{ProgressEvent, TaskStatus};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Mutex;

/// Phase name of the terminal transition
const FINISHED: &str = "finished";

/// Reports progress with one bar per phase
pub struct ProgressReporter {
    multi: MultiProgress,
    phase_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self::with_multi(MultiProgress::new())
    }

    /// Reporter that draws nothing (bars are still tracked)
    pub fn hidden() -> Self {
        Self::with_multi(MultiProgress::with_draw_target(ProgressDrawTarget::hidden()))
    }

    fn with_multi(multi: MultiProgress) -> Self {
        Self {
            multi,
            phase_bar: Mutex::new(None),
        }
    }

    fn phase_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|style| style.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
    }

    /// Position and length of the current phase bar
    pub fn position(&self) -> Option<(u64, u64)> {
        let bar = self.phase_bar.lock().ok()?;
        bar.as_ref()
            .map(|pb| (pb.position(), pb.length().unwrap_or(0)))
    }

    fn on_phase_change(&self, phase: &str, agents: usize, message: Option<&str>) {
        let Ok(mut current) = self.phase_bar.lock() else {
            return;
        };
        if let Some(pb) = current.take() {
            pb.finish_with_message(format!("{}", "complete".green()));
        }
        if phase == FINISHED {
            if let Some(message) = message {
                let _ = self.multi.println(format!("{} {}", "->".cyan(), message));
            }
            return;
        }

        let pb = self.multi.add(ProgressBar::new(agents as u64));
        pb.set_style(Self::phase_style());
        pb.set_prefix(phase.to_string());
        pb.set_message("Starting...");
        *current = Some(pb);
    }

    fn on_agent_status(&self, agent: &str, status: TaskStatus) {
        if !status.is_terminal() {
            return;
        }
        if let Ok(current) = self.phase_bar.lock()
            && let Some(pb) = current.as_ref()
        {
            pb.set_message(status_line(agent, status));
            pb.inc(1);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for ProgressReporter {
    fn publish(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::PhaseChange {
                phase,
                agents,
                message,
                ..
            } => self.on_phase_change(phase, agents.len(), message.as_deref()),
            ProgressEvent::AgentStatus { agent, status, .. } => {
                self.on_agent_status(agent, *status)
            }
        }
    }
}

fn status_line(agent: &str, status: TaskStatus) -> String {
    match status {
        TaskStatus::Done => format!("{} {}", "v".green(), agent),
        TaskStatus::TimedOut => format!("{} {} (timed out)", "!".yellow(), agent),
        TaskStatus::Cancelled => format!("{} {} (cancelled)", "-".yellow(), agent),
        _ => format!("{} {} (failed)", "x".red(), agent),
    }
}

/// Simple text-based progress on stderr (no fancy UI)
pub struct SimpleProgress;

impl EventPublisher for SimpleProgress {
    fn publish(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::PhaseChange {
                phase,
                agents,
                message,
                ..
            } => {
                if phase == FINISHED {
                    eprintln!("{} {}", "->".cyan(), message.as_deref().unwrap_or(phase));
                } else {
                    eprintln!("{} {} ({} agents)", "->".cyan(), phase.bold(), agents.len());
                }
            }
            ProgressEvent::AgentStatus { agent, status, .. } if status.is_terminal() => {
                eprintln!("  {}", status_line(agent, *status));
            }
            ProgressEvent::AgentStatus { .. } => {}
        }
    }
}
