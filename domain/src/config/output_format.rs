//! Output format value object

use serde::{Deserialize, Serialize};

/// How a final result is rendered for the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Answer, rationale, disclaimer and the per-agent trace
    Full,
    /// Only the reconciled answer (default)
    #[default]
    Content,
    /// The whole result as JSON
    Json,
}
