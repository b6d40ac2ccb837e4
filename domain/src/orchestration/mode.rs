//! Collaboration mode selection

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Collaboration protocol run by a session
///
/// Each variant is driven by its own state machine in [`crate::protocol`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// draft → critique → vote → synthesize
    RoundTable,
    /// Each agent amends the previous agent's output in turn
    SequentialCritiqueChain,
    /// Co-draft → verify claims → optional rewrite → finalize
    ValidatedConsensus,
    /// Ideate → fuse → vote → expand
    CreativeBrainstormSwarm,
    /// Ideate → rank → verify survivors → elaborate
    HybridGuardedBraintrust,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::RoundTable,
        Mode::SequentialCritiqueChain,
        Mode::ValidatedConsensus,
        Mode::CreativeBrainstormSwarm,
        Mode::HybridGuardedBraintrust,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::RoundTable => "round_table",
            Mode::SequentialCritiqueChain => "sequential_critique_chain",
            Mode::ValidatedConsensus => "validated_consensus",
            Mode::CreativeBrainstormSwarm => "creative_brainstorm_swarm",
            Mode::HybridGuardedBraintrust => "hybrid_guarded_braintrust",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::RoundTable => "Round Table",
            Mode::SequentialCritiqueChain => "Sequential Critique Chain",
            Mode::ValidatedConsensus => "Validated Consensus",
            Mode::CreativeBrainstormSwarm => "Creative Brainstorm Swarm",
            Mode::HybridGuardedBraintrust => "Hybrid Guarded Braintrust",
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::RoundTable
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Mode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Mode::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| DomainError::UnknownMode(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_modes() {
        for mode in Mode::ALL {
            assert_eq!(mode.as_str().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_parse_accepts_kebab_case() {
        assert_eq!(
            "creative-brainstorm-swarm".parse::<Mode>().unwrap(),
            Mode::CreativeBrainstormSwarm
        );
    }

    #[test]
    fn test_parse_unknown_mode() {
        let err = "debate".parse::<Mode>().unwrap_err();
        assert_eq!(err, DomainError::UnknownMode("debate".to_string()));
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&Mode::ValidatedConsensus).unwrap();
        assert_eq!(json, "\"validated_consensus\"");
    }
}
