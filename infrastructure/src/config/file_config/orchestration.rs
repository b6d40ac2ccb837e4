//! Orchestration configuration from TOML (`[orchestration]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [orchestration]
//! global_timeout_ms = 13000
//! phase_timeout_ms = 6000     # optional cap on a single phase
//! quorum = "atleast:3"        # or "majority", "unanimous", "75%"
//! flagged_ratio_threshold = 0.04
//! max_retries = 2
//! backoff_base_ms = 200
//! max_in_flight = 16
//! rank_survivors = 3
//! ```

use super::ConfigValidationError;
use council_application::OrchestrationParams;
use council_domain::QuorumRule;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw orchestration configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOrchestrationConfig {
    pub global_timeout_ms: u64,
    pub phase_timeout_ms: Option<u64>,
    /// Quorum rule: "majority", "unanimous", "atleast:N", "N%"
    pub quorum: String,
    pub flagged_ratio_threshold: f64,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub max_in_flight: usize,
    pub rank_survivors: usize,
}

impl Default for FileOrchestrationConfig {
    fn default() -> Self {
        Self {
            global_timeout_ms: 13_000,
            phase_timeout_ms: None,
            quorum: "atleast:3".to_string(),
            flagged_ratio_threshold: 0.04,
            max_retries: 2,
            backoff_base_ms: 200,
            max_in_flight: 16,
            rank_survivors: 3,
        }
    }
}

impl FileOrchestrationConfig {
    /// Parse the quorum string into a QuorumRule
    pub fn parse_quorum(&self) -> Result<QuorumRule, ConfigValidationError> {
        let rule: QuorumRule = self
            .quorum
            .parse()
            .map_err(|reason| ConfigValidationError::InvalidQuorum {
                value: self.quorum.clone(),
                reason,
            })?;
        match rule {
            QuorumRule::AtLeast(0) | QuorumRule::Percentage(0) => {
                Err(ConfigValidationError::InvalidQuorum {
                    value: self.quorum.clone(),
                    reason: "a quorum of zero accepts any session".to_string(),
                })
            }
            rule => Ok(rule),
        }
    }

    pub(super) fn validate(&self, errors: &mut Vec<ConfigValidationError>) {
        if self.global_timeout_ms == 0 {
            errors.push(ConfigValidationError::ZeroValue("orchestration.global_timeout_ms"));
        }
        if self.phase_timeout_ms == Some(0) {
            errors.push(ConfigValidationError::ZeroValue("orchestration.phase_timeout_ms"));
        }
        if self.max_in_flight == 0 {
            errors.push(ConfigValidationError::ZeroValue("orchestration.max_in_flight"));
        }
        if let Err(e) = self.parse_quorum() {
            errors.push(e);
        }
        if !(0.0..=1.0).contains(&self.flagged_ratio_threshold) {
            errors.push(ConfigValidationError::ThresholdOutOfRange(
                self.flagged_ratio_threshold,
            ));
        }
    }

    /// Convert to application parameters (call [`validate`](super::FileConfig::validate) first;
    /// an unparseable quorum falls back to the default rule)
    pub fn to_params(&self) -> OrchestrationParams {
        OrchestrationParams::default()
            .with_global_timeout(Duration::from_millis(self.global_timeout_ms))
            .with_phase_timeout(self.phase_timeout_ms.map(Duration::from_millis))
            .with_quorum(self.parse_quorum().unwrap_or_default())
            .with_flagged_ratio_threshold(self.flagged_ratio_threshold)
            .with_max_retries(self.max_retries)
            .with_backoff_base(Duration::from_millis(self.backoff_base_ms))
            .with_max_in_flight(self.max_in_flight)
            .with_rank_survivors(self.rank_survivors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_application_params() {
        assert_eq!(
            FileOrchestrationConfig::default().to_params(),
            OrchestrationParams::default()
        );
    }

    #[test]
    fn test_deserialize_orchestration_section() {
        let toml_str = r#"
[orchestration]
global_timeout_ms = 20000
phase_timeout_ms = 5000
quorum = "majority"
max_in_flight = 4
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let params = config.orchestration.to_params();
        assert_eq!(params.global_timeout, Duration::from_secs(20));
        assert_eq!(params.phase_timeout, Some(Duration::from_secs(5)));
        assert_eq!(params.quorum, QuorumRule::Majority);
        assert_eq!(params.max_in_flight, 4);
        assert_eq!(params.max_retries, 2);
    }

    #[test]
    fn test_parse_quorum_rules() {
        let mut config = FileOrchestrationConfig::default();
        assert_eq!(config.parse_quorum().unwrap(), QuorumRule::AtLeast(3));

        config.quorum = "75%".to_string();
        assert_eq!(config.parse_quorum().unwrap(), QuorumRule::Percentage(75));

        config.quorum = "atleast:0".to_string();
        assert!(config.parse_quorum().is_err());

        config.quorum = "most".to_string();
        assert!(config.parse_quorum().is_err());
    }

    #[test]
    fn test_rank_survivors_is_clamped() {
        let config = FileOrchestrationConfig {
            rank_survivors: 9,
            ..Default::default()
        };
        assert_eq!(config.to_params().protocol_params().rank_survivors, 5);
    }
}
