//! Quorum rules
//!
//! A quorum rule states how many agents must complete successfully for a
//! session to count as `completed` rather than `partial`.

use serde::{Deserialize, Serialize};

/// Rule for determining whether enough agents succeeded
///
/// Absolute requirements are capped at the number of participants, so a
/// two-agent session with the default `AtLeast(3)` needs both agents.
///
/// # Example
///
/// ```
/// use council_domain::quorum::QuorumRule;
///
/// let rule = QuorumRule::default();
/// assert!(rule.is_satisfied(3, 5));
/// assert!(!rule.is_satisfied(2, 5));
/// assert!(rule.is_satisfied(2, 2)); // capped at the roster size
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuorumRule {
    /// More than half must succeed
    Majority,

    /// Every participant must succeed
    Unanimous,

    /// At least n must succeed (capped at the participant count)
    AtLeast(usize),

    /// At least this percentage must succeed (0-100)
    Percentage(u8),
}

impl Default for QuorumRule {
    fn default() -> Self {
        QuorumRule::AtLeast(3)
    }
}

impl QuorumRule {
    /// Successes required out of `total` participants
    pub fn required(&self, total: usize) -> usize {
        match self {
            QuorumRule::Majority => total / 2 + 1,
            QuorumRule::Unanimous => total,
            QuorumRule::AtLeast(n) => (*n).min(total),
            QuorumRule::Percentage(p) => (total as f64 * (*p as f64 / 100.0)).ceil() as usize,
        }
    }

    /// Check if `successes` out of `total` participants meets the rule
    pub fn is_satisfied(&self, successes: usize, total: usize) -> bool {
        if total == 0 {
            return false;
        }
        successes >= self.required(total)
    }

    /// Get a human-readable description of this rule
    pub fn description(&self) -> String {
        match self {
            QuorumRule::Majority => "majority (more than half)".to_string(),
            QuorumRule::Unanimous => "unanimous (every agent)".to_string(),
            QuorumRule::AtLeast(n) => format!("at least {} agents", n),
            QuorumRule::Percentage(p) => format!("at least {}% of agents", p),
        }
    }
}

impl std::fmt::Display for QuorumRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::str::FromStr for QuorumRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "majority" => Ok(QuorumRule::Majority),
            "unanimous" => Ok(QuorumRule::Unanimous),
            s if s.starts_with("atleast:") || s.starts_with("at_least:") => {
                let n: usize = s
                    .split(':')
                    .nth(1)
                    .ok_or("Missing number after atleast:")?
                    .parse()
                    .map_err(|_| "Invalid number for atleast")?;
                Ok(QuorumRule::AtLeast(n))
            }
            s if s.starts_with("percentage:") || s.ends_with('%') => {
                let num_str = s.trim_start_matches("percentage:").trim_end_matches('%');
                let p: u8 = num_str.parse().map_err(|_| "Invalid percentage")?;
                Ok(QuorumRule::Percentage(p.min(100)))
            }
            s => s.parse::<usize>().map(QuorumRule::AtLeast).map_err(|_| {
                format!(
                    "Unknown quorum rule: {}. Valid: N, majority, unanimous, atleast:N, percentage:N or N%",
                    s
                )
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_three_agents() {
        assert_eq!(QuorumRule::default(), QuorumRule::AtLeast(3));
        assert!(!QuorumRule::default().is_satisfied(2, 4));
        assert!(QuorumRule::default().is_satisfied(3, 4));
    }

    #[test]
    fn test_at_least_capped_at_roster() {
        let rule = QuorumRule::AtLeast(3);
        assert_eq!(rule.required(2), 2);
        assert!(rule.is_satisfied(2, 2));
        assert!(!rule.is_satisfied(1, 2));
    }

    #[test]
    fn test_majority_rule() {
        let rule = QuorumRule::Majority;
        assert!(!rule.is_satisfied(1, 3));
        assert!(rule.is_satisfied(2, 3));
        assert!(!rule.is_satisfied(2, 4));
        assert!(rule.is_satisfied(3, 4));
    }

    #[test]
    fn test_percentage_rule() {
        let rule = QuorumRule::Percentage(75);
        assert!(!rule.is_satisfied(3, 5));
        assert!(rule.is_satisfied(4, 5));
    }

    #[test]
    fn test_zero_total() {
        assert!(!QuorumRule::Majority.is_satisfied(0, 0));
        assert!(!QuorumRule::AtLeast(0).is_satisfied(0, 0));
    }

    #[test]
    fn test_parse_rule() {
        assert_eq!("4".parse::<QuorumRule>().ok(), Some(QuorumRule::AtLeast(4)));
        assert_eq!(
            "majority".parse::<QuorumRule>().ok(),
            Some(QuorumRule::Majority)
        );
        assert_eq!(
            "at_least:2".parse::<QuorumRule>().ok(),
            Some(QuorumRule::AtLeast(2))
        );
        assert_eq!(
            "80%".parse::<QuorumRule>().ok(),
            Some(QuorumRule::Percentage(80))
        );
        assert!("most".parse::<QuorumRule>().is_err());
    }
}
