//! Critique chain links

use crate::core::string::{first_line, truncate};
use crate::session::task::AggregateResult;

const EXCERPT_LEN: usize = 120;

/// One version of the answer in a critique chain
#[derive(Debug, Clone, PartialEq)]
pub struct ChainLink {
    /// Roster index of the agent that wrote this version
    pub agent: usize,
    pub text: String,
}

/// The chain so far and a human-readable account of how it evolved
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainSummary {
    pub links: Vec<ChainLink>,
    pub evolution: String,
}

impl ChainSummary {
    /// The version the next agent amends
    pub fn latest(&self) -> Option<&ChainLink> {
        self.links.last()
    }
}

/// Append the amend step's output to the chain.
///
/// A failed step adds no link, so the next agent amends the last version
/// that actually exists.
pub fn summarize_chain(result: &AggregateResult, prior: &[ChainLink]) -> ChainSummary {
    let mut links = prior.to_vec();
    for (agent, text) in result.texts() {
        links.push(ChainLink {
            agent,
            text: text.trim().to_string(),
        });
    }

    let evolution = links
        .iter()
        .enumerate()
        .map(|(step, link)| {
            format!(
                "{}. agent #{}: {}",
                step + 1,
                link.agent + 1,
                truncate(first_line(&link.text), EXCERPT_LEN)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    ChainSummary { links, evolution }
}
