//! Idea fusion

use crate::aggregate::candidates::{Candidate, CandidateSet};
use crate::quorum::parsing::parse_sources;
use crate::session::task::AggregateResult;

/// A fusion must draw on at least this many distinct ideas
pub const MIN_FUSION_SOURCES: usize = 2;

/// Turn fuse-phase outputs into a candidate set of fusions.
///
/// The `SOURCES:` line is lifted out of each fusion's text into
/// [`Candidate::sources`]; source labels that name no idea are dropped.
/// An output citing fewer than [`MIN_FUSION_SOURCES`] distinct ideas is not
/// a fusion and is left out. Fusions are ordered by author index.
pub fn fuse_ideas(result: &AggregateResult, ideas: &CandidateSet) -> CandidateSet {
    let fusions = result
        .texts()
        .into_iter()
        .filter_map(|(author, text)| {
            let sources: Vec<usize> = parse_sources(text)
                .into_iter()
                .filter(|&i| i < ideas.len())
                .collect();
            if sources.len() < MIN_FUSION_SOURCES {
                return None;
            }
            let body = text
                .lines()
                .filter(|line| !is_sources_line(line))
                .collect::<Vec<_>>()
                .join("\n");
            Some(Candidate {
                author,
                text: body.trim().to_string(),
                sources,
            })
        })
        .collect();
    CandidateSet::new(fusions)
}

fn is_sources_line(line: &str) -> bool {
    let line = line.trim_start_matches(|c: char| c.is_whitespace() || c == '*' || c == '-');
    line.get(..7)
        .is_some_and(|head| head.eq_ignore_ascii_case("sources"))
        && line[7..].trim_start().starts_with(':')
}
