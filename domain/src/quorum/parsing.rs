//! Response parsing for ballots, scores, claims and critiques.
//!
//! These functions extract structured signals from free-form agent output.
//! They are pure domain logic: no I/O, only line-oriented pattern
//! matching against the formats the prompt templates ask for.
//!
//! # Functions
//!
//! | Function | Phase | Format |
//! |----------|-------|--------|
//! | [`parse_ballot`] | vote | `VOTE: B` |
//! | [`parse_candidate_scores`] | rank | `SCORE A: 7` |
//! | [`parse_claim_verdicts`] | verify | `FLAGGED [A]: claim` |
//! | [`parse_critique_flags`] | critique | `FLAG B: issue` |
//! | [`parse_sources`] | fuse | `SOURCES: A, C` |
//! | [`parse_score`] | any | `8`, `8/10` or `{"score": 8}` |

use serde::{Deserialize, Serialize};

const LABEL_PREFIXES: [&str; 6] = ["draft", "idea", "fusion", "candidate", "option", "response"];

/// Anonymous label for a candidate index: `A`, `B`, ... then `#27`, `#28`, ...
pub fn candidate_label(index: usize) -> String {
    if index < 26 {
        ((b'A' + index as u8) as char).to_string()
    } else {
        format!("#{}", index + 1)
    }
}

/// Inverse of [`candidate_label`]
fn label_index(label: &str) -> Option<usize> {
    let label = label.trim();
    if let Some(num) = label.strip_prefix('#') {
        return num.parse::<usize>().ok().filter(|n| *n > 0).map(|n| n - 1);
    }
    let mut chars = label.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            Some((c.to_ascii_uppercase() as u8 - b'A') as usize)
        }
        _ => None,
    }
}

/// Find the first candidate label in a short phrase like `Draft B.` or `(C)`
fn parse_label_token(text: &str) -> Option<usize> {
    text.split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .map(|t| t.trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '#'))
        .filter(|t| !t.is_empty())
        .find(|t| !LABEL_PREFIXES.contains(&t.to_lowercase().as_str()))
        .and_then(label_index)
}

fn strip_bullet(line: &str) -> &str {
    line.trim()
        .trim_start_matches(|c: char| c == '-' || c == '*' || c == '•' || c == '>')
        .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == ')')
        .trim()
        .trim_matches('*')
        .trim()
}

/// Split `KEYWORD [A]: rest`, `KEYWORD A: rest` or `KEYWORD: rest`
///
/// Returns the optional candidate index and the text after the colon.
fn split_tagged<'a>(line: &'a str, keyword: &str) -> Option<(Option<usize>, &'a str)> {
    let line = strip_bullet(line);
    let head = line.get(..keyword.len())?;
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let rest = &line[keyword.len()..];
    if !rest.starts_with(|c: char| c == ':' || c == '[' || c == '(' || c.is_whitespace()) {
        return None;
    }
    let (tag, body) = rest.split_once(':')?;
    let tag = tag.trim();
    let label = if tag.is_empty() {
        None
    } else {
        Some(parse_label_token(tag)?)
    };
    Some((label, body.trim()))
}

/// Parse a ballot, accepting only labels in `options`.
///
/// The first `VOTE:` line naming a valid option wins; invalid or missing
/// ballots return `None` (an abstention).
pub fn parse_ballot(response: &str, options: &[usize]) -> Option<usize> {
    response
        .lines()
        .filter_map(|line| split_tagged(line, "VOTE"))
        .filter_map(|(tag, body)| tag.or_else(|| parse_label_token(body)))
        .find(|choice| options.contains(choice))
}

/// Parse a score from a scoring response.
///
/// # Supported Formats
///
/// 1. **JSON**: `{"score": 8, "reasoning": "..."}`
/// 2. **Fraction**: `8/10` or `Score: 7/10`
/// 3. **Standalone number**: `9` (if in valid range 1-10)
///
/// Returns the score clamped to 1.0-10.0, or 5.0 (neutral) if nothing parses.
///
/// # Examples
///
/// ```
/// use council_domain::quorum::parse_score;
///
/// assert_eq!(parse_score(r#"{"score": 8, "reasoning": "Good"}"#), 8.0);
/// assert_eq!(parse_score("I rate this 7/10"), 7.0);
/// assert_eq!(parse_score("No numbers here"), 5.0);
/// ```
pub fn parse_score(response: &str) -> f64 {
    if let Some(start) = response.find('{')
        && let Some(end) = response[start..].rfind('}')
    {
        let json_str = &response[start..start + end + 1];
        if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(json_str)
            && let Some(score) = parsed.get("score").and_then(|v| v.as_f64())
        {
            return score.clamp(1.0, 10.0);
        }
    }

    for word in response.split_whitespace() {
        if let Some(num_str) = word.strip_suffix("/10")
            && let Ok(num) = num_str.parse::<f64>()
        {
            if num.is_finite() {
                return num.clamp(1.0, 10.0);
            }
            continue;
        }
        if let Ok(num) = word
            .trim_matches(|c: char| !c.is_ascii_digit() && c != '.')
            .trim_end_matches('.')
            .parse::<f64>()
            && (1.0..=10.0).contains(&num)
        {
            return num;
        }
    }

    5.0
}

/// Parse `SCORE A: 7` lines into `(candidate, score)` pairs
pub fn parse_candidate_scores(response: &str) -> Vec<(usize, f64)> {
    response
        .lines()
        .filter_map(|line| split_tagged(line, "SCORE"))
        .filter_map(|(tag, body)| tag.map(|candidate| (candidate, parse_score(body))))
        .collect()
}

/// Verdict on one factual claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Verified,
    Flagged,
    Uncertain,
}

impl Verdict {
    const KEYWORDS: [(&'static str, Verdict); 3] = [
        ("VERIFIED", Verdict::Verified),
        ("FLAGGED", Verdict::Flagged),
        ("UNCERTAIN", Verdict::Uncertain),
    ];
}

/// One claim as judged by a verifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimVerdict {
    /// Candidate the claim belongs to, when the verifier tagged it
    pub candidate: Option<usize>,
    pub verdict: Verdict,
    pub claim: String,
}

/// Parse `VERIFIED|FLAGGED|UNCERTAIN [label]: claim` lines
pub fn parse_claim_verdicts(response: &str) -> Vec<ClaimVerdict> {
    response
        .lines()
        .filter_map(|line| {
            Verdict::KEYWORDS.iter().find_map(|(keyword, verdict)| {
                split_tagged(line, keyword).map(|(candidate, claim)| ClaimVerdict {
                    candidate,
                    verdict: *verdict,
                    claim: claim.to_string(),
                })
            })
        })
        .filter(|v| !v.claim.is_empty())
        .collect()
}

/// Parse `FLAG B: issue` lines into `(candidate, issue)` pairs
pub fn parse_critique_flags(response: &str) -> Vec<(usize, String)> {
    response
        .lines()
        .filter_map(|line| split_tagged(line, "FLAG"))
        .filter_map(|(tag, issue)| tag.map(|candidate| (candidate, issue.to_string())))
        .collect()
}

/// Parse the `SOURCES: A, C` line of a fusion, deduplicated in order
pub fn parse_sources(response: &str) -> Vec<usize> {
    let Some((_, body)) = response
        .lines()
        .find_map(|line| split_tagged(line, "SOURCES"))
    else {
        return Vec::new();
    };

    let mut sources = Vec::new();
    for token in body.split(|c: char| c == ',' || c == '&' || c == '+' || c.is_whitespace()) {
        if token.eq_ignore_ascii_case("and") {
            continue;
        }
        if let Some(index) = parse_label_token(token)
            && !sources.contains(&index)
        {
            sources.push(index);
        }
    }
    sources
}
