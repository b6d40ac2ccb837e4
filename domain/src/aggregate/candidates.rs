//! Anonymized candidate sets shared across phases

use crate::quorum::parsing::candidate_label;

/// A draft, idea or fusion put before the other agents
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Roster index of the authoring agent
    pub author: usize,
    pub text: String,
    /// Candidates this one was fused from (fusions only)
    pub sources: Vec<usize>,
}

impl Candidate {
    pub fn new(author: usize, text: impl Into<String>) -> Self {
        Self {
            author,
            text: text.into(),
            sources: Vec::new(),
        }
    }
}

/// Ordered candidates; a candidate's label is derived from its position
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateSet {
    candidates: Vec<Candidate>,
}

impl CandidateSet {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Candidate> {
        self.candidates.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    pub fn label(&self, index: usize) -> String {
        candidate_label(index)
    }

    /// Index of the candidate written by `author`
    pub fn index_of_author(&self, author: usize) -> Option<usize> {
        self.candidates.iter().position(|c| c.author == author)
    }

    /// Candidate indices an agent may vote for or score (never its own)
    pub fn options_for(&self, agent: usize) -> Vec<usize> {
        (0..self.candidates.len())
            .filter(|&i| self.candidates[i].author != agent)
            .collect()
    }

    /// Render selected candidates as labelled blocks for a prompt
    pub fn render(&self, noun: &str, indices: &[usize]) -> String {
        indices
            .iter()
            .filter_map(|&i| self.candidates.get(i).map(|c| (i, c)))
            .map(|(i, c)| format!("--- {} {} ---\n{}\n", noun, candidate_label(i), c.text.trim()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn render_all(&self, noun: &str) -> String {
        let all: Vec<usize> = (0..self.candidates.len()).collect();
        self.render(noun, &all)
    }

    /// Render everything except the candidate written by `agent`
    pub fn render_for(&self, noun: &str, agent: usize) -> String {
        self.render(noun, &self.options_for(agent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> CandidateSet {
        CandidateSet::new(vec![
            Candidate::new(0, "first"),
            Candidate::new(2, "second"),
            Candidate::new(3, "third"),
        ])
    }

    #[test]
    fn test_options_exclude_own_candidate() {
        let set = set();
        assert_eq!(set.options_for(2), vec![0, 2]);
        assert_eq!(set.options_for(1), vec![0, 1, 2]);
    }

    #[test]
    fn test_render_labels_by_position() {
        let set = set();
        let text = set.render_for("Draft", 0);
        assert!(!text.contains("first"));
        assert!(text.contains("--- Draft B ---\nsecond"));
        assert!(text.contains("--- Draft C ---\nthird"));
    }

    #[test]
    fn test_index_of_author() {
        assert_eq!(set().index_of_author(3), Some(2));
        assert_eq!(set().index_of_author(1), None);
    }
}
