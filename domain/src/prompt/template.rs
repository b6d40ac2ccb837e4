//! Prompt templates for the collaboration protocols

use crate::orchestration::phase::CritiqueStyle;

/// Templates for generating prompts at each phase
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for independent drafting and co-drafting
    pub fn draft_system() -> &'static str {
        r#"You are a knowledgeable expert participating in a collaborative council.
Your task is to provide a thoughtful, well-reasoned answer to the question.
Be concise but comprehensive. Support your points with reasoning and examples where appropriate.
Focus on accuracy and clarity."#
    }

    /// User prompt for a first draft
    pub fn draft_prompt(question: &str) -> String {
        format!(
            r#"Please answer the following question:

{}

Provide a clear, well-structured response."#,
            question
        )
    }

    /// User prompt for one of the two co-drafters in validated consensus
    pub fn co_draft_prompt(question: &str) -> String {
        format!(
            r#"Please answer the following question:

{}

Your answer will be fact-checked claim by claim by other experts.
State each factual claim plainly and avoid speculation you cannot support."#,
            question
        )
    }

    /// System prompt for the round table critique phase
    pub fn critique_system() -> &'static str {
        r#"You are a critical reviewer evaluating drafts from other experts.
Be fair but thorough. Identify concrete problems: factual errors, gaps, unclear reasoning.
Do not rewrite the drafts; point out what is wrong with them."#
    }

    /// User prompt for reviewing the other agents' drafts
    pub fn critique_prompt(question: &str, drafts: &str) -> String {
        format!(
            r#"Original question: {}

Drafts to review:

{}
For each problem you find, write one line in the form:

FLAG <label>: <issue>

For example `FLAG B: the date given for the treaty is wrong`.
You may add a short overall assessment after the flags."#,
            question, drafts
        )
    }

    /// System prompt for ballots
    pub fn vote_system() -> &'static str {
        r#"You are a judge choosing the strongest candidate among several anonymous submissions.
Judge on accuracy, completeness and usefulness. You must pick exactly one candidate."#
    }

    /// User prompt for a vote over labelled candidates
    pub fn vote_prompt(question: &str, noun: &str, candidates: &str, context: Option<&str>) -> String {
        let mut prompt = format!(
            r#"Original question: {}

Candidates:

{}"#,
            question, candidates
        );

        if let Some(context) = context
            && !context.is_empty()
        {
            prompt.push_str(&format!("\nReviewer notes:\n{}\n", context));
        }

        prompt.push_str(&format!(
            r#"
Explain your choice briefly, then end with exactly one line:

VOTE: <label of the best {}>"#,
            noun.to_lowercase()
        ));

        prompt
    }

    /// System prompt for synthesis and elaboration phases
    pub fn synthesis_system() -> &'static str {
        r#"You are a moderator producing the final answer of a council of experts.
Keep the strongest elements, resolve disagreements in favor of the better supported position,
and write one coherent answer. Do not mention the council, the drafts or the votes."#
    }

    /// Round table: the lead agent merges the top-voted draft with the rest
    pub fn round_table_synthesis_prompt(
        question: &str,
        winner: &str,
        others: &str,
        critiques: &[String],
    ) -> String {
        let mut prompt = format!(
            r#"Original question: {}

The council voted for this draft:

{}
"#,
            question, winner
        );

        if !others.is_empty() {
            prompt.push_str(&format!("\nOther drafts:\n\n{}", others));
        }

        if !critiques.is_empty() {
            prompt.push_str("\nIssues raised by reviewers:\n");
            for issue in critiques {
                prompt.push_str(&format!("- {}\n", issue));
            }
        }

        prompt.push_str(
            r#"
Write the final answer. Start from the voted draft, fix the issues that apply to it,
and fold in anything valuable the other drafts add."#,
        );

        prompt
    }

    /// System prompt for an amend step in a critique chain
    pub fn chain_system(style: CritiqueStyle) -> String {
        format!(
            r#"You are one expert in a chain of reviewers. Each reviewer receives the previous
version of an answer and produces an improved version.
Your stance: {}
Reply with the complete amended answer only."#,
            style.instruction()
        )
    }

    /// User prompt for amending the previous link
    pub fn chain_amend_prompt(question: &str, previous: &str, style: CritiqueStyle) -> String {
        format!(
            r#"Original question: {}

Previous version:

{}

Critique style: {}
Produce the amended version."#,
            question,
            previous,
            style.as_str()
        )
    }

    /// User prompt for summarizing how a chain evolved
    pub fn chain_synthesis_prompt(question: &str, evolution: &str, latest: &str) -> String {
        format!(
            r#"Original question: {}

How the answer evolved through the chain:
{}

Latest version:

{}

Write the final answer. Keep the improvements the chain made and drop changes
that made the answer worse."#,
            question, evolution, latest
        )
    }

    /// System prompt for claim verification
    pub fn verify_system() -> &'static str {
        r#"You are a fact checker. Break the text you receive into individual factual claims
and judge each one on its own. Mark a claim FLAGGED only when you believe it is wrong
or misleading; mark it UNCERTAIN when it cannot be checked."#
    }

    /// User prompt for verifying claims in one or more labelled candidates
    pub fn verify_prompt(question: &str, candidates: &str) -> String {
        format!(
            r#"Original question: {}

Text to check:

{}
Write one line per claim in the form:

VERIFIED [<label>]: <claim>
FLAGGED [<label>]: <claim> (<why it is wrong>)
UNCERTAIN [<label>]: <claim>

Use the label of the text the claim comes from."#,
            question, candidates
        )
    }

    /// User prompt for rewriting a draft around flagged claims
    pub fn rewrite_prompt(question: &str, draft: &str, flagged: &[&str]) -> String {
        let mut prompt = format!(
            r#"Original question: {}

Current draft:

{}

Fact checkers flagged these claims:
"#,
            question, draft
        );

        for claim in flagged {
            prompt.push_str(&format!("- {}\n", claim));
        }

        prompt.push_str(
            r#"
Rewrite the draft. Correct or remove every flagged claim and keep everything else."#,
        );

        prompt
    }

    /// User prompt for the validated consensus finalize phase
    pub fn finalize_prompt(question: &str, draft: &str, flagged: &[&str], uncertain: &[&str]) -> String {
        let mut prompt = format!(
            r#"Original question: {}

Checked draft:

{}
"#,
            question, draft
        );

        if !flagged.is_empty() {
            prompt.push_str("\nClaims still flagged by fact checkers:\n");
            for claim in flagged {
                prompt.push_str(&format!("- {}\n", claim));
            }
        }
        if !uncertain.is_empty() {
            prompt.push_str("\nClaims fact checkers could not confirm:\n");
            for claim in uncertain {
                prompt.push_str(&format!("- {}\n", claim));
            }
        }

        prompt.push_str(
            r#"
Write the final answer. After each factual statement add an inline tag
[confidence: high], [confidence: medium] or [confidence: low] reflecting how well
the fact checkers supported it."#,
        );

        prompt
    }

    /// System prompt for solo ideation
    pub fn ideate_system() -> &'static str {
        r#"You are a creative thinker in a brainstorming swarm.
Propose one bold, original idea. Do not hedge and do not list alternatives."#
    }

    /// User prompt for solo ideation
    pub fn ideate_prompt(question: &str) -> String {
        format!(
            r#"Challenge:

{}

Describe your single best idea in a few paragraphs."#,
            question
        )
    }

    /// User prompt for fusing at least two ideas
    pub fn fuse_prompt(question: &str, ideas: &str) -> String {
        format!(
            r#"Challenge: {}

Ideas from the swarm:

{}
Combine at least two of these ideas into a new idea that is stronger than its parts.
Describe the fused idea, then end with one line naming the ideas you used:

SOURCES: <label>, <label>"#,
            question, ideas
        )
    }

    /// User prompt for expanding the winning fusion into a full answer
    pub fn expand_prompt(question: &str, fusion: &str) -> String {
        format!(
            r#"Challenge: {}

The swarm chose this idea:

{}

Expand it into a complete, concrete answer: how it works, first steps, and risks."#,
            question, fusion
        )
    }

    /// System prompt for the quick scoring pass
    pub fn rank_system() -> &'static str {
        r#"You are a judge scoring ideas for originality and usefulness on a scale of 1 to 10.
Be decisive and use the whole scale."#
    }

    /// User prompt for scoring labelled ideas
    pub fn rank_prompt(question: &str, ideas: &str) -> String {
        format!(
            r#"Challenge: {}

Ideas:

{}
Give every idea a score, one line each:

SCORE <label>: <1-10>"#,
            question, ideas
        )
    }

    /// User prompt for elaborating the best guarded idea
    pub fn elaborate_prompt(question: &str, idea: &str, flagged: &[&str]) -> String {
        let mut prompt = format!(
            r#"Challenge: {}

Selected idea:

{}
"#,
            question, idea
        );

        if !flagged.is_empty() {
            prompt.push_str("\nFact checkers flagged these claims in it:\n");
            for claim in flagged {
                prompt.push_str(&format!("- {}\n", claim));
            }
        }

        prompt.push_str(
            r#"
Elaborate the idea into a complete answer. Keep its originality but drop or correct
anything that was flagged."#,
        );

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_prompt_asks_for_ballot_line() {
        let prompt = PromptTemplate::vote_prompt("Q?", "Fusion", "--- Fusion A ---\nx\n", None);
        assert!(prompt.contains("Q?"));
        assert!(prompt.contains("VOTE: <label of the best fusion>"));
        assert!(!prompt.contains("Reviewer notes"));
    }

    #[test]
    fn test_chain_prompt_carries_previous_verbatim() {
        let previous = "line one\nline two";
        let prompt =
            PromptTemplate::chain_amend_prompt("Q?", previous, CritiqueStyle::Disagree);
        assert!(prompt.contains(previous));
        assert!(prompt.contains("Critique style: disagree"));
    }

    #[test]
    fn test_finalize_prompt_lists_claims() {
        let prompt = PromptTemplate::finalize_prompt("Q?", "draft", &["bad"], &[]);
        assert!(prompt.contains("- bad"));
        assert!(prompt.contains("[confidence: high]"));
        assert!(!prompt.contains("could not confirm"));
    }
}
