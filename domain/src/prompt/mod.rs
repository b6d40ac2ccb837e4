//! Prompt templates for every phase kind.
//!
//! The templates fix the line formats (`VOTE: B`, `FLAG A: ...`,
//! `FLAGGED [A]: ...`, `SCORE A: 7`, `SOURCES: A, C`) that the parsers in
//! [`crate::quorum::parsing`] read back.

pub mod template;

pub use template::PromptTemplate;
