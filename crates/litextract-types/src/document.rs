//! Parsed documents and their chunks.
//!
//! `ParsedDocument` is produced by the (external) PDF parser and is
//! immutable once built; the core only ever reads it.

use serde::{Deserialize, Serialize};

/// Closed set of section tags a chunk may carry.
///
/// `Other` accepts parser-specific section names the core doesn't
/// otherwise need to special-case (e.g. "case presentation").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionTag {
    Abstract,
    Introduction,
    Methods,
    Results,
    Discussion,
    Conclusion,
    References,
    Acknowledgments,
    Funding,
    ConflictOfInterest,
    AuthorContributions,
    Supplementary,
    Other(String),
}

impl SectionTag {
    /// Case-insensitive, whole-word match against a stop-list entry.
    #[must_use]
    pub fn matches_name(&self, name: &str) -> bool {
        let label = match self {
            SectionTag::Abstract => "abstract",
            SectionTag::Introduction => "introduction",
            SectionTag::Methods => "methods",
            SectionTag::Results => "results",
            SectionTag::Discussion => "discussion",
            SectionTag::Conclusion => "conclusion",
            SectionTag::References => "references",
            SectionTag::Acknowledgments => "acknowledgments",
            SectionTag::Funding => "funding",
            SectionTag::ConflictOfInterest => "conflict of interest",
            SectionTag::AuthorContributions => "author contributions",
            SectionTag::Supplementary => "supplementary",
            SectionTag::Other(other) => other.as_str(),
        };
        label.eq_ignore_ascii_case(name)
    }
}

/// A contiguous text span of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub section: Option<SectionTag>,
    pub char_start: usize,
    pub char_end: usize,
}

impl Chunk {
    #[must_use]
    pub fn new(text: impl Into<String>, section: Option<SectionTag>, char_start: usize) -> Self {
        let text = text.into();
        let char_end = char_start + text.chars().count();
        Self {
            text,
            section,
            char_start,
            char_end,
        }
    }
}

/// A fully parsed document: identifier, full text, ordered chunks.
///
/// Immutable after construction. Chunk order is the parser's contract and
/// MUST be stable across runs for the same input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub filename: String,
    pub full_text: String,
    pub chunks: Vec<Chunk>,
}

impl ParsedDocument {
    #[must_use]
    pub fn new(filename: impl Into<String>, full_text: impl Into<String>, chunks: Vec<Chunk>) -> Self {
        Self {
            filename: filename.into(),
            full_text: full_text.into(),
            chunks,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.full_text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_tag_matches_case_insensitively() {
        assert!(SectionTag::References.matches_name("REFERENCES"));
        assert!(!SectionTag::References.matches_name("results"));
    }

    #[test]
    fn other_section_matches_by_inner_string() {
        let tag = SectionTag::Other("case presentation".to_string());
        assert!(tag.matches_name("Case Presentation"));
    }

    #[test]
    fn empty_document_detected() {
        let doc = ParsedDocument::new("a.pdf", "   \n  ", vec![]);
        assert!(doc.is_empty());
    }
}
