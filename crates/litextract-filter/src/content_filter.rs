//! Deterministic, regex-driven content filter.
//!
//! Drops chunks whose section tag matches the configured stop-list, then
//! strips boilerplate lines (copyright notices, page-number markers,
//! repeated running headers) from the survivors.

use litextract_types::{Chunk, FilterStats, ParsedDocument, SectionTag};
use regex::Regex;

use crate::error::FilterError;

const DEFAULT_STOP_SECTIONS: &[SectionTag] = &[
    SectionTag::References,
    SectionTag::Acknowledgments,
    SectionTag::Funding,
    SectionTag::ConflictOfInterest,
    SectionTag::AuthorContributions,
    SectionTag::Supplementary,
];

/// Pure content filter. Holds its compiled boilerplate patterns so they are
/// built once rather than per chunk.
pub struct ContentFilter {
    stop_sections: Vec<SectionTag>,
    boilerplate: Vec<Regex>,
}

impl ContentFilter {
    /// # Errors
    /// Returns `FilterError::InvalidPattern` if a boilerplate pattern fails
    /// to compile. Never fails with the default pattern set.
    pub fn new() -> Result<Self, FilterError> {
        Self::with_stop_sections(DEFAULT_STOP_SECTIONS.to_vec())
    }

    /// # Errors
    /// Returns `FilterError::InvalidPattern` if a boilerplate pattern fails
    /// to compile.
    pub fn with_stop_sections(stop_sections: Vec<SectionTag>) -> Result<Self, FilterError> {
        let patterns = [
            r"(?i)^\s*copyright\b",
            r"(?i)^©\s*\d{4}",
            r"^\s*\d+\s*$",
            r"(?i)^\s*page\s+\d+(\s+of\s+\d+)?\s*$",
        ];
        let boilerplate = patterns
            .iter()
            .map(|p| Regex::new(p).map_err(|e| FilterError::InvalidPattern(e.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            stop_sections,
            boilerplate,
        })
    }

    /// Drops stop-listed sections and boilerplate lines. Returns the
    /// surviving chunks (re-filtered to strip boilerplate lines from their
    /// text, offsets recomputed relative to the stripped text) and filter
    /// statistics.
    #[must_use]
    pub fn filter(&self, document: &ParsedDocument) -> (Vec<Chunk>, FilterStats) {
        let chars_in = document.full_text.chars().count();
        let mut sections_dropped = 0usize;
        let mut chars_out = 0usize;

        let kept: Vec<Chunk> = document
            .chunks
            .iter()
            .filter(|chunk| {
                let drop = chunk
                    .section
                    .as_ref()
                    .is_some_and(|tag| self.stop_sections.iter().any(|s| s == tag));
                if drop {
                    sections_dropped += 1;
                }
                !drop
            })
            .map(|chunk| self.strip_boilerplate(chunk))
            .inspect(|chunk| chars_out += chunk.text.chars().count())
            .collect();

        let stats = FilterStats {
            chars_in,
            chars_out,
            sections_dropped,
            chunks_classified: 0,
            chunks_kept: kept.len(),
        };
        (kept, stats)
    }

    fn strip_boilerplate(&self, chunk: &Chunk) -> Chunk {
        let cleaned: String = chunk
            .text
            .lines()
            .filter(|line| !self.boilerplate.iter().any(|re| re.is_match(line.trim())))
            .collect::<Vec<_>>()
            .join("\n");
        Chunk::new(cleaned, chunk.section.clone(), chunk.char_start)
    }
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self::new().expect("default boilerplate patterns always compile")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use litextract_types::Chunk;

    fn doc(chunks: Vec<Chunk>) -> ParsedDocument {
        let full_text = chunks.iter().map(|c| c.text.clone()).collect::<Vec<_>>().join("\n");
        ParsedDocument {
            filename: "test.pdf".to_string(),
            full_text,
            chunks,
        }
    }

    #[test]
    fn drops_reference_sections() {
        let filter = ContentFilter::new().unwrap();
        let document = doc(vec![
            Chunk::new("Methods body.".to_string(), Some(SectionTag::Methods), 0),
            Chunk::new("Smith et al. 2020.".to_string(), Some(SectionTag::References), 20),
        ]);
        let (kept, stats) = filter.filter(&document);
        assert_eq!(kept.len(), 1);
        assert_eq!(stats.sections_dropped, 1);
    }

    #[test]
    fn strips_page_number_lines() {
        let filter = ContentFilter::new().unwrap();
        let document = doc(vec![Chunk::new(
            "Results body.\n14\nMore results.".to_string(),
            Some(SectionTag::Results),
            0,
        )]);
        let (kept, _) = filter.filter(&document);
        assert!(!kept[0].text.contains('\n'));
        assert!(kept[0].text.contains("Results body."));
        assert!(kept[0].text.contains("More results."));
    }
}
