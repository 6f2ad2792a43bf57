//! Context preparation: deterministic filtering followed by relevance
//! classification, budgeted to `max_context_chars`.

use litextract_filter::{ContentFilter, RelevanceClassifier};
use litextract_types::{FilterStats, ParsedDocument, Schema};

/// Prepared context handed to the tier cascade: the concatenated text
/// budgeted to `max_context_chars`, the surviving chunk texts (used later
/// by the validator's evidence audit), and bookkeeping statistics.
pub struct PreparedContext {
    pub text: String,
    pub source_chunks: Vec<String>,
    pub stats: FilterStats,
}

/// Runs the content filter, then (if a classifier is supplied) per-chunk
/// relevance classification against `schema`'s field keys and `theme`,
/// then concatenates surviving chunks up to `max_context_chars`.
pub async fn prepare_context(
    document: &ParsedDocument,
    schema: &Schema,
    theme: &str,
    filter: &ContentFilter,
    classifier: Option<&RelevanceClassifier<'_>>,
    max_context_chars: usize,
) -> PreparedContext {
    let (chunks, mut stats) = filter.filter(document);
    let field_keys: Vec<String> = schema.field_keys().iter().map(|k| (*k).to_string()).collect();

    let mut kept = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let keep = match classifier {
            Some(classifier) => {
                stats.chunks_classified += 1;
                classifier.classify(&chunk, theme, &field_keys).await.kept
            }
            None => true,
        };
        if keep {
            kept.push(chunk);
        }
    }
    stats.chunks_kept = kept.len();

    let mut text = String::new();
    let mut source_chunks = Vec::with_capacity(kept.len());
    for chunk in kept {
        if text.chars().count() >= max_context_chars {
            break;
        }
        text.push_str(&chunk.text);
        text.push('\n');
        source_chunks.push(chunk.text);
    }
    let text: String = text.chars().take(max_context_chars).collect();
    stats.chars_out = text.chars().count();

    PreparedContext {
        text,
        source_chunks,
        stats,
    }
}
