//! Cache key types for the three logical tables:
//! `document_cache`, `extraction_cache`, `embedding_cache`, plus the
//! whole-document `PipelineResult` table consulted at cache lookup.

use litextract_types::Fingerprint;
use std::fmt;

/// Key for a cached `PipelineResult`, consulted first on every extraction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WholeDocumentKey {
    pub fingerprint: Fingerprint,
    pub schema_version: String,
}

impl fmt::Display for WholeDocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "whole-document:{}:{}", self.fingerprint, self.schema_version)
    }
}

/// Key for a cached parsed-document representation: `(fingerprint, parser_version)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentCacheKey {
    pub fingerprint: Fingerprint,
    pub parser_version: String,
}

impl fmt::Display for DocumentCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "document:{}:{}", self.fingerprint, self.parser_version)
    }
}

/// Key for a single cached field extraction: `(fingerprint, field_key, schema_version)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtractionCacheKey {
    pub fingerprint: Fingerprint,
    pub field_key: String,
    pub schema_version: String,
}

impl fmt::Display for ExtractionCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "extraction:{}:{}:{}",
            self.fingerprint, self.field_key, self.schema_version
        )
    }
}

/// Key for a cached embedding: `(chunk_hash, embedding_model)`. The cache
/// only stores opaque bytes here; producing and interpreting them is the
/// job of the external embedding store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmbeddingCacheKey {
    pub chunk_hash: String,
    pub embedding_model: String,
}

impl fmt::Display for EmbeddingCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "embedding:{}:{}", self.chunk_hash, self.embedding_model)
    }
}
