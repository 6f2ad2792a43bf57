//! Content-addressed result cache with single-flight builds.
//!
//! Three logical tables plus the whole-document result table, all sharing
//! the same single-flight discipline:
//!
//! | table | key | value |
//! |---|---|---|
//! | `document_cache` | `(fingerprint, parser_version)` | serialized parsed document |
//! | `extraction_cache` | `(fingerprint, field_key, schema_version)` | `CacheEntry` |
//! | `embedding_cache` | `(chunk_hash, embedding_model)` | embedding bytes |
//! | whole-document | `(fingerprint, schema_version)` | `PipelineResult` |
//!
//! Cache is in-process durable state: it survives across documents within
//! one process but is never persisted to disk by this crate.

pub mod error;
pub mod key;
pub mod store;

pub use error::CacheError;
pub use key::{DocumentCacheKey, EmbeddingCacheKey, ExtractionCacheKey, WholeDocumentKey};
pub use store::SingleFlightStore;

use litextract_types::{CacheEntry, ParsedDocument, PipelineResult};
use std::convert::Infallible;
use tracing::{debug, trace};

/// The Cache collaborator owned by the Pipeline Orchestrator.
///
/// Access is value-semantics (get/put); there is no ambient global. Each
/// table is independently single-flight: a build in progress for one key
/// never blocks a lookup of a different key in the same or another table.
#[derive(Default)]
pub struct ResultCache {
    documents: SingleFlightStore<DocumentCacheKey, ParsedDocument>,
    extractions: SingleFlightStore<ExtractionCacheKey, CacheEntry>,
    embeddings: SingleFlightStore<EmbeddingCacheKey, Vec<u8>>,
    whole_document: SingleFlightStore<WholeDocumentKey, PipelineResult>,
}

impl ResultCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a whole-document `PipelineResult`. This is the cache-check
    /// step of the Executor state machine; a hit short-circuits straight to
    /// `return` without entering `context-prepared`.
    pub async fn lookup_pipeline_result(&self, key: &WholeDocumentKey) -> Option<PipelineResult> {
        let hit = self.whole_document.get(key).await;
        if hit.is_some() {
            debug!(key = %key, "cache hit");
        } else {
            trace!(key = %key, "cache miss");
        }
        hit.map(|r| r.as_cached())
    }

    /// Builds (single-flight) and stores a `PipelineResult` for `key`, or
    /// returns the existing one if a build already completed or is in
    /// flight for this key. A caller that rode along on someone else's
    /// build gets the result marked `cached`, the same as a
    /// `lookup_pipeline_result` hit.
    ///
    /// # Errors
    /// Propagates whatever error `build` returns; the key is left empty so
    /// a later call retries.
    pub async fn get_or_build_pipeline_result<F, Fut, E>(
        &self,
        key: WholeDocumentKey,
        build: F,
    ) -> Result<PipelineResult, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<PipelineResult, E>>,
    {
        let (result, is_waiter) = self.whole_document.get_or_build(key, build).await?;
        Ok(if is_waiter { result.as_cached() } else { result })
    }

    /// Evicts a whole-document entry, e.g. after `CacheCorruption` on read.
    pub async fn evict_pipeline_result(&self, key: &WholeDocumentKey) {
        self.whole_document.evict(key).await;
    }

    /// Looks up a single field's cached extraction, honoring the
    /// content-integrity rule: an entry whose producer version no longer
    /// matches `current_producer_version` is treated as absent.
    pub async fn lookup_field(
        &self,
        key: &ExtractionCacheKey,
        current_producer_version: &str,
    ) -> Option<CacheEntry> {
        let entry = self.extractions.get(key).await?;
        if entry.is_fresh(current_producer_version) {
            Some(entry)
        } else {
            self.extractions.evict(key).await;
            None
        }
    }

    /// Stores a single field's extraction result unconditionally (fields
    /// are write-once per key; a stale producer version is handled by
    /// `lookup_field` evicting rather than this method overwriting).
    pub async fn put_field(&self, key: ExtractionCacheKey, entry: CacheEntry) {
        let _ = self
            .extractions
            .get_or_build(key, || async move { Ok::<CacheEntry, Infallible>(entry) })
            .await;
    }

    /// Looks up a cached parsed document.
    pub async fn lookup_document(&self, key: &DocumentCacheKey) -> Option<ParsedDocument> {
        self.documents.get(key).await
    }

    /// Single-flight build of a parsed document cache entry. `ParsedDocument`
    /// has no `cached` flag, so the builder/waiter distinction from the
    /// underlying store is discarded here.
    ///
    /// # Errors
    /// Propagates whatever error `build` returns.
    pub async fn get_or_build_document<F, Fut, E>(
        &self,
        key: DocumentCacheKey,
        build: F,
    ) -> Result<ParsedDocument, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<ParsedDocument, E>>,
    {
        self.documents.get_or_build(key, build).await.map(|(doc, _)| doc)
    }

    /// Looks up a cached embedding.
    pub async fn lookup_embedding(&self, key: &EmbeddingCacheKey) -> Option<Vec<u8>> {
        self.embeddings.get(key).await
    }

    /// Single-flight build of an embedding cache entry.
    ///
    /// # Errors
    /// Propagates whatever error `build` returns.
    pub async fn get_or_build_embedding<F, Fut, E>(
        &self,
        key: EmbeddingCacheKey,
        build: F,
    ) -> Result<Vec<u8>, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Vec<u8>, E>>,
    {
        self.embeddings.get_or_build(key, build).await.map(|(bytes, _)| bytes)
    }
}
