//! Schema chunker: splits large schemas into sequential sub-schemas so a
//! grammar-state-limited LLM provider can still be driven.

use std::collections::HashMap;

use litextract_types::{ExtractionWithEvidence, Schema};

use crate::error::ChunkerError;

/// Typical upper bound on fields per structured-output call.
pub const DEFAULT_MAX_FIELDS_PER_CHUNK: usize = 25;

/// Splits `schema` into sequential sub-schemas of at most
/// `max_fields_per_chunk` fields each, preserving field order.
///
/// # Errors
/// Returns `ChunkerError::EmptySchema` if `schema` has no fields.
pub fn chunk_schema(schema: &Schema, max_fields_per_chunk: usize) -> Result<Vec<Schema>, ChunkerError> {
    if schema.fields.is_empty() {
        return Err(ChunkerError::EmptySchema);
    }
    if schema.field_count() <= max_fields_per_chunk {
        return Ok(vec![schema.clone()]);
    }
    let chunks = schema
        .fields
        .chunks(max_fields_per_chunk)
        .map(|fields| Schema {
            name: format!("{}#chunk", schema.name),
            version: schema.version,
            fields: fields.to_vec(),
        })
        .collect();
    Ok(chunks)
}

/// Merges per-sub-schema extraction results by union of keys. When the
/// same field appears in more than one sub-schema result (shouldn't happen
/// under a correct split, but tolerated), evidence confidences for that
/// field are averaged.
#[must_use]
pub fn merge_chunked(results: Vec<ExtractionWithEvidence>) -> ExtractionWithEvidence {
    let mut merged = ExtractionWithEvidence::new();
    let mut confidence_sums: HashMap<String, (f64, u32)> = HashMap::new();

    for result in results {
        for (key, value) in result.values {
            merged.values.insert(key, value);
        }
        for item in result.evidence {
            let entry = confidence_sums.entry(item.field.clone()).or_insert((0.0, 0));
            entry.0 += item.confidence;
            entry.1 += 1;
            merged.evidence.retain(|e| e.field != item.field);
            merged.evidence.push(item);
        }
    }

    for item in &mut merged.evidence {
        if let Some((sum, count)) = confidence_sums.get(&item.field) {
            if *count > 1 {
                item.confidence = sum / f64::from(*count);
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use litextract_types::{EvidenceItem, ExtractionPolicy, Field, FieldType};

    fn schema_with_fields(n: usize) -> Schema {
        let fields = (0..n)
            .map(|i| Field::new(format!("f{i}"), FieldType::Scalar, "", ExtractionPolicy::Metadata))
            .collect();
        Schema::new("s", 1, fields)
    }

    #[test]
    fn splits_large_schema_into_sequential_chunks() {
        let schema = schema_with_fields(60);
        let chunks = chunk_schema(&schema, 25).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].field_count(), 25);
        assert_eq!(chunks[2].field_count(), 10);
    }

    #[test]
    fn small_schema_is_not_split() {
        let schema = schema_with_fields(5);
        let chunks = chunk_schema(&schema, 25).unwrap();
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn duplicate_field_confidence_is_averaged() {
        let mut a = ExtractionWithEvidence::new();
        a.evidence.push(EvidenceItem::new("age", "40", 0, 0.8));
        let mut b = ExtractionWithEvidence::new();
        b.evidence.push(EvidenceItem::new("age", "40", 0, 0.6));

        let merged = merge_chunked(vec![a, b]);
        let confidence = merged.evidence_for("age").unwrap().confidence;
        assert!((confidence - 0.7).abs() < 1e-9);
    }
}
