//! Target schema: the fields the pipeline extracts per document.

use crate::document::SectionTag;
use serde::{Deserialize, Serialize};

/// How aggressively the LLM may infer a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionPolicy {
    /// Always extract (e.g. DOI, year).
    Metadata,
    /// The LLM may infer from context.
    Inferable,
    /// Refuse unless stated verbatim in the source.
    MustBeExplicit,
    /// Computed from other fields post-hoc; never sent to the LLM.
    Derived,
    /// Flag for a human; never returned by automated extraction.
    HumanReview,
}

/// Population unit a finding's denominator refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationUnit {
    Patient,
    Lesion,
    Specimen,
    Biopsy,
    ImagingSeries,
}

/// Semantic type of a field's value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldType {
    Scalar,
    NumericWithUnit { unit: Option<String> },
    Finding { aggregation_unit: AggregationUnit },
    FreeText,
}

/// One field of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub key: String,
    pub field_type: FieldType,
    pub description: String,
    pub policy: ExtractionPolicy,
    pub source_section_hint: Option<SectionTag>,
    pub keywords: Vec<String>,
    pub requires_quote: bool,
}

impl Field {
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        field_type: FieldType,
        description: impl Into<String>,
        policy: ExtractionPolicy,
    ) -> Self {
        Self {
            key: key.into(),
            field_type,
            description: description.into(),
            policy,
            source_section_hint: None,
            keywords: Vec::new(),
            requires_quote: false,
        }
    }

    #[must_use]
    pub fn requiring_quote(mut self) -> Self {
        self.requires_quote = true;
        self
    }

    #[must_use]
    pub fn with_keywords(mut self, keywords: impl IntoIterator<Item = String>) -> Self {
        self.keywords = keywords.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_section_hint(mut self, section: SectionTag) -> Self {
        self.source_section_hint = Some(section);
        self
    }

    #[must_use]
    pub fn is_finding(&self) -> bool {
        matches!(self.field_type, FieldType::Finding { .. })
    }
}

/// A named collection of fields plus a monotonically increasing version.
///
/// `version` is part of every cache key (see `litextract_types::Fingerprint`
/// usage in the cache crate) so that changing a schema's shape invalidates
/// prior extractions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    pub version: u32,
    pub fields: Vec<Field>,
}

impl Schema {
    #[must_use]
    pub fn new(name: impl Into<String>, version: u32, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            version,
            fields,
        }
    }

    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn field_keys(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.key.as_str()).collect()
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Restrict this schema to the named fields, preserving relative order.
    #[must_use]
    pub fn restricted_to(&self, keys: &[String]) -> Schema {
        let fields = self
            .fields
            .iter()
            .filter(|f| keys.iter().any(|k| k == &f.key))
            .cloned()
            .collect();
        Schema {
            name: format!("{}#subset", self.name),
            version: self.version,
            fields,
        }
    }
}
