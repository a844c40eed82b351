//! OMOP concepts and the join records linking them to fields and values.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Reference;

/// An OMOP vocabulary entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Concept {
    pub concept_id: i64,
    pub concept_name: String,
    #[serde(default)]
    pub domain_id: String,
    #[serde(default)]
    pub vocabulary_id: String,
    #[serde(default)]
    pub concept_class_id: String,
    #[serde(default)]
    pub standard_concept: Option<String>,
    #[serde(default)]
    pub concept_code: String,
    #[serde(default)]
    pub valid_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub valid_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub invalid_reason: Option<String>,
}

/// Provenance of a concept association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum CreationType {
    /// Added by hand in the mapping UI.
    #[serde(rename = "M")]
    Manual,
    /// Derived from the scan report's data dictionary vocabulary.
    #[serde(rename = "V")]
    Vocab,
    /// Reused from another scan report.
    #[serde(rename = "R")]
    Reuse,
}

impl CreationType {
    pub fn code(self) -> &'static str {
        match self {
            Self::Manual => "M",
            Self::Vocab => "V",
            Self::Reuse => "R",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Manual => "Manual",
            Self::Vocab => "Vocab",
            Self::Reuse => "Reuse",
        }
    }
}

/// Which kind of row a concept is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ContentTypeName {
    #[serde(rename = "scanreportfield")]
    Field,
    #[serde(rename = "scanreportvalue")]
    Value,
}

/// Join record between a field/value (`object_id`) and a concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScanReportConcept {
    pub id: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub nlp_entity: Option<String>,
    #[serde(default)]
    pub nlp_entity_type: Option<String>,
    #[serde(default)]
    pub nlp_confidence: Option<String>,
    #[serde(default)]
    pub nlp_vocabulary: Option<String>,
    #[serde(default)]
    pub nlp_concept_code: Option<String>,
    #[serde(default)]
    pub nlp_processed_string: Option<String>,
    pub object_id: i64,
    pub creation_type: CreationType,
    #[schema(value_type = Object)]
    pub concept: Reference<Concept>,
    /// Django content type id of the annotated model.
    pub content_type: i64,
}

impl ScanReportConcept {
    /// OMOP concept id, whichever form the backend serialized.
    pub fn concept_id(&self) -> i64 {
        match &self.concept {
            Reference::Id(id) => *id,
            Reference::Expanded(concept) => concept.concept_id,
        }
    }

    /// The embedded concept detail, if the backend expanded it.
    pub fn embedded_concept(&self) -> Option<&Concept> {
        match &self.concept {
            Reference::Id(_) => None,
            Reference::Expanded(concept) => Some(concept),
        }
    }
}

/// A concept attached to a row, with the join data needed to remove it again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnnotatedConcept {
    #[serde(flatten)]
    pub concept: Concept,
    /// Id of the `ScanReportConcept` join; deletion goes through it.
    pub scan_report_concept_id: i64,
    pub creation_type: CreationType,
}

/// Body of `POST v2/scanreports/concepts/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewScanReportConcept {
    pub concept: i64,
    pub object_id: i64,
    pub content_type: ContentTypeName,
    pub creation_type: CreationType,
    /// Table the field or value belongs to; the backend validates against it.
    pub table_id: i64,
}

impl NewScanReportConcept {
    /// A manual association, the only kind the UI creates.
    pub fn manual(concept: i64, object_id: i64, location: ContentTypeName, table_id: i64) -> Self {
        Self {
            concept,
            object_id,
            content_type: location,
            creation_type: CreationType::Manual,
            table_id,
        }
    }
}
