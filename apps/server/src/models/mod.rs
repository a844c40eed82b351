//! Records mirrored from the Carrot-Mapper backend API.
//!
//! These are transient, request-scoped copies; the backend owns every entity.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod concept;
pub mod dataset;
pub mod file;
pub mod job;
pub mod mapping_rule;
pub mod omop;
pub mod scan_report;
pub mod user;

// Re-export commonly used types
pub use concept::{
    AnnotatedConcept, Concept, ContentTypeName, CreationType, NewScanReportConcept,
    ScanReportConcept,
};
pub use dataset::{DataPartner, DataSet, Project};
pub use file::{FileDownload, FileRequest, FileType, FileTypeValue};
pub use job::{GeneralStatus, JOB_STAGES, Job, JobStageInfo, STAGE_STATUSES, StageStatus};
pub use mapping_rule::{AnalyseRule, AnalyseRules, MappingRule, RulesFormat};
pub use omop::{OmopField, OmopTable};
pub use scan_report::{
    MAPPING_STATUS_OPTIONS, ScanReport, ScanReportField, ScanReportFieldUpdate, ScanReportTable,
    ScanReportTableUpdate, ScanReportValue, UPLOAD_STATUS_OPTIONS,
};
pub use user::{Permission, PermissionsResponse, User};

/// Uniform envelope of every backend list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> PaginatedResponse<T> {
    /// The default returned by list accessors when the backend call fails.
    pub fn empty() -> Self {
        Self {
            count: 0,
            next: None,
            previous: None,
            results: Vec::new(),
        }
    }

    /// Replace every row, keeping the envelope.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResponse<U> {
        PaginatedResponse {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

impl<T> Default for PaginatedResponse<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// A foreign key the backend serializes either as an id or as the full record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum Reference<T> {
    Id(i64),
    Expanded(T),
}

/// `{ "value": "..." }` lookup rows (upload/mapping status, job stage/status).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusValue {
    pub value: String,
}

impl StatusValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// Display metadata for a status code, used by filter facets and badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusOption {
    #[schema(value_type = String)]
    pub value: &'static str,
    #[schema(value_type = String)]
    pub label: &'static str,
}

/// Find the label for a status code in an option table.
pub fn status_label(options: &[StatusOption], value: &str) -> Option<&'static str> {
    options.iter().find(|o| o.value == value).map(|o| o.label)
}
