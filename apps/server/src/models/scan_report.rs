//! Scan reports and their table -> field -> value hierarchy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{StatusOption, StatusValue};

/// Upload status codes of a scan report.
pub const UPLOAD_STATUS_OPTIONS: &[StatusOption] = &[
    StatusOption {
        value: "UPCOMPL",
        label: "Upload Complete",
    },
    StatusOption {
        value: "UPFAILE",
        label: "Upload Failed",
    },
    StatusOption {
        value: "UPINPRO",
        label: "Upload in Progress",
    },
];

/// Mapping status codes of a scan report.
pub const MAPPING_STATUS_OPTIONS: &[StatusOption] = &[
    StatusOption {
        value: "BLOCKED",
        label: "Blocked",
    },
    StatusOption {
        value: "COMPLET",
        label: "Mapping Complete",
    },
    StatusOption {
        value: "PENDING",
        label: "Mapping 0%",
    },
    StatusOption {
        value: "INPRO25",
        label: "Mapping 25%",
    },
    StatusOption {
        value: "INPRO50",
        label: "Mapping 50%",
    },
    StatusOption {
        value: "INPRO75",
        label: "Mapping 75%",
    },
];

/// A scan report as listed by `v2/scanreports/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScanReport {
    pub id: i64,
    /// Uploaded file name.
    #[serde(default)]
    pub name: Option<String>,
    /// Dataset name given at upload time.
    pub dataset: String,
    #[serde(default)]
    pub parent_dataset: Option<String>,
    #[serde(default)]
    pub data_partner: Option<String>,
    #[serde(default)]
    pub upload_status: Option<StatusValue>,
    #[serde(default)]
    pub mapping_status: Option<StatusValue>,
    /// Author username or id, depending on the serializer.
    #[serde(default)]
    pub author: Option<serde_json::Value>,
    #[serde(default)]
    pub visibility: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub hidden: bool,
}

/// A source table inside a scan report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScanReportTable {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
    pub scan_report: i64,
    /// Name of the field holding the person identifier.
    #[serde(default)]
    pub person_id: Option<String>,
    /// Name of the field holding the event date.
    #[serde(default)]
    pub date_event: Option<String>,
    #[serde(default)]
    pub death_table: bool,
}

impl ScanReportTable {
    /// Concepts can only be added once both person id and date event are set.
    pub fn is_ready_for_concepts(&self) -> bool {
        self.person_id.is_some() && self.date_event.is_some()
    }
}

/// A column of a source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScanReportField {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
    #[serde(default)]
    pub description_column: String,
    #[serde(default)]
    pub type_column: String,
    #[serde(default)]
    pub max_length: Option<i64>,
    #[serde(default)]
    pub nrows: Option<i64>,
    #[serde(default)]
    pub nrows_checked: Option<i64>,
    #[serde(default)]
    pub fraction_empty: Option<String>,
    #[serde(default)]
    pub nunique_values: Option<i64>,
    #[serde(default)]
    pub fraction_unique: Option<String>,
    #[serde(default)]
    pub ignore_column: Option<bool>,
    #[serde(default)]
    pub is_patient_id: bool,
    #[serde(default)]
    pub is_ignore: bool,
    #[serde(default)]
    pub classification_system: Option<String>,
    #[serde(default)]
    pub pass_from_source: bool,
    #[serde(default)]
    pub concept_id: Option<i64>,
    #[serde(default)]
    pub field_description: Option<String>,
    pub scan_report_table: i64,
}

/// A distinct value observed in a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScanReportValue {
    pub id: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub value: String,
    #[serde(default)]
    pub frequency: i64,
    #[serde(default)]
    pub value_description: Option<String>,
    pub scan_report_field: i64,
}

/// Editable attributes of a table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ScanReportTableUpdate {
    /// Field id holding the person identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_id: Option<i64>,
    /// Field id holding the event date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_event: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub death_table: Option<bool>,
}

/// Editable attributes of a field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ScanReportFieldUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_ignore: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_from_source: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_column: Option<String>,
}
