//! Asynchronous backend jobs (upload, concept building, rule generation).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{StatusOption, StatusValue};

/// Stage status codes reported by a job.
pub const STAGE_STATUSES: &[StatusOption] = &[
    StatusOption {
        value: "NOT_STARTED",
        label: "Not Started",
    },
    StatusOption {
        value: "QUEUED",
        label: "Job Queued",
    },
    StatusOption {
        value: "COMPLETE",
        label: "Job Complete",
    },
    StatusOption {
        value: "FAILED",
        label: "Job Failed",
    },
    StatusOption {
        value: "IN_PROGRESS",
        label: "Job In Progress",
    },
];

/// A pipeline stage a job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct JobStageInfo {
    pub id: u8,
    #[schema(value_type = String)]
    pub value: &'static str,
    #[schema(value_type = String)]
    pub display_name: &'static str,
}

pub const JOB_STAGES: &[JobStageInfo] = &[
    JobStageInfo {
        id: 1,
        value: "UPLOAD_SCAN_REPORT",
        display_name: "Upload Scan Report",
    },
    JobStageInfo {
        id: 2,
        value: "BUILD_CONCEPTS_FROM_DICT",
        display_name: "Building concepts from OMOP Data dictionary",
    },
    JobStageInfo {
        id: 3,
        value: "REUSE_CONCEPTS",
        display_name: "Reusing mappings from available data",
    },
    JobStageInfo {
        id: 4,
        value: "GENERATE_RULES",
        display_name: "Generating rules from available mappings",
    },
    JobStageInfo {
        id: 5,
        value: "DOWNLOAD_RULES",
        display_name: "Generate mapping rules file",
    },
];

/// Status of a single job stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageStatus {
    NotStarted,
    Queued,
    Complete,
    Failed,
    InProgress,
}

impl StageStatus {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "NOT_STARTED" => Some(Self::NotStarted),
            "QUEUED" => Some(Self::Queued),
            "COMPLETE" => Some(Self::Complete),
            "FAILED" => Some(Self::Failed),
            "IN_PROGRESS" => Some(Self::InProgress),
            _ => None,
        }
    }
}

/// Rolled-up status of every job of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeneralStatus {
    NotStarted,
    Complete,
    Failed,
    InProgress,
}

impl GeneralStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::NotStarted => {
                "Not Started or No data yet. Start by update table's Person ID and Date event"
            }
            Self::Complete => "Complete. Click for details.",
            Self::Failed => "Failed. Click for details.",
            Self::InProgress => "In Progress. Click for details.",
        }
    }
}

/// A job record as returned by the jobs endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Job {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scan_report_id: Option<i64>,
    #[serde(default)]
    pub scan_report_table_id: Option<i64>,
    #[serde(default)]
    pub stage: Option<StatusValue>,
    #[serde(default)]
    pub status: Option<StatusValue>,
    #[serde(default)]
    pub details: Option<String>,
}

impl Job {
    /// Parsed status; unknown or missing codes yield `None`.
    pub fn stage_status(&self) -> Option<StageStatus> {
        self.status
            .as_ref()
            .and_then(|s| StageStatus::from_code(&s.value))
    }
}
