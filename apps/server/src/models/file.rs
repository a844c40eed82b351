//! Generated files offered for download.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Kind of generated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FileTypeValue {
    MappingJson,
    MappingCsv,
    MappingSvg,
    DataDictionary,
    ScanReport,
}

impl FileTypeValue {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::MappingJson => "Mapping Rules JSON",
            Self::MappingCsv => "Mapping Rules CSV",
            Self::MappingSvg => "Mapping Rules SVG",
            Self::DataDictionary => "Data Dictionary",
            Self::ScanReport => "Scan Report",
        }
    }

    /// MIME type of the generated file, where one is fixed.
    pub fn content_type(self) -> Option<&'static str> {
        match self {
            Self::MappingJson => Some("application/json"),
            Self::MappingCsv => Some("text/csv"),
            Self::MappingSvg => Some("image/svg+xml"),
            Self::DataDictionary | Self::ScanReport => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FileType {
    pub value: FileTypeValue,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FileDownload {
    pub id: i64,
    pub scan_report: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Requesting user, serialized however the backend chooses.
    #[serde(default)]
    pub user: Option<serde_json::Value>,
    pub file_type: FileType,
    #[serde(default)]
    pub file_url: Option<String>,
}

/// Body of a file generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FileRequest {
    pub file_type: FileTypeValue,
}
