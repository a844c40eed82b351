//! Generated mapping rules and their analysis.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RuleTable {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RuleDomain {
    pub name: String,
}

/// A source-field to OMOP-field transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MappingRule {
    pub rule_id: i64,
    #[serde(default)]
    pub omop_term: Option<String>,
    pub destination_table: RuleTable,
    #[serde(default)]
    pub domain: Option<RuleDomain>,
    pub destination_field: RuleTable,
    pub source_table: RuleTable,
    pub source_field: RuleTable,
    /// Source value to concept id, for value-level rules.
    #[serde(default)]
    pub term_mapping: Option<BTreeMap<String, i64>>,
    #[serde(default)]
    pub creation_type: Option<String>,
}

/// One row of the ancestor/descendant analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalyseRule {
    pub rule_id: i64,
    #[serde(default)]
    pub rule_name: Option<String>,
    #[serde(default)]
    pub anc_desc: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalyseRules {
    #[serde(default)]
    pub data: Vec<AnalyseRule>,
}

/// Export format of the mapping rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RulesFormat {
    Svg,
    Json,
    Csv,
}

impl RulesFormat {
    /// Flag the legacy `mapping_rules/` endpoint expects in its POST body.
    pub fn request_flag(self) -> &'static str {
        match self {
            Self::Svg => "get_svg",
            Self::Json => "download_rules",
            Self::Csv => "download_rules_as_csv",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Svg => "image/svg+xml",
            Self::Json => "application/json",
            Self::Csv => "text/csv",
        }
    }
}

impl FromStr for RulesFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unsupported rules format: {other}")),
        }
    }
}
