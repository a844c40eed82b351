//! Datasets, data partners and projects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Reference;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DataPartner {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A dataset as listed by `datasets/datasets_data_partners/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DataSet {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[schema(value_type = Object)]
    pub data_partner: Reference<DataPartner>,
    #[serde(default)]
    pub admins: Vec<serde_json::Value>,
    #[serde(default)]
    pub editors: Vec<serde_json::Value>,
    #[serde(default)]
    pub viewers: Vec<serde_json::Value>,
}

impl DataSet {
    /// Data partner name when the backend expanded it.
    pub fn data_partner_name(&self) -> Option<&str> {
        match &self.data_partner {
            Reference::Expanded(partner) => Some(&partner.name),
            Reference::Id(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Dataset ids in the project.
    #[serde(default)]
    pub datasets: Vec<i64>,
    #[serde(default)]
    pub members: Vec<serde_json::Value>,
}
