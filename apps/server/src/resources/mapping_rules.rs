//! Mapping rules, their summary, analysis and exports.

use serde_json::json;

use super::with_query;
use crate::client::{ApiSession, Blob, RequestOptions};
use crate::models::{AnalyseRules, MappingRule, PaginatedResponse, RulesFormat};

mod paths {
    pub fn rules(id: i64) -> String {
        format!("v2/scanreports/{id}/rules/")
    }

    pub fn summary(id: i64) -> String {
        format!("v2/scanreports/{id}/rules/summary")
    }

    pub fn analyse(id: i64) -> String {
        format!("v2/scanreports/{id}/analyse/")
    }

    pub fn export(id: i64) -> String {
        format!("scanreports/{id}/mapping_rules/")
    }
}

impl ApiSession {
    pub async fn get_mapping_rules_list(
        &self,
        id: i64,
        filter: &str,
    ) -> PaginatedResponse<MappingRule> {
        let path = with_query(&paths::rules(id), filter);
        self.or_default(&path, self.get(&path).await, PaginatedResponse::empty)
    }

    pub async fn get_summary_rules(
        &self,
        id: i64,
        filter: &str,
    ) -> PaginatedResponse<MappingRule> {
        let path = with_query(&paths::summary(id), filter);
        self.or_default(&path, self.get(&path).await, PaginatedResponse::empty)
    }

    pub async fn get_analyse_rules(&self, id: i64) -> AnalyseRules {
        let path = paths::analyse(id);
        self.or_default(&path, self.get(&path).await, AnalyseRules::default)
    }

    /// Export the rules as an SVG diagram, JSON or CSV. `None` on failure.
    pub async fn get_map_diagram(&self, id: i64, format: RulesFormat) -> Option<Blob> {
        let path = paths::export(id);
        let body = json!({ format.request_flag(): true });
        self.or_default(
            &path,
            self.download(&path, RequestOptions::post_json(body))
                .await
                .map(Some),
            || None,
        )
    }
}
