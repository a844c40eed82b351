//! Concept joins and OMOP concept details.

use crate::client::{ApiBody, ApiError, ApiSession, RequestOptions};
use crate::models::{Concept, NewScanReportConcept, ScanReportConcept};
use crate::services::{ViewCache, view_path};

mod paths {
    pub fn joins(filter: &str) -> String {
        super::super::with_query("v2/scanreports/concepts/", filter)
    }

    pub fn join(join_id: i64) -> String {
        format!("v2/scanreports/concepts/{join_id}/")
    }

    pub fn concepts_filter(ids: &str) -> String {
        format!("v2/omop/conceptsfilter/?concept_id__in={ids}")
    }
}

/// Comma separated id list for `__in` filters.
pub fn id_list(ids: &[i64]) -> String {
    ids.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

impl ApiSession {
    /// Every concept join matching `filter`, across all pages.
    pub async fn get_all_scan_report_concepts(&self, filter: &str) -> Vec<ScanReportConcept> {
        let path = paths::joins(filter);
        self.or_default(&path, self.find_scan_report_concepts(filter).await, Vec::new)
    }

    /// Like [`get_all_scan_report_concepts`](Self::get_all_scan_report_concepts)
    /// but a failed call is returned instead of replaced by `[]`.
    pub async fn find_scan_report_concepts(
        &self,
        filter: &str,
    ) -> Result<Vec<ScanReportConcept>, ApiError> {
        self.fetch_all_pages(&paths::joins(filter)).await
    }

    /// Joins attached to any of `object_ids`.
    pub async fn get_scan_report_concepts_for(&self, object_ids: &[i64]) -> Vec<ScanReportConcept> {
        if object_ids.is_empty() {
            return Vec::new();
        }
        self.get_all_scan_report_concepts(&format!("object_id__in={}", id_list(object_ids)))
            .await
    }

    /// OMOP concept details for `concept_ids`. No request for an empty list.
    pub async fn get_all_concepts_filtered(&self, concept_ids: &[i64]) -> Vec<Concept> {
        if concept_ids.is_empty() {
            return Vec::new();
        }
        let path = paths::concepts_filter(&id_list(concept_ids));
        self.or_default(&path, self.fetch_all_pages(&path).await, Vec::new)
    }

    /// Attach a concept to a field or value, returning the created join when
    /// the backend echoes it.
    ///
    /// Failures are not propagated: the backend's message is returned so the
    /// caller can show it (missing person id or date event, unknown concept,
    /// duplicate association and similar).
    pub async fn add_concept(
        &self,
        cache: &ViewCache,
        scan_report_id: i64,
        concept: &NewScanReportConcept,
    ) -> Result<Option<ScanReportConcept>, String> {
        let body = serde_json::to_value(concept).map_err(|e| e.to_string())?;
        let created = self
            .request(&paths::joins(""), RequestOptions::post_json(body))
            .await
            .map_err(|e| e.message())?;

        cache
            .revalidate_path(&view_path(&format!(
                "/scanreports/{scan_report_id}/tables/{}",
                concept.table_id
            )))
            .await;

        Ok(match created {
            ApiBody::Json(value) => serde_json::from_value(value).ok(),
            _ => None,
        })
    }

    /// Remove a concept association by its join id.
    pub async fn delete_concept(
        &self,
        cache: &ViewCache,
        scan_report_id: i64,
        table_id: i64,
        join_id: i64,
    ) -> Result<(), ApiError> {
        self.send(&paths::join(join_id), RequestOptions::delete())
            .await?;
        cache
            .revalidate_path(&view_path(&format!(
                "/scanreports/{scan_report_id}/tables/{table_id}"
            )))
            .await;
        Ok(())
    }
}
