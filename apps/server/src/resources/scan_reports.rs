//! Scan reports, their tables, fields, values and jobs.

use reqwest::Method;
use serde_json::json;

use super::with_query;
use crate::client::{ApiError, ApiSession, RequestOptions};
use crate::models::{
    Job, PaginatedResponse, PermissionsResponse, ScanReport, ScanReportField,
    ScanReportFieldUpdate, ScanReportTable, ScanReportTableUpdate, ScanReportValue,
};
use crate::query::with_hidden_default;
use crate::services::{ViewCache, view_path};

mod paths {
    pub fn list() -> &'static str {
        "v2/scanreports/"
    }

    pub fn detail(id: i64) -> String {
        format!("v2/scanreports/{id}/")
    }

    pub fn permissions(id: i64) -> String {
        format!("v2/scanreports/{id}/permissions/")
    }

    pub fn tables(id: i64) -> String {
        format!("v2/scanreports/{id}/tables/")
    }

    pub fn table(id: i64, table_id: i64) -> String {
        format!("v2/scanreports/{id}/tables/{table_id}/")
    }

    pub fn fields(id: i64, table_id: i64) -> String {
        format!("v2/scanreports/{id}/tables/{table_id}/fields/")
    }

    pub fn field(id: i64, table_id: i64, field_id: i64) -> String {
        format!("v2/scanreports/{id}/tables/{table_id}/fields/{field_id}/")
    }

    pub fn values(id: i64, table_id: i64, field_id: i64) -> String {
        format!("v2/scanreports/{id}/tables/{table_id}/fields/{field_id}/values/")
    }

    pub fn jobs(id: i64) -> String {
        format!("v2/scanreports/{id}/jobs/")
    }

    pub fn table_jobs(id: i64, table_id: i64) -> String {
        format!("v2/scanreports/{id}/tables/{table_id}/jobs/")
    }
}

impl ApiSession {
    /// List scan reports. The active tab is shown unless `filter` picks one.
    pub async fn get_scan_reports(&self, filter: &str) -> PaginatedResponse<ScanReport> {
        let path = with_query(paths::list(), &with_hidden_default(filter));
        self.or_default(&path, self.get(&path).await, PaginatedResponse::empty)
    }

    pub async fn get_scan_report(&self, id: i64) -> Result<ScanReport, ApiError> {
        self.get(&paths::detail(id)).await
    }

    pub async fn get_scan_report_permissions(&self, id: i64) -> PermissionsResponse {
        let path = paths::permissions(id);
        self.or_default(&path, self.get(&path).await, PermissionsResponse::default)
    }

    pub async fn get_scan_report_tables(
        &self,
        id: i64,
        filter: &str,
    ) -> PaginatedResponse<ScanReportTable> {
        let path = with_query(&paths::tables(id), filter);
        self.or_default(&path, self.get(&path).await, PaginatedResponse::empty)
    }

    pub async fn get_scan_report_table(
        &self,
        id: i64,
        table_id: i64,
    ) -> Result<ScanReportTable, ApiError> {
        self.get(&paths::table(id, table_id)).await
    }

    pub async fn get_scan_report_fields(
        &self,
        id: i64,
        table_id: i64,
        filter: &str,
    ) -> PaginatedResponse<ScanReportField> {
        let path = with_query(&paths::fields(id, table_id), filter);
        self.or_default(&path, self.get(&path).await, PaginatedResponse::empty)
    }

    pub async fn get_scan_report_field(
        &self,
        id: i64,
        table_id: i64,
        field_id: i64,
    ) -> Result<ScanReportField, ApiError> {
        self.get(&paths::field(id, table_id, field_id)).await
    }

    pub async fn get_scan_report_values(
        &self,
        id: i64,
        table_id: i64,
        field_id: i64,
        filter: &str,
    ) -> PaginatedResponse<ScanReportValue> {
        let path = with_query(&paths::values(id, table_id, field_id), filter);
        self.or_default(&path, self.get(&path).await, PaginatedResponse::empty)
    }

    /// Every job of a scan report, across all pages.
    pub async fn get_jobs(&self, id: i64) -> Vec<Job> {
        let path = paths::jobs(id);
        self.or_default(&path, self.get_fresh_list(&path).await, Vec::new)
    }

    pub async fn get_table_jobs(&self, id: i64, table_id: i64) -> Vec<Job> {
        let path = paths::table_jobs(id, table_id);
        self.or_default(&path, self.get_fresh_list(&path).await, Vec::new)
    }

    /// Move a scan report to or from the archived tab.
    pub async fn archive_scan_report(
        &self,
        cache: &ViewCache,
        id: i64,
        hidden: bool,
    ) -> Result<(), ApiError> {
        self.send(
            &paths::detail(id),
            RequestOptions::patch_json(json!({ "hidden": hidden })),
        )
        .await?;
        cache.revalidate_path(&view_path("/scanreports")).await;
        Ok(())
    }

    pub async fn delete_scan_report(&self, cache: &ViewCache, id: i64) -> Result<(), ApiError> {
        self.send(&paths::detail(id), RequestOptions::delete()).await?;
        cache.revalidate_path(&view_path("/scanreports")).await;
        Ok(())
    }

    /// Update person id, date event or the death-table flag of a table.
    pub async fn update_scan_report_table(
        &self,
        cache: &ViewCache,
        id: i64,
        table_id: i64,
        update: &ScanReportTableUpdate,
    ) -> Result<ScanReportTable, ApiError> {
        let table = self
            .send_json(Method::PATCH, &paths::table(id, table_id), update)
            .await?;
        cache
            .revalidate_path(&view_path(&format!("/scanreports/{id}")))
            .await;
        Ok(table)
    }

    pub async fn update_scan_report_field(
        &self,
        cache: &ViewCache,
        id: i64,
        table_id: i64,
        field_id: i64,
        update: &ScanReportFieldUpdate,
    ) -> Result<ScanReportField, ApiError> {
        let field = self
            .send_json(Method::PATCH, &paths::field(id, table_id, field_id), update)
            .await?;
        cache
            .revalidate_path(&view_path(&format!("/scanreports/{id}/tables/{table_id}")))
            .await;
        Ok(field)
    }
}
