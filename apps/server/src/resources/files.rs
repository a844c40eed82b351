//! Generated rule files and scan report downloads.

use super::with_query;
use crate::client::{ApiError, ApiSession, Blob, RequestOptions};
use crate::models::{FileDownload, FileRequest, FileTypeValue, PaginatedResponse};
use crate::services::{ViewCache, view_path};

mod paths {
    pub fn downloads(id: i64) -> String {
        format!("v2/scanreports/{id}/rules/downloads/")
    }

    pub fn download(id: i64, file_id: i64) -> String {
        format!("v2/scanreports/{id}/rules/downloads/{file_id}")
    }

    pub fn scan_report_file(id: i64) -> String {
        format!("v2/scanreports/{id}/download/")
    }
}

impl ApiSession {
    pub async fn list_downloads(&self, id: i64, filter: &str) -> PaginatedResponse<FileDownload> {
        let path = with_query(&paths::downloads(id), filter);
        self.or_default(&path, self.get(&path).await, PaginatedResponse::empty)
    }

    /// Ask the backend to generate a file; it shows up in the list once done.
    pub async fn request_file(
        &self,
        cache: &ViewCache,
        id: i64,
        file_type: FileTypeValue,
    ) -> Result<(), ApiError> {
        let body = serde_json::to_value(FileRequest { file_type })?;
        self.send(&paths::downloads(id), RequestOptions::post_json(body))
            .await?;
        cache
            .revalidate_path(&view_path(&format!("/scanreports/{id}/downloads")))
            .await;
        Ok(())
    }

    pub async fn download_file(&self, id: i64, file_id: i64) -> Result<Blob, ApiError> {
        self.download(&paths::download(id, file_id), RequestOptions::get())
            .await
    }

    /// The uploaded scan report workbook.
    pub async fn download_scan_report(&self, id: i64) -> Result<Blob, ApiError> {
        self.download(&paths::scan_report_file(id), RequestOptions::get())
            .await
    }
}
