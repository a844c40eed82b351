//! Datasets.

use serde_json::json;

use super::with_query;
use crate::client::{ApiError, ApiSession, RequestOptions};
use crate::models::{DataSet, PaginatedResponse, PermissionsResponse};
use crate::query::with_hidden_default;
use crate::services::{ViewCache, view_path};

mod paths {
    pub const LIST: &str = "datasets/datasets_data_partners/";

    pub fn detail(id: i64) -> String {
        format!("datasets/{id}/")
    }

    pub fn permissions(id: i64) -> String {
        format!("datasets/{id}/permissions/")
    }
}

impl ApiSession {
    pub async fn get_data_sets(&self, filter: &str) -> PaginatedResponse<DataSet> {
        let path = with_query(paths::LIST, &with_hidden_default(filter));
        self.or_default(&path, self.get(&path).await, PaginatedResponse::empty)
    }

    pub async fn get_data_set(&self, id: i64) -> Result<DataSet, ApiError> {
        self.get(&paths::detail(id)).await
    }

    pub async fn get_data_set_permissions(&self, id: i64) -> PermissionsResponse {
        let path = paths::permissions(id);
        self.or_default(&path, self.get(&path).await, PermissionsResponse::default)
    }

    pub async fn archive_data_set(
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
        cache.revalidate_path(&view_path("/datasets")).await;
        Ok(())
    }
}
