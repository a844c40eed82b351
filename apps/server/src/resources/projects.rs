//! Projects.

use super::with_query;
use crate::client::ApiSession;
use crate::models::{PaginatedResponse, Project};
use crate::query::obj_to_query;

const PROJECTS: &str = "projects/";

impl ApiSession {
    pub async fn get_projects_list(&self, filter: &str) -> PaginatedResponse<Project> {
        let path = with_query(PROJECTS, filter);
        self.or_default(&path, self.get(&path).await, PaginatedResponse::empty)
    }

    /// Projects containing the dataset with id `dataset_id`.
    pub async fn get_projects_for_dataset(&self, dataset_id: &str) -> Vec<Project> {
        let path = with_query(PROJECTS, &obj_to_query([("dataset", Some(dataset_id))]));
        self.or_default(&path, self.get_list(&path).await, Vec::new)
    }
}
