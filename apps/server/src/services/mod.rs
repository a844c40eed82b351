//! View composition services.

pub mod concept_table;
pub mod download;
pub mod jobs;
pub mod view_cache;

pub use concept_table::{
    ConceptIndex, ConceptRow, ConceptTableState, HasObjectId, add_concepts_to_results,
};
pub use jobs::{divide_jobs, general_status, jobs_by_table};
pub use view_cache::{ViewCache, view_path};
