//! OMOP destination tables and fields.

use crate::client::ApiSession;
use crate::models::{OmopField, OmopTable};

const OMOP_FIELDS: &str = "omopfields/";
const OMOP_TABLES: &str = "omoptables/";

impl ApiSession {
    pub async fn get_omop_fields(&self) -> Vec<OmopField> {
        self.or_default(OMOP_FIELDS, self.get_list(OMOP_FIELDS).await, Vec::new)
    }

    pub async fn get_omop_tables(&self) -> Vec<OmopTable> {
        self.or_default(OMOP_TABLES, self.get_list(OMOP_TABLES).await, Vec::new)
    }

    /// A single table by name; a zeroed record when it cannot be fetched.
    pub async fn get_omop_table(&self, table: &str) -> OmopTable {
        let path = format!("{OMOP_TABLES}{}/", urlencoding::encode(table));
        self.or_default(&path, self.get(&path).await, OmopTable::default)
    }
}
