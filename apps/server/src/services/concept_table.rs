//! Concept-annotation merge for field and value tables.
//!
//! A table page is fetched in three independent calls: the rows, the
//! `ScanReportConcept` joins for those rows, and the OMOP concept details the
//! joins point at. This module stitches them together.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{
    AnnotatedConcept, Concept, Permission, PermissionsResponse, ScanReportConcept,
    ScanReportField, ScanReportValue,
};

/// Rows that concepts can be attached to.
pub trait HasObjectId {
    /// Id matched against `ScanReportConcept::object_id`.
    fn object_id(&self) -> i64;
}

impl HasObjectId for ScanReportField {
    fn object_id(&self) -> i64 {
        self.id
    }
}

impl HasObjectId for ScanReportValue {
    fn object_id(&self) -> i64 {
        self.id
    }
}

/// A table row with its concepts and the caller's permissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptRow<T> {
    #[serde(flatten)]
    pub row: T,
    #[serde(default)]
    pub concepts: Vec<AnnotatedConcept>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl<T> From<T> for ConceptRow<T> {
    fn from(row: T) -> Self {
        Self {
            row,
            concepts: Vec::new(),
            permissions: Vec::new(),
        }
    }
}

impl<T: HasObjectId> HasObjectId for ConceptRow<T> {
    fn object_id(&self) -> i64 {
        self.row.object_id()
    }
}

/// Joins grouped by `object_id` and concepts keyed by `concept_id`.
#[derive(Debug)]
pub struct ConceptIndex<'a> {
    joins_by_object: HashMap<i64, Vec<&'a ScanReportConcept>>,
    concepts_by_id: HashMap<i64, &'a Concept>,
}

impl<'a> ConceptIndex<'a> {
    pub fn new(joins: &'a [ScanReportConcept], concepts: &'a [Concept]) -> Self {
        let mut joins_by_object: HashMap<i64, Vec<&'a ScanReportConcept>> = HashMap::new();
        for join in joins {
            joins_by_object.entry(join.object_id).or_default().push(join);
        }

        let concepts_by_id = concepts.iter().map(|c| (c.concept_id, c)).collect();

        Self {
            joins_by_object,
            concepts_by_id,
        }
    }

    /// Concepts attached to `object_id`, in join order.
    ///
    /// A join whose concept detail is neither in the concept list nor embedded
    /// in the join itself is skipped.
    pub fn concepts_for(&self, object_id: i64) -> Vec<AnnotatedConcept> {
        let Some(joins) = self.joins_by_object.get(&object_id) else {
            return Vec::new();
        };

        joins
            .iter()
            .filter_map(|join| {
                let detail = self
                    .concepts_by_id
                    .get(&join.concept_id())
                    .copied()
                    .or_else(|| join.embedded_concept())?;
                Some(AnnotatedConcept {
                    concept: detail.clone(),
                    scan_report_concept_id: join.id,
                    creation_type: join.creation_type,
                })
            })
            .collect()
    }

    /// Annotate `rows`, replacing any concepts they already carry.
    pub fn annotate<T, R>(
        &self,
        rows: impl IntoIterator<Item = R>,
        permissions: &PermissionsResponse,
    ) -> Vec<ConceptRow<T>>
    where
        R: Into<ConceptRow<T>>,
        T: HasObjectId,
    {
        rows.into_iter()
            .map(|row| {
                let mut row: ConceptRow<T> = row.into();
                row.concepts = self.concepts_for(row.object_id());
                row.permissions = permissions.permissions.clone();
                row
            })
            .collect()
    }
}

/// Attach concepts and permissions to a page of rows.
///
/// Output has one row per input row. Rows without joins get an empty
/// `concepts` list. Passing already-annotated rows back in yields the same
/// result.
pub fn add_concepts_to_results<T, R>(
    rows: impl IntoIterator<Item = R>,
    joins: &[ScanReportConcept],
    concepts: &[Concept],
    permissions: &PermissionsResponse,
) -> Vec<ConceptRow<T>>
where
    R: Into<ConceptRow<T>>,
    T: HasObjectId,
{
    ConceptIndex::new(joins, concepts).annotate(rows, permissions)
}

/// In-memory joins and details backing one table view.
///
/// Local adds and deletes only touch these lists; the rows are re-annotated
/// without refetching the page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptTableState {
    pub joins: Vec<ScanReportConcept>,
    pub concepts: Vec<Concept>,
}

impl ConceptTableState {
    pub fn new(joins: Vec<ScanReportConcept>, concepts: Vec<Concept>) -> Self {
        Self { joins, concepts }
    }

    /// Record a freshly created join and its concept detail.
    pub fn add_concept(&mut self, join: ScanReportConcept, detail: Concept) {
        if !self
            .concepts
            .iter()
            .any(|c| c.concept_id == detail.concept_id)
        {
            self.concepts.push(detail);
        }
        self.joins.retain(|j| j.id != join.id);
        self.joins.push(join);
    }

    /// Drop a join by its id. Returns whether anything was removed.
    pub fn delete_concept(&mut self, join_id: i64) -> bool {
        let before = self.joins.len();
        self.joins.retain(|j| j.id != join_id);
        self.joins.len() != before
    }

    /// Annotate `rows` from the current state.
    pub fn compose<T, R>(
        &self,
        rows: impl IntoIterator<Item = R>,
        permissions: &PermissionsResponse,
    ) -> Vec<ConceptRow<T>>
    where
        R: Into<ConceptRow<T>>,
        T: HasObjectId,
    {
        add_concepts_to_results(rows, &self.joins, &self.concepts, permissions)
    }

    /// Distinct concept ids referenced by the joins, for the details request.
    pub fn needed_concept_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.joins.iter().map(|j| j.concept_id()).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
