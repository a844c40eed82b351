//! Add and remove concept associations on fields and values.

use actix_web::{HttpResponse, delete, post, web};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use super::api_session;
use crate::auth::BackendSession;
use crate::client::ApiClient;
use crate::error::{AppError, AppResult};
use crate::models::{
    AnnotatedConcept, ContentTypeName, CreationType, NewScanReportConcept, ScanReportConcept,
};
use crate::query::obj_to_query;
use crate::services::{ConceptIndex, ViewCache};

/// Body of the add-concept route.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddConceptRequest {
    /// Field or value id the concept is attached to.
    pub object_id: i64,
    /// OMOP concept id.
    pub concept: i64,
    pub location: ContentTypeName,
}

/// The new join and its annotated concept, for a local table update.
///
/// Both are `None` when the association was created but could not be read
/// back; the table view is revalidated either way.
#[derive(Debug, Serialize, ToSchema)]
pub struct AddedConcept {
    pub join: Option<ScanReportConcept>,
    pub concept: Option<AnnotatedConcept>,
}

/// Configure concept routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(add_concept).service(delete_concept);
}

/// The newest manual join of `concept` among `joins`.
fn newest_manual_join(joins: Vec<ScanReportConcept>, concept: i64) -> Option<ScanReportConcept> {
    joins
        .into_iter()
        .filter(|j| j.concept_id() == concept && j.creation_type == CreationType::Manual)
        .max_by_key(|j| j.id)
}

/// Attach an OMOP concept to a field or value.
///
/// POST /scanreports/{id}/tables/{table_id}/concepts
#[utoipa::path(
    post,
    path = "/api/v1/scanreports/{id}/tables/{table_id}/concepts",
    tag = "Concepts",
    params(
        ("id" = i64, Path, description = "Scan report id"),
        ("table_id" = i64, Path, description = "Table the field or value belongs to")
    ),
    request_body = AddConceptRequest,
    responses(
        (status = 201, description = "Concept attached", body = AddedConcept),
        (status = 400, description = "Rejected by the backend", body = crate::error::ErrorResponse)
    )
)]
#[post("/scanreports/{id}/tables/{table_id}/concepts")]
pub async fn add_concept(
    auth: BackendSession,
    client: web::Data<ApiClient>,
    cache: web::Data<ViewCache>,
    path: web::Path<(i64, i64)>,
    body: web::Json<AddConceptRequest>,
) -> AppResult<HttpResponse> {
    let (id, table_id) = path.into_inner();
    let request = body.into_inner();
    let session = api_session(&client, auth);

    let new_concept =
        NewScanReportConcept::manual(request.concept, request.object_id, request.location, table_id);
    let created = session
        .add_concept(&cache, id, &new_concept)
        .await
        .map_err(|message| AppError::InvalidInput(format!("Adding concept failed. {message}")))?;

    // The association exists from here on; lookups below only enrich the answer.
    let listed = session
        .find_scan_report_concepts(&obj_to_query([
            ("object_id", Some(request.object_id)),
            ("concept__concept_id", Some(request.concept)),
        ]))
        .await;
    let join = match listed {
        Ok(joins) => newest_manual_join(joins, request.concept).or(created),
        Err(e) => {
            warn!(
                concept_id = request.concept,
                error = %e,
                "Could not re-read the new concept association"
            );
            created
        }
    };

    let concept = match &join {
        Some(join) => {
            let details = session.get_all_concepts_filtered(&[request.concept]).await;
            ConceptIndex::new(std::slice::from_ref(join), &details)
                .concepts_for(request.object_id)
                .pop()
        }
        None => None,
    };

    info!(
        scan_report_id = id,
        table_id,
        object_id = request.object_id,
        concept_id = request.concept,
        join_id = ?join.as_ref().map(|j| j.id),
        "Concept attached"
    );

    Ok(HttpResponse::Created().json(AddedConcept { join, concept }))
}

/// Remove a concept association by its join id.
///
/// DELETE /scanreports/{id}/tables/{table_id}/concepts/{join_id}
#[utoipa::path(
    delete,
    path = "/api/v1/scanreports/{id}/tables/{table_id}/concepts/{join_id}",
    tag = "Concepts",
    params(
        ("id" = i64, Path, description = "Scan report id"),
        ("table_id" = i64, Path, description = "Table id"),
        ("join_id" = i64, Path, description = "ScanReportConcept id")
    ),
    responses(
        (status = 204, description = "Association removed"),
        (status = 403, description = "Forbidden", body = crate::error::ErrorResponse),
        (status = 404, description = "Association not found", body = crate::error::ErrorResponse)
    )
)]
#[delete("/scanreports/{id}/tables/{table_id}/concepts/{join_id}")]
pub async fn delete_concept(
    auth: BackendSession,
    client: web::Data<ApiClient>,
    cache: web::Data<ViewCache>,
    path: web::Path<(i64, i64, i64)>,
) -> AppResult<HttpResponse> {
    let (id, table_id, join_id) = path.into_inner();
    let session = api_session(&client, auth);
    session.delete_concept(&cache, id, table_id, join_id).await?;

    info!(scan_report_id = id, table_id, join_id, "Concept removed");
    Ok(HttpResponse::NoContent().finish())
}
