//! OpenAPI documentation configuration.

use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, Http, HttpAuthScheme, SecurityScheme};

use crate::config::SESSION_COOKIE;
use crate::{api, error, models, query};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Carrot-Mapper Web",
        version = "0.1.0",
        description = "Composed views over the Carrot-Mapper API: scan reports, concept mapping, mapping rules and datasets"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Scan report endpoints
        api::scan_reports::list_scan_reports,
        api::scan_reports::get_scan_report_detail,
        api::scan_reports::get_scan_report_jobs,
        api::scan_reports::get_table_jobs,
        api::scan_reports::archive_scan_report,
        api::scan_reports::delete_scan_report,
        api::scan_reports::get_table_fields,
        api::scan_reports::update_table,
        api::scan_reports::get_field_values,
        api::scan_reports::update_field,
        // Concept endpoints
        api::concepts::add_concept,
        api::concepts::delete_concept,
        // Mapping rule endpoints
        api::mapping_rules::list_mapping_rules,
        api::mapping_rules::get_summary_rules,
        api::mapping_rules::get_analyse_rules,
        api::mapping_rules::download_rules,
        // File endpoints
        api::files::list_downloads,
        api::files::request_file,
        api::files::download_file,
        api::files::download_scan_report,
        // Dataset and project endpoints
        api::datasets::list_data_sets,
        api::datasets::get_data_set_detail,
        api::datasets::archive_data_set,
        api::projects::list_projects,
        // OMOP endpoints
        api::omop::list_omop_tables,
        api::omop::get_omop_table,
        api::omop::list_omop_fields,
        // User endpoints
        api::users::current_user,
        api::users::list_users,
        // Navigation
        api::navigation::navigate,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            models::StatusValue,
            query::SortDirection,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Scan reports
            models::ScanReport,
            models::ScanReportTable,
            models::ScanReportField,
            models::ScanReportValue,
            models::ScanReportTableUpdate,
            models::ScanReportFieldUpdate,
            models::PermissionsResponse,
            models::Permission,
            api::scan_reports::ArchiveRequest,
            api::scan_reports::JobSummary,
            api::scan_reports::TableWithJobs,
            api::scan_reports::TableJobs,
            api::scan_reports::ScanReportDetailView,
            // Jobs
            models::Job,
            models::GeneralStatus,
            models::StageStatus,
            // Concepts
            models::Concept,
            models::CreationType,
            models::ContentTypeName,
            models::ScanReportConcept,
            models::AnnotatedConcept,
            api::concepts::AddConceptRequest,
            api::concepts::AddedConcept,
            // Mapping rules
            models::MappingRule,
            models::AnalyseRule,
            models::AnalyseRules,
            models::RulesFormat,
            // Files
            models::FileDownload,
            models::FileType,
            models::FileTypeValue,
            models::FileRequest,
            // Datasets and projects
            models::DataSet,
            models::DataPartner,
            models::Project,
            api::datasets::DataSetDetailView,
            // OMOP
            models::OmopTable,
            models::OmopField,
            // Users
            models::User,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Scan Reports", description = "Scan reports, tables, fields and values"),
        (name = "Concepts", description = "Concept associations on fields and values"),
        (name = "Mapping Rules", description = "Mapping rules, analysis and exports"),
        (name = "Files", description = "Generated files and scan report downloads"),
        (name = "Datasets", description = "Datasets and their archive state"),
        (name = "Projects", description = "Projects"),
        (name = "OMOP", description = "OMOP CDM destination tables and fields"),
        (name = "Users", description = "Signed-in user and user lists"),
        (name = "Navigation", description = "Table query-state navigation")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add the session cookie and bearer token security schemes.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
            );
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
