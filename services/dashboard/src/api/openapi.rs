//! OpenAPI schema aggregation for the dashboard API.
use crate::api::{
    apps, system,
    types::{
        AppTile, AuthorizeResponse, ErrorResponse, HealthStatus, IdentitySummary, ProfileSummary,
        RegistryStatus, SystemInfo,
    },
};
use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "sso-dashboard",
        version = "v1",
        description = "SSO dashboard tile authorization and registry API"
    ),
    paths(
        system::system_info,
        system::system_health,
        apps::registry_status,
        apps::authorize_apps
    ),
    components(schemas(
        SystemInfo,
        HealthStatus,
        RegistryStatus,
        IdentitySummary,
        ProfileSummary,
        AppTile,
        AuthorizeResponse,
        ErrorResponse
    )),
    tags(
        (name = "system", description = "Service metadata and health checks"),
        (name = "registry", description = "Published application registry"),
        (name = "apps", description = "Tile authorization")
    )
)]
pub struct ApiDoc;

pub(crate) async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
