//! Registry and tile authorization handlers.
//!
//! # Purpose and responsibility
//! Exposes the published registry status and computes the tile list for a
//! caller-supplied claims object.
//!
//! # Security considerations
//! - Claims are trusted as-is. Token validation happens upstream, in the OIDC
//!   layer that fronts this service.
//! - With no registry loaded the caller sees zero tiles, never an error that
//!   could be mistaken for "everything allowed".
use crate::api::error::{ApiError, api_validation_error};
use crate::api::types::{
    AppTile, AuthorizeResponse, ErrorResponse, ProfileSummary, RegistryStatus,
};
use crate::app::AppState;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use dashboard_authz::{UserProfile, authorize, extract_with};
use serde_json::Value;

#[utoipa::path(
    get,
    path = "/v1/registry",
    tag = "registry",
    responses(
        (status = 200, description = "Published registry status", body = RegistryStatus)
    )
)]
pub(crate) async fn registry_status(State(state): State<AppState>) -> Json<RegistryStatus> {
    let Some(loaded) = state.snapshot.current() else {
        return Json(RegistryStatus {
            loaded: false,
            apps: 0,
            rejected: 0,
            vanity_paths: 0,
            vanity_collisions: 0,
            revision: None,
            loaded_at: None,
        });
    };
    Json(RegistryStatus {
        loaded: true,
        apps: loaded.registry.len(),
        rejected: loaded.registry.rejected().len(),
        vanity_paths: loaded.vanity.len(),
        vanity_collisions: loaded.vanity.collisions(),
        revision: Some(loaded.revision.clone()),
        loaded_at: Some(loaded.loaded_at.to_rfc3339()),
    })
}

#[utoipa::path(
    post,
    path = "/v1/apps/authorize",
    tag = "apps",
    request_body(content = Object, description = "OIDC claims of the signed-in user"),
    responses(
        (status = 200, description = "Tiles visible to the user, in registry order", body = AuthorizeResponse),
        (status = 400, description = "Body is not a JSON object", body = ErrorResponse)
    )
)]
/// Authorize the registry against a claims object.
///
/// # Errors
/// - Returns 400 when the body is not valid JSON or not a JSON object.
pub(crate) async fn authorize_apps(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AuthorizeResponse>, ApiError> {
    let Json(body) = body.map_err(|err| api_validation_error(&err.body_text()))?;
    let Value::Object(claims) = body else {
        return Err(api_validation_error("claims must be a JSON object"));
    };

    let identity = extract_with(&claims, &state.claims);
    let profile = UserProfile::from_claims(&claims);
    let items: Vec<AppTile> = match state.snapshot.current() {
        Some(loaded) => authorize(&loaded.registry, &identity)
            .into_iter()
            .map(AppTile::from)
            .collect(),
        None => {
            tracing::warn!("authorize called before any registry was loaded");
            Vec::new()
        }
    };

    metrics::counter!("dashboard_authorize_requests_total").increment(1);
    metrics::histogram!("dashboard_authorized_tiles").record(items.len() as f64);
    tracing::debug!(
        subject = %identity.subject_id,
        tiles = items.len(),
        "apps authorized"
    );
    Ok(Json(AuthorizeResponse {
        identity: (&identity).into(),
        profile: ProfileSummary::from(profile),
        items,
    }))
}
