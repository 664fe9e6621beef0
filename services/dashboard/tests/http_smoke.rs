mod common;

use axum::http::StatusCode;
use common::{REGISTRY, app_with_registry, read_json};
use http_helpers::{get, json_request};
use tower::ServiceExt;

#[tokio::test]
async fn system_endpoints_report_registry_state() {
    let app = app_with_registry(None);
    let response = app
        .clone()
        .oneshot(get("/v1/system/health"))
        .await
        .expect("health");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["registry_loaded"], false);

    let response = app.oneshot(get("/v1/system/info")).await.expect("info");
    let body = read_json(response).await;
    assert_eq!(body["service"], "sso-dashboard");
    assert_eq!(body["registry_source"], "file:apps.yml");
}

#[tokio::test]
async fn registry_status_counts_rejected_entries() {
    let app = app_with_registry(Some(REGISTRY));
    let response = app.oneshot(get("/v1/registry")).await.expect("registry");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["loaded"], true);
    assert_eq!(body["apps"], 4);
    assert_eq!(body["rejected"], 1);
    assert_eq!(body["vanity_paths"], 3);
    assert_eq!(body["revision"].as_str().map(str::len), Some(64));
}

#[tokio::test]
async fn authorize_returns_tiles_in_registry_order() {
    let app = app_with_registry(Some(REGISTRY));
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/apps/authorize",
            serde_json::json!({
                "sub": "ad|LDAP|alice",
                "email": "alice@example.com",
                "given_name": "Alice",
                "https://sso.mozilla.com/claim/groups": ["eng"]
            }),
        ))
        .await
        .expect("authorize");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let names: Vec<&str> = body["items"]
        .as_array()
        .expect("items")
        .iter()
        .filter_map(|item| item["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Alpha", "Zeta"]);
    assert_eq!(body["items"][0]["op"], "okta");
    assert_eq!(body["identity"]["email"], "alice@example.com");
    assert_eq!(body["identity"]["groups"], serde_json::json!(["eng"]));
    assert_eq!(body["profile"]["first_name"], "Alice");

    let response = app
        .oneshot(json_request(
            "POST",
            "/v1/apps/authorize",
            serde_json::json!({
                "sub": "ad|LDAP|bob",
                "email": "bob@example.com"
            }),
        ))
        .await
        .expect("authorize");
    let body = read_json(response).await;
    let items = body["items"].as_array().expect("items");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], "A Very Long Application Name");
    assert_eq!(items[0]["display_name"], "A Very Long Appl..");
    assert_eq!(items[1]["name"], "Zeta");
}

#[tokio::test]
async fn authorize_without_registry_returns_no_tiles() {
    let app = app_with_registry(None);
    let response = app
        .oneshot(json_request(
            "POST",
            "/v1/apps/authorize",
            serde_json::json!({ "email": "alice@example.com" }),
        ))
        .await
        .expect("authorize");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["items"], serde_json::json!([]));
}

#[tokio::test]
async fn authorize_rejects_non_object_claims() {
    let app = app_with_registry(Some(REGISTRY));
    let response = app
        .oneshot(json_request(
            "POST",
            "/v1/apps/authorize",
            serde_json::json!(["not", "claims"]),
        ))
        .await
        .expect("authorize");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn vanity_paths_redirect_with_and_without_trailing_slash() {
    let app = app_with_registry(Some(REGISTRY));
    for path in ["/box", "/box/"] {
        let response = app.clone().oneshot(get(path)).await.expect("vanity");
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY, "{path}");
        let headers = response.headers();
        assert_eq!(headers["location"], "https://alpha.example.com/sso");
        assert_eq!(
            headers["cache-control"],
            dashboard_authz::CACHE_CONTROL_NO_STORE
        );
        assert_eq!(headers["expires"], "-1");
    }
}

#[tokio::test]
async fn unknown_path_is_json_not_found() {
    let app = app_with_registry(Some(REGISTRY));
    let response = app.oneshot(get("/unknown")).await.expect("unknown");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json(response).await;
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn vanity_requires_get() {
    let app = app_with_registry(Some(REGISTRY));
    let response = app
        .oneshot(json_request("POST", "/box", serde_json::json!({})))
        .await
        .expect("post");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = app_with_registry(None);
    let response = app.oneshot(get("/v1/openapi.json")).await.expect("openapi");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert!(body["paths"]["/v1/apps/authorize"].is_object());
}
