use dashboard::app::{AppState, build_router};
use dashboard::registry::RegistrySnapshot;
use dashboard_authz::ClaimNamespace;
use std::sync::Arc;

pub const REGISTRY: &str = r#"
apps:
  - application:
      name: "Zeta"
      op: "auth0"
      url: "https://zeta.example.com/login"
      logo: "zeta.png"
      display: true
      authorized_users: []
      authorized_groups: ["everyone"]
      vanity_url: ["/zeta"]
  - application:
      name: "Alpha"
      op: "okta"
      url: "https://alpha.example.com/sso"
      logo: "alpha.png"
      display: true
      authorized_users: []
      authorized_groups: ["eng"]
      vanity_url: ["/box"]
  - application:
      name: "A Very Long Application Name"
      url: "https://long.example.com"
      display: true
      authorized_users: ["bob@example.com"]
      authorized_groups: []
  - application:
      name: "Hidden"
      url: "https://hidden.example.com"
      display: false
      authorized_users: []
      authorized_groups: ["everyone"]
      vanity_url: ["/hidden"]
  - application:
      name: "Broken"
      url: "https://broken.example.com"
      authorized_users: []
      authorized_groups: ["everyone"]
"#;

#[allow(dead_code)]
pub fn state_with(snapshot: Arc<RegistrySnapshot>) -> AppState {
    AppState {
        service_name: "sso-dashboard".to_string(),
        api_version: "v1".to_string(),
        snapshot,
        source_description: "file:apps.yml".to_string(),
        claims: ClaimNamespace::default(),
    }
}

#[allow(dead_code)]
pub fn app_with_registry(text: Option<&str>) -> axum::routing::RouterIntoService<axum::body::Body, ()> {
    let snapshot = Arc::new(RegistrySnapshot::new());
    if let Some(text) = text {
        snapshot.apply(text).expect("registry");
    }
    build_router(state_with(snapshot)).into_service()
}

#[allow(dead_code)]
pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}
