//! HTTP API request/response types.
//!
//! # Purpose
//! Defines payload shapes for the dashboard REST API and OpenAPI schema
//! generation. Core types are mapped here so the authorization crate stays
//! free of HTTP concerns.
use dashboard_authz::{ApplicationEntry, Identity, UserProfile};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SystemInfo {
    pub service: String,
    pub api_version: String,
    pub registry_source: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct HealthStatus {
    pub status: String,
    pub registry_loaded: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct RegistryStatus {
    pub loaded: bool,
    pub apps: usize,
    pub rejected: usize,
    pub vanity_paths: usize,
    pub vanity_collisions: usize,
    pub revision: Option<String>,
    /// RFC 3339 timestamp of the last successful load.
    pub loaded_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct IdentitySummary {
    pub subject_id: String,
    pub email: String,
    pub groups: Vec<String>,
}

impl From<&Identity> for IdentitySummary {
    fn from(identity: &Identity) -> Self {
        Self {
            subject_id: identity.subject_id.clone(),
            email: identity.email.clone(),
            groups: identity.groups.iter().cloned().collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Default, PartialEq, Eq)]
pub struct ProfileSummary {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub picture: Option<String>,
}

impl From<UserProfile> for ProfileSummary {
    fn from(profile: UserProfile) -> Self {
        Self {
            first_name: profile.first_name,
            last_name: profile.last_name,
            picture: profile.picture,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct AppTile {
    pub name: String,
    pub display_name: String,
    pub url: String,
    pub logo: String,
    pub op: String,
}

impl From<&ApplicationEntry> for AppTile {
    fn from(entry: &ApplicationEntry) -> Self {
        Self {
            name: entry.name.clone(),
            display_name: entry.display_name.clone(),
            url: entry.url.clone(),
            logo: entry.logo.clone(),
            op: entry.access_provider.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthorizeResponse {
    pub identity: IdentitySummary,
    pub profile: ProfileSummary,
    pub items: Vec<AppTile>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub request_id: Option<String>,
}
