//! Identity extraction from upstream OIDC claims.
//!
//! # Purpose
//! Normalizes the claim shapes different identity providers emit into a single
//! `{subject_id, email, groups}` triple used by authorization.
//!
//! # Key invariants
//! - Extraction never fails; missing or oddly typed claims become empty values.
//! - Groups come from the namespaced claim when it is non-empty, otherwise
//!   from the bare `groups` claim.
//! - Empty strings never become identifiers or groups.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

pub const DEFAULT_EMAILS_CLAIM: &str = "https://sso.mozilla.com/claim/emails";
pub const DEFAULT_GROUPS_CLAIM: &str = "https://sso.mozilla.com/claim/groups";

/// Keys of the namespaced (URI-shaped) claims to consult.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimNamespace {
    pub emails_claim: String,
    pub groups_claim: String,
}

impl Default for ClaimNamespace {
    fn default() -> Self {
        Self {
            emails_claim: DEFAULT_EMAILS_CLAIM.to_string(),
            groups_claim: DEFAULT_GROUPS_CLAIM.to_string(),
        }
    }
}

/// Who is asking, as far as tile authorization is concerned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub subject_id: String,
    pub email: String,
    pub groups: BTreeSet<String>,
}

impl Identity {
    pub fn new<G, S>(subject_id: impl Into<String>, email: impl Into<String>, groups: G) -> Self
    where
        G: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subject_id: subject_id.into(),
            email: email.into(),
            groups: groups
                .into_iter()
                .map(Into::into)
                .filter(|group: &String| !group.is_empty())
                .collect(),
        }
    }

    /// Identifiers matched against `authorized_users`, skipping empty ones.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        [self.email.as_str(), self.subject_id.as_str()]
            .into_iter()
            .filter(|value| !value.is_empty())
    }
}

/// Extract an [`Identity`] using the default claim namespace.
pub fn extract(claims: &Map<String, Value>) -> Identity {
    extract_with(claims, &ClaimNamespace::default())
}

/// Extract an [`Identity`] using explicit namespaced claim keys.
pub fn extract_with(claims: &Map<String, Value>, namespace: &ClaimNamespace) -> Identity {
    let subject_id = string_claim(claims, "sub").unwrap_or_default();
    let email = string_claim(claims, "email")
        .or_else(|| first_namespaced_email(claims.get(&namespace.emails_claim)))
        .unwrap_or_default();

    let namespaced = group_list(claims.get(&namespace.groups_claim));
    let groups = if namespaced.is_empty() {
        // Non-directory logins (social, passwordless) carry no groups at all.
        group_list(claims.get("groups"))
    } else {
        namespaced
    };

    Identity::new(subject_id, email, groups)
}

/// Display attributes for the signed-in user; not used for authorization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub picture: Option<String>,
}

impl UserProfile {
    pub fn from_claims(claims: &Map<String, Value>) -> Self {
        Self {
            first_name: string_claim(claims, "given_name"),
            last_name: string_claim(claims, "family_name"),
            picture: string_claim(claims, "picture"),
        }
    }
}

fn string_claim(claims: &Map<String, Value>, name: &str) -> Option<String> {
    claims
        .get(name)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn first_namespaced_email(value: Option<&Value>) -> Option<String> {
    let first = value?.as_array()?.first()?;
    let email = match first {
        Value::String(email) => Some(email.as_str()),
        Value::Object(object) => object
            .get("emails")
            .or_else(|| object.get("email"))
            .and_then(|inner| match inner {
                Value::String(email) => Some(email.as_str()),
                Value::Array(items) => items.first().and_then(Value::as_str),
                _ => None,
            }),
        _ => None,
    }?;
    (!email.is_empty()).then(|| email.to_string())
}

fn group_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|group| !group.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(group)) if !group.is_empty() => vec![group.clone()],
        _ => Vec::new(),
    }
}
