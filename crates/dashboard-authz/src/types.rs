//! Typed registry records.
//!
//! # Purpose
//! Models one normalized application entry and the small value types that
//! describe it (visibility flag, access provider, assurance level).
//!
//! # Key invariants
//! - `display_name` is always derived from the original `name`.
//! - `authorized_users` and `authorized_groups` hold exact-match strings.
//!
//! # Common pitfalls
//! - Comparing [`DisplayFlag`] with `==` against `true`; the registry may carry a
//!   string-typed boolean, so always go through [`DisplayFlag::is_enabled`].
use std::collections::BTreeSet;

/// Group name that grants unconditional visibility (still subject to `display`).
pub const EVERYONE_GROUP: &str = "everyone";

/// Master visibility switch as written in the registry.
///
/// # Summary
/// The registry format historically accepts `display: false`,
/// `display: "False"`, and the YAML 1.1 false words (`no`, `off` and their
/// capitalized forms), which some registry writers still emit unquoted. The
/// raw form is kept so operators can see what was written; decisions use
/// [`DisplayFlag::is_enabled`].
///
/// # Example
/// ```rust
/// use dashboard_authz::DisplayFlag;
///
/// assert!(DisplayFlag::Bool(true).is_enabled());
/// assert!(!DisplayFlag::Text("False".to_string()).is_enabled());
/// assert!(!DisplayFlag::Text("off".to_string()).is_enabled());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayFlag {
    Bool(bool),
    Text(String),
}

/// String spellings that switch a tile off.
const DISABLED_WORDS: [&str; 8] = ["", "False", "no", "No", "NO", "off", "Off", "OFF"];

impl DisplayFlag {
    pub fn is_enabled(&self) -> bool {
        match self {
            DisplayFlag::Bool(value) => *value,
            DisplayFlag::Text(value) => !DISABLED_WORDS.contains(&value.as_str()),
        }
    }
}

/// Access provider (`op`) that fronts the application.
///
/// Opaque to authorization; carried through for the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessProvider {
    Auth0,
    Okta,
    Other(String),
    Unspecified,
}

impl AccessProvider {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" => AccessProvider::Unspecified,
            "auth0" => AccessProvider::Auth0,
            "okta" => AccessProvider::Okta,
            _ => AccessProvider::Other(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AccessProvider::Auth0 => "auth0",
            AccessProvider::Okta => "okta",
            AccessProvider::Other(value) => value,
            AccessProvider::Unspecified => "",
        }
    }
}

/// Authenticator assurance level the access provider enforces for the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssuranceLevel {
    Low,
    Medium,
    Maximum,
}

impl AssuranceLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "LOW" => Some(AssuranceLevel::Low),
            "MEDIUM" => Some(AssuranceLevel::Medium),
            "MAXIMUM" => Some(AssuranceLevel::Maximum),
            _ => None,
        }
    }
}

/// One validated row of the application registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationEntry {
    pub name: String,
    pub display_name: String,
    pub url: String,
    pub logo: String,
    /// Raw `op` field.
    pub access_provider: AccessProvider,
    pub display: DisplayFlag,
    pub authorized_users: BTreeSet<String>,
    pub authorized_groups: BTreeSet<String>,
    pub vanity_paths: Vec<String>,
    pub client_id: Option<String>,
    pub aal: Option<AssuranceLevel>,
}

impl ApplicationEntry {
    pub fn is_displayed(&self) -> bool {
        self.display.is_enabled()
    }

    pub fn is_for_everyone(&self) -> bool {
        self.authorized_groups.contains(EVERYONE_GROUP)
    }
}
