//! Registry and authorization primitives for the SSO dashboard.
//!
//! # Purpose
//! Turns an application registry document into a normalized, sorted list of
//! tiles, decides which tiles a signed-in user may see, and resolves legacy
//! vanity paths to application login URLs.
//!
//! # How it fits
//! The dashboard service fetches registry text, hands it to [`Registry::load`],
//! and publishes the result as an immutable snapshot. Request handlers build an
//! [`Identity`] from upstream OIDC claims and call [`authorize`] or
//! [`VanityMap::resolve`] against that snapshot.
//!
//! # Key invariants
//! - Every function here is pure: no I/O, no global state, no mutation of inputs.
//! - Entries missing `display`, `authorized_users`, or `authorized_groups` are
//!   dropped at load time and never authorized (fail closed).
//! - `authorize` output is a subsequence of the registry in registry order.
//!
//! # Examples
//! ```rust
//! use dashboard_authz::{Identity, Registry, authorize};
//!
//! let registry = Registry::load(
//!     r#"
//! apps:
//!   - application:
//!       name: "Wiki"
//!       url: "https://wiki.example.com/login"
//!       display: true
//!       authorized_users: []
//!       authorized_groups: ["everyone"]
//!       vanity_url: ["/wiki"]
//! "#,
//! )
//! .expect("registry");
//!
//! let identity = Identity::new("ad|LDAP|alice", "alice@example.com", Vec::<String>::new());
//! let visible = authorize(&registry, &identity);
//! assert_eq!(visible.len(), 1);
//!
//! let target = registry.vanity_urls().resolve("/wiki/").expect("vanity");
//! assert_eq!(target.url, "https://wiki.example.com/login");
//! ```
//!
//! # Common pitfalls
//! - Treating a failed [`Registry::load`] as an empty registry; callers must keep
//!   serving the last good snapshot instead.
//! - Matching on empty identifiers; [`Identity`] drops them on construction.

mod authorize;
mod errors;
mod identity;
mod registry;
mod types;
mod vanity;

pub use authorize::{Decision, authorize, evaluate};
pub use errors::{RegistryError, RegistryResult};
pub use identity::{
    ClaimNamespace, DEFAULT_EMAILS_CLAIM, DEFAULT_GROUPS_CLAIM, Identity, UserProfile, extract,
    extract_with,
};
pub use registry::{DISPLAY_NAME_MAX, Registry, truncate_display_name};
pub use types::{AccessProvider, ApplicationEntry, AssuranceLevel, DisplayFlag, EVERYONE_GROUP};
pub use vanity::{
    CACHE_CONTROL_NO_STORE, EXPIRES_IMMEDIATELY, MOVED_PERMANENTLY, RedirectTarget, VanityMap,
    normalize_path,
};
