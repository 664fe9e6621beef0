//! Vanity path resolution.
//!
//! # Purpose
//! Maps short bookmarkable paths (`/box`) to application login URLs and builds
//! the permanent redirect the HTTP layer sends back.
//!
//! # Key invariants
//! - Lookups are exact after trailing-slash normalization; no prefix matching.
//! - On path collisions the entry later in registry order wins.
//! - Redirects always carry no-store cache headers, because targets change with
//!   every registry refresh and a cached 301 would outlive them.
use crate::types::ApplicationEntry;
use std::collections::BTreeMap;

pub const MOVED_PERMANENTLY: u16 = 301;
pub const CACHE_CONTROL_NO_STORE: &str =
    "no-store, no-cache, must-revalidate, post-check=0, pre-check=0, max-age=0";
pub const EXPIRES_IMMEDIATELY: &str = "-1";

/// Redirect produced for a matched vanity path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTarget {
    pub url: String,
    pub status: u16,
}

impl RedirectTarget {
    pub fn cache_headers(&self) -> [(&'static str, &'static str); 2] {
        [
            ("cache-control", CACHE_CONTROL_NO_STORE),
            ("expires", EXPIRES_IMMEDIATELY),
        ]
    }
}

/// Path → target URL mapping derived from a [`crate::Registry`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VanityMap {
    targets: BTreeMap<String, String>,
    collisions: usize,
}

impl VanityMap {
    pub(crate) fn from_entries(entries: &[ApplicationEntry]) -> Self {
        let mut map = Self::default();
        for entry in entries {
            for raw in &entry.vanity_paths {
                map.insert(raw, &entry.url, &entry.name);
            }
        }
        map
    }

    /// Build a map directly from `(path, url)` pairs, applying the same
    /// normalization and collision rules as registry extraction.
    pub fn from_pairs<I, P, U>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (P, U)>,
        P: AsRef<str>,
        U: AsRef<str>,
    {
        let mut map = Self::default();
        for (path, url) in pairs {
            map.insert(path.as_ref(), url.as_ref(), "");
        }
        map
    }

    fn insert(&mut self, raw_path: &str, url: &str, app: &str) {
        let path = normalize_path(raw_path.trim());
        if path.is_empty() || url.is_empty() {
            tracing::warn!(app, path = raw_path, "skipping vanity path without target");
            return;
        }
        if let Some(previous) = self.targets.insert(path.to_string(), url.to_string())
            && previous != url
        {
            self.collisions += 1;
            tracing::warn!(
                app,
                path,
                previous = %previous,
                current = url,
                "vanity path collision; later registry entry wins"
            );
        }
    }

    /// Resolve an inbound request path.
    ///
    /// # Example
    /// ```rust
    /// use dashboard_authz::VanityMap;
    ///
    /// let map = VanityMap::from_pairs([("/box", "https://box.example.com")]);
    /// assert_eq!(map.resolve("/box"), map.resolve("/box/"));
    /// assert!(map.resolve("/unknown").is_none());
    /// ```
    pub fn resolve(&self, inbound_path: &str) -> Option<RedirectTarget> {
        self.targets
            .get(normalize_path(inbound_path))
            .map(|url| RedirectTarget {
                url: url.clone(),
                status: MOVED_PERMANENTLY,
            })
    }

    /// Every route a host must make reachable: each path with and without a
    /// trailing slash.
    pub fn route_paths(&self) -> Vec<String> {
        self.targets
            .keys()
            .flat_map(|path| {
                if path == "/" {
                    vec![path.clone()]
                } else {
                    vec![path.clone(), format!("{path}/")]
                }
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.targets
            .iter()
            .map(|(path, url)| (path.as_str(), url.as_str()))
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn collisions(&self) -> usize {
        self.collisions
    }
}

/// Strip trailing slashes; the root path stays `/`.
pub fn normalize_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() && path.starts_with('/') {
        "/"
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Registry;

    #[test]
    fn trailing_slash_is_idempotent() {
        let map = VanityMap::from_pairs([("/box", "https://box.example.com")]);
        let plain = map.resolve("/box").expect("plain");
        let slashed = map.resolve("/box/").expect("slashed");
        assert_eq!(plain, slashed);
        assert_eq!(plain.status, MOVED_PERMANENTLY);
        assert_eq!(plain.url, "https://box.example.com");
    }

    #[test]
    fn unknown_path_is_no_match() {
        let map = VanityMap::from_pairs([("/box", "https://box.example.com")]);
        assert!(map.resolve("/unknown").is_none());
        assert!(map.resolve("/box/extra").is_none());
        assert!(map.resolve("/bo").is_none());
    }

    #[test]
    fn registry_paths_are_normalized() {
        let map = VanityMap::from_pairs([("/netlify/", "https://some-url-for-netlify")]);
        assert!(map.resolve("/netlify").is_some());
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("//"), "/");
        assert_eq!(normalize_path("/a//"), "/a");
    }

    #[test]
    fn collisions_last_registry_entry_wins() {
        let registry = Registry::load(
            r#"
apps:
  - application: { name: "Beta", url: "https://beta", display: true, authorized_groups: [], authorized_users: [], vanity_url: ["/shared"] }
  - application: { name: "Alpha", url: "https://alpha", display: true, authorized_groups: [], authorized_users: [], vanity_url: ["/shared"] }
"#,
        )
        .expect("load");
        let map = registry.vanity_urls();
        assert_eq!(map.collisions(), 1);
        // Alpha sorts first, so Beta is the later entry.
        assert_eq!(map.resolve("/shared").expect("hit").url, "https://beta");
    }

    #[test]
    fn invalid_entries_contribute_no_vanity_paths() {
        let registry = Registry::load(
            r#"
apps:
  - application: { name: "Broken", url: "https://broken", display: true, authorized_groups: [], vanity_url: ["/broken"] }
"#,
        )
        .expect("load");
        assert!(registry.vanity_urls().resolve("/broken").is_none());
    }

    #[test]
    fn route_paths_include_both_forms() {
        let map = VanityMap::from_pairs([("/box", "https://box"), ("/wiki", "https://wiki")]);
        assert_eq!(map.route_paths(), vec!["/box", "/box/", "/wiki", "/wiki/"]);
    }

    #[test]
    fn redirect_headers_disable_caching() {
        let target = VanityMap::from_pairs([("/box", "https://box")])
            .resolve("/box")
            .expect("hit");
        let headers = target.cache_headers();
        assert_eq!(headers[0], ("cache-control", CACHE_CONTROL_NO_STORE));
        assert_eq!(headers[1], ("expires", "-1"));
    }
}
