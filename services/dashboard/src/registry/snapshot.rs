//! Published registry snapshot.
//!
//! # Purpose
//! Holds the registry and vanity map that request handlers read, and swaps in a
//! new pair only after the replacement text has parsed successfully.
//!
//! # Key invariants
//! - Readers always see a matching `(registry, vanity)` pair from one load.
//! - A failed parse leaves the previous snapshot in place.
use crate::registry::content_revision;
use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use dashboard_authz::{Registry, RegistryError, VanityMap};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct LoadedRegistry {
    pub registry: Registry,
    pub vanity: VanityMap,
    /// sha256 of the registry text, hex encoded.
    pub revision: String,
    pub loaded_at: DateTime<Utc>,
}

impl LoadedRegistry {
    pub fn from_text(text: &str) -> Result<Self, RegistryError> {
        let registry = Registry::load(text)?;
        let vanity = registry.vanity_urls();
        Ok(Self {
            registry,
            vanity,
            revision: content_revision(text),
            loaded_at: Utc::now(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Swapped,
    Identical,
}

#[derive(Debug, Default)]
pub struct RegistrySnapshot {
    current: ArcSwapOption<LoadedRegistry>,
}

impl RegistrySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Arc<LoadedRegistry>> {
        self.current.load_full()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.load().is_some()
    }

    /// Parse `text` and publish it unless it matches the current revision.
    pub fn apply(&self, text: &str) -> Result<ApplyOutcome, RegistryError> {
        let revision = content_revision(text);
        let unchanged = self
            .current
            .load()
            .as_ref()
            .is_some_and(|current| current.revision == revision);
        if unchanged {
            return Ok(ApplyOutcome::Identical);
        }

        let loaded = match LoadedRegistry::from_text(text) {
            Ok(loaded) => loaded,
            Err(err) => {
                metrics::counter!("dashboard_registry_loads_total", "result" => "error")
                    .increment(1);
                tracing::warn!(error = %err, "registry rejected; keeping previous snapshot");
                return Err(err);
            }
        };

        metrics::counter!("dashboard_registry_loads_total", "result" => "ok").increment(1);
        metrics::gauge!("dashboard_registry_apps").set(loaded.registry.len() as f64);
        metrics::gauge!("dashboard_registry_rejected_entries")
            .set(loaded.registry.rejected().len() as f64);
        metrics::gauge!("dashboard_vanity_paths").set(loaded.vanity.len() as f64);
        metrics::gauge!("dashboard_vanity_collisions").set(loaded.vanity.collisions() as f64);
        tracing::info!(
            apps = loaded.registry.len(),
            rejected = loaded.registry.rejected().len(),
            vanity_paths = loaded.vanity.len(),
            revision = %loaded.revision,
            "registry snapshot published"
        );
        self.current.store(Some(Arc::new(loaded)));
        Ok(ApplyOutcome::Swapped)
    }
}
