//! Registry refresh: where registry text comes from and how it is published.
//!
//! # Purpose
//! Sources fetch and cache the registry blob; the snapshot parses it off to the
//! side and swaps it in atomically; the refresh loop ties the two together on a
//! schedule.
//!
//! # Key invariants
//! - Once `sync()` returns, `current_registry_text()` yields the previous or the
//!   new complete blob, never a partial write.
//! - A blob that fails to parse never replaces a good snapshot.
use async_trait::async_trait;
use thiserror::Error;

pub mod cdn;
pub mod file;
pub mod refresh;
pub mod snapshot;

pub use cdn::CdnRegistrySource;
pub use file::FileRegistrySource;
pub use refresh::{RefreshOutcome, refresh_once, start_refresh};
pub use snapshot::{ApplyOutcome, LoadedRegistry, RegistrySnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Updated,
    Unchanged,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("registry io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("registry fetch failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("registry fetch returned status {0}")]
    Status(u16),
}

pub type SourceResult<T> = Result<T, SourceError>;

#[async_trait]
pub trait RegistrySource: Send + Sync {
    /// Check upstream for a newer blob and persist it if there is one.
    async fn sync(&self) -> SourceResult<SyncOutcome>;

    /// Latest known-good blob, or `None` if nothing has been fetched yet.
    async fn current_registry_text(&self) -> SourceResult<Option<String>>;

    fn describe(&self) -> String;
}

pub(crate) fn content_revision(text: &str) -> String {
    use sha2::{Digest, Sha256};
    hex::encode(Sha256::digest(text.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_revision_is_stable() {
        let a = content_revision("apps: []");
        assert_eq!(a, content_revision("apps: []"));
        assert_ne!(a, content_revision("apps: [ ]"));
        assert_eq!(a.len(), 64);
    }
}
