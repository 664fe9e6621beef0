//! CDN-backed registry source with an on-disk cache.
//!
//! # Purpose
//! Fetches `<base_url>/apps.yml` with a conditional request and keeps the last
//! good copy under the cache directory, next to an ETag change-token file.
//!
//! # Key invariants
//! - Each file is written to its own temp file, flushed, and renamed into
//!   place. The blob lands before the ETag file is touched; a crash in between
//!   leaves a stale token, which only costs one extra download on the next sync.
//! - Fetch failures never modify the cache.
use crate::registry::{RegistrySource, SourceError, SourceResult, SyncOutcome};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ETAG, IF_NONE_MATCH};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

const REGISTRY_FILE: &str = "apps.yml";
const ETAG_FILE: &str = "apps.yml-etag";

#[derive(Debug, Clone)]
pub struct CdnRegistrySource {
    client: reqwest::Client,
    url: String,
    cache_dir: PathBuf,
}

impl CdnRegistrySource {
    pub fn new(
        base_url: &str,
        cache_dir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> SourceResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: format!("{}/{REGISTRY_FILE}", base_url.trim_end_matches('/')),
            cache_dir: cache_dir.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn registry_path(&self) -> PathBuf {
        self.cache_dir.join(REGISTRY_FILE)
    }

    fn etag_path(&self) -> PathBuf {
        self.cache_dir.join(ETAG_FILE)
    }

    async fn cached_etag(&self) -> Option<String> {
        // Without a cached blob the token is meaningless; force a full fetch.
        if !tokio::fs::try_exists(self.registry_path())
            .await
            .unwrap_or(false)
        {
            return None;
        }
        tokio::fs::read_to_string(self.etag_path())
            .await
            .ok()
            .map(|etag| etag.trim().to_string())
            .filter(|etag| !etag.is_empty())
    }
}

#[async_trait]
impl RegistrySource for CdnRegistrySource {
    async fn sync(&self) -> SourceResult<SyncOutcome> {
        let mut request = self.client.get(&self.url);
        if let Some(etag) = self.cached_etag().await {
            request = request.header(IF_NONE_MATCH, etag);
        }
        let response = request.send().await?;
        match response.status() {
            StatusCode::NOT_MODIFIED => return Ok(SyncOutcome::Unchanged),
            status if !status.is_success() => return Err(SourceError::Status(status.as_u16())),
            _ => {}
        }

        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;

        tokio::fs::create_dir_all(&self.cache_dir).await?;
        write_atomically(&self.registry_path(), &body).await?;
        match etag {
            Some(etag) => write_atomically(&self.etag_path(), etag.as_bytes()).await?,
            None => match tokio::fs::remove_file(self.etag_path()).await {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            },
        }
        tracing::info!(url = %self.url, bytes = body.len(), "registry downloaded");
        Ok(SyncOutcome::Updated)
    }

    async fn current_registry_text(&self) -> SourceResult<Option<String>> {
        match tokio::fs::read_to_string(self.registry_path()).await {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn describe(&self) -> String {
        format!("cdn:{}", self.url)
    }
}

/// Temp file next to `path`, unique per target file and per process so
/// instances sharing a cache directory never rename each other's bytes.
fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{file_name}.{}.tmp", std::process::id()))
}

async fn write_atomically(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let tmp = temp_path_for(path);
    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(contents).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(&tmp, path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_atomically_replaces_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("apps.yml");
        write_atomically(&path, b"first").await.expect("write");
        write_atomically(&path, b"second").await.expect("write");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "second");
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn temp_paths_differ_per_target_file() {
        let dir = Path::new("/cache");
        let registry_tmp = temp_path_for(&dir.join(REGISTRY_FILE));
        let etag_tmp = temp_path_for(&dir.join(ETAG_FILE));
        assert_ne!(registry_tmp, etag_tmp);
        assert_eq!(registry_tmp.parent(), Some(dir));
        assert!(
            registry_tmp
                .to_string_lossy()
                .ends_with(&format!("apps.yml.{}.tmp", std::process::id()))
        );
    }

    #[tokio::test]
    async fn registry_and_etag_writes_do_not_clobber() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blob = dir.path().join(REGISTRY_FILE);
        let etag = dir.path().join(ETAG_FILE);
        write_atomically(&blob, b"apps: []").await.expect("blob");
        write_atomically(&etag, b"\"v1\"").await.expect("etag");
        assert_eq!(std::fs::read_to_string(&blob).expect("blob"), "apps: []");
        assert_eq!(std::fs::read_to_string(&etag).expect("etag"), "\"v1\"");
        let leftovers = std::fs::read_dir(dir.path())
            .expect("read_dir")
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn cached_etag_requires_cached_blob() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source =
            CdnRegistrySource::new("https://cdn.example.com/", dir.path(), Duration::from_secs(1))
                .expect("source");
        assert_eq!(source.url(), "https://cdn.example.com/apps.yml");

        std::fs::write(dir.path().join(ETAG_FILE), "\"abc\"\n").expect("etag");
        assert_eq!(source.cached_etag().await, None);

        std::fs::write(dir.path().join(REGISTRY_FILE), "apps: []").expect("blob");
        assert_eq!(source.cached_etag().await.as_deref(), Some("\"abc\""));
    }
}
