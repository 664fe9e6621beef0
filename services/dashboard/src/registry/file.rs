//! Local-file registry source.
//!
//! Re-reads the file on every sync and reports `Updated` when its content hash
//! changes. Operators replace the file atomically (rename over it).
use crate::registry::{RegistrySource, SourceResult, SyncOutcome, content_revision};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::PathBuf;

#[derive(Debug)]
pub struct FileRegistrySource {
    path: PathBuf,
    last_revision: Mutex<Option<String>>,
}

impl FileRegistrySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_revision: Mutex::new(None),
        }
    }
}

#[async_trait]
impl RegistrySource for FileRegistrySource {
    async fn sync(&self) -> SourceResult<SyncOutcome> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        let revision = content_revision(&text);
        let mut last = self.last_revision.lock();
        if last.as_deref() == Some(revision.as_str()) {
            return Ok(SyncOutcome::Unchanged);
        }
        *last = Some(revision);
        Ok(SyncOutcome::Updated)
    }

    async fn current_registry_text(&self) -> SourceResult<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn sync_reports_changes_by_content() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, "apps: []").expect("write");
        let source = FileRegistrySource::new(file.path());

        assert_eq!(source.sync().await.expect("sync"), SyncOutcome::Updated);
        assert_eq!(source.sync().await.expect("sync"), SyncOutcome::Unchanged);

        std::fs::write(file.path(), "apps:\n  - application: {}\n").expect("rewrite");
        assert_eq!(source.sync().await.expect("sync"), SyncOutcome::Updated);
        let text = source.current_registry_text().await.expect("read");
        assert_eq!(text.as_deref(), Some("apps:\n  - application: {}\n"));
    }

    #[tokio::test]
    async fn missing_file_has_no_text_and_sync_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = FileRegistrySource::new(dir.path().join("apps.yml"));
        assert!(source.current_registry_text().await.expect("read").is_none());
        assert!(source.sync().await.is_err());
        assert!(source.describe().starts_with("file:"));
    }
}
