//! SSO dashboard HTTP service entry point.
//!
//! # Purpose
//! Wires configuration, the registry source, the refresh loop, and the HTTP
//! routers, then serves until interrupted.
use anyhow::Context;
use dashboard::app::{AppState, build_router};
use dashboard::config::{DashboardConfig, RegistrySourceConfig};
use dashboard::observability::{self, ServiceIdentity};
use dashboard::registry::{
    CdnRegistrySource, FileRegistrySource, RegistrySnapshot, RegistrySource, refresh_once,
    start_refresh,
};
use std::future::Future;
use std::sync::Arc;

const SERVICE_NAME: &str = "sso-dashboard";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = DashboardConfig::from_env_or_yaml().context("dashboard config")?;
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

fn build_source(config: &DashboardConfig) -> anyhow::Result<Arc<dyn RegistrySource>> {
    let source: Arc<dyn RegistrySource> = match &config.registry_source {
        RegistrySourceConfig::File { path } => Arc::new(FileRegistrySource::new(path.clone())),
        RegistrySourceConfig::Cdn {
            base_url,
            cache_dir,
        } => Arc::new(
            CdnRegistrySource::new(base_url, cache_dir.clone(), config.fetch_timeout())
                .context("build cdn client")?,
        ),
    };
    Ok(source)
}

async fn run_with_shutdown<F>(config: DashboardConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let source = build_source(&config)?;
    let metrics_handle = observability::init_observability(&ServiceIdentity {
        name: SERVICE_NAME,
        registry_source: &source.describe(),
    });
    let snapshot = Arc::new(RegistrySnapshot::new());

    // Serve immediately; an empty snapshot yields zero tiles until a load lands.
    let outcome = refresh_once(source.as_ref(), &snapshot).await;
    tracing::info!(?outcome, source = %source.describe(), "initial registry load");

    let refresh_task = tokio::spawn(start_refresh(
        Arc::clone(&source),
        Arc::clone(&snapshot),
        config.refresh_interval(),
    ));
    let metrics_task = metrics_handle.map(|handle| {
        let metrics_bind = config.metrics_bind;
        tokio::spawn(async move {
            if let Err(err) = observability::serve_metrics(handle, metrics_bind).await {
                tracing::warn!(error = %err, "metrics listener exited");
            }
        })
    });

    let app = build_router(AppState {
        service_name: SERVICE_NAME.to_string(),
        api_version: "v1".to_string(),
        snapshot,
        source_description: source.describe(),
        claims: config.claims.clone(),
    });

    let addr = config.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!(%addr, "dashboard listening");
    tokio::pin!(shutdown);
    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            result?;
        }
        _ = &mut shutdown => {}
    }

    refresh_task.abort();
    let _ = refresh_task.await;
    if let Some(task) = metrics_task {
        task.abort();
        let _ = task.await;
    }
    tracing::info!("dashboard stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_authz::ClaimNamespace;
    use serial_test::serial;
    use std::io::Write;

    fn test_config(registry_path: std::path::PathBuf) -> DashboardConfig {
        DashboardConfig {
            bind_addr: "127.0.0.1:0".parse().expect("bind"),
            metrics_bind: "127.0.0.1:0".parse().expect("metrics"),
            registry_source: RegistrySourceConfig::File {
                path: registry_path,
            },
            refresh_interval_ms: 50,
            fetch_timeout_ms: 500,
            claims: ClaimNamespace::default(),
        }
    }

    #[test]
    fn build_source_describes_backend() {
        let config = test_config("apps.yml".into());
        let source = build_source(&config).expect("source");
        assert_eq!(source.describe(), "file:apps.yml");

        let mut cdn = config.clone();
        cdn.registry_source = RegistrySourceConfig::Cdn {
            base_url: "https://cdn.example.com".to_string(),
            cache_dir: "cache".into(),
        };
        let source = build_source(&cdn).expect("source");
        assert_eq!(source.describe(), "cdn:https://cdn.example.com/apps.yml");
    }

    #[tokio::test]
    #[serial]
    async fn run_with_shutdown_starts_and_stops() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, "apps: []").expect("write");
        run_with_shutdown(test_config(file.path().to_path_buf()), async {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        })
        .await
        .expect("run should stop cleanly");
    }

    #[tokio::test]
    #[serial]
    async fn run_with_shutdown_tolerates_missing_registry() {
        let dir = tempfile::tempdir().expect("tempdir");
        run_with_shutdown(test_config(dir.path().join("apps.yml")), async {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        })
        .await
        .expect("run should stop cleanly");
    }
}
