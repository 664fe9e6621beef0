use anyhow::{Context, Result, bail};
use dashboard_authz::ClaimNamespace;
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 60_000;
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_REGISTRY_PATH: &str = "data/apps.yml";
const DEFAULT_CACHE_DIR: &str = "data";

// Where registry text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrySourceConfig {
    // Local file, re-read and hashed on every refresh.
    File { path: PathBuf },
    // `<base_url>/apps.yml`, cached under `cache_dir` with its ETag.
    Cdn { base_url: String, cache_dir: PathBuf },
}

// Dashboard service configuration sourced from environment variables.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    pub registry_source: RegistrySourceConfig,
    pub refresh_interval_ms: u64,
    pub fetch_timeout_ms: u64,
    pub claims: ClaimNamespace,
}

#[derive(Debug, Deserialize)]
struct DashboardConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    registry_path: Option<String>,
    cdn_url: Option<String>,
    cache_dir: Option<String>,
    refresh_interval_ms: Option<u64>,
    fetch_timeout_ms: Option<u64>,
    emails_claim: Option<String>,
    groups_claim: Option<String>,
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("DASHBOARD_BIND")
            .unwrap_or_else(|_| "0.0.0.0:8000".to_string())
            .parse()
            .with_context(|| "parse DASHBOARD_BIND")?;
        let metrics_bind = std::env::var("DASHBOARD_METRICS_BIND")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .with_context(|| "parse DASHBOARD_METRICS_BIND")?;
        let cache_dir = std::env::var("DASHBOARD_CACHE_DIR")
            .unwrap_or_else(|_| DEFAULT_CACHE_DIR.to_string());
        // A CDN URL takes precedence over a local registry file.
        let registry_source = match std::env::var("DASHBOARD_CDN_URL") {
            Ok(base_url) if !base_url.trim().is_empty() => RegistrySourceConfig::Cdn {
                base_url: base_url.trim().trim_end_matches('/').to_string(),
                cache_dir: PathBuf::from(cache_dir),
            },
            _ => RegistrySourceConfig::File {
                path: PathBuf::from(
                    std::env::var("DASHBOARD_REGISTRY_PATH")
                        .unwrap_or_else(|_| DEFAULT_REGISTRY_PATH.to_string()),
                ),
            },
        };
        let refresh_interval_ms = std::env::var("DASHBOARD_REFRESH_INTERVAL_MS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(DEFAULT_REFRESH_INTERVAL_MS);
        let fetch_timeout_ms = std::env::var("DASHBOARD_FETCH_TIMEOUT_MS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_MS);
        let mut claims = ClaimNamespace::default();
        if let Ok(value) = std::env::var("DASHBOARD_EMAILS_CLAIM") {
            claims.emails_claim = value;
        }
        if let Ok(value) = std::env::var("DASHBOARD_GROUPS_CLAIM") {
            claims.groups_claim = value;
        }
        Ok(Self {
            bind_addr,
            metrics_bind,
            registry_source,
            refresh_interval_ms,
            fetch_timeout_ms,
            claims,
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("DASHBOARD_CONFIG") {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read DASHBOARD_CONFIG: {path}"))?;
            config.apply_yaml(&contents)?;
        }
        Ok(config)
    }

    fn apply_yaml(&mut self, contents: &str) -> Result<()> {
        let override_cfg: DashboardConfigOverride =
            serde_yaml::from_str(contents).with_context(|| "parse dashboard config yaml")?;
        if let Some(value) = override_cfg.bind_addr {
            self.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
        }
        if let Some(value) = override_cfg.metrics_bind {
            self.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
        }
        match (override_cfg.cdn_url, override_cfg.registry_path) {
            (Some(_), Some(_)) => bail!("set either cdn_url or registry_path, not both"),
            (Some(base_url), None) => {
                let cache_dir = override_cfg
                    .cache_dir
                    .map(PathBuf::from)
                    .or_else(|| match &self.registry_source {
                        RegistrySourceConfig::Cdn { cache_dir, .. } => Some(cache_dir.clone()),
                        RegistrySourceConfig::File { .. } => None,
                    })
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR));
                self.registry_source = RegistrySourceConfig::Cdn {
                    base_url: base_url.trim_end_matches('/').to_string(),
                    cache_dir,
                };
            }
            (None, Some(path)) => {
                self.registry_source = RegistrySourceConfig::File {
                    path: PathBuf::from(path),
                };
            }
            (None, None) => {
                if let (Some(dir), RegistrySourceConfig::Cdn { cache_dir, .. }) =
                    (override_cfg.cache_dir, &mut self.registry_source)
                {
                    *cache_dir = PathBuf::from(dir);
                }
            }
        }
        if let Some(value) = override_cfg.refresh_interval_ms.filter(|value| *value > 0) {
            self.refresh_interval_ms = value;
        }
        if let Some(value) = override_cfg.fetch_timeout_ms.filter(|value| *value > 0) {
            self.fetch_timeout_ms = value;
        }
        if let Some(value) = override_cfg.emails_claim {
            self.claims.emails_claim = value;
        }
        if let Some(value) = override_cfg.groups_claim {
            self.claims.groups_claim = value;
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}
