//! Observability wiring for the dashboard service.
//!
//! # Purpose
//! Installs the `tracing` subscriber, exports spans over OTLP when a collector
//! is configured, extracts W3C trace context from inbound requests, and serves
//! Prometheus metrics on their own listener.
//!
//! # Notes
//! - Every exported span carries the service version and the registry source
//!   (`file:...` or `cdn:...`), so traces from instances fed by different
//!   registries can be told apart.
//! - Initialization runs once per process; later calls only hand back the
//!   metrics handle.
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use opentelemetry::KeyValue;
use opentelemetry::global;
use opentelemetry::propagation::Extractor;
use opentelemetry::trace::TracerProvider;
use opentelemetry_sdk::Resource;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static METRICS_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();
static OBS_INIT: OnceLock<()> = OnceLock::new();
static PROPAGATOR_INIT: OnceLock<()> = OnceLock::new();

/// Identity attached to every exported span.
#[derive(Debug, Clone)]
pub struct ServiceIdentity<'a> {
    pub name: &'a str,
    /// `RegistrySource::describe()` of the configured source.
    pub registry_source: &'a str,
}

pub fn init_observability(identity: &ServiceIdentity<'_>) -> Option<PrometheusHandle> {
    OBS_INIT.get_or_init(|| {
        global::set_text_map_propagator(
            opentelemetry_sdk::propagation::TraceContextPropagator::new(),
        );

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer());
        let installed = match otlp_tracer_provider(identity) {
            Some(provider) => {
                let tracer = provider.tracer(identity.name.to_string());
                subscriber
                    .with(tracing_opentelemetry::layer().with_tracer(tracer))
                    .try_init()
            }
            None => subscriber.try_init(),
        };
        if installed.is_ok() {
            tracing::info!(
                service = identity.name,
                registry_source = identity.registry_source,
                "observability initialized"
            );
        }
    });

    install_metrics_recorder()
}

fn otlp_tracer_provider(
    identity: &ServiceIdentity<'_>,
) -> Option<opentelemetry_sdk::trace::SdkTracerProvider> {
    // No collector configured means spans stay local to the fmt layer.
    std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok()?;
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()
        .map_err(|err| eprintln!("otlp exporter disabled: {err}"))
        .ok()?;
    let resource = Resource::builder_empty()
        .with_attributes(resource_attributes(identity))
        .build();
    Some(
        opentelemetry_sdk::trace::SdkTracerProvider::builder()
            .with_batch_exporter(exporter)
            .with_resource(resource)
            .build(),
    )
}

fn resource_attributes(identity: &ServiceIdentity<'_>) -> Vec<KeyValue> {
    let mut attrs = vec![
        KeyValue::new("service.name", identity.name.to_string()),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        KeyValue::new(
            "dashboard.registry.source",
            identity.registry_source.to_string(),
        ),
    ];
    let instance = std::env::var("DASHBOARD_INSTANCE_ID").or_else(|_| std::env::var("HOSTNAME"));
    if let Ok(value) = instance {
        attrs.push(KeyValue::new("service.instance.id", value));
    }
    if let Ok(value) = std::env::var("DEPLOYMENT_ENVIRONMENT") {
        attrs.push(KeyValue::new("deployment.environment", value));
    }
    attrs
}

pub fn trace_context_from_headers(headers: &axum::http::HeaderMap) -> opentelemetry::Context {
    PROPAGATOR_INIT.get_or_init(|| {
        global::set_text_map_propagator(
            opentelemetry_sdk::propagation::TraceContextPropagator::new(),
        );
    });
    global::get_text_map_propagator(|prop| prop.extract(&HeaderMapExtractor(headers)))
}

struct HeaderMapExtractor<'a>(&'a axum::http::HeaderMap);

impl<'a> Extractor for HeaderMapExtractor<'a> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|name| name.as_str()).collect()
    }
}

pub async fn serve_metrics(handle: PrometheusHandle, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve_metrics_with_listener(handle, listener, std::future::pending()).await
}

async fn serve_metrics_with_listener<F>(
    handle: PrometheusHandle,
    listener: tokio::net::TcpListener,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = axum::Router::new().route(
        "/metrics",
        axum::routing::get(move || async move { handle.render() }),
    );
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
}

fn install_metrics_recorder() -> Option<PrometheusHandle> {
    METRICS_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::warn!(error = %err, "failed to install metrics recorder");
                None
            }
        })
        .clone()
}
