//! Logging and OTLP span export.

use anyhow::Result;
use opentelemetry::{global, trace::TracerProvider as _, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace, Resource};
use std::{env::var, sync::OnceLock, time::Duration};
use tracing::{debug, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};
use ulid::Ulid;

// gRPC sensible default
const DEFAULT_OTLP_ENDPOINT: &str = "http://localhost:4317";

static TRACER_PROVIDER: OnceLock<trace::TracerProvider> = OnceLock::new();

/// Prefix bare endpoints with https, tonic requires a scheme.
fn with_scheme(endpoint: &str) -> String {
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{}", endpoint.trim_end_matches('/'))
    }
}

fn resource() -> Resource {
    // Generate or take service.instance.id
    let instance_id = var("OTEL_SERVICE_INSTANCE_ID").unwrap_or_else(|_| Ulid::new().to_string());

    Resource::new(vec![
        KeyValue::new("service.name", env!("CARGO_PKG_NAME")),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        KeyValue::new("service.instance.id", instance_id),
    ])
}

fn init_tracer() -> Result<trace::Tracer> {
    let endpoint = var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .map_or_else(|_| DEFAULT_OTLP_ENDPOINT.to_string(), |ep| with_scheme(&ep));

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&endpoint)
        .with_timeout(Duration::from_secs(3))
        .build()?;

    let provider = trace::TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_resource(resource())
        .build();

    // Keep a handle for shutdown, then register globally
    let _ = TRACER_PROVIDER.set(provider.clone());
    global::set_tracer_provider(provider.clone());

    Ok(provider.tracer(env!("CARGO_PKG_NAME")))
}

fn log_filter(level: Level) -> Result<EnvFilter> {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
        .add_directive("hyper=error".parse()?)
        .add_directive("tokio=error".parse()?)
        .add_directive("opentelemetry_sdk=warn".parse()?);

    Ok(filter)
}

/// Install the global tracing subscriber.
///
/// Log formatting is always on; span export kicks in only when
/// `OTEL_EXPORTER_OTLP_ENDPOINT` points at an OTLP gRPC collector.
///
/// # Errors
///
/// Returns an error if a filter directive fails to parse or a subscriber
/// is already installed
pub fn init(verbosity_level: Option<Level>) -> Result<()> {
    let filter = log_filter(verbosity_level.unwrap_or(Level::ERROR))?;

    let fmt_layer = fmt::layer()
        .with_file(false)
        .with_line_number(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty();

    let registry = Registry::default().with(fmt_layer);

    if var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok() {
        let otel_layer = tracing_opentelemetry::layer().with_tracer(init_tracer()?);
        tracing::subscriber::set_global_default(registry.with(otel_layer).with(filter))?;
    } else {
        tracing::subscriber::set_global_default(registry.with(filter))?;
    }

    Ok(())
}

/// Flush and stop the tracer provider (noop when tracing never started)
pub fn shutdown_tracer() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        debug!("flushing spans before shutdown");
        let _ = provider.shutdown();
        debug!("tracer provider stopped");
    }
}
