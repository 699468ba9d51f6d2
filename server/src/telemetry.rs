//! Logging setup with optional OpenTelemetry export.
//!
//! Console logging is always on and filtered by `RUST_LOG`. When an OTLP
//! endpoint is configured and answers a quick TCP probe, traces and logs are
//! also shipped to the collector.

use opentelemetry::trace::TracerProvider;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const PROBE_TIMEOUT: Duration = Duration::from_millis(100);

/// Strip the scheme and path so the endpoint can be resolved as `host:port`.
fn host_port(endpoint: &str) -> &str {
    let rest = endpoint
        .trim_start_matches("http://")
        .trim_start_matches("https://");
    rest.split('/').next().unwrap_or(rest)
}

fn is_reachable(endpoint: &str) -> bool {
    host_port(endpoint)
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .map(|addr| TcpStream::connect_timeout(&addr, PROBE_TIMEOUT).is_ok())
        .unwrap_or(false)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_console() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_otlp(endpoint: &str, service_name: &str) -> anyhow::Result<()> {
    let resource = opentelemetry_sdk::Resource::builder()
        .with_service_name(service_name.to_string())
        .build();

    let trace_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let trace_provider = SdkTracerProvider::builder()
        .with_batch_exporter(trace_exporter)
        .with_resource(resource.clone())
        .build();

    let tracer = trace_provider.tracer(service_name.to_string());
    opentelemetry::global::set_tracer_provider(trace_provider);

    let log_exporter = opentelemetry_otlp::LogExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let log_provider = SdkLoggerProvider::builder()
        .with_batch_exporter(log_exporter)
        .with_resource(resource)
        .build();

    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .with(OpenTelemetryTracingBridge::new(&log_provider))
        .init();

    Ok(())
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_telemetry(otel_endpoint: Option<&str>, service_name: &str) {
    let Some(endpoint) = otel_endpoint else {
        init_console();
        tracing::debug!("OTEL_EXPORTER_OTLP_ENDPOINT not set, using console logging only");
        return;
    };

    if !is_reachable(endpoint) {
        init_console();
        tracing::info!(
            "OpenTelemetry endpoint {} not reachable, using console logging only",
            endpoint
        );
        return;
    }

    match init_otlp(endpoint, service_name) {
        Ok(()) => tracing::info!(
            "OpenTelemetry enabled, exporting traces and logs to {} as {}",
            endpoint,
            service_name
        ),
        Err(e) => {
            init_console();
            tracing::warn!("Failed to set up OTLP export, using console logging only: {}", e);
        }
    }
}
