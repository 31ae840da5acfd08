//! Telemetry — tracing and OpenTelemetry setup for applet hosts.
//!
//! Every invocation sequence runs in its own span, so retries, card swaps
//! and login prompts of one user action show up as one trace.

use opentelemetry::trace::TracerProvider;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, TelemetryConfig};

const DEFAULT_FILTER: &str = "warn,applet_core=info,applet_protocol=info";

/// Initialize the applet telemetry pipeline.
///
/// Sets up:
/// - Log output on stderr (JSON or human-readable, per config)
/// - OpenTelemetry tracing with OTLP export, when enabled
/// - Environment-based log filtering (`RUST_LOG`)
///
/// Logs go to stderr so hosts can keep stdout for their own output.
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.filter.as_deref().unwrap_or(DEFAULT_FILTER)))?;

    let (json_layer, pretty_layer) = match config.log_format {
        LogFormat::Json => (
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            ),
            None,
        ),
        LogFormat::Pretty => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            ),
        ),
    };

    let otel_layer = if config.enabled {
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(&config.otlp_endpoint)
            .build()?;

        let resource = opentelemetry_sdk::Resource::new(vec![
            KeyValue::new("service.name", "adaptive-applet"),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        ]);

        let provider = opentelemetry_sdk::trace::TracerProvider::builder()
            .with_simple_exporter(exporter)
            .with_resource(resource)
            .build();

        let tracer = provider.tracer("adaptive-applet");
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .with(otel_layer)
        .try_init()?;

    Ok(())
}
