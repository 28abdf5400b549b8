//! BPA Guard Lambda - CloudFormation custom resource enforcing account-level
//! S3 Block Public Access.
//!
//! The function receives custom-resource requests from CloudFormation, turns
//! on all four Block Public Access flags for the account on `Create`, and PUTs
//! the result to the request's `ResponseURL`.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `LOG_FORMAT` | `json` | `json` or `text` |
//! | `CALLBACK_TIMEOUT_SECS` | `30` | Timeout for the response PUT |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |
//! | `AWS_ENDPOINT_URL` | *(unset)* | Endpoint override, read by `aws-config` |

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, SdkConfig};
use lambda_runtime::{LambdaEvent, run, service_fn};
use tracing::info;
use tracing_subscriber::EnvFilter;

use bpa_guard_core::{BpaConfig, LogFormat};
use bpa_guard_model::CustomResourceResponse;
use bpa_guard_reconciler::aws::{S3ControlStore, SnsNotifier, StsIdentityProvider};
use bpa_guard_reconciler::{BpaReconciler, HttpResponseSink};

/// Handler version reported at cold start.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(config: &BpaConfig) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(&config.log_level)
            .with_context(|| format!("invalid log level filter: {}", config.log_level))?
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(false);

    match config.log_format {
        LogFormat::Json => builder.json().with_current_span(true).init(),
        LogFormat::Text => builder.init(),
    }

    Ok(())
}

/// Build the reconciler with AWS-backed collaborators.
fn build_reconciler(sdk_config: &SdkConfig, config: &BpaConfig) -> Result<BpaReconciler> {
    let sink = HttpResponseSink::new(callback_timeout(config))?;

    Ok(BpaReconciler::new(
        Arc::new(StsIdentityProvider::new(aws_sdk_sts::Client::new(sdk_config))),
        Arc::new(S3ControlStore::new(aws_sdk_s3control::Client::new(
            sdk_config,
        ))),
        Arc::new(SnsNotifier::new(aws_sdk_sns::Client::new(sdk_config))),
        Arc::new(sink),
    ))
}

fn callback_timeout(config: &BpaConfig) -> Duration {
    Duration::from_secs(config.callback_timeout_secs.max(1))
}

/// Handle one invocation.
///
/// The payload is taken as raw JSON so a malformed request still gets a
/// `FAILED` response. Only a body without a readable `ResponseURL` fails the
/// invocation itself.
async fn handle(
    reconciler: &BpaReconciler,
    event: LambdaEvent<serde_json::Value>,
) -> Result<CustomResourceResponse, lambda_runtime::Error> {
    let (payload, context) = event.into_parts();
    info!(
        aws_request_id = %context.request_id,
        request_type = payload.get("RequestType").and_then(serde_json::Value::as_str),
        "invocation started"
    );
    Ok(reconciler.handle_raw(&payload).await?)
}

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    let config = BpaConfig::from_env();

    init_tracing(&config)?;

    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let reconciler = build_reconciler(&sdk_config, &config)?;

    info!(
        log_format = ?config.log_format,
        callback_timeout_secs = config.callback_timeout_secs,
        region = ?sdk_config.region(),
        version = VERSION,
        "starting BPA Guard handler",
    );

    run(service_fn(|event| handle(&reconciler, event))).await
}
