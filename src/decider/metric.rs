// SPDX-License-Identifier: MIT

//! Fire-and-forget inference metrics
//!
//! Each inference outcome is written to stdout as one CloudWatch Embedded
//! Metric Format (EMF) line. Emission runs on a detached task and can never
//! fail or delay the response that triggered it.

use futures::FutureExt;
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use tokio::io::AsyncWriteExt;

use crate::decider::config::{Config, DEFAULT_METRICS_NAMESPACE};

pub const METRIC_NAME: &str = "policy_inference";

static EMITTER: OnceCell<Emitter> = OnceCell::new();

/// Stage of the inference pipeline that failed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cause {
    BindJson,
    ParseDot,
    Execute,
}

impl Cause {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cause::BindJson => "bind_json",
            Cause::ParseDot => "parse_dot",
            Cause::Execute => "execute",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Success,
    Error(Cause),
}

impl Outcome {
    fn result(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Error(_) => "error",
        }
    }

    fn cause(&self) -> Option<&'static str> {
        match self {
            Outcome::Success => None,
            Outcome::Error(cause) => Some(cause.as_str()),
        }
    }
}

/// Process-wide metric settings
#[derive(Debug, Clone)]
pub struct Emitter {
    namespace: String,
    enabled: bool,
}

impl Emitter {
    pub fn new(namespace: impl Into<String>, enabled: bool) -> Self {
        Self {
            namespace: namespace.into(),
            enabled,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.metrics_namespace.clone(), config.metrics_enabled)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new(DEFAULT_METRICS_NAMESPACE, true)
    }
}

/// Install the global emitter; returns false if one was already set
pub fn init(config: &Config) -> bool {
    EMITTER.set(Emitter::from_config(config)).is_ok()
}

/// The global emitter, initialized with defaults on first use
pub fn emitter() -> &'static Emitter {
    EMITTER.get_or_init(Emitter::default)
}

pub fn emit_success() {
    emit(Outcome::Success);
}

pub fn emit_error(cause: Cause) {
    emit(Outcome::Error(cause));
}

/// Spawn a detached task writing one EMF line for `outcome`
///
/// Outside a tokio runtime this is a no-op.
pub fn emit(outcome: Outcome) {
    let emitter = emitter();
    if !emitter.enabled() {
        return;
    }

    let handle = match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle,
        Err(_) => {
            log::debug!("No runtime available, dropping {:?} metric", outcome);
            return;
        }
    };

    let line = match render(
        emitter.namespace(),
        outcome,
        chrono::Utc::now().timestamp_millis(),
    ) {
        Ok(line) => line,
        Err(e) => {
            log::error!("Failed to encode metric: {}", e);
            return;
        }
    };

    handle.spawn(async move {
        match AssertUnwindSafe(write_line(line)).catch_unwind().await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::error!("Failed to write metric: {}", e),
            Err(_) => log::error!("Metric emission panicked"),
        }
    });
}

async fn write_line(mut line: String) -> std::io::Result<()> {
    line.push('\n');
    let mut stdout = tokio::io::stdout();
    stdout.write_all(line.as_bytes()).await?;
    stdout.flush().await
}

#[derive(Serialize)]
struct EmfPayload<'a> {
    #[serde(rename = "_aws")]
    aws: EmfMetadata<'a>,
    result: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cause: Option<&'a str>,
    policy_inference: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct EmfMetadata<'a> {
    timestamp: i64,
    cloud_watch_metrics: Vec<EmfDirective<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct EmfDirective<'a> {
    namespace: &'a str,
    dimensions: Vec<Vec<&'a str>>,
    metrics: Vec<EmfMetric<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct EmfMetric<'a> {
    name: &'a str,
    unit: &'a str,
}

/// Render one EMF document for `outcome`
pub fn render(
    namespace: &str,
    outcome: Outcome,
    timestamp_ms: i64,
) -> Result<String, serde_json::Error> {
    let mut dimensions = vec!["result"];
    if outcome.cause().is_some() {
        dimensions.push("cause");
    }

    let payload = EmfPayload {
        aws: EmfMetadata {
            timestamp: timestamp_ms,
            cloud_watch_metrics: vec![EmfDirective {
                namespace,
                dimensions: vec![dimensions],
                metrics: vec![EmfMetric {
                    name: METRIC_NAME,
                    unit: "Count",
                }],
            }],
        },
        result: outcome.result(),
        cause: outcome.cause(),
        policy_inference: 1,
    };
    serde_json::to_string(&payload)
}
