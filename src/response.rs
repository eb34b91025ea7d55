use serde::Serialize;

use crate::error::ExecError;
use crate::orchestrator::RunReport;
use crate::session::RunView;

pub const CONNECTIVITY_HINT: &str = "Note: Java code execution uses an external API. Please check your internet connection and try again.";

/// Editor-facing run payload.
/// `status` is one of the outcome kinds, `"error"` for an execution failure,
/// or `"busy"` when a run was already in flight.
#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub status: &'static str,
    pub content: String,
    pub metadata: RunMetadata,
}

#[derive(Debug, Serialize)]
pub struct RunMetadata {
    pub provider_used: Option<String>,
    pub failed_attempts: Vec<String>,
    #[serde(serialize_with = "serialize_finite_f64")]
    pub duration_seconds: f64,
    pub stdin_detected: bool,
}

/// Serialize f64, clamping non-finite values (NaN, Inf) to 0.0.
fn serialize_finite_f64<S: serde::Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(if v.is_finite() { *v } else { 0.0 })
}

/// The per-provider error behind a failed run, unwrapping exhaustion.
fn last_failure(error: &ExecError) -> Option<&ExecError> {
    match error {
        ExecError::AllProvidersExhausted { last, .. } => last.as_deref(),
        other if other.provider().is_some() => Some(other),
        _ => None,
    }
}

impl RunResponse {
    pub fn completed(report: RunReport, stdin_detected: bool) -> Self {
        Self {
            status: report.outcome.kind.as_str(),
            content: report.outcome.text,
            metadata: RunMetadata {
                provider_used: Some(report.provider),
                failed_attempts: report
                    .failed_attempts
                    .into_iter()
                    .map(|a| format!("{}: {}", a.provider, a.message))
                    .collect(),
                duration_seconds: report.duration_seconds,
                stdin_detected,
            },
        }
    }

    pub fn execution_failed(error: &ExecError, stdin_detected: bool) -> Self {
        let failed_attempts = match (error.provider(), last_failure(error)) {
            (Some(provider), Some(cause)) => vec![format!("{provider}: {}", cause.user_message())],
            _ => Vec::new(),
        };
        Self {
            status: "error",
            content: format!(
                "Execution failed: {}\n\n{CONNECTIVITY_HINT}",
                error.user_message()
            ),
            metadata: RunMetadata {
                provider_used: None,
                failed_attempts,
                duration_seconds: 0.0,
                stdin_detected,
            },
        }
    }

    pub fn busy(stdin_detected: bool) -> Self {
        Self {
            status: "busy",
            content: "A run is already in progress.".to_string(),
            metadata: RunMetadata {
                provider_used: None,
                failed_attempts: Vec::new(),
                duration_seconds: 0.0,
                stdin_detected,
            },
        }
    }

    pub fn from_view(view: RunView, stdin_detected: bool) -> Self {
        match view {
            RunView::Completed(report) => Self::completed(report, stdin_detected),
            RunView::Failed(e) => Self::execution_failed(&e, stdin_detected),
            RunView::Busy => Self::busy(stdin_detected),
        }
    }

    /// Never fails: a serialization error is reported inside the JSON itself.
    pub fn to_json(&self) -> String {
        match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                let escaped = e.to_string().replace('\\', "\\\\").replace('"', "\\\"");
                format!(
                    r#"{{"status":"error","content":"serialization failed: {escaped}","metadata":{{}}}}"#
                )
            }
        }
    }
}
