use std::time::Instant;

use serde::Serialize;

use crate::dispatch::registry::Registry;
use crate::error::ExecError;
use crate::outcome::{ExecutionOutcome, classify};

/// A provider that failed at the transport level during one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedAttempt {
    pub provider: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub outcome: ExecutionOutcome,
    /// Provider whose result was classified.
    pub provider: String,
    /// Transport failures recorded before `provider` answered.
    pub failed_attempts: Vec<FailedAttempt>,
    pub duration_seconds: f64,
}

/// Sequential-fallback execution over an ordered provider list.
///
/// Only transport failures move on to the next provider. The first provider
/// that returns a result is authoritative, even when that result is a
/// compile or runtime failure. At most one provider call is in flight.
pub struct Orchestrator {
    registry: Registry,
}

impl Orchestrator {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub async fn run(&self, source: &str, stdin: &str) -> Result<RunReport, ExecError> {
        let start = Instant::now();
        let mut failed_attempts = Vec::new();
        let mut last_error: Option<ExecError> = None;

        for provider in self.registry.providers() {
            match provider.execute(source, stdin).await {
                Ok(raw) => {
                    let outcome = classify(&raw);
                    tracing::info!(
                        provider = provider.name(),
                        outcome = outcome.kind.as_str(),
                        fallbacks = failed_attempts.len(),
                        "execution completed"
                    );
                    return Ok(RunReport {
                        outcome,
                        provider: provider.name().to_string(),
                        failed_attempts,
                        duration_seconds: start.elapsed().as_secs_f64(),
                    });
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), "provider failed, trying next: {e}");
                    failed_attempts.push(FailedAttempt {
                        provider: provider.name().to_string(),
                        message: e.user_message(),
                    });
                    last_error = Some(e);
                }
            }
        }

        tracing::error!(attempted = failed_attempts.len(), "all execution providers failed");
        Err(ExecError::AllProvidersExhausted {
            attempted: failed_attempts.len(),
            last: last_error.map(Box::new),
        })
    }
}
