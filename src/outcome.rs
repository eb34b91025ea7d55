use serde::Serialize;

use crate::dispatch::RawResult;

pub const COMPILE_FAILED_MESSAGE: &str = "Compilation failed with no output.";
pub const RUNTIME_FAILED_MESSAGE: &str = "Runtime error occurred.";
pub const TIMEOUT_MESSAGE: &str = "Time Limit Exceeded: Your code took too long to execute.";
pub const NO_OUTPUT_MARKER: &str = "(no output)";

const STATUS_COMPILATION_ERROR: &str = "compilation error";
const STATUS_RUNTIME_ERROR_PREFIX: &str = "runtime error";
const STATUS_TIME_LIMIT_EXCEEDED: &str = "time limit exceeded";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    CompileError,
    RuntimeError,
    Timeout,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::CompileError => "compile_error",
            Self::RuntimeError => "runtime_error",
            Self::Timeout => "timeout",
        }
    }
}

/// Normalized result of one run. The only result type the editor consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionOutcome {
    pub kind: OutcomeKind,
    pub text: String,
}

impl ExecutionOutcome {
    fn new(kind: OutcomeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Classify a provider result. Provider-reported status is consulted before
/// any text heuristic, so a "Compilation Error" with stray stderr stays a
/// compile error.
pub fn classify(raw: &RawResult) -> ExecutionOutcome {
    let status = raw
        .status
        .as_deref()
        .map(|s| s.trim().to_ascii_lowercase())
        .unwrap_or_default();

    if status == STATUS_COMPILATION_ERROR
        || (!raw.compile_output.is_empty() && raw.stdout.is_empty())
    {
        let text = first_non_empty(&[raw.compile_output.as_str(), raw.stderr.as_str()])
            .unwrap_or(COMPILE_FAILED_MESSAGE);
        return ExecutionOutcome::new(OutcomeKind::CompileError, text);
    }

    if status.starts_with(STATUS_RUNTIME_ERROR_PREFIX) {
        let text =
            first_non_empty(&[raw.stderr.as_str(), raw.stdout.as_str()]).unwrap_or(RUNTIME_FAILED_MESSAGE);
        return ExecutionOutcome::new(OutcomeKind::RuntimeError, text);
    }

    if status == STATUS_TIME_LIMIT_EXCEEDED {
        return ExecutionOutcome::new(OutcomeKind::Timeout, TIMEOUT_MESSAGE);
    }

    if !raw.stderr.is_empty() {
        return ExecutionOutcome::new(OutcomeKind::RuntimeError, raw.stderr.as_str());
    }

    if raw.stdout.is_empty() {
        ExecutionOutcome::new(OutcomeKind::Success, NO_OUTPUT_MARKER)
    } else {
        ExecutionOutcome::new(OutcomeKind::Success, raw.stdout.as_str())
    }
}

fn first_non_empty<'a>(candidates: &[&'a str]) -> Option<&'a str> {
    candidates.iter().copied().find(|s| !s.is_empty())
}
