pub mod http;
pub mod judge0;
pub mod piston;
pub mod registry;

use async_trait::async_trait;

use crate::error::ExecError;

/// Unprocessed response from one provider, translated into a common shape.
/// Missing or null provider fields are normalized to empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResult {
    pub stdout: String,
    pub stderr: String,
    /// Compiler diagnostics.
    pub compile_output: String,
    /// Human-readable status phrase, for providers that report one.
    pub status: Option<String>,
}

/// A remote service that compiles and runs a Java program.
///
/// Implementations translate their own request/response schema into
/// [`RawResult`]. Any network, HTTP-status or body-decoding failure must be
/// returned as a transport error (see [`ExecError::is_transport`]); a failing
/// *program* is always an `Ok` result.
#[async_trait]
pub trait ExecutionProvider: Send + Sync {
    /// Stable name used in logs and run metadata.
    fn name(&self) -> &str;

    async fn execute(&self, source: &str, stdin: &str) -> Result<RawResult, ExecError>;
}
