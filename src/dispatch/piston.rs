use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::dispatch::http::HttpDispatch;
use crate::dispatch::{ExecutionProvider, RawResult};
use crate::error::ExecError;

/// Adapter for the Piston execution API (`POST /execute`).
///
/// Piston reports no status phrase; its results are classified purely from
/// the run and compile text.
pub struct PistonProvider {
    name: String,
    base_url: String,
    language: String,
    version: String,
    http: HttpDispatch,
}

/// Java requires the public class to live in a file of the same name.
pub const SOURCE_FILE_NAME: &str = "Main.java";

#[derive(Serialize)]
struct ExecuteRequest<'a> {
    language: &'a str,
    version: &'a str,
    files: [SourceFile<'a>; 1],
    stdin: &'a str,
}

#[derive(Serialize)]
struct SourceFile<'a> {
    name: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ExecuteResponse {
    run: Option<Stage>,
    compile: Option<Stage>,
}

#[derive(Deserialize, Default)]
struct Stage {
    stdout: Option<String>,
    stderr: Option<String>,
}

impl PistonProvider {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        language: impl Into<String>,
        version: impl Into<String>,
        http: HttpDispatch,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            language: language.into(),
            version: version.into(),
            http,
        }
    }

    pub fn execute_url(&self) -> String {
        format!("{}/execute", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ExecutionProvider for PistonProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, source: &str, stdin: &str) -> Result<RawResult, ExecError> {
        let body = ExecuteRequest {
            language: &self.language,
            version: &self.version,
            files: [SourceFile {
                name: SOURCE_FILE_NAME,
                content: source,
            }],
            stdin,
        };

        let response: ExecuteResponse = self
            .http
            .post_json(&self.name, &self.execute_url(), &[], &body)
            .await?;

        // A failed javac leaves out the run stage; only a body with neither stage is unusable.
        let (run, compile) = match (response.run, response.compile) {
            (None, None) => {
                return Err(ExecError::SchemaParse {
                    provider: self.name.clone(),
                    message: "response has neither a run nor a compile stage".to_string(),
                });
            }
            (run, compile) => (run.unwrap_or_default(), compile.unwrap_or_default()),
        };

        Ok(RawResult {
            stdout: run.stdout.unwrap_or_default(),
            stderr: run.stderr.unwrap_or_default(),
            compile_output: compile.stderr.unwrap_or_default(),
            status: None,
        })
    }
}
