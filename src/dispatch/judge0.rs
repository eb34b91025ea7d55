use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::dispatch::http::HttpDispatch;
use crate::dispatch::{ExecutionProvider, RawResult};
use crate::error::ExecError;

/// Judge0 CE language id for Java (OpenJDK 13.0.1).
pub const JAVA_LANGUAGE_ID: u32 = 62;

/// Adapter for Judge0-compatible APIs (`POST /submissions?wait=true`).
///
/// Judge0 blocks until the program finishes and reports a status phrase such
/// as "Accepted", "Compilation Error", "Runtime Error (NZEC)" or
/// "Time Limit Exceeded".
pub struct Judge0Provider {
    name: String,
    base_url: String,
    api_key: Option<String>,
    language_id: u32,
    http: HttpDispatch,
}

#[derive(Serialize)]
struct SubmissionRequest<'a> {
    language_id: u32,
    source_code: &'a str,
    stdin: &'a str,
}

#[derive(Deserialize)]
struct SubmissionResponse {
    stdout: Option<String>,
    stderr: Option<String>,
    compile_output: Option<String>,
    status: Option<SubmissionStatus>,
}

#[derive(Deserialize)]
struct SubmissionStatus {
    description: Option<String>,
}

impl Judge0Provider {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: Option<String>,
        language_id: u32,
        http: HttpDispatch,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            api_key,
            language_id,
            http,
        }
    }

    pub fn submissions_url(&self) -> String {
        format!(
            "{}/submissions?base64_encoded=false&wait=true",
            self.base_url.trim_end_matches('/')
        )
    }

    /// RapidAPI-hosted Judge0 wants the key plus the host it was issued for.
    fn auth_headers(&self) -> Vec<(&'static str, String)> {
        let Some(key) = &self.api_key else {
            return Vec::new();
        };
        let mut headers = vec![("X-RapidAPI-Key", key.clone())];
        if let Some(host) = reqwest::Url::parse(&self.base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
        {
            headers.push(("X-RapidAPI-Host", host));
        }
        headers
    }
}

#[async_trait]
impl ExecutionProvider for Judge0Provider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, source: &str, stdin: &str) -> Result<RawResult, ExecError> {
        let body = SubmissionRequest {
            language_id: self.language_id,
            source_code: source,
            stdin,
        };

        let response: SubmissionResponse = self
            .http
            .post_json(&self.name, &self.submissions_url(), &self.auth_headers(), &body)
            .await?;

        Ok(RawResult {
            stdout: response.stdout.unwrap_or_default(),
            stderr: response.stderr.unwrap_or_default(),
            compile_output: response.compile_output.unwrap_or_default(),
            status: response.status.and_then(|s| s.description),
        })
    }
}
