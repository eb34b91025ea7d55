use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ExecError;

pub const MAX_RESPONSE_BYTES: usize = 2 * 1024 * 1024; // 2MB

/// Shared JSON-over-HTTP transport for the provider adapters.
///
/// The request timeout is the only timeout applied to a run; there is no
/// separate client-side abort.
#[derive(Clone)]
pub struct HttpDispatch {
    client: Client,
}

impl HttpDispatch {
    pub fn new(request_timeout: Duration) -> Result<Self, ExecError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(request_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| ExecError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// POST `body` as JSON and decode the JSON response into `T`.
    pub async fn post_json<B, T>(
        &self,
        provider: &str,
        url: &str,
        headers: &[(&str, String)],
        body: &B,
    ) -> Result<T, ExecError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(body);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| ExecError::from_reqwest(provider, e))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ExecError::RateLimited {
                provider: provider.to_string(),
            });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(ExecError::AuthFailed {
                provider: provider.to_string(),
                message: format!("{status}"),
            });
        }

        // Catch-all for any non-success status (4xx, 5xx, 3xx that wasn't followed)
        if !status.is_success() {
            let error_bytes = response.bytes().await.unwrap_or_default();
            let truncated = &error_bytes[..error_bytes.len().min(MAX_RESPONSE_BYTES)];
            let text = String::from_utf8_lossy(truncated);
            return Err(ExecError::Upstream {
                provider: provider.to_string(),
                message: format!("{status}: {text}"),
                status: Some(status.as_u16()),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ExecError::from_reqwest(provider, e))?;

        if bytes.len() > MAX_RESPONSE_BYTES {
            return Err(ExecError::Upstream {
                provider: provider.to_string(),
                message: format!(
                    "response too large: {} bytes (max {})",
                    bytes.len(),
                    MAX_RESPONSE_BYTES
                ),
                status: None,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| ExecError::SchemaParse {
            provider: provider.to_string(),
            message: format!("failed to parse response: {e}"),
        })
    }
}
