use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("timeout contacting {provider}")]
    Timeout { provider: String },

    #[error("rate limited by {provider}")]
    RateLimited { provider: String },

    #[error("upstream error from {provider}: {message}")]
    Upstream {
        provider: String,
        message: String,
        status: Option<u16>,
    },

    #[error("auth failed for {provider}: {message}")]
    AuthFailed { provider: String, message: String },

    #[error("schema parse error from {provider}: {message}")]
    SchemaParse { provider: String, message: String },

    #[error("request error from {provider}: {source}")]
    Request {
        provider: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("all {attempted} execution providers failed")]
    AllProvidersExhausted {
        attempted: usize,
        last: Option<Box<ExecError>>,
    },

    #[error("caller is not authenticated")]
    Unauthenticated,

    #[error("snippet store error: {0}")]
    Store(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExecError {
    /// Map a reqwest failure onto the transport taxonomy, keeping timeouts distinct.
    pub fn from_reqwest(provider: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                provider: provider.to_string(),
            }
        } else {
            Self::Request {
                provider: provider.to_string(),
                source: err,
            }
        }
    }

    /// Extract provider name from structured error variants.
    /// Returns None for variants that don't carry provider context.
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::Timeout { provider }
            | Self::RateLimited { provider }
            | Self::Upstream { provider, .. }
            | Self::AuthFailed { provider, .. }
            | Self::SchemaParse { provider, .. }
            | Self::Request { provider, .. } => Some(provider),
            Self::AllProvidersExhausted { last, .. } => last.as_deref().and_then(Self::provider),
            _ => None,
        }
    }

    /// True for failures that one provider hit while being contacted.
    /// These make the orchestrator move on to the next provider.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::RateLimited { .. }
                | Self::Upstream { .. }
                | Self::AuthFailed { .. }
                | Self::SchemaParse { .. }
                | Self::Request { .. }
        )
    }

    /// Produce a sanitized message safe for showing in the editor.
    /// Does not leak internal URLs, connection details, or upstream error bodies.
    pub fn user_message(&self) -> String {
        match self {
            Self::Timeout { provider } => format!("{provider} timed out"),
            Self::RateLimited { provider } => {
                format!("rate limited by {provider}, try again shortly")
            }
            Self::Upstream {
                provider, status, ..
            } => match status {
                Some(code) => format!("{provider} responded with HTTP {code}"),
                None => format!("{provider} returned an unusable response"),
            },
            Self::AuthFailed { provider, .. } => format!("authentication failed for {provider}"),
            Self::SchemaParse { provider, .. } => {
                format!("failed to parse response from {provider}")
            }
            Self::Request { provider, .. } => format!("request to {provider} failed"),
            Self::AllProvidersExhausted { attempted, last } => match last {
                Some(last) => format!(
                    "all {attempted} execution providers failed (last: {})",
                    last.user_message()
                ),
                None => "no execution providers are configured".to_string(),
            },
            Self::Unauthenticated => "sign in to save code history".to_string(),
            Self::Store(_) => "code history is unavailable".to_string(),
            Self::Config(msg) => format!("config error: {msg}"),
            Self::Io(_) => "local storage error".to_string(),
        }
    }
}
