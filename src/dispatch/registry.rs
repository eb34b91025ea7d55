use std::sync::Arc;

use crate::config::Config;
use crate::dispatch::ExecutionProvider;
use crate::dispatch::http::HttpDispatch;
use crate::dispatch::judge0::Judge0Provider;
use crate::dispatch::piston::PistonProvider;
use crate::error::ExecError;

/// Backend-specific configuration. One variant per request/response shape.
#[derive(Clone, PartialEq, Eq)]
pub enum BackendConfig {
    Judge0 {
        base_url: String,
        api_key: Option<String>,
        language_id: u32,
    },
    Piston {
        base_url: String,
        language: String,
        version: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEntry {
    pub name: String,
    pub backend: BackendConfig,
}

impl ProviderEntry {
    /// Returns the backend type as a string for display purposes.
    pub fn backend_name(&self) -> &'static str {
        match &self.backend {
            BackendConfig::Judge0 { .. } => "judge0",
            BackendConfig::Piston { .. } => "piston",
        }
    }

    pub fn base_url(&self) -> &str {
        match &self.backend {
            BackendConfig::Judge0 { base_url, .. } | BackendConfig::Piston { base_url, .. } => {
                base_url
            }
        }
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Judge0 {
                base_url,
                api_key,
                language_id,
            } => f
                .debug_struct("Judge0")
                .field("base_url", base_url)
                .field("language_id", language_id)
                .field("api_key", &api_key.as_ref().map(|_| "[REDACTED]"))
                .finish(),
            Self::Piston {
                base_url,
                language,
                version,
            } => f
                .debug_struct("Piston")
                .field("base_url", base_url)
                .field("language", language)
                .field("version", version)
                .finish(),
        }
    }
}

/// Ordered set of execution providers, highest preference first.
pub struct Registry {
    providers: Vec<Arc<dyn ExecutionProvider>>,
}

impl Registry {
    /// Build one adapter per configured entry. Configured order is preserved.
    pub fn from_config(config: &Config) -> Result<Self, ExecError> {
        let http = HttpDispatch::new(config.request_timeout)?;

        let providers = config
            .providers
            .iter()
            .map(|entry| -> Arc<dyn ExecutionProvider> {
                match &entry.backend {
                    BackendConfig::Judge0 {
                        base_url,
                        api_key,
                        language_id,
                    } => Arc::new(Judge0Provider::new(
                        entry.name.clone(),
                        base_url.clone(),
                        api_key.clone(),
                        *language_id,
                        http.clone(),
                    )),
                    BackendConfig::Piston {
                        base_url,
                        language,
                        version,
                    } => Arc::new(PistonProvider::new(
                        entry.name.clone(),
                        base_url.clone(),
                        language.clone(),
                        version.clone(),
                        http.clone(),
                    )),
                }
            })
            .collect();

        Ok(Self { providers })
    }

    pub fn from_providers(providers: Vec<Arc<dyn ExecutionProvider>>) -> Self {
        Self { providers }
    }

    pub fn providers(&self) -> &[Arc<dyn ExecutionProvider>] {
        &self.providers
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
