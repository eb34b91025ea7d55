use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::dispatch::judge0::JAVA_LANGUAGE_ID;
use crate::dispatch::registry::{BackendConfig, ProviderEntry};
use crate::error::ExecError;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SNIPPETS_DIR: &str = ".javarun/snippets";
const DEFAULT_CONFIG_PATH: &str = ".javarun/config.toml";

pub const JUDGE0_RAPIDAPI_URL: &str = "https://judge0-ce.p.rapidapi.com";
pub const JUDGE0_CE_URL: &str = "https://ce.judge0.com";
pub const PISTON_URL: &str = "https://emkc.org/api/v2/piston";

#[derive(Debug, Clone)]
pub struct Config {
    /// Execution providers in preference order.
    pub providers: Vec<ProviderEntry>,
    /// Per-request transport timeout for every provider call.
    pub request_timeout: Duration,
    pub snippets_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            snippets_dir: PathBuf::from(DEFAULT_SNIPPETS_DIR),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum ProviderKind {
    Judge0,
    Piston,
}

#[derive(Deserialize)]
struct ProviderFile {
    name: String,
    kind: ProviderKind,
    base_url: String,
    /// Name of the environment variable holding the API key (never the key itself).
    api_key_env: Option<String>,
    language_id: Option<u32>,
    language: Option<String>,
    version: Option<String>,
}

#[derive(Deserialize, Default)]
struct ConfigFile {
    request_timeout_secs: Option<u64>,
    snippets_dir: Option<PathBuf>,
    #[serde(default)]
    providers: Vec<ProviderFile>,
}

impl Config {
    /// Default provider chain: RapidAPI-hosted Judge0 (when a key is set),
    /// the public Judge0 CE instance, then Piston.
    pub fn from_env() -> Self {
        Config {
            providers: Self::default_providers(),
            ..Self::env_settings()
        }
    }

    fn default_providers() -> Vec<ProviderEntry> {
        let mut providers = Vec::new();

        match env::var("JUDGE0_RAPIDAPI_KEY") {
            Ok(key) if !key.trim().is_empty() => providers.push(ProviderEntry {
                name: "judge0-rapidapi".to_string(),
                backend: BackendConfig::Judge0 {
                    base_url: JUDGE0_RAPIDAPI_URL.to_string(),
                    api_key: Some(key),
                    language_id: JAVA_LANGUAGE_ID,
                },
            }),
            _ => tracing::warn!("JUDGE0_RAPIDAPI_KEY not set, skipping judge0-rapidapi"),
        }

        providers.push(ProviderEntry {
            name: "judge0-ce".to_string(),
            backend: BackendConfig::Judge0 {
                base_url: JUDGE0_CE_URL.to_string(),
                api_key: None,
                language_id: JAVA_LANGUAGE_ID,
            },
        });

        providers.push(ProviderEntry {
            name: "piston".to_string(),
            backend: BackendConfig::Piston {
                base_url: PISTON_URL.to_string(),
                language: "java".to_string(),
                version: "*".to_string(),
            },
        });

        providers
    }

    /// Timeout and storage settings from the environment, with no providers.
    fn env_settings() -> Self {
        let request_timeout = env::var("JAVARUN_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));

        let snippets_dir = env::var("JAVARUN_SNIPPETS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SNIPPETS_DIR));

        Config {
            providers: Vec::new(),
            request_timeout,
            snippets_dir,
        }
    }

    /// Load from `JAVARUN_CONFIG` (or `.javarun/config.toml`) when present,
    /// otherwise from the environment. A broken file is logged and ignored.
    pub fn load() -> Self {
        let path = env::var("JAVARUN_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        if !path.exists() {
            return Self::from_env();
        }

        match Self::from_file(&path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::error!(path = %path.display(), "ignoring config file: {e}");
                Self::from_env()
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ExecError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Parse a TOML config. An empty `providers` list keeps the default chain.
    pub fn from_toml(text: &str) -> Result<Self, ExecError> {
        let file: ConfigFile =
            toml::from_str(text).map_err(|e| ExecError::Config(e.to_string()))?;

        let mut config = Self::env_settings();

        if let Some(secs) = file.request_timeout_secs {
            if secs == 0 {
                return Err(ExecError::Config(
                    "request_timeout_secs must be positive".to_string(),
                ));
            }
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(dir) = file.snippets_dir {
            config.snippets_dir = dir;
        }
        config.providers = if file.providers.is_empty() {
            Self::default_providers()
        } else {
            file.providers
                .into_iter()
                .map(ProviderFile::into_entry)
                .collect::<Result<_, _>>()?
        };

        Ok(config)
    }
}

impl ProviderFile {
    fn into_entry(self) -> Result<ProviderEntry, ExecError> {
        if self.name.trim().is_empty() {
            return Err(ExecError::Config("provider name must not be empty".to_string()));
        }

        let backend = match self.kind {
            ProviderKind::Judge0 => {
                let api_key = match &self.api_key_env {
                    Some(var) => match env::var(var) {
                        Ok(key) => Some(key),
                        Err(_) => {
                            tracing::warn!(provider = %self.name, "{var} not set, sending no API key");
                            None
                        }
                    },
                    None => None,
                };
                BackendConfig::Judge0 {
                    base_url: self.base_url,
                    api_key,
                    language_id: self.language_id.unwrap_or(JAVA_LANGUAGE_ID),
                }
            }
            ProviderKind::Piston => BackendConfig::Piston {
                base_url: self.base_url,
                language: self.language.unwrap_or_else(|| "java".to_string()),
                version: self.version.unwrap_or_else(|| "*".to_string()),
            },
        };

        Ok(ProviderEntry {
            name: self.name,
            backend,
        })
    }
}
