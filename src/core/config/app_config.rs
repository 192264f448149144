use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;

use super::defaults::*;
use super::paths::AppPaths;
use super::ConfigError;

/// Completion-service credential. Never printed.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(****)")
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub timeout: Duration,
    pub api_key: Credential,
}

#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    pub index_path: PathBuf,
    pub embedding_model: String,
    pub embedding_base_url: String,
    pub top_k: usize,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub idle_ttl: Duration,
    pub sweep_interval: Duration,
    pub cookie_name: String,
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub completion: CompletionConfig,
    pub retrieval: RetrievalConfig,
    pub session: SessionConfig,
}

impl AppConfig {
    /// Builds the typed configuration from an already validated document.
    ///
    /// `env` is consulted only for the completion credential; every other
    /// environment override has been merged into `document` by the caller.
    pub fn resolve<F>(document: &Value, paths: &AppPaths, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = env(CREDENTIAL_ENV_VAR)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingCredential(CREDENTIAL_ENV_VAR))?;

        let server = ServerConfig {
            host: string_at(document, &["server", "host"]).unwrap_or_else(|| DEFAULT_HOST.into()),
            port: u64_at(document, &["server", "port"])
                .map(|v| v as u16)
                .unwrap_or(DEFAULT_PORT),
            cors_allowed_origins: lookup(document, &["server", "cors_allowed_origins"])
                .and_then(|v| v.as_array())
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| item.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default(),
        };

        let completion = CompletionConfig {
            base_url: string_at(document, &["completion", "base_url"])
                .unwrap_or_else(|| DEFAULT_COMPLETION_BASE_URL.into()),
            model: string_at(document, &["completion", "model"])
                .unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.into()),
            temperature: lookup(document, &["completion", "temperature"])
                .and_then(|v| v.as_f64())
                .unwrap_or(DEFAULT_TEMPERATURE),
            timeout: Duration::from_secs(
                u64_at(document, &["completion", "timeout_secs"])
                    .unwrap_or(DEFAULT_COMPLETION_TIMEOUT_SECS),
            ),
            api_key: Credential::new(api_key),
        };

        let index_path = string_at(document, &["retrieval", "index_path"])
            .unwrap_or_else(|| DEFAULT_INDEX_PATH.into());
        let retrieval = RetrievalConfig {
            index_path: paths.resolve(Path::new(&index_path)),
            embedding_model: string_at(document, &["retrieval", "embedding_model"])
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.into()),
            embedding_base_url: string_at(document, &["retrieval", "embedding_base_url"])
                .unwrap_or_else(|| DEFAULT_EMBEDDING_BASE_URL.into()),
            top_k: u64_at(document, &["retrieval", "top_k"])
                .map(|v| v as usize)
                .unwrap_or(DEFAULT_TOP_K),
            timeout: Duration::from_secs(
                u64_at(document, &["retrieval", "timeout_secs"])
                    .unwrap_or(DEFAULT_RETRIEVAL_TIMEOUT_SECS),
            ),
        };

        let session = SessionConfig {
            idle_ttl: Duration::from_secs(
                u64_at(document, &["session", "idle_ttl_secs"])
                    .unwrap_or(DEFAULT_SESSION_IDLE_TTL_SECS),
            ),
            sweep_interval: Duration::from_secs(
                u64_at(document, &["session", "sweep_interval_secs"])
                    .unwrap_or(DEFAULT_SESSION_SWEEP_INTERVAL_SECS),
            ),
            cookie_name: string_at(document, &["session", "cookie_name"])
                .unwrap_or_else(|| DEFAULT_SESSION_COOKIE.into()),
        };

        Ok(Self {
            server,
            completion,
            retrieval,
            session,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn lookup<'a>(document: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(document, |node, key| node.get(key))
}

fn string_at(document: &Value, path: &[&str]) -> Option<String> {
    lookup(document, path)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
}

fn u64_at(document: &Value, path: &[&str]) -> Option<u64> {
    lookup(document, path).and_then(|v| v.as_u64())
}
