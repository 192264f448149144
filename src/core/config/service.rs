use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{json, Map, Value};

use super::app_config::AppConfig;
use super::paths::AppPaths;
use super::validation::validate_config;
use super::ConfigError;

#[derive(Clone)]
pub struct ConfigService {
    paths: Arc<AppPaths>,
}

impl ConfigService {
    pub fn new(paths: Arc<AppPaths>) -> Self {
        Self { paths }
    }

    pub fn config_path(&self) -> PathBuf {
        if let Ok(path) = env::var("MEDICHAT_CONFIG_PATH") {
            return PathBuf::from(path);
        }

        let data_config = self.paths.data_dir.join("config.yml");
        if data_config.exists() {
            return data_config;
        }

        self.paths.project_root.join("config.yml")
    }

    pub fn load_config(&self) -> Result<Value, ConfigError> {
        load_yaml_file(&self.config_path())
    }

    /// Loads `config.yml`, applies environment overrides, validates the
    /// result and resolves it into an [`AppConfig`].
    pub fn load_app_config(&self) -> Result<AppConfig, ConfigError> {
        self.load_app_config_with(|key| env::var(key).ok())
    }

    pub fn load_app_config_with<F>(&self, env: F) -> Result<AppConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file_config = self.load_config()?;
        let overrides = env_overrides(&env)?;
        let merged = deep_merge(&file_config, &overrides);

        validate_config(&merged)?;
        AppConfig::resolve(&merged, &self.paths, env)
    }
}

fn load_yaml_file(path: &Path) -> Result<Value, ConfigError> {
    if !path.exists() {
        return Ok(Value::Object(Map::new()));
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match serde_yaml::from_str::<Value>(&contents) {
        Ok(Value::Null) => Ok(Value::Object(Map::new())),
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err(ConfigError::Invalid(format!(
            "Invalid config in {}: expected a mapping at the root",
            path.display()
        ))),
        Err(err) => Err(ConfigError::Invalid(format!(
            "Failed to parse {}: {}",
            path.display(),
            err
        ))),
    }
}

fn env_overrides<F>(env: &F) -> Result<Value, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut overrides = json!({});

    if let Some(port) = env("PORT") {
        let port = port.trim().parse::<u16>().map_err(|_| {
            ConfigError::Invalid(format!("PORT must be a port number, got '{}'", port))
        })?;
        overrides = deep_merge(&overrides, &json!({ "server": { "port": port } }));
    }
    if let Some(host) = env("MEDICHAT_HOST") {
        overrides = deep_merge(&overrides, &json!({ "server": { "host": host } }));
    }
    if let Some(index_path) = env("MEDICHAT_INDEX_PATH") {
        overrides = deep_merge(&overrides, &json!({ "retrieval": { "index_path": index_path } }));
    }
    if let Some(url) = env("MEDICHAT_EMBEDDING_BASE_URL") {
        overrides = deep_merge(
            &overrides,
            &json!({ "retrieval": { "embedding_base_url": url } }),
        );
    }

    Ok(overrides)
}

fn deep_merge(base: &Value, override_value: &Value) -> Value {
    match (base, override_value) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            let mut merged: Map<String, Value> = base_map.clone();
            for (key, value) in override_map {
                let merged_value = match merged.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), merged_value);
            }
            Value::Object(merged)
        }
        _ => override_value.clone(),
    }
}
