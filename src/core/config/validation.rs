use serde_json::{Map, Value};

use super::ConfigError;

pub fn validate_config(config: &Value) -> Result<(), ConfigError> {
    let root = config
        .as_object()
        .ok_or_else(|| config_type_error("root", "object"))?;

    if let Some(server) = expect_optional_object(root, "server")? {
        validate_optional_string_field(server, "server.host", "host")?;
        validate_u64_field(server, "server.port", "port", 0, 65535)?;
        validate_string_array_field(
            server,
            "server.cors_allowed_origins",
            "cors_allowed_origins",
        )?;
    }

    if let Some(completion) = expect_optional_object(root, "completion")? {
        validate_optional_string_field(completion, "completion.base_url", "base_url")?;
        validate_optional_string_field(completion, "completion.model", "model")?;
        validate_f64_field(
            completion,
            "completion.temperature",
            "temperature",
            0.0,
            2.0,
        )?;
        validate_u64_field(
            completion,
            "completion.timeout_secs",
            "timeout_secs",
            1,
            600,
        )?;
    }

    if let Some(retrieval) = expect_optional_object(root, "retrieval")? {
        validate_optional_string_field(retrieval, "retrieval.index_path", "index_path")?;
        validate_optional_string_field(
            retrieval,
            "retrieval.embedding_model",
            "embedding_model",
        )?;
        validate_optional_string_field(
            retrieval,
            "retrieval.embedding_base_url",
            "embedding_base_url",
        )?;
        validate_u64_field(retrieval, "retrieval.top_k", "top_k", 1, 100)?;
        validate_u64_field(
            retrieval,
            "retrieval.timeout_secs",
            "timeout_secs",
            1,
            600,
        )?;
    }

    if let Some(session) = expect_optional_object(root, "session")? {
        validate_u64_field(
            session,
            "session.idle_ttl_secs",
            "idle_ttl_secs",
            1,
            31_536_000,
        )?;
        validate_u64_field(
            session,
            "session.sweep_interval_secs",
            "sweep_interval_secs",
            1,
            86_400,
        )?;
        validate_cookie_name(session)?;
    }

    Ok(())
}

fn validate_cookie_name(session: &Map<String, Value>) -> Result<(), ConfigError> {
    let Some(value) = session.get("cookie_name") else {
        return Ok(());
    };
    let Some(name) = value.as_str() else {
        return Err(config_type_error("session.cookie_name", "string"));
    };
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(ConfigError::Invalid(
            "Invalid config at 'session.cookie_name': use ASCII letters, digits, '_' or '-'"
                .to_string(),
        ));
    }
    Ok(())
}

fn expect_optional_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, ConfigError> {
    match root.get(key) {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(config_type_error(key, "object")),
        None => Ok(None),
    }
}

fn validate_u64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: u64,
    max: u64,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(number) = value.as_u64() else {
        return Err(config_type_error(path, "integer"));
    };
    if number < min || number > max {
        return Err(ConfigError::Invalid(format!(
            "Invalid config at '{}': must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn validate_f64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: f64,
    max: f64,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(number) = value.as_f64() else {
        return Err(config_type_error(path, "number"));
    };
    if !(min..=max).contains(&number) {
        return Err(ConfigError::Invalid(format!(
            "Invalid config at '{}': must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn validate_optional_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(text) = value.as_str() else {
        return Err(config_type_error(path, "string"));
    };
    if text.trim().is_empty() {
        return Err(ConfigError::Invalid(format!(
            "Invalid config at '{}': value cannot be empty",
            path
        )));
    }
    Ok(())
}

fn validate_string_array_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(items) = value.as_array() else {
        return Err(config_type_error(path, "array of strings"));
    };
    for (index, item) in items.iter().enumerate() {
        let Some(text) = item.as_str() else {
            return Err(config_type_error(&format!("{}[{}]", path, index), "string"));
        };
        if text.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "Invalid config at '{}[{}]': value cannot be empty",
                path, index
            )));
        }
    }
    Ok(())
}

fn config_type_error(path: &str, expected: &str) -> ConfigError {
    ConfigError::Invalid(format!(
        "Invalid config at '{}': expected {}",
        path, expected
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_config_is_valid() {
        assert!(validate_config(&json!({})).is_ok());
    }

    #[test]
    fn rejects_non_object_root() {
        let err = validate_config(&json!(["server"])).unwrap_err();
        assert!(err.to_string().contains("'root'"));
    }

    #[test]
    fn rejects_out_of_range_temperature() {
        let err = validate_config(&json!({"completion": {"temperature": 3.5}})).unwrap_err();
        assert!(err.to_string().contains("completion.temperature"));
    }

    #[test]
    fn rejects_zero_top_k() {
        let err = validate_config(&json!({"retrieval": {"top_k": 0}})).unwrap_err();
        assert!(err.to_string().contains("retrieval.top_k"));
    }

    #[test]
    fn rejects_blank_model_name() {
        let err = validate_config(&json!({"completion": {"model": "  "}})).unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn rejects_cookie_names_with_separators() {
        let err = validate_config(&json!({"session": {"cookie_name": "a;b"}})).unwrap_err();
        assert!(err.to_string().contains("session.cookie_name"));
        assert!(validate_config(&json!({"session": {"cookie_name": "chat-sid_1"}})).is_ok());
    }

    #[test]
    fn rejects_non_string_origins() {
        let err =
            validate_config(&json!({"server": {"cors_allowed_origins": ["http://a", 5]}}))
                .unwrap_err();
        assert!(err.to_string().contains("server.cors_allowed_origins[1]"));
    }
}
