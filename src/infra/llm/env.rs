use std::time::Duration;

use crate::domain::GenerationError;

pub(crate) const ENV_GLOBAL_TIMEOUT_SECS: &str = "CODESMITH_LLM_TIMEOUT_SECS";

pub(crate) fn read_env_var(name: &str) -> Result<Option<String>, GenerationError> {
    match std::env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(error) => Err(GenerationError::validation(format!(
            "{name} could not be read: {error}"
        ))),
    }
}

/// Like [`read_env_var`], but treats blank values as unset and trims the rest.
pub(crate) fn read_non_empty_env_var(name: &str) -> Result<Option<String>, GenerationError> {
    Ok(read_env_var(name)?.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }))
}

pub(crate) fn parse_timeout_seconds(name: &str, value: &str) -> Result<Duration, GenerationError> {
    let parsed = value.trim().parse::<u64>().map_err(|_| {
        GenerationError::validation(format!("{name} must be a positive integer in seconds"))
    })?;
    if parsed == 0 {
        return Err(GenerationError::validation(format!(
            "{name} must be greater than 0 seconds"
        )));
    }
    Ok(Duration::from_secs(parsed))
}

pub(crate) fn read_timeout_from_env(name: &str) -> Result<Option<Duration>, GenerationError> {
    let Some(value) = read_env_var(name)? else {
        return Ok(None);
    };
    Ok(Some(parse_timeout_seconds(name, &value)?))
}

pub(crate) fn resolve_timeout_with_global_fallback<F>(
    backend_timeout: Option<Duration>,
    read_global_timeout: F,
    default_timeout: Duration,
) -> Result<Duration, GenerationError>
where
    F: FnOnce() -> Result<Option<Duration>, GenerationError>,
{
    if let Some(timeout) = backend_timeout {
        return Ok(timeout);
    }

    Ok(read_global_timeout()?.unwrap_or(default_timeout))
}

pub(crate) fn read_backend_timeout(
    backend_timeout_env: &str,
    default_timeout: Duration,
) -> Result<Duration, GenerationError> {
    resolve_timeout_with_global_fallback(
        read_timeout_from_env(backend_timeout_env)?,
        || read_timeout_from_env(ENV_GLOBAL_TIMEOUT_SECS),
        default_timeout,
    )
}

pub(crate) fn read_bool_env(name: &str) -> Result<bool, GenerationError> {
    let Some(value) = read_env_var(name)? else {
        return Ok(false);
    };

    parse_bool(&value).ok_or_else(|| {
        GenerationError::validation(format!(
            "{name} must be one of: true,false,1,0,yes,no,on,off"
        ))
    })
}

pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
