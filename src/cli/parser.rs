// Parameter parsing for command-line overrides and parameter files

use crate::models::Params;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

/// Parse one `key=value` override
///
/// The value is read as JSON when it parses (`2.0`, `true`, `[10,4]`),
/// otherwise it is kept as a plain string.
pub fn parse_param_override(token: &str) -> Result<(String, Value), String> {
    let (key, raw) = token
        .split_once('=')
        .ok_or_else(|| format!("Invalid parameter '{}'. Expected key=value.", token))?;
    let key = key.trim();
    crate::cli::error::validate_param_key(key)?;

    let raw = raw.trim();
    let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

/// Load a parameter file; it must hold a JSON object
pub fn load_params_file(path: &Path) -> Result<Params> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read parameter file: {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse parameter file: {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("Parameter file {} must contain a JSON object", path.display()),
    }
}

/// Parameter file (if any) with command-line overrides applied on top
pub fn build_params(file: Option<&Path>, overrides: &[String]) -> Result<Params> {
    let mut params = match file {
        Some(path) => load_params_file(path)?,
        None => Params::new(),
    };
    for token in overrides {
        let (key, value) = parse_param_override(token).map_err(anyhow::Error::msg)?;
        params.insert(key, value);
    }
    Ok(params)
}
