// Error handling utilities for consistent error messages and exit codes

use crate::models::Module;
use std::process;

/// Exit with a user error (exit code 1)
/// User errors are for invalid input, missing recordings, misconfigured installs, etc.
pub fn user_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Validate a parameter name (letters, digits, underscores)
pub fn validate_param_key(key: &str) -> Result<(), String> {
    if key.trim().is_empty() {
        return Err("Parameter name cannot be empty".to_string());
    }

    if key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(format!("Invalid parameter name: '{}'. Parameter names can only contain letters, numbers, and underscores.", key))
    }
}

/// Validate a Kilosort version suffix (e.g. `2.5`, `3.0`)
pub fn validate_ks_version(version: &str) -> Result<String, String> {
    let version = version.trim();
    if version.is_empty() {
        return Err("Kilosort version cannot be empty".to_string());
    }
    if version.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-') {
        Ok(version.to_string())
    } else {
        Err(format!("Invalid Kilosort version: '{}'", version))
    }
}

/// Validate a module name against the pipeline stages
pub fn validate_module_name(name: &str) -> Result<Module, String> {
    Module::from_str(name).ok_or_else(|| {
        let known: Vec<&str> = Module::ALL.iter().map(|m| m.as_str()).collect();
        format!("Unknown module '{}'. Expected one of: {}", name, known.join(", "))
    })
}
