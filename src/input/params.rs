// Caller parameter shaping for the module input

use crate::error::{Result, TriggerError};
use crate::models::Params;
use serde_json::Value;

/// Render a JSON value the way the pipeline's Python side prints it
///
/// Lists become `[10, 4]`, strings inside lists are single-quoted,
/// booleans are `True`/`False` and null is `None`.
pub fn python_repr(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(python_repr).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("'{}': {}", k, python_repr(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}

/// Prefix every key with `ks_` unless it already has it; list values are
/// stringified with [`python_repr`]
pub fn namespace_ks_params(params: &Params) -> Params {
    params
        .iter()
        .map(|(key, value)| {
            let key = if key.starts_with("ks_") {
                key.clone()
            } else {
                format!("ks_{}", key)
            };
            let value = match value {
                Value::Array(_) => Value::String(python_repr(value)),
                other => other.clone(),
            };
            (key, value)
        })
        .collect()
}

/// Numeric parameter with a default; a present but non-numeric value is an error
pub fn param_f64(params: &Params, key: &str, default: f64) -> Result<f64> {
    match params.get(key) {
        None => Ok(default),
        Some(value) => value.as_f64().ok_or_else(|| TriggerError::InvalidParam {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_python_repr() {
        assert_eq!(python_repr(&json!([10, 4])), "[10, 4]");
        assert_eq!(python_repr(&json!(["a", "b"])), "['a', 'b']");
        assert_eq!(python_repr(&json!([true, null, 1.5])), "[True, None, 1.5]");
        assert_eq!(python_repr(&json!([[1], []])), "[[1], []]");
    }

    #[test]
    fn test_namespace_ks_params() {
        let mut params = Params::new();
        params.insert("Th".into(), json!([10, 4]));
        params.insert("ks_CAR".into(), json!(1));
        params.insert("refPerMS".into(), json!(2.0));

        let namespaced = namespace_ks_params(&params);
        assert_eq!(namespaced["ks_Th"], json!("[10, 4]"));
        assert_eq!(namespaced["ks_CAR"], json!(1));
        assert_eq!(namespaced["ks_refPerMS"], json!(2.0));
        assert_eq!(namespaced.len(), 3);
    }

    #[test]
    fn test_param_f64() {
        let mut params = Params::new();
        params.insert("refPerMS".into(), json!(1));
        assert_eq!(param_f64(&params, "refPerMS", 2.0).unwrap(), 1.0);
        assert_eq!(param_f64(&params, "missing", 2.0).unwrap(), 2.0);
    }

    #[test]
    fn test_param_f64_rejects_non_numeric() {
        let mut params = Params::new();
        params.insert("refPerMS".into(), json!("1.5"));
        let err = param_f64(&params, "refPerMS", 2.0).unwrap_err();
        assert!(matches!(err, TriggerError::InvalidParam { ref key, ref value } if key == "refPerMS" && value == "\"1.5\""));

        params.insert("refPerMS".into(), json!(null));
        assert!(param_f64(&params, "refPerMS", 2.0).is_err());
    }
}
