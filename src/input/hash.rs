// Content hash of an input document, used to name the status ledger

use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Deterministic identifier for a configuration document
///
/// Object keys serialize in sorted order, so equal documents always produce
/// the same bytes. The first 16 bytes of the SHA-256 digest form the UUID.
pub fn config_hash(document: &Value) -> Uuid {
    let canonical = document.to_string();
    let digest = Sha256::digest(canonical.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Uuid::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hash_is_stable() {
        let a = json!({"b": 1, "a": {"y": [1, 2], "x": null}});
        let b = json!({"a": {"x": null, "y": [1, 2]}, "b": 1});
        assert_eq!(config_hash(&a), config_hash(&b));
    }

    #[test]
    fn test_hash_changes_with_value() {
        let a = json!({"quality_metrics_params": {"isi_threshold": 0.002}});
        let b = json!({"quality_metrics_params": {"isi_threshold": 0.0015}});
        assert_ne!(config_hash(&a), config_hash(&b));
    }
}
