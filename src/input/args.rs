// Flat input arguments accepted by the input JSON builder
// Each name has a default; anything outside this list is not part of the pipeline schema.

use crate::models::Params;
use serde_json::{json, Map, Value};

/// Accepted argument names with their defaults
fn default_args() -> Vec<(&'static str, Value)> {
    vec![
        // Paths and recording layout
        ("npx_directory", Value::Null),
        ("continuous_file", Value::Null),
        ("input_meta_path", Value::Null),
        ("extracted_data_directory", Value::Null),
        ("kilosort_output_directory", Value::Null),
        ("kilosort_repository", Value::Null),
        ("spikeGLX_data", json!(true)),
        ("KS2ver", json!("2.5")),
        // CatGT
        ("catGT_run_name", json!("test")),
        ("gate_string", json!("0")),
        ("trigger_string", json!("0,0")),
        ("probe_string", json!("0")),
        ("catGT_stream_string", json!("-ap")),
        ("catGT_car_mode", json!("gblcar")),
        ("catGT_loccar_min_um", json!(40)),
        ("catGT_loccar_max_um", json!(160)),
        ("catGT_maxZ_um", json!(-1)),
        ("catGT_cmd_string", json!("-prb_fld -out_prb_fld -gfix=0.4,0.10,0.02")),
        // Kilosort
        ("ks_make_copy", json!(false)),
        ("ks_remDup", json!(0)),
        ("ks_finalSplits", json!(1)),
        ("ks_labelGood", json!(1)),
        ("ks_saveRez", json!(1)),
        ("ks_copy_fproc", json!(0)),
        ("ks_helper_noise_threshold", json!(20)),
        ("ks_doFilter", json!(0)),
        ("ks_Th", json!("[10,4]")),
        ("ks_CAR", json!(0)),
        ("ks_nblocks", json!(5)),
        ("ks_doDrift", json!(1)),
        ("ks_minfr_goodchannels", json!(0.1)),
        ("ks_whiteningRange_um", json!(32)),
        ("ks_CSBseed", json!(1)),
        ("ks_LTseed", json!(1)),
        ("ks_templateRadius_um", json!(163)),
        // Post-processing
        ("include_pcs", json!(true)),
        ("noise_template_use_rf", json!(true)),
        ("c_Waves_snr_um", json!(160)),
        ("wm_spread_thresh", json!(0.12)),
        ("wm_site_range", json!(16)),
        ("qm_isi_thresh", json!(0.0015)),
    ]
}

/// Whether `key` is an argument the input JSON builder understands
pub fn accepts(key: &str) -> bool {
    default_args().iter().any(|(k, _)| *k == key)
}

/// Defaults overlaid with caller values
#[derive(Debug, Clone)]
pub struct InputArgs {
    values: Map<String, Value>,
}

impl Default for InputArgs {
    fn default() -> Self {
        Self::new()
    }
}

impl InputArgs {
    pub fn new() -> Self {
        let values = default_args()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        Self { values }
    }

    /// Set an accepted argument; returns false (and leaves the set unchanged)
    /// for names outside the schema
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> bool {
        if !accepts(key) {
            return false;
        }
        self.values.insert(key.to_string(), value.into());
        true
    }

    /// Overlay every accepted entry of `params`; returns the names that were dropped
    pub fn overlay(&mut self, params: &Params) -> Vec<String> {
        let mut dropped = Vec::new();
        for (key, value) in params {
            if !self.set(key, value.clone()) {
                dropped.push(key.clone());
            }
        }
        dropped
    }

    pub fn get(&self, key: &str) -> &Value {
        self.values.get(key).unwrap_or(&Value::Null)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = InputArgs::new();
        assert_eq!(args.get_str("catGT_car_mode"), Some("gblcar"));
        assert_eq!(args.get("catGT_loccar_min_um"), &json!(40));
        assert_eq!(args.get("kilosort_repository"), &Value::Null);
    }

    #[test]
    fn test_set_rejects_unknown() {
        let mut args = InputArgs::new();
        assert!(args.set("ks_Th", "[8,3]"));
        assert!(!args.set("refPerMS", 1.5));
        assert_eq!(args.get_str("ks_Th"), Some("[8,3]"));
        assert_eq!(args.get("refPerMS"), &Value::Null);
    }

    #[test]
    fn test_overlay_reports_dropped() {
        let mut params = Params::new();
        params.insert("ks_CAR".into(), json!(1));
        params.insert("ks_refPerMS".into(), json!(2.0));
        params.insert("fs".into(), json!(30000));

        let mut args = InputArgs::new();
        let mut dropped = args.overlay(&params);
        dropped.sort();
        assert_eq!(dropped, vec!["fs".to_string(), "ks_refPerMS".to_string()]);
        assert_eq!(args.get("ks_CAR"), &json!(1));
    }
}
