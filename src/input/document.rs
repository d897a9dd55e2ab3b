// Nested input JSON document read by the ecephys_spike_sorting modules

use crate::error::{Result, TriggerError};
use crate::input::args::InputArgs;
use crate::recording::SpikeGlxMeta;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

/// `<base>/<name>` as a JSON string, or null when `base` is unset
fn join_path(base: &Value, name: &str) -> Value {
    match base.as_str() {
        Some(dir) => Value::String(Path::new(dir).join(name).to_string_lossy().into_owned()),
        None => Value::Null,
    }
}

/// Assemble the full module input document from flat arguments
pub fn build_document(args: &InputArgs, meta: &SpikeGlxMeta) -> Value {
    let ks_out = args.get("kilosort_output_directory");

    json!({
        "directories": {
            "npx_directory": args.get("npx_directory"),
            "extracted_data_directory": args.get("extracted_data_directory"),
            "kilosort_output_directory": ks_out,
            "kilosort_output_tmp": join_path(ks_out, "kilosort_tmp"),
        },
        "ephys_params": {
            "sample_rate": meta.sample_rate(),
            "num_channels": meta.num_channels(),
            "probe_type": meta.probe_type(),
            "ap_band_file": args.get("continuous_file"),
            "input_meta_path": args.get("input_meta_path"),
            "cluster_group_file_name": "cluster_group.tsv",
        },
        "catGT_helper_params": {
            "run_name": args.get("catGT_run_name"),
            "gate_string": args.get("gate_string"),
            "trigger_string": args.get("trigger_string"),
            "probe_string": args.get("probe_string"),
            "stream_string": args.get("catGT_stream_string"),
            "car_mode": args.get("catGT_car_mode"),
            "loccar_inner_um": args.get("catGT_loccar_min_um"),
            "loccar_outer_um": args.get("catGT_loccar_max_um"),
            "maxZ_um": args.get("catGT_maxZ_um"),
            "cmdStr": args.get("catGT_cmd_string"),
        },
        "kilosort_helper_params": {
            "kilosort_repository": args.get("kilosort_repository"),
            "kilosort_version": args.get("KS2ver"),
            "spikeGLX_data": args.get("spikeGLX_data"),
            "ks_make_copy": args.get("ks_make_copy"),
            "doFilter": args.get("ks_doFilter"),
            "noise_threshold": args.get("ks_helper_noise_threshold"),
            "kilosort2_params": {
                "Th": args.get("ks_Th"),
                "CAR": args.get("ks_CAR"),
                "nblocks": args.get("ks_nblocks"),
                "doDrift": args.get("ks_doDrift"),
                "minfr_goodchannels": args.get("ks_minfr_goodchannels"),
                "whiteningRange_um": args.get("ks_whiteningRange_um"),
                "templateRadius_um": args.get("ks_templateRadius_um"),
                "CSBseed": args.get("ks_CSBseed"),
                "LTseed": args.get("ks_LTseed"),
                "remDup": args.get("ks_remDup"),
                "finalSplits": args.get("ks_finalSplits"),
                "labelGood": args.get("ks_labelGood"),
                "saveRez": args.get("ks_saveRez"),
                "copy_fproc": args.get("ks_copy_fproc"),
            },
        },
        "ks_postprocessing_params": {
            "within_unit_overlap_window": 0.000166,
            "between_unit_overlap_window": 0.000166,
            "between_unit_dist_um": 5,
            "deletion_mode": "lowAmpCluster",
            "include_pcs": args.get("include_pcs"),
        },
        "noise_waveform_params": {
            "use_random_forest": args.get("noise_template_use_rf"),
        },
        "mean_waveform_params": {
            "mean_waveforms_file": join_path(ks_out, "mean_waveforms.npy"),
            "spread_threshold": args.get("wm_spread_thresh"),
            "site_range": args.get("wm_site_range"),
            "snr_radius_um": args.get("c_Waves_snr_um"),
        },
        "quality_metrics_params": {
            "isi_threshold": args.get("qm_isi_thresh"),
            "min_isi": 0.00,
            "max_radius_um": 68,
            "include_pcs": args.get("include_pcs"),
        },
        "cluster_metrics": {
            "cluster_metrics_file": join_path(ks_out, "metrics.csv"),
        },
        "waveform_metrics": {
            "waveform_metrics_file": join_path(ks_out, "waveform_metrics.csv"),
        },
    })
}

/// Build the document and write it as pretty JSON to `path`
pub fn write_input_json(path: &Path, args: &InputArgs, meta: &SpikeGlxMeta) -> Result<Value> {
    let document = build_document(args, meta);
    let content = serde_json::to_string_pretty(&document).map_err(|e| TriggerError::json(path, e))?;
    fs::write(path, content).map_err(|e| TriggerError::io(path, e))?;
    Ok(document)
}
