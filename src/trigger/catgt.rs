use super::{path_string, KilosortTrigger};
use crate::error::Result;
use crate::input::accepts;
use crate::models::{RunIdentity, CATGT_HELPER};
use crate::recording;
use crate::runner::{ModuleInvocation, ModuleRunner};
use serde_json::Value;
use std::path::PathBuf;

/// NI channel extraction used when the caller does not supply one
pub const DEFAULT_NI_EXTRACT_STRING: &str =
    "-XA=0,1,3,500 -iXA=1,3,3,0  -XD=-1,1,50 -XD=-1,2,1.7 -XD=-1,3,5 -iXD=-1,3,5";

const DEFAULT_CAR_MODE: &str = "gblcar";
const DEFAULT_LOCCAR_MIN_UM: i64 = 40;
const DEFAULT_LOCCAR_MAX_UM: i64 = 160;
const DEFAULT_CMD_STRING: &str = "-prb_fld -out_prb_fld -gfix=0.4,0.10,0.02";

fn value_as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl<R: ModuleRunner> KilosortTrigger<R> {
    fn catgt_input_path(&self, id: &RunIdentity) -> PathBuf {
        self.json_dir.join(format!("{}{}_CatGT-input.json", id.session, id.probe))
    }

    fn catgt_output_path(&self, id: &RunIdentity) -> PathBuf {
        self.json_dir.join(format!("{}{}_CatGT-output.json", id.session, id.probe))
    }

    /// Caller params over the CatGT defaults, with stream and extraction
    /// options folded into the command string
    fn catgt_params(&self, probe: &str) -> Vec<(&'static str, Value)> {
        let params = &self.config.params;
        let pick = |key: &str, default: Value| params.get(key).cloned().unwrap_or(default);

        let ni_present = params
            .get("ni_present")
            .and_then(Value::as_bool)
            .unwrap_or(self.config.ni_present);
        let ni_extract_string = params
            .get("ni_extract_string")
            .map(value_as_string)
            .or_else(|| self.config.ni_extract_string.clone())
            .unwrap_or_else(|| DEFAULT_NI_EXTRACT_STRING.to_string());

        let sync_extract = format!("-SY={},-1,6,500", probe);
        let extract_string = if ni_present {
            format!("{} {}", sync_extract, ni_extract_string)
        } else {
            sync_extract
        };
        let cmd_string = value_as_string(&pick("catGT_cmd_string", Value::from(DEFAULT_CMD_STRING)));

        vec![
            ("catGT_car_mode", pick("catGT_car_mode", Value::from(DEFAULT_CAR_MODE))),
            ("catGT_loccar_min_um", pick("catGT_loccar_min_um", Value::from(DEFAULT_LOCCAR_MIN_UM))),
            ("catGT_loccar_max_um", pick("catGT_loccar_max_um", Value::from(DEFAULT_LOCCAR_MAX_UM))),
            ("catGT_cmd_string", Value::from(format!("{} {}", cmd_string, extract_string))),
            ("catGT_stream_string", Value::from(if ni_present { "-ap -ni" } else { "-ap" })),
        ]
    }

    /// Write `<session><probe>_CatGT-input.json`
    ///
    /// Returns `Ok(None)` without touching the filesystem when CatGT was not
    /// requested.
    pub fn generate_catgt_input_json(&mut self) -> Result<Option<PathBuf>> {
        if !self.config.run_catgt {
            log::info!("run_CatGT is set to False, skipping...");
            return Ok(None);
        }

        let id = self.parse_input_filename()?;
        let (first_trig, last_trig) = recording::parse_trigger_range(
            "start,end",
            &id.probe,
            &id.gate,
            &self.config.npx_input_dir,
        )?;
        let trigger_string = format!("{},{}", first_trig, last_trig);

        let input_json = self.catgt_input_path(&id);
        // CatGT always reads the raw recording, even on a forced rerun
        let (meta_path, bin_path) = recording::raw_data_files(&self.config.npx_input_dir, &id.session)?;

        let mut args = self.base_input_args(&meta_path, &bin_path)?;
        args.set("catGT_run_name", id.session.as_str());
        args.set("gate_string", id.gate.as_str());
        args.set("trigger_string", trigger_string);
        args.set("probe_string", id.probe.as_str());
        for (key, value) in self.catgt_params(&id.probe) {
            if accepts(key) {
                args.set(key, value);
            }
        }

        self.write_input(&input_json, &args, &meta_path)?;
        log::debug!("Wrote CatGT input {}", path_string(&input_json));

        self.catgt_input_json = Some(input_json.clone());
        Ok(Some(input_json))
    }

    /// Run CatGT unless it is disabled or already finished (and not forced)
    ///
    /// Returns whether CatGT ran. The finished flag is set only on success.
    pub fn run_catgt(&mut self, force_rerun: bool) -> Result<bool> {
        if !self.config.run_catgt || (self.catgt_finished && !force_rerun) {
            return Ok(false);
        }

        let Some(input_json) = self.generate_catgt_input_json()? else {
            return Ok(false);
        };
        let id = self.parse_input_filename()?;
        let output_json = self.catgt_output_path(&id);

        log::info!("---- Running CatGT ----");
        let invocation = ModuleInvocation::new(CATGT_HELPER, &input_json, &output_json);
        self.runner.run_module(&invocation)?;

        self.catgt_finished = true;
        Ok(true)
    }
}
