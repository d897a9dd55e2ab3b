use super::{path_string, KilosortTrigger};
use crate::error::{Result, TriggerError};
use crate::input::{config_hash, namespace_ks_params, param_f64};
use crate::models::{Module, ModuleStatus, RunIdentity};
use crate::repo::{LedgerEntries, StatusLedger};
use crate::runner::{ModuleInvocation, ModuleRunner};
use serde_json::Value;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Outcome of one `run_modules` call
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub config_hash: Uuid,
    pub ledger_path: PathBuf,
    pub catgt_ran: bool,
    pub executed: Vec<Module>,
    pub skipped: Vec<Module>,
}

/// Refractory period used for the ISI threshold when `refPerMS` is absent
const DEFAULT_REF_PER_MS: f64 = 2.0;
const DEFAULT_C_WAVES_SNR_UM: i64 = 160;

fn module_base(id: &RunIdentity) -> String {
    format!("{}_imec{}", id.session, id.probe)
}

impl<R: ModuleRunner> KilosortTrigger<R> {
    fn module_output_path(json_dir: &Path, base: &str, module: Module) -> PathBuf {
        json_dir.join(format!("{}-{}-output.json", base, module))
    }

    /// Write `<session>_imec<probe>-input.json` and hash it
    ///
    /// The hash names the status ledger, so each distinct configuration keeps
    /// its own completion record.
    pub fn generate_modules_input_json(&mut self) -> Result<Uuid> {
        let id = self.parse_input_filename()?;
        let input_json = self.json_dir.join(format!("{}-input.json", module_base(&id)));
        let (meta_path, bin_path) = self.raw_data_filepaths(&id)?;

        let params = &self.config.params;
        let mut args = self.base_input_args(&meta_path, &bin_path)?;

        let ks_params = namespace_ks_params(params);
        for dropped in args.overlay(&ks_params) {
            log::debug!("Parameter '{}' is not a module input, ignoring", dropped);
        }
        if ks_params.contains_key("ks_make_copy") {
            log::warn!("Parameter 'ks_make_copy' is always enabled, ignoring caller value");
        }

        args.set("ks_make_copy", true);
        args.set(
            "noise_template_use_rf",
            params.get("noise_template_use_rf").cloned().unwrap_or(Value::Bool(false)),
        );
        args.set(
            "c_Waves_snr_um",
            params.get("c_Waves_snr_um").cloned().unwrap_or(Value::from(DEFAULT_C_WAVES_SNR_UM)),
        );
        args.set("qm_isi_thresh", param_f64(params, "refPerMS", DEFAULT_REF_PER_MS)? / 1000.0);

        let document = self.write_input(&input_json, &args, &meta_path)?;
        let hash = config_hash(&document);
        log::debug!("Module input {} has hash {}", path_string(&input_json), hash);

        self.module_input_json = Some(input_json);
        self.modules_input_hash = Some(hash);
        self.ledger = Some(StatusLedger::open(&self.json_dir, &hash));
        Ok(hash)
    }

    /// Ledger for the current configuration
    pub fn ledger(&self) -> Result<&StatusLedger> {
        self.ledger.as_ref().ok_or(TriggerError::ModulesInputNotGenerated)
    }

    /// Merge module records into the ledger
    pub fn update_module_status(&self, updates: &[(Module, ModuleStatus)]) -> Result<LedgerEntries> {
        self.ledger()?.update(updates)
    }

    /// Recorded status of one module (unset if nothing is recorded yet)
    pub fn module_status(&self, module: Module) -> Result<ModuleStatus> {
        self.ledger()?.get(module)
    }

    /// Status of every module
    pub fn module_statuses(&self) -> Result<LedgerEntries> {
        self.ledger()?.load()
    }

    /// Run CatGT (if requested and unfinished), then every module not yet
    /// complete in the ledger, in order
    ///
    /// Stops at the first failing module; its ledger entry stays unset so the
    /// next call resumes there.
    pub fn run_modules(&mut self) -> Result<RunSummary> {
        let mut catgt_ran = false;
        if self.config.run_catgt && !self.catgt_finished {
            catgt_ran = self.run_catgt(false)?;
        }

        log::info!("---- Running Modules ----");
        let hash = self.generate_modules_input_json()?;
        let id = self.parse_input_filename()?;
        let base = module_base(&id);
        let input_json = self.json_dir.join(format!("{}-input.json", base));
        let log_file = self.json_dir.join(format!("{}-run_modules-log.txt", base));

        let ledger = self.ledger()?.clone();
        if !ledger.exists() {
            ledger.update(&[])?;
        }

        let mut summary = RunSummary {
            config_hash: hash,
            ledger_path: ledger.path().to_path_buf(),
            catgt_ran,
            executed: Vec::new(),
            skipped: Vec::new(),
        };

        for module in Module::ALL {
            if ledger.get(module)?.is_complete() {
                log::debug!("{} already complete, skipping", module);
                summary.skipped.push(module);
                continue;
            }

            let output_json = Self::module_output_path(&self.json_dir, &base, module);
            let invocation = ModuleInvocation::new(module.as_str(), &input_json, &output_json)
                .with_log_file(&log_file);

            log::info!("Running {}", module);
            let start_time = chrono::Utc::now().naive_utc();
            self.runner.run_module(&invocation)?;
            let completion_time = chrono::Utc::now().naive_utc();

            let status = ModuleStatus::finished(start_time, completion_time);
            log::info!("{} finished in {:.1}s", module, status.duration.unwrap_or_default());
            ledger.update(&[(module, status)])?;
            summary.executed.push(module);
        }

        Ok(summary)
    }
}
