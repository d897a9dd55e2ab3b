// Kilosort trigger for SpikeGLX recordings
//
// One trigger drives one recording/output-directory pair: it writes the input
// JSON for CatGT and for the downstream modules, runs each stage through a
// ModuleRunner, and records module completion in the status ledger.

mod catgt;
mod modules;

pub use catgt::DEFAULT_NI_EXTRACT_STRING;
pub use modules::RunSummary;

use crate::config::Settings;
use crate::error::{Result, TriggerError};
use crate::input::{write_input_json, InputArgs};
use crate::models::{Params, RunIdentity};
use crate::recording::{self, SpikeGlxMeta};
use crate::repo::StatusLedger;
use crate::runner::{ModuleRunner, PythonRunner};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Name of the generated-config directory inside the output directory
pub const JSON_CONFIG_DIR: &str = "json_configs";

/// What to sort and how
#[derive(Debug, Clone)]
pub struct TriggerConfig {
    pub npx_input_dir: PathBuf,
    pub ks_output_dir: PathBuf,
    pub params: Params,
    /// Kilosort version suffix, e.g. `2.5` for `Kilosort-2.5`
    pub ks_version: String,
    pub run_catgt: bool,
    /// Whether the NI auxiliary stream is present
    pub ni_present: bool,
    pub ni_extract_string: Option<String>,
}

impl TriggerConfig {
    pub fn new(
        npx_input_dir: impl Into<PathBuf>,
        ks_output_dir: impl Into<PathBuf>,
        params: Params,
        ks_version: &str,
    ) -> Self {
        Self {
            npx_input_dir: npx_input_dir.into(),
            ks_output_dir: ks_output_dir.into(),
            params,
            ks_version: ks_version.to_string(),
            run_catgt: false,
            ni_present: false,
            ni_extract_string: None,
        }
    }

    /// Request CatGT preprocessing before the modules
    pub fn with_catgt(mut self, ni_present: bool, ni_extract_string: Option<String>) -> Self {
        self.run_catgt = true;
        self.ni_present = ni_present;
        self.ni_extract_string = ni_extract_string;
        self
    }
}

/// Orchestrates CatGT and the sorting modules for one recording
pub struct KilosortTrigger<R: ModuleRunner = PythonRunner> {
    config: TriggerConfig,
    settings: Settings,
    runner: R,
    json_dir: PathBuf,
    catgt_finished: bool,
    catgt_input_json: Option<PathBuf>,
    module_input_json: Option<PathBuf>,
    modules_input_hash: Option<Uuid>,
    ledger: Option<StatusLedger>,
}

impl KilosortTrigger<PythonRunner> {
    /// Trigger that launches stages with the configured Python interpreter
    pub fn new(config: TriggerConfig, settings: Settings) -> Result<Self> {
        let runner = PythonRunner::new(settings.python.clone(), settings.modules_package.clone());
        Self::with_runner(config, settings, runner)
    }
}

impl<R: ModuleRunner> KilosortTrigger<R> {
    /// Create the output and JSON config directories and set up the trigger
    pub fn with_runner(config: TriggerConfig, settings: Settings, runner: R) -> Result<Self> {
        let json_dir = config.ks_output_dir.join(JSON_CONFIG_DIR);
        fs::create_dir_all(&json_dir).map_err(|e| TriggerError::io(&json_dir, e))?;

        Ok(Self {
            config,
            settings,
            runner,
            json_dir,
            catgt_finished: false,
            catgt_input_json: None,
            module_input_json: None,
            modules_input_hash: None,
            ledger: None,
        })
    }

    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn json_dir(&self) -> &Path {
        &self.json_dir
    }

    pub fn catgt_finished(&self) -> bool {
        self.catgt_finished
    }

    pub fn catgt_input_json(&self) -> Option<&Path> {
        self.catgt_input_json.as_deref()
    }

    pub fn module_input_json(&self) -> Option<&Path> {
        self.module_input_json.as_deref()
    }

    /// Hash of the last generated module input; `None` before generation
    pub fn modules_input_hash(&self) -> Option<Uuid> {
        self.modules_input_hash
    }

    /// Run identity of the recording in the input directory
    pub fn parse_input_filename(&self) -> Result<RunIdentity> {
        recording::parse_input_filename(&self.config.npx_input_dir)
    }

    /// Treat CatGT as finished when its output for this recording is already on disk
    ///
    /// A fresh trigger otherwise hashes the raw input paths and misses the
    /// ledger written by an earlier CatGT run. Returns whether output was found.
    pub fn adopt_catgt_output(&mut self) -> Result<bool> {
        if !self.config.run_catgt {
            return Ok(false);
        }
        let id = self.parse_input_filename()?;
        let catgt_dir = recording::catgt_output_dir(&self.extracted_data_directory(), &id);
        if recording::raw_data_files(&catgt_dir, &id.session).is_err() {
            return Ok(false);
        }
        log::debug!("Using existing CatGT output in {}", catgt_dir.display());
        self.catgt_finished = true;
        Ok(true)
    }

    /// CatGT writes next to the output directory
    fn extracted_data_directory(&self) -> PathBuf {
        match self.config.ks_output_dir.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Meta/bin pair to sort: CatGT output once CatGT has finished, raw input otherwise
    fn raw_data_filepaths(&self, id: &RunIdentity) -> Result<(PathBuf, PathBuf)> {
        let data_dir = if self.catgt_finished {
            recording::catgt_output_dir(&self.extracted_data_directory(), id)
        } else {
            self.config.npx_input_dir.clone()
        };
        recording::raw_data_files(&data_dir, &id.session)
    }

    /// Versioned Kilosort checkout (`<parent>/Kilosort-<version>`)
    ///
    /// The configured base must exist and be a `Kilosort*` directory.
    fn kilosort_repository(&self) -> Result<PathBuf> {
        let base = self
            .settings
            .kilosort_repository
            .as_ref()
            .ok_or(TriggerError::KilosortRepositoryUnset)?;

        if !base.exists() {
            return Err(TriggerError::KilosortRepositoryMissing(base.clone()));
        }
        let name = base
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !name.starts_with("Kilosort") {
            return Err(TriggerError::KilosortRepositoryInvalid(base.clone()));
        }

        let versioned = base
            .parent()
            .unwrap_or(Path::new(""))
            .join(format!("Kilosort-{}", self.config.ks_version));
        if !versioned.exists() {
            return Err(TriggerError::KilosortVersionMissing {
                version: self.config.ks_version.clone(),
                path: versioned,
            });
        }
        Ok(versioned)
    }

    /// Flat arguments shared by the CatGT and module inputs
    fn base_input_args(&self, meta_path: &Path, bin_path: &Path) -> Result<InputArgs> {
        let mut args = InputArgs::new();
        args.set("KS2ver", self.config.ks_version.as_str());
        args.set("npx_directory", path_string(&self.config.npx_input_dir));
        args.set("spikeGLX_data", true);
        args.set("continuous_file", path_string(bin_path));
        args.set("input_meta_path", path_string(meta_path));
        args.set("extracted_data_directory", path_string(&self.extracted_data_directory()));
        args.set("kilosort_output_directory", path_string(&self.config.ks_output_dir));
        args.set("kilosort_repository", path_string(&self.kilosort_repository()?));
        Ok(args)
    }

    /// Write the document for `args` to `path`, reading probe details from the meta file
    fn write_input(&self, path: &Path, args: &InputArgs, meta_path: &Path) -> Result<serde_json::Value> {
        let meta = SpikeGlxMeta::read(meta_path)?;
        write_input_json(path, args, &meta)
    }
}

pub(crate) fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
