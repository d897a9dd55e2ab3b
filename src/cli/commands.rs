use clap::{Args, Parser, Subcommand};
use crate::cli::error::{user_error, validate_ks_version, validate_module_name};
use crate::cli::output::{format_identity, format_run_summary, format_status_table, is_tty};
use crate::cli::parser::build_params;
use crate::config::Settings;
use crate::models::Module;
use crate::recording;
use crate::repo::LedgerEntries;
use crate::trigger::{KilosortTrigger, TriggerConfig};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "kstrigger")]
#[command(about = "Kilosort Trigger - run the ecephys spike-sorting pipeline against SpikeGLX recordings")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show session, gate, trigger and probe for a recording directory
    Parse {
        /// Directory holding the *.ap.meta file
        input_dir: PathBuf,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Write the CatGT and module input JSON without running anything
    Generate {
        #[command(flatten)]
        recording: RecordingArgs,
    },
    /// Run CatGT preprocessing
    Catgt {
        #[command(flatten)]
        recording: RecordingArgs,
        /// Rerun even if CatGT output for this recording already exists
        #[arg(long)]
        force: bool,
    },
    /// Run CatGT (if requested) and every module not yet complete
    Run {
        #[command(flatten)]
        recording: RecordingArgs,
    },
    /// Show the completion ledger for this configuration
    Status {
        #[command(flatten)]
        recording: RecordingArgs,
        /// Show a single module
        #[arg(long)]
        module: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// Recording, output location and parameters shared by the pipeline commands
#[derive(Args, Debug, Clone)]
pub struct RecordingArgs {
    /// Directory holding the SpikeGLX *.ap.meta and *.ap.bin files
    pub input_dir: PathBuf,
    /// Kilosort output directory (generated JSON goes to <OUTPUT_DIR>/json_configs)
    pub output_dir: PathBuf,
    /// Kilosort version, selects the Kilosort-<VERSION> checkout
    #[arg(long = "ks-version", default_value = "2.5")]
    pub ks_version: String,
    /// JSON file with sorting parameters
    #[arg(long = "params", value_name = "FILE")]
    pub params_file: Option<PathBuf>,
    /// Parameter override (repeatable), e.g. -p refPerMS=1.5 -p Th=[10,4]
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,
    /// Run CatGT before the modules
    #[arg(long)]
    pub catgt: bool,
    /// The NI auxiliary stream is present
    #[arg(long = "ni-present")]
    pub ni_present: bool,
    /// CatGT extraction string for the NI stream
    #[arg(long = "ni-extract", value_name = "STRING", allow_hyphen_values = true)]
    pub ni_extract: Option<String>,
}

impl RecordingArgs {
    fn trigger_config(&self) -> Result<TriggerConfig> {
        let ks_version = match validate_ks_version(&self.ks_version) {
            Ok(v) => v,
            Err(e) => user_error(&e),
        };
        let params = build_params(self.params_file.as_deref(), &self.params)?;
        let mut config = TriggerConfig::new(&self.input_dir, &self.output_dir, params, &ks_version);
        if self.catgt {
            config = config.with_catgt(self.ni_present, self.ni_extract.clone());
        }
        Ok(config)
    }

    fn trigger(&self) -> Result<KilosortTrigger> {
        let settings = Settings::load().context("Failed to load settings")?;
        Ok(KilosortTrigger::new(self.trigger_config()?, settings)?)
    }
}

#[derive(Serialize)]
struct StatusReport {
    config_hash: Uuid,
    ledger: PathBuf,
    modules: LedgerEntries,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { input_dir, json } => handle_parse(input_dir, json),
        Commands::Generate { recording } => handle_generate(&recording),
        Commands::Catgt { recording, force } => handle_catgt(&recording, force),
        Commands::Run { recording } => handle_run(&recording),
        Commands::Status { recording, module, json } => handle_status(&recording, module, json),
    }
}

/// Handle `kstrigger parse <INPUT_DIR>`
fn handle_parse(input_dir: PathBuf, json: bool) -> Result<()> {
    let id = recording::parse_input_filename(&input_dir)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&id)?);
    } else {
        print!("{}", format_identity(&id));
    }
    Ok(())
}

/// Handle `kstrigger generate`
fn handle_generate(args: &RecordingArgs) -> Result<()> {
    let mut trigger = args.trigger()?;

    if let Some(path) = trigger.generate_catgt_input_json()? {
        println!("CatGT input:  {}", path.display());
    }
    trigger.adopt_catgt_output()?;
    let hash = trigger.generate_modules_input_json()?;
    if let Some(path) = trigger.module_input_json() {
        println!("Module input: {}", path.display());
    }
    println!("Config hash:  {}", hash);
    Ok(())
}

/// Handle `kstrigger catgt`
fn handle_catgt(args: &RecordingArgs, force: bool) -> Result<()> {
    let mut args = args.clone();
    args.catgt = true;
    let mut trigger = args.trigger()?;

    if !force && trigger.adopt_catgt_output()? {
        println!("CatGT output already present for {} (use --force to rerun)", args.input_dir.display());
        return Ok(());
    }
    if trigger.run_catgt(force)? {
        println!("CatGT finished for {}", args.input_dir.display());
    }
    Ok(())
}

/// Handle `kstrigger run`
fn handle_run(args: &RecordingArgs) -> Result<()> {
    let mut trigger = args.trigger()?;
    let summary = trigger.run_modules()?;
    print!("{}", format_run_summary(&summary));
    Ok(())
}

/// Handle `kstrigger status`
fn handle_status(args: &RecordingArgs, module: Option<String>, json: bool) -> Result<()> {
    let module = match module.as_deref().map(validate_module_name) {
        Some(Ok(m)) => Some(m),
        Some(Err(e)) => user_error(&e),
        None => None,
    };

    let mut trigger = args.trigger()?;
    trigger.adopt_catgt_output()?;
    let hash = trigger.generate_modules_input_json()?;
    let mut modules = trigger.module_statuses()?;
    let shown: Vec<Module> = match module {
        Some(m) => {
            modules.retain(|name, _| name == m.as_str());
            vec![m]
        }
        None => Module::ALL.to_vec(),
    };

    if json {
        let report = StatusReport {
            config_hash: hash,
            ledger: trigger.ledger()?.path().to_path_buf(),
            modules,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Config hash: {}", hash);
        print!("{}", format_status_table(&modules, &shown, is_tty()));
    }
    Ok(())
}
