//! kstrigger - Kilosort Trigger for SpikeGLX Neuropixels recordings
//!
//! This library drives the external ecephys spike-sorting pipeline, including:
//! - Run identity parsing from SpikeGLX filenames
//! - CatGT and module input JSON generation
//! - Stage execution through a pluggable module runner
//! - A per-configuration status ledger so completed stages are skipped
//! - CLI command parsing and execution
//!
//! # Example
//!
//! ```no_run
//! use kstrigger::config::Settings;
//! use kstrigger::models::Params;
//! use kstrigger::trigger::{KilosortTrigger, TriggerConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TriggerConfig::new("/data/run1_g0", "/data/sorted/run1_g0_ks", Params::new(), "2.5");
//!     let mut trigger = KilosortTrigger::new(config, Settings::load()?)?;
//!     trigger.run_modules()?;
//!     Ok(())
//! }
//! ```

#![recursion_limit = "256"]

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod models;
pub mod recording;
pub mod repo;
pub mod runner;
pub mod trigger;
