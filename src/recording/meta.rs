// SpikeGLX .meta reader
// The file is a flat list of key=value lines; keys beginning with '~' are kept verbatim.

use crate::error::{Result, TriggerError};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const DEFAULT_SAMPLE_RATE: f64 = 30000.0;
const DEFAULT_NUM_CHANNELS: u32 = 385;

/// Parsed SpikeGLX metadata
#[derive(Debug, Clone, Default)]
pub struct SpikeGlxMeta {
    entries: HashMap<String, String>,
}

impl SpikeGlxMeta {
    /// Read and parse a `.meta` file
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| TriggerError::io(path, e))?;
        Ok(Self::parse(&content))
    }

    /// Parse `.meta` content; lines without `=` are ignored
    pub fn parse(content: &str) -> Self {
        let entries = content
            .lines()
            .filter_map(|line| line.split_once('='))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .filter(|(k, _)| !k.is_empty())
            .collect();
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|s| s.as_str())
    }

    /// AP sampling rate in Hz (`imSampRate`)
    pub fn sample_rate(&self) -> f64 {
        self.get("imSampRate")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SAMPLE_RATE)
    }

    /// Saved channel count including the sync channel (`nSavedChans`)
    pub fn num_channels(&self) -> u32 {
        self.get("nSavedChans")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_NUM_CHANNELS)
    }

    /// Probe generation as understood by the pipeline
    ///
    /// Phase 3A probes carry no `imDatPrb_type` key.
    pub fn probe_type(&self) -> String {
        match self.get("imDatPrb_type") {
            None => "3A".to_string(),
            Some("0") => "NP1".to_string(),
            Some(t) => format!("NP{}", t),
        }
    }
}
