use serde::{Deserialize, Serialize};
use std::fmt;

/// Downstream pipeline stage tracked in the status ledger
///
/// Stages run in the order of `Module::ALL`. CatGT preprocessing is not a
/// ledger module; it is tracked in memory by the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    KilosortHelper,
    KilosortPostprocessing,
    NoiseTemplates,
    MeanWaveforms,
    QualityMetrics,
}

impl Module {
    /// Fixed execution order
    pub const ALL: [Module; 5] = [
        Module::KilosortHelper,
        Module::KilosortPostprocessing,
        Module::NoiseTemplates,
        Module::MeanWaveforms,
        Module::QualityMetrics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Module::KilosortHelper => "kilosort_helper",
            Module::KilosortPostprocessing => "kilosort_postprocessing",
            Module::NoiseTemplates => "noise_templates",
            Module::MeanWaveforms => "mean_waveforms",
            Module::QualityMetrics => "quality_metrics",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "kilosort_helper" => Some(Module::KilosortHelper),
            "kilosort_postprocessing" => Some(Module::KilosortPostprocessing),
            "noise_templates" => Some(Module::NoiseTemplates),
            "mean_waveforms" => Some(Module::MeanWaveforms),
            "quality_metrics" => Some(Module::QualityMetrics),
            _ => None,
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Script name of the CatGT preprocessing stage
pub const CATGT_HELPER: &str = "catGT_helper";
