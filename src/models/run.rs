use serde::{Deserialize, Serialize};

/// Acquisition identity derived from a SpikeGLX `*.ap.meta` filename
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunIdentity {
    pub session: String,
    pub gate: String,
    /// Trigger index, or `cat` for CatGT-concatenated output
    pub trigger: String,
    pub probe: String,
}

impl RunIdentity {
    /// `<session>_g<gate>`, the CatGT run string
    pub fn run_string(&self) -> String {
        format!("{}_g{}", self.session, self.gate)
    }

    /// Tuple form `(session, gate, trigger, probe)`
    pub fn as_tuple(&self) -> (&str, &str, &str, &str) {
        (&self.session, &self.gate, &self.trigger, &self.probe)
    }
}
