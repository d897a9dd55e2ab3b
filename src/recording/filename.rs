// SpikeGLX filename parsing
// <session>_g<gate>_t<trigger|cat>.imec<probe>.ap.meta

use crate::error::{Result, TriggerError};
use crate::models::RunIdentity;
use regex::Regex;
use std::sync::OnceLock;

fn meta_filename_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(.*)_g(\d+)_t(\d+|cat)\.imec(\d?)\.ap\.meta").expect("static regex")
    })
}

/// Parse the run identity out of an `*.ap.meta` filename
///
/// A missing probe index (`.imec.ap.meta`) is reported as probe `"0"`.
pub fn parse_meta_filename(name: &str) -> Result<RunIdentity> {
    let caps = meta_filename_regex()
        .captures(name)
        .ok_or_else(|| TriggerError::FilenameMismatch(name.to_string()))?;

    let probe = caps.get(4).map(|m| m.as_str()).unwrap_or("");
    Ok(RunIdentity {
        session: caps[1].to_string(),
        gate: caps[2].to_string(),
        trigger: caps[3].to_string(),
        probe: if probe.is_empty() { "0".to_string() } else { probe.to_string() },
    })
}
