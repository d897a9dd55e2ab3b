// Recording directory lookups: meta/bin files and trigger ranges

use crate::error::{Result, TriggerError};
use crate::models::RunIdentity;
use crate::recording::filename::parse_meta_filename;
use glob::Pattern;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// List files in `dir` whose names match a glob pattern, sorted by name
fn matching_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let pattern = Pattern::new(pattern)?;
    let entries = fs::read_dir(dir).map_err(|e| TriggerError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| TriggerError::io(dir, e))?;
        let name = entry.file_name();
        if pattern.matches(&name.to_string_lossy()) && entry.path().is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// First `*.ap.meta` file in `dir`
pub fn find_meta_file(dir: &Path) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(TriggerError::NoMetaFile(dir.to_path_buf()));
    }
    matching_files(dir, "*.ap.meta")?
        .into_iter()
        .next()
        .ok_or_else(|| TriggerError::NoMetaFile(dir.to_path_buf()))
}

/// Derive the run identity from the `*.ap.meta` file in `dir`
pub fn parse_input_filename(dir: &Path) -> Result<RunIdentity> {
    let meta = find_meta_file(dir)?;
    let name = meta
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_meta_filename(&name)
}

/// Locate `<session>*.ap.meta` and `<session>*.ap.bin` in `dir`
pub fn raw_data_files(dir: &Path, session: &str) -> Result<(PathBuf, PathBuf)> {
    let prefix = Pattern::escape(session);
    let first = |suffix: &str| -> Result<PathBuf> {
        let pattern = format!("{}*{}", prefix, suffix);
        if !dir.is_dir() {
            return Err(TriggerError::MissingDataFile { dir: dir.to_path_buf(), pattern });
        }
        matching_files(dir, &pattern)?
            .into_iter()
            .next()
            .ok_or(TriggerError::MissingDataFile { dir: dir.to_path_buf(), pattern })
    };
    Ok((first(".ap.meta")?, first(".ap.bin")?))
}

/// Directory CatGT writes its per-probe output to
///
/// `<dest>/catgt_<session>_g<gate>/<session>_g<gate>_imec<probe>`
pub fn catgt_output_dir(dest: &Path, id: &RunIdentity) -> PathBuf {
    let run = id.run_string();
    dest.join(format!("catgt_{}", run))
        .join(format!("{}_imec{}", run, id.probe))
}

/// Trigger indices present in `dir` for a gate/probe pair
fn trigger_indices(dir: &Path, gate: &str, probe: &str) -> Result<Vec<u32>> {
    let probe_pat = if probe == "0" {
        "0?".to_string()
    } else {
        regex::escape(probe)
    };
    let re = Regex::new(&format!(
        r"^.*_g{}_t(\d+)\.imec{}\.ap\.(?:bin|meta)$",
        regex::escape(gate),
        probe_pat
    ))
    .map_err(|_| TriggerError::InvalidTriggerRange(format!("gate {} probe {}", gate, probe)))?;

    let entries = fs::read_dir(dir).map_err(|e| TriggerError::io(dir, e))?;
    let mut indices = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| TriggerError::io(dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some(caps) = re.captures(&name) {
            if let Ok(idx) = caps[1].parse::<u32>() {
                indices.push(idx);
            }
        }
    }
    indices.sort_unstable();
    indices.dedup();
    Ok(indices)
}

/// Resolve a `"<first>,<last>"` trigger range against `dir`
///
/// `start` and `end` resolve to the lowest and highest trigger index found
/// for the gate/probe pair; numeric bounds are taken as given.
pub fn parse_trigger_range(range: &str, probe: &str, gate: &str, dir: &Path) -> Result<(u32, u32)> {
    let invalid = || TriggerError::InvalidTriggerRange(range.to_string());
    let (first_str, last_str) = range.split_once(',').ok_or_else(invalid)?;
    let (first_str, last_str) = (first_str.trim(), last_str.trim());

    let symbolic = first_str == "start" || last_str == "end";
    let indices = if symbolic {
        let found = trigger_indices(dir, gate, probe)?;
        if found.is_empty() {
            return Err(TriggerError::NoTriggerFiles {
                dir: dir.to_path_buf(),
                gate: gate.to_string(),
                probe: probe.to_string(),
            });
        }
        found
    } else {
        Vec::new()
    };

    let first = match first_str {
        "start" => indices[0],
        s => s.parse::<u32>().map_err(|_| invalid())?,
    };
    let last = match last_str {
        "end" => indices[indices.len() - 1],
        s => s.parse::<u32>().map_err(|_| invalid())?,
    };

    if first > last {
        return Err(invalid());
    }
    Ok((first, last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_find_meta_file_missing() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "run1_g0_t0.imec0.lf.meta");
        assert!(matches!(find_meta_file(temp.path()), Err(TriggerError::NoMetaFile(_))));
    }

    #[test]
    fn test_find_meta_file_nonexistent_dir() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        assert!(matches!(find_meta_file(&missing), Err(TriggerError::NoMetaFile(_))));
    }

    #[test]
    fn test_parse_input_filename() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "run1_g0_t0.imec1.ap.meta");
        touch(temp.path(), "run1_g0_t0.imec1.ap.bin");
        let id = parse_input_filename(temp.path()).unwrap();
        assert_eq!(id.as_tuple(), ("run1", "0", "0", "1"));
    }

    #[test]
    fn test_parse_input_filename_mismatch() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "badname.ap.meta");
        assert!(matches!(
            parse_input_filename(temp.path()),
            Err(TriggerError::FilenameMismatch(_))
        ));
    }

    #[test]
    fn test_raw_data_files() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "run1_g0_t0.imec0.ap.meta");
        touch(temp.path(), "run1_g0_t0.imec0.ap.bin");
        touch(temp.path(), "other_g0_t0.imec0.ap.bin");
        let (meta, bin) = raw_data_files(temp.path(), "run1").unwrap();
        assert!(meta.ends_with("run1_g0_t0.imec0.ap.meta"));
        assert!(bin.ends_with("run1_g0_t0.imec0.ap.bin"));
    }

    #[test]
    fn test_raw_data_files_missing_bin() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "run1_g0_t0.imec0.ap.meta");
        let err = raw_data_files(temp.path(), "run1").unwrap_err();
        assert!(matches!(err, TriggerError::MissingDataFile { ref pattern, .. } if pattern == "run1*.ap.bin"));
    }

    #[test]
    fn test_raw_data_files_escapes_session() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "run[1]_g0_t0.imec0.ap.meta");
        touch(temp.path(), "run[1]_g0_t0.imec0.ap.bin");
        assert!(raw_data_files(temp.path(), "run[1]").is_ok());
    }

    #[test]
    fn test_catgt_output_dir() {
        let id = RunIdentity {
            session: "run1".into(),
            gate: "0".into(),
            trigger: "0".into(),
            probe: "2".into(),
        };
        let dir = catgt_output_dir(Path::new("/data/out"), &id);
        assert_eq!(dir, PathBuf::from("/data/out/catgt_run1_g0/run1_g0_imec2"));
    }

    #[test]
    fn test_trigger_range_start_end() {
        let temp = TempDir::new().unwrap();
        for t in [2, 0, 5] {
            touch(temp.path(), &format!("run1_g0_t{}.imec0.ap.bin", t));
        }
        touch(temp.path(), "run1_g1_t9.imec0.ap.bin");
        touch(temp.path(), "run1_g0_t7.imec1.ap.bin");
        assert_eq!(parse_trigger_range("start,end", "0", "0", temp.path()).unwrap(), (0, 5));
        assert_eq!(parse_trigger_range("start,end", "1", "0", temp.path()).unwrap(), (7, 7));
    }

    #[test]
    fn test_trigger_range_probe_zero_matches_unsuffixed() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "run1_g0_t3.imec.ap.meta");
        assert_eq!(parse_trigger_range("start,end", "0", "0", temp.path()).unwrap(), (3, 3));
    }

    #[test]
    fn test_trigger_range_numeric() {
        let temp = TempDir::new().unwrap();
        assert_eq!(parse_trigger_range("1,4", "0", "0", temp.path()).unwrap(), (1, 4));
        touch(temp.path(), "run1_g0_t6.imec0.ap.bin");
        assert_eq!(parse_trigger_range("2,end", "0", "0", temp.path()).unwrap(), (2, 6));
    }

    #[test]
    fn test_trigger_range_errors() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            parse_trigger_range("start,end", "0", "0", temp.path()),
            Err(TriggerError::NoTriggerFiles { .. })
        ));
        assert!(matches!(
            parse_trigger_range("0", "0", "0", temp.path()),
            Err(TriggerError::InvalidTriggerRange(_))
        ));
        assert!(matches!(
            parse_trigger_range("5,2", "0", "0", temp.path()),
            Err(TriggerError::InvalidTriggerRange(_))
        ));
    }
}
