// Library error type
// Every fallible operation in the trigger pipeline surfaces one of these.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TriggerError>;

#[derive(Error, Debug)]
pub enum TriggerError {
    #[error("No *.ap.meta file found in {0}")]
    NoMetaFile(PathBuf),

    #[error("Filename '{0}' does not match <session>_g<gate>_t<trigger>.imec<probe>.ap.meta")]
    FilenameMismatch(String),

    #[error("No file matching '{pattern}' found in {dir}")]
    MissingDataFile { dir: PathBuf, pattern: String },

    #[error("Invalid trigger range '{0}'. Expected '<first>,<last>' (first may be 'start', last may be 'end')")]
    InvalidTriggerRange(String),

    #[error("No numbered trigger files for gate {gate}, probe {probe} found in {dir}")]
    NoTriggerFiles { dir: PathBuf, gate: String, probe: String },

    #[error("Parameter '{key}' must be a number, got {value}")]
    InvalidParam { key: String, value: String },

    #[error("Kilosort repository is not set (export kilosort_repository or set kilosort.repository in the rc file)")]
    KilosortRepositoryUnset,

    #[error("Kilosort repository does not exist: {0}")]
    KilosortRepositoryMissing(PathBuf),

    #[error("Kilosort repository must be a 'Kilosort*' directory: {0}")]
    KilosortRepositoryInvalid(PathBuf),

    #[error("Kilosort {version} is not installed (expected {path})")]
    KilosortVersionMissing { version: String, path: PathBuf },

    #[error("\"generate_modules_input_json()\" not yet performed!")]
    ModulesInputNotGenerated,

    #[error("Failed to spawn {module}: {source}")]
    Spawn {
        module: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{module} exited with status {code}")]
    StageFailed { module: String, code: i32 },

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

impl TriggerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TriggerError::Io { path: path.into(), source }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        TriggerError::Json { path: path.into(), source }
    }

    /// True for problems with the caller's inputs or installation rather than
    /// a failure while processing.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            TriggerError::NoMetaFile(_)
                | TriggerError::FilenameMismatch(_)
                | TriggerError::MissingDataFile { .. }
                | TriggerError::InvalidTriggerRange(_)
                | TriggerError::NoTriggerFiles { .. }
                | TriggerError::InvalidParam { .. }
                | TriggerError::KilosortRepositoryUnset
                | TriggerError::KilosortRepositoryMissing(_)
                | TriggerError::KilosortRepositoryInvalid(_)
                | TriggerError::KilosortVersionMissing { .. }
        )
    }
}
