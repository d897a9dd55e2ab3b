// Stage execution
// Each pipeline stage is an external script driven through --input_json/--output_json.

pub mod python;

pub use python::PythonRunner;

use crate::error::Result;
use std::path::{Path, PathBuf};

/// One stage invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleInvocation {
    /// Script name within the pipeline package (e.g. `kilosort_helper`)
    pub module: String,
    pub input_json: PathBuf,
    pub output_json: PathBuf,
    /// Append stdout here instead of inheriting the terminal
    pub log_file: Option<PathBuf>,
}

impl ModuleInvocation {
    pub fn new(module: &str, input_json: &Path, output_json: &Path) -> Self {
        Self {
            module: module.to_string(),
            input_json: input_json.to_path_buf(),
            output_json: output_json.to_path_buf(),
            log_file: None,
        }
    }

    pub fn with_log_file(mut self, log_file: &Path) -> Self {
        self.log_file = Some(log_file.to_path_buf());
        self
    }
}

/// Executes stages; blocks until the stage has exited
pub trait ModuleRunner {
    /// Run the stage; a non-zero exit is `TriggerError::StageFailed`
    fn run_module(&self, invocation: &ModuleInvocation) -> Result<()>;
}

impl<R: ModuleRunner + ?Sized> ModuleRunner for &R {
    fn run_module(&self, invocation: &ModuleInvocation) -> Result<()> {
        (**self).run_module(invocation)
    }
}

impl<R: ModuleRunner + ?Sized> ModuleRunner for Box<R> {
    fn run_module(&self, invocation: &ModuleInvocation) -> Result<()> {
        (**self).run_module(invocation)
    }
}

/// Map an exit status to a single code; signals report as 128 + signal on unix
pub(crate) fn normalize_exit(status: std::process::ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(code) = status.code() {
            code
        } else if let Some(sig) = status.signal() {
            128 + sig
        } else {
            1
        }
    }
    #[cfg(not(unix))]
    {
        status.code().unwrap_or(1)
    }
}
