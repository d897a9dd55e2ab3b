use crate::error::{Result, TriggerError};
use crate::runner::{normalize_exit, ModuleInvocation, ModuleRunner};
use std::ffi::OsString;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::{Command, Stdio};

pub const DEFAULT_PYTHON: &str = "python3";
pub const DEFAULT_PACKAGE: &str = "ecephys_spike_sorting.modules";

/// Runs stages as `<python> -W ignore -m <package>.<module> --input_json .. --output_json ..`
#[derive(Debug, Clone)]
pub struct PythonRunner {
    python: PathBuf,
    package: String,
}

impl Default for PythonRunner {
    fn default() -> Self {
        Self::new(DEFAULT_PYTHON, DEFAULT_PACKAGE)
    }
}

impl PythonRunner {
    pub fn new(python: impl Into<PathBuf>, package: impl Into<String>) -> Self {
        Self {
            python: python.into(),
            package: package.into(),
        }
    }

    /// Interpreter arguments for an invocation
    pub fn args(&self, invocation: &ModuleInvocation) -> Vec<OsString> {
        vec![
            "-W".into(),
            "ignore".into(),
            "-m".into(),
            format!("{}.{}", self.package, invocation.module).into(),
            "--input_json".into(),
            invocation.input_json.clone().into_os_string(),
            "--output_json".into(),
            invocation.output_json.clone().into_os_string(),
        ]
    }
}

impl ModuleRunner for PythonRunner {
    fn run_module(&self, invocation: &ModuleInvocation) -> Result<()> {
        let mut command = Command::new(&self.python);
        command.args(self.args(invocation));

        if let Some(log_path) = &invocation.log_file {
            let log = OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)
                .map_err(|e| TriggerError::io(log_path, e))?;
            command.stdout(Stdio::from(log));
        }

        log::debug!("Running {:?} {:?}", self.python, self.args(invocation));
        let status = command.status().map_err(|source| TriggerError::Spawn {
            module: invocation.module.clone(),
            source,
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(TriggerError::StageFailed {
                module: invocation.module.clone(),
                code: normalize_exit(status),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_command_line() {
        let runner = PythonRunner::default();
        let inv = ModuleInvocation::new(
            "noise_templates",
            Path::new("/j/run1_imec0-input.json"),
            Path::new("/j/run1_imec0-noise_templates-output.json"),
        );
        let args: Vec<String> = runner
            .args(&inv)
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "-W",
                "ignore",
                "-m",
                "ecephys_spike_sorting.modules.noise_templates",
                "--input_json",
                "/j/run1_imec0-input.json",
                "--output_json",
                "/j/run1_imec0-noise_templates-output.json",
            ]
        );
    }

    #[test]
    fn test_missing_interpreter_is_spawn_error() {
        let runner = PythonRunner::new("/nonexistent/python-for-kstrigger", DEFAULT_PACKAGE);
        let inv = ModuleInvocation::new("catGT_helper", Path::new("in.json"), Path::new("out.json"));
        assert!(matches!(runner.run_module(&inv), Err(TriggerError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status_and_log_append() {
        use std::os::unix::fs::PermissionsExt;
        let temp = tempfile::TempDir::new().unwrap();
        let script = temp.path().join("fake-python");
        std::fs::write(&script, "#!/bin/sh\necho \"ran $4\"\ncase \"$4\" in *fail*) exit 3;; esac\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let runner = PythonRunner::new(&script, "pkg");
        let log = temp.path().join("log.txt");
        let ok = ModuleInvocation::new("good", Path::new("i"), Path::new("o")).with_log_file(&log);
        runner.run_module(&ok).unwrap();
        runner.run_module(&ok).unwrap();

        let bad = ModuleInvocation::new("fail", Path::new("i"), Path::new("o")).with_log_file(&log);
        let err = runner.run_module(&bad).unwrap_err();
        assert!(matches!(err, TriggerError::StageFailed { code: 3, .. }));

        let logged = std::fs::read_to_string(&log).unwrap();
        assert_eq!(logged, "ran pkg.good\nran pkg.good\nran pkg.fail\n");
    }
}
