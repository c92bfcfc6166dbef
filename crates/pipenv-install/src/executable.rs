//! Running external programs
//!
//! Everything that spawns a subprocess goes through [`Executable`], so the
//! build can be exercised against recording doubles instead of a real
//! pipenv or python.

use pipenv_config::{resolve_executable, ProcessEnv};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;
use tracing::debug;

/// One invocation: arguments, the complete child environment and an
/// optional working directory (the current directory when `None`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Execution {
    pub args: Vec<String>,
    pub env: ProcessEnv,
    pub dir: Option<PathBuf>,
    /// Send stderr to the same sink as stdout, so the captured `stdout`
    /// keeps both streams in the order they were written
    pub merge_output: bool,
}

impl Execution {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Execution {
            args: args.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_env(mut self, env: ProcessEnv) -> Self {
        self.env = env;
        self
    }

    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn with_merged_output(mut self) -> Self {
        self.merge_output = true;
        self
    }
}

/// Captured output of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionOutput {
    /// Stdout followed by stderr, for error reports
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => {
                let mut text = self.stdout.trim_end_matches('\n').to_string();
                text.push('\n');
                text.push_str(&self.stderr);
                text
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("could not find '{program}' on PATH: {source}")]
    NotFound {
        program: String,
        #[source]
        source: which::Error,
    },

    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' exited with {}", describe_code(*code))]
    ExitStatus {
        program: String,
        code: Option<i32>,
        output: ExecutionOutput,
    },
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl ExecutionError {
    /// Whatever the process printed before failing, if it ran at all
    pub fn output(&self) -> Option<&ExecutionOutput> {
        match self {
            ExecutionError::ExitStatus { output, .. } => Some(output),
            _ => None,
        }
    }
}

/// Runs a program and waits for it
pub trait Executable {
    fn execute(&self, execution: &Execution) -> Result<ExecutionOutput, ExecutionError>;
}

/// A program looked up by name on the `PATH` of each execution's
/// environment
#[derive(Debug, Clone)]
pub struct PathExecutable {
    name: String,
}

impl PathExecutable {
    pub fn new(name: impl Into<String>) -> Self {
        PathExecutable { name: name.into() }
    }
}

impl Executable for PathExecutable {
    fn execute(&self, execution: &Execution) -> Result<ExecutionOutput, ExecutionError> {
        let cwd = match &execution.dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().map_err(|source| ExecutionError::Spawn {
                program: self.name.clone(),
                source,
            })?,
        };

        let program = resolve_executable(&self.name, &execution.env, &cwd).map_err(|source| {
            ExecutionError::NotFound {
                program: self.name.clone(),
                source,
            }
        })?;

        debug!(
            "Running {} {} in {}",
            program.display(),
            execution.args.join(" "),
            cwd.display()
        );

        let mut command = Command::new(&program);
        command
            .args(&execution.args)
            .env_clear()
            .envs(execution.env.iter())
            .current_dir(&cwd)
            .stdin(Stdio::null());

        let run = if execution.merge_output {
            run_merged(&mut command)
        } else {
            run_split(&mut command)
        };
        let (status, captured) = run.map_err(|source| ExecutionError::Spawn {
            program: self.name.clone(),
            source,
        })?;

        if status.success() {
            Ok(captured)
        } else {
            debug!("{} exited with {}", self.name, status);
            Err(ExecutionError::ExitStatus {
                program: self.name.clone(),
                code: status.code(),
                output: captured,
            })
        }
    }
}

fn run_split(command: &mut Command) -> io::Result<(ExitStatus, ExecutionOutput)> {
    let output = command.output()?;
    Ok((
        output.status,
        ExecutionOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        },
    ))
}

/// Both streams share one file description, so writes land in the order
/// the child made them
fn run_merged(command: &mut Command) -> io::Result<(ExitStatus, ExecutionOutput)> {
    let mut sink = tempfile::tempfile()?;
    command
        .stdout(Stdio::from(sink.try_clone()?))
        .stderr(Stdio::from(sink.try_clone()?));
    let status = command.status()?;

    let mut bytes = Vec::new();
    sink.seek(SeekFrom::Start(0))?;
    sink.read_to_end(&mut bytes)?;
    Ok((
        status,
        ExecutionOutput {
            stdout: String::from_utf8_lossy(&bytes).into_owned(),
            stderr: String::new(),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_output() {
        let output = ExecutionOutput {
            stdout: "stdout output\n".to_string(),
            stderr: "stderr output".to_string(),
        };
        assert_eq!(output.combined(), "stdout output\nstderr output");

        let only_stderr = ExecutionOutput {
            stdout: String::new(),
            stderr: "boom".to_string(),
        };
        assert_eq!(only_stderr.combined(), "boom");
    }

    #[test]
    fn test_missing_program_reports_not_found() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::TempDir::new()?;
        let env = ProcessEnv::from_pairs([("PATH", dir.path().display().to_string())]);
        let execution = Execution::new(["--version"]).with_env(env).with_dir(dir.path());

        let result = PathExecutable::new("definitely-not-a-real-program").execute(&execution);
        assert!(matches!(result, Err(ExecutionError::NotFound { .. })));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_with_exact_environment() -> Result<(), Box<dyn std::error::Error>> {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new()?;
        let script = dir.path().join("show-env");
        fs::write(
            &script,
            "#!/bin/sh\necho \"$SOME_KEY|$PWD|$@\"\necho oops >&2\nexit ${EXIT_WITH:-0}\n",
        )?;
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755))?;

        let env = ProcessEnv::from_pairs([
            ("PATH", format!("{}:/usr/bin:/bin", dir.path().display())),
            ("SOME_KEY", "some-value".to_string()),
        ]);
        let execution = Execution::new(["a", "b"])
            .with_env(env.clone())
            .with_dir(dir.path());

        let output = PathExecutable::new("show-env").execute(&execution)?;
        let cwd = fs::canonicalize(dir.path())?;
        assert_eq!(output.stdout, format!("some-value|{}|a b\n", cwd.display()));
        assert_eq!(output.stderr, "oops\n");

        let failing = Execution::new(Vec::<String>::new())
            .with_env(env.with("EXIT_WITH", "3"))
            .with_dir(dir.path());
        let err = PathExecutable::new("show-env")
            .execute(&failing)
            .err()
            .ok_or("expected failure")?;
        assert_eq!(err.to_string(), "'show-env' exited with status 3");
        assert_eq!(err.output().map(|o| o.stderr.as_str()), Some("oops\n"));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_merged_output_keeps_write_order() -> Result<(), Box<dyn std::error::Error>> {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new()?;
        let script = dir.path().join("chatty");
        fs::write(
            &script,
            "#!/bin/sh\necho one\necho two >&2\necho three\necho four >&2\nexit 2\n",
        )?;
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755))?;

        let env = ProcessEnv::from_pairs([("PATH", format!("{}:/usr/bin:/bin", dir.path().display()))]);
        let execution = Execution::new(Vec::<String>::new())
            .with_env(env)
            .with_dir(dir.path())
            .with_merged_output();

        let err = PathExecutable::new("chatty")
            .execute(&execution)
            .err()
            .ok_or("expected failure")?;
        let output = err.output().ok_or("expected captured output")?;
        assert_eq!(output.stdout, "one\ntwo\nthree\nfour\n");
        assert_eq!(output.stderr, "");
        assert_eq!(output.combined(), "one\ntwo\nthree\nfour\n");
        Ok(())
    }
}
