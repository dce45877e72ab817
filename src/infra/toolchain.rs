//! External tool invocation
//!
//! Runs the Flutter toolchain and the installer compiler as blocking child
//! processes. Environment overrides are applied to the child only; the
//! orchestrator's own environment is never modified.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Environment variables passed to toolchain child processes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolchainEnv {
    vars: BTreeMap<String, String>,
}

impl ToolchainEnv {
    /// Empty override set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace one variable
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Look up a variable
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Iterate variables in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ToolchainEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A single external command to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to execute
    pub program: PathBuf,
    /// Arguments
    pub args: Vec<String>,
    /// Working directory
    pub cwd: PathBuf,
    /// Environment overrides for the child
    pub env: ToolchainEnv,
}

impl Invocation {
    /// Create an invocation with no environment overrides
    pub fn new(program: impl Into<PathBuf>, args: &[&str], cwd: &Path) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
            cwd: cwd.to_path_buf(),
            env: ToolchainEnv::new(),
        }
    }

    /// Attach environment overrides
    #[must_use]
    pub fn with_env(mut self, env: ToolchainEnv) -> Self {
        self.env = env;
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Result of a finished child process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, if the process exited normally
    pub code: Option<i32>,
    /// Captured standard error (lossy UTF-8)
    pub stderr: String,
}

impl ToolOutput {
    /// Successful exit with no output
    pub fn ok() -> Self {
        Self {
            code: Some(0),
            stderr: String::new(),
        }
    }

    /// Failed exit with the given code and stderr
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stderr: stderr.into(),
        }
    }

    /// Exit status 0
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Diagnostic text for a failed run
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        match (self.code, stderr.is_empty()) {
            (Some(code), true) => format!("exited with status {code}"),
            (None, true) => "terminated by signal".to_string(),
            (_, false) => stderr.to_string(),
        }
    }
}

/// Runs external commands
///
/// The seam between orchestration and the operating system; tests substitute
/// a recording implementation.
pub trait CommandRunner {
    /// Run to completion, blocking the caller
    ///
    /// `Err` means the process could not be started at all.
    fn run(&self, invocation: &Invocation) -> std::io::Result<ToolOutput>;
}

/// Runs commands as real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> std::io::Result<ToolOutput> {
        tracing::debug!("Running: {invocation}");

        let program = resolve_program(&invocation.program);
        let output = Command::new(program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .envs(invocation.env.iter())
            .output()?;

        Ok(ToolOutput {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Resolve a bare program name through `PATH`
///
/// On Windows `flutter` is a `.bat` shim that `Command` will not find by
/// bare name, so the lookup goes through `which`.
fn resolve_program(program: &Path) -> PathBuf {
    if program.components().count() > 1 {
        return program.to_path_buf();
    }
    which::which(program).unwrap_or_else(|_| program.to_path_buf())
}

/// Check whether a tool is runnable from `PATH`
pub fn is_available(program: &str) -> bool {
    which::which(program).is_ok()
}
