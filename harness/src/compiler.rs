use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use tracing::debug;

use crate::error::{HarnessError, Result};

/// How a compiler process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exit {
    /// Exit code, or None if the process was killed by a signal.
    pub code: Option<i32>,
}

impl Exit {
    pub const SUCCESS: Exit = Exit { code: Some(0) };

    pub fn with_code(code: i32) -> Self {
        Exit { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for Exit {
    fn from(status: ExitStatus) -> Self {
        Exit {
            code: status.code(),
        }
    }
}

impl fmt::Display for Exit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit status {}", code),
            None => write!(f, "terminated by signal"),
        }
    }
}

/// Something that can check a single compilation unit.
pub trait Compiler {
    /// Compile `unit` without linking or running it.
    fn compile(&mut self, unit: &Path) -> Result<Exit>;
}

/// Runs `<program> <command> <unit>` and waits for it.
///
/// The child inherits stdout and stderr so its diagnostics reach the user.
#[derive(Debug, Clone)]
pub struct ProcessCompiler {
    pub program: PathBuf,
    pub command: String,
}

impl ProcessCompiler {
    pub fn new(program: impl Into<PathBuf>, command: impl Into<String>) -> Self {
        ProcessCompiler {
            program: program.into(),
            command: command.into(),
        }
    }
}

impl Compiler for ProcessCompiler {
    fn compile(&mut self, unit: &Path) -> Result<Exit> {
        debug!(
            compiler = %self.program.display(),
            command = %self.command,
            unit = %unit.display(),
            "invoking compiler"
        );
        let status = Command::new(&self.program)
            .arg(&self.command)
            .arg(unit)
            .stdin(Stdio::null())
            .status()
            .map_err(|source| HarnessError::CompilerLaunch {
                compiler: self.program.clone(),
                source,
            })?;
        Ok(Exit::from(status))
    }
}
