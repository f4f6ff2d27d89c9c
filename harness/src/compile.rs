use std::io::Write;
use std::path::Path;

use fence::CodeBlock;
use tracing::{debug, info};

use crate::compiler::{Compiler, Exit};
use crate::config::HarnessConfig;
use crate::discover::collect_blocks;
use crate::error::{HarnessError, Result};

/// Outcome of compiling one example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationResult {
    /// Document the example came from, relative to the root.
    pub document: String,
    /// Index of the example within its document.
    pub index: usize,
    pub exit: Exit,
}

impl CompilationResult {
    pub fn success(&self) -> bool {
        self.exit.success()
    }
}

/// Progress of a compile-and-report run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Pending,
    /// Compiling the n-th example of the run.
    Compiling(usize),
    Success,
    /// Terminal: the last result failed and nothing after it is attempted.
    Failed,
    /// Terminal: the n-th example could not be handed to the compiler.
    Aborted(usize),
}

/// Every example compiled cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileReport {
    pub results: Vec<CompilationResult>,
}

impl CompileReport {
    pub fn passed(&self) -> usize {
        self.results.len()
    }
}

/// Compiles examples one at a time, stopping at the first failure.
pub struct CompileRun<'a, C: Compiler> {
    blocks: &'a [CodeBlock],
    compiler: &'a mut C,
    extension: &'a str,
    state: RunState,
    results: Vec<CompilationResult>,
}

impl<'a, C: Compiler> CompileRun<'a, C> {
    pub fn new(blocks: &'a [CodeBlock], compiler: &'a mut C, extension: &'a str) -> Self {
        CompileRun {
            blocks,
            compiler,
            extension,
            state: RunState::Pending,
            results: Vec::with_capacity(blocks.len()),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn results(&self) -> &[CompilationResult] {
        &self.results
    }

    /// Compile the next example. Returns `None` once the run is terminal.
    pub fn step(&mut self) -> Result<Option<&CompilationResult>> {
        if matches!(
            self.state,
            RunState::Success | RunState::Failed | RunState::Aborted(_)
        ) {
            return Ok(None);
        }

        let ordinal = self.results.len();
        let Some(block) = self.blocks.get(ordinal) else {
            self.state = RunState::Success;
            return Ok(None);
        };

        self.state = RunState::Compiling(ordinal);
        let exit = match compile_block(block, &mut *self.compiler, self.extension) {
            Ok(exit) => exit,
            Err(err) => {
                self.state = RunState::Aborted(ordinal);
                return Err(err);
            }
        };

        if exit.success() {
            debug!(example = %block, "compiled");
        } else {
            info!(example = %block, %exit, "example failed to compile");
            self.state = RunState::Failed;
        }

        self.results.push(CompilationResult {
            document: label(block),
            index: block.index,
            exit,
        });
        Ok(self.results.last())
    }

    /// Drive the run to its end and turn the terminal state into a result.
    pub fn finish(mut self) -> Result<CompileReport> {
        while self.step()?.is_some() {}

        let failure = match self.state {
            // Failed is only entered by a step that also records its result.
            RunState::Failed => self.results.last().map(|failed| HarnessError::CompilationFailed {
                document: failed.document.clone(),
                index: failed.index,
                exit: failed.exit,
            }),
            RunState::Aborted(ordinal) => {
                let block = &self.blocks[ordinal];
                Some(HarnessError::Aborted {
                    document: label(block),
                    index: block.index,
                })
            }
            _ => None,
        };
        if let Some(err) = failure {
            return Err(err);
        }
        Ok(CompileReport {
            results: self.results,
        })
    }
}

fn label(block: &CodeBlock) -> String {
    block.document.to_string_lossy().replace('\\', "/")
}

/// Write `block` to a fresh temporary unit and hand it to `compiler`.
///
/// The unit is deleted as soon as the compiler returns.
fn compile_block<C: Compiler>(
    block: &CodeBlock,
    compiler: &mut C,
    extension: &str,
) -> Result<Exit> {
    let write_err = |source: std::io::Error| HarnessError::Write {
        path: std::env::temp_dir(),
        source,
    };

    let mut unit = tempfile::Builder::new()
        .prefix("lpg-doc-")
        .suffix(&format!(".{}", extension))
        .tempfile()
        .map_err(write_err)?;
    unit.write_all(block.content.as_bytes()).map_err(write_err)?;
    unit.write_all(b"\n").map_err(write_err)?;
    unit.flush().map_err(write_err)?;

    // Close our handle before the compiler opens the file.
    let unit = unit.into_temp_path();
    compiler.compile(&unit)
}

/// Compile `blocks` in order, calling `on_result` after each attempt.
pub fn compile_blocks<C: Compiler>(
    blocks: &[CodeBlock],
    compiler: &mut C,
    extension: &str,
    mut on_result: impl FnMut(&CompilationResult),
) -> Result<CompileReport> {
    let mut run = CompileRun::new(blocks, compiler, extension);
    while let Some(result) = run.step()? {
        on_result(result);
    }
    run.finish()
}

/// Compile every example under `root`, failing on the first rejected one.
pub fn compile<C: Compiler>(
    root: &Path,
    config: &HarnessConfig,
    compiler: &mut C,
    on_result: impl FnMut(&CompilationResult),
) -> Result<CompileReport> {
    let blocks = collect_blocks(root, config)?;
    let report = compile_blocks(&blocks, compiler, &config.unit_extension, on_result)?;
    info!(passed = report.passed(), "all examples compiled");
    Ok(report)
}
