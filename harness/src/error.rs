use std::io;
use std::path::PathBuf;

use fence::{TagError, UnterminatedBlock};
use thiserror::Error;

use crate::compiler::Exit;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("root directory not found: {}", .0.display())]
    InvalidRoot(PathBuf),

    #[error("cannot walk {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A document contains a start tag that is never closed.
    #[error("{source}")]
    Unterminated {
        /// Location of the document on disk.
        path: PathBuf,
        #[source]
        source: UnterminatedBlock,
    },

    #[error("cannot run compiler {}: {source}", .compiler.display())]
    CompilerLaunch {
        compiler: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("example {document} : {index} failed to compile ({exit})")]
    CompilationFailed {
        document: String,
        index: usize,
        exit: Exit,
    },

    /// The run stopped before `document : index` produced an exit status.
    #[error("compilation stopped at example {document} : {index}")]
    Aborted { document: String, index: usize },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<TagError> for HarnessError {
    fn from(err: TagError) -> Self {
        HarnessError::Config(err.to_string())
    }
}
