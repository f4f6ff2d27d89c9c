pub mod aggregate;
pub mod compile;
pub mod compiler;
pub mod config;
pub mod discover;
pub mod error;
pub mod output;
pub mod split;

pub use aggregate::{Aggregate, AggregateReport, aggregate};
pub use compile::{CompilationResult, CompileReport, CompileRun, RunState, compile, compile_blocks};
pub use compiler::{Compiler, Exit, ProcessCompiler};
pub use config::HarnessConfig;
pub use discover::{collect_blocks, discover_documents};
pub use error::{HarnessError, Result};
pub use split::split;
