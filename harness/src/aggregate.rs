use std::path::{Path, PathBuf};

use fence::CodeBlock;
use tracing::info;

use crate::config::HarnessConfig;
use crate::discover::collect_blocks;
use crate::error::Result;
use crate::output::write_atomically;

/// Prefix of the line written before every aggregated example.
pub const SEPARATOR: &str = "//";

/// The aggregate compilation unit under construction.
///
/// Threaded by value through the blocks and finalized once with [`Aggregate::finish`].
#[derive(Debug, Clone, Default)]
pub struct Aggregate {
    annotate: bool,
    text: String,
    blocks: usize,
}

impl Aggregate {
    pub fn new(annotate: bool) -> Self {
        Aggregate {
            annotate,
            text: String::new(),
            blocks: 0,
        }
    }

    /// Append one example, preceded by its separator line.
    pub fn push(mut self, block: &CodeBlock) -> Self {
        self.text.push_str(SEPARATOR);
        if self.annotate {
            self.text.push_str(&format!(
                " {} : {}",
                block.document.to_string_lossy().replace('\\', "/"),
                block.index
            ));
        }
        self.text.push('\n');
        self.text.push_str(&block.content);
        self.text.push('\n');
        self.blocks += 1;
        self
    }

    pub fn len(&self) -> usize {
        self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks == 0
    }

    pub fn finish(self) -> String {
        self.text
    }
}

/// Fold `blocks` into a single aggregate.
pub fn render(blocks: &[CodeBlock], annotate: bool) -> Aggregate {
    blocks.iter().fold(Aggregate::new(annotate), Aggregate::push)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateReport {
    pub path: PathBuf,
    pub blocks: usize,
}

/// Concatenate every example under `root` into `config.output`.
pub fn aggregate(root: &Path, config: &HarnessConfig) -> Result<AggregateReport> {
    let blocks = collect_blocks(root, config)?;
    let aggregate = render(&blocks, config.annotate);
    let count = aggregate.len();

    write_atomically(&config.output, aggregate.finish().as_bytes())?;
    info!(path = %config.output.display(), blocks = count, "wrote aggregate");

    Ok(AggregateReport {
        path: config.output.clone(),
        blocks: count,
    })
}
