pub mod block;
pub mod error;
pub mod scan;
pub mod tags;

use std::path::{Path, PathBuf};

pub use block::CodeBlock;
pub use error::{TagError, UnterminatedBlock};
pub use scan::Blocks;
pub use tags::FenceTags;

/// A documentation file held in memory while its examples are extracted.
#[derive(Debug, Clone)]
pub struct Document {
    /// Identifier attached to every block extracted from this document.
    pub path: PathBuf,
    pub text: String,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Document {
            path: path.into(),
            text: text.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Scan the document for blocks delimited by `tags`.
    /// Every call starts over from the beginning of the text.
    pub fn blocks<'a>(&'a self, tags: &'a FenceTags) -> Blocks<'a> {
        Blocks::new(&self.path, &self.text, tags)
    }

    /// All blocks of the document, or the first unterminated one.
    pub fn extract(&self, tags: &FenceTags) -> Result<Vec<CodeBlock>, UnterminatedBlock> {
        scan::extract(&self.path, &self.text, tags)
    }
}
