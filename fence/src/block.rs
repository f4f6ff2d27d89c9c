use std::fmt;
use std::ops::Range;
use std::path::PathBuf;

/// One example extracted from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// The document the block came from.
    pub document: PathBuf,
    /// 0-based position among the blocks of `document`.
    pub index: usize,
    /// Text between the tags, with surrounding whitespace trimmed.
    pub content: String,
    /// Byte span of `content` in the document.
    pub span: Range<usize>,
    /// 1-based line of the start tag.
    pub line: usize,
}

impl fmt::Display for CodeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.document.display(), self.index)
    }
}
