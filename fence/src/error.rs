use std::ops::Range;
use std::path::PathBuf;

use codespan_reporting::diagnostic::{Diagnostic, Label};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("start tag must not be empty")]
    EmptyStart,
    #[error("end tag must not be empty")]
    EmptyEnd,
}

/// A start tag with no end tag anywhere after it.
///
/// No block is produced for it, and scanning of the document stops there.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "unterminated code block #{index} in {} (opened on line {line})",
    .document.display()
)]
pub struct UnterminatedBlock {
    pub document: PathBuf,
    /// The index the block would have had.
    pub index: usize,
    /// Byte span of the offending start tag.
    pub span: Range<usize>,
    /// 1-based line of the start tag.
    pub line: usize,
    /// The end tag that was expected.
    pub end_tag: String,
}

impl UnterminatedBlock {
    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic<FileId: Copy>(&self, file_id: FileId) -> Diagnostic<FileId> {
        Diagnostic::error()
            .with_message(format!("unterminated code block #{}", self.index))
            .with_labels(vec![
                Label::primary(file_id, self.span.clone())
                    .with_message("this fence is never closed"),
            ])
            .with_notes(vec![format!(
                "expected `{}` before the end of the file",
                self.end_tag
            )])
    }
}
