use std::iter::FusedIterator;
use std::path::Path;

use crate::block::CodeBlock;
use crate::error::UnterminatedBlock;
use crate::tags::FenceTags;

/// Lazy scan over the code blocks of one document, in textual order.
///
/// Yields `Ok` for each closed block. A start tag without a matching end tag
/// yields a single `Err` and ends the scan; the remainder of the document is
/// never treated as block content.
#[derive(Debug, Clone)]
pub struct Blocks<'a> {
    document: &'a Path,
    text: &'a str,
    tags: &'a FenceTags,
    /// Byte offset where the next start-tag search begins.
    cursor: usize,
    /// Index of the next block within the document.
    index: usize,
    /// 1-based line number of `line_offset`.
    line: usize,
    /// Byte offset up to which newlines have been counted.
    line_offset: usize,
    done: bool,
}

impl<'a> Blocks<'a> {
    pub fn new(document: &'a Path, text: &'a str, tags: &'a FenceTags) -> Self {
        Blocks {
            document,
            text,
            tags,
            cursor: 0,
            index: 0,
            line: 1,
            line_offset: 0,
            done: false,
        }
    }

    /// Line of `offset`, counting only the newlines since the previous call.
    /// Offsets must not decrease between calls.
    fn line_at(&mut self, offset: usize) -> usize {
        self.line += self.text.as_bytes()[self.line_offset..offset]
            .iter()
            .filter(|&&b| b == b'\n')
            .count();
        self.line_offset = offset;
        self.line
    }
}

/// Find `tag` in `text` at or after `from`.
fn find_tag(text: &str, from: usize, tag: &str) -> Option<usize> {
    text.get(from..)?.find(tag).map(|offset| from + offset)
}

impl Iterator for Blocks<'_> {
    type Item = Result<CodeBlock, UnterminatedBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let start_tag = self.tags.start();
        let end_tag = self.tags.end();

        let Some(start) = find_tag(self.text, self.cursor, start_tag) else {
            self.done = true;
            return None;
        };
        let body_start = start + start_tag.len();
        let line = self.line_at(start);

        let Some(end) = find_tag(self.text, body_start, end_tag) else {
            self.done = true;
            return Some(Err(UnterminatedBlock {
                document: self.document.to_path_buf(),
                index: self.index,
                span: start..body_start,
                line,
                end_tag: end_tag.to_string(),
            }));
        };

        // Resume strictly after the consumed end tag.
        self.cursor = end + end_tag.len();

        let raw = &self.text[body_start..end];
        let content = raw.trim();
        let leading = raw.len() - raw.trim_start().len();
        let content_start = body_start + leading;

        let block = CodeBlock {
            document: self.document.to_path_buf(),
            index: self.index,
            content: content.to_string(),
            span: content_start..content_start + content.len(),
            line,
        };
        self.index += 1;
        Some(Ok(block))
    }
}

impl FusedIterator for Blocks<'_> {}

/// Extract every block of `text`, stopping at the first unterminated one.
pub fn extract(
    document: &Path,
    text: &str,
    tags: &FenceTags,
) -> Result<Vec<CodeBlock>, UnterminatedBlock> {
    Blocks::new(document, text, tags).collect()
}
