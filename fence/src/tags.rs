use crate::error::TagError;

pub const DEFAULT_START_TAG: &str = "```lpg";
pub const DEFAULT_END_TAG: &str = "```";

/// The start/end delimiter pair that brackets an example.
///
/// Both tags are matched as plain substrings. Neither may be empty, since an
/// empty tag matches everywhere and the scan could never make progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceTags {
    start: String,
    end: String,
}

impl FenceTags {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Result<Self, TagError> {
        let start = start.into();
        let end = end.into();
        if start.is_empty() {
            return Err(TagError::EmptyStart);
        }
        if end.is_empty() {
            return Err(TagError::EmptyEnd);
        }
        Ok(FenceTags { start, end })
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }
}

impl Default for FenceTags {
    fn default() -> Self {
        FenceTags {
            start: DEFAULT_START_TAG.to_string(),
            end: DEFAULT_END_TAG.to_string(),
        }
    }
}
