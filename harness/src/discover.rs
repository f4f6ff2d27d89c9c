use std::path::{Path, PathBuf};

use fence::{CodeBlock, Document};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};

/// List every file under `root` whose name ends with `suffix`, in sorted path order.
///
/// Fails with `InvalidRoot` before touching anything if `root` is not a directory.
pub fn discover_documents(root: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(HarnessError::InvalidRoot(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|source| HarnessError::Walk {
            path: source.path().unwrap_or(root).to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(suffix));
        if matches {
            files.push(entry.into_path());
        }
    }
    files.sort();
    debug!(root = %root.display(), documents = files.len(), "discovered documents");
    Ok(files)
}

/// Path of `path` relative to `root`, '/'-separated.
pub fn document_label(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Extract the examples of every document under `root`, in traversal order.
///
/// Each block's `document` is its path relative to `root`.
pub fn collect_blocks(root: &Path, config: &HarnessConfig) -> Result<Vec<CodeBlock>> {
    let tags = config.tags()?;
    let paths = discover_documents(root, &config.suffix)?;

    let mut blocks = Vec::new();
    for path in &paths {
        let text = std::fs::read_to_string(path).map_err(|source| HarnessError::Read {
            path: path.clone(),
            source,
        })?;
        let document = Document::new(document_label(root, path), text);

        let extracted = document
            .extract(&tags)
            .map_err(|source| HarnessError::Unterminated {
                path: path.clone(),
                source,
            })?;
        debug!(
            document = %document.path().display(),
            blocks = extracted.len(),
            "extracted examples"
        );
        blocks.extend(extracted);
    }

    info!(documents = paths.len(), blocks = blocks.len(), "collected examples");
    Ok(blocks)
}
