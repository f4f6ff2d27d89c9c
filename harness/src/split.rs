use std::fs;
use std::path::{Path, PathBuf};

use fence::CodeBlock;
use tracing::{debug, info};

use crate::config::HarnessConfig;
use crate::discover::collect_blocks;
use crate::error::{HarnessError, Result};
use crate::output::write_atomically;

/// Name of the split file for the `counter`-th example of the run.
pub fn split_file_name(counter: usize, extension: &str) -> String {
    format!("{}.{}", counter, extension)
}

/// Write each block to `<dir>/<counter>.<extension>`, counting from 0 across all documents.
///
/// Numbered files left over from an earlier, larger run are removed.
pub fn write_split(blocks: &[CodeBlock], dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|source| HarnessError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(blocks.len());
    for (counter, block) in blocks.iter().enumerate() {
        let path = dir.join(split_file_name(counter, extension));
        write_atomically(&path, format!("{}\n", block.content).as_bytes())?;
        debug!(path = %path.display(), example = %block, "wrote example");
        written.push(path);
    }

    remove_stale(dir, extension, blocks.len())?;
    Ok(written)
}

fn remove_stale(dir: &Path, extension: &str, count: usize) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|source| HarnessError::Read {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let path = entry
            .map_err(|source| HarnessError::Read {
                path: dir.to_path_buf(),
                source,
            })?
            .path();
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        let Some(counter) = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<usize>().ok())
        else {
            continue;
        };
        if counter >= count {
            fs::remove_file(&path).map_err(|source| HarnessError::Write {
                path: path.clone(),
                source,
            })?;
            debug!(path = %path.display(), "removed stale example");
        }
    }
    Ok(())
}

/// Write every example under `root` to its own file in `config.split_dir`.
pub fn split(root: &Path, config: &HarnessConfig) -> Result<Vec<PathBuf>> {
    let blocks = collect_blocks(root, config)?;
    let written = write_split(&blocks, &config.split_dir, &config.unit_extension)?;
    info!(dir = %config.split_dir.display(), files = written.len(), "wrote split examples");
    Ok(written)
}
