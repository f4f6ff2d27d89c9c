use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{HarnessError, Result};

/// Write `contents` to `path` through a temporary file in the same directory.
///
/// The destination is replaced only once the data is fully written, so a failed
/// run leaves either the previous artifact or none at all.
pub fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let write_err = |source: std::io::Error| HarnessError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = NamedTempFile::new_in(dir).map_err(write_err)?;
    file.write_all(contents).map_err(write_err)?;
    file.flush().map_err(write_err)?;
    file.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
