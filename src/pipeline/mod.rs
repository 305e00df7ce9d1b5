// Pipelines: file-to-file orchestration of each analysis.

pub mod distance_map;
pub mod transitions;

use std::fs;
use std::path::Path;

use crate::error::{Result, SptmError};

/// Write a text artifact, creating parent directories as needed.
fn write_output(path: &Path, contents: &str) -> Result<()> {
    let output_err = |source| SptmError::Output {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(output_err)?;
        }
    }
    fs::write(path, contents).map_err(output_err)
}
