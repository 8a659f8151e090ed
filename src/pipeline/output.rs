use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{OverlayError, OverlayResult};

/// Ensures `dir` exists and is empty apart from the `reserved` entry.
pub fn prepare_output_dir(dir: &Path, reserved: &str) -> OverlayResult<()> {
    fs::create_dir_all(dir).map_err(|err| OverlayError::io(dir, err))?;

    let entries = fs::read_dir(dir).map_err(|err| OverlayError::io(dir, err))?;
    let mut removed = 0usize;
    for entry in entries {
        let entry = entry.map_err(|err| OverlayError::io(dir, err))?;
        if entry.file_name() == reserved {
            continue;
        }
        let path = entry.path();
        let is_dir = entry
            .file_type()
            .map_err(|err| OverlayError::io(&path, err))?
            .is_dir();
        let result = if is_dir {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.map_err(|err| OverlayError::io(&path, err))?;
        removed += 1;
    }

    debug!(dir = %dir.display(), removed, "prepared output directory");
    Ok(())
}
