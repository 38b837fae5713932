//! Location of resized artifacts.
//!
//! A resized image lives in a `resized` directory next to the directory
//! that holds the source's parent, under the source's file name:
//!
//! ```text
//! <project>/uploads/photo.jpg  ->  <project>/resized/photo.jpg
//! ```
//!
//! The rule depends on the upload path depth. Existing data is laid out
//! this way, so it must not change.

use std::path::{Path, PathBuf};

use crate::error::CoreError;

/// Name of the output directory created beside the upload directory.
pub const RESIZED_DIR_NAME: &str = "resized";

/// Directory that receives the resized copy of `source`.
pub fn resized_dir_for(source: &Path) -> PathBuf {
    let grandparent = source
        .parent()
        .and_then(Path::parent)
        .unwrap_or_else(|| Path::new(""));
    grandparent.join(RESIZED_DIR_NAME)
}

/// Full output path for the resized copy of `source`.
pub fn resized_path_for(source: &Path) -> Result<PathBuf, CoreError> {
    let file_name = source.file_name().ok_or_else(|| {
        CoreError::InvalidInput(format!(
            "source path '{}' has no file name",
            source.display()
        ))
    })?;
    Ok(resized_dir_for(source).join(file_name))
}
