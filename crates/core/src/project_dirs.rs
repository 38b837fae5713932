//! Filesystem side of projects: one directory per project under a base dir.
//!
//! ```text
//! <base>/<slug>/uploads/<project_id>_<nanos>.<ext>   uploaded sources
//! <base>/<slug>/resized/...                          worker output
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::types::DbId;

/// Sub-directory of a project location that receives uploads.
pub const UPLOADS_DIR_NAME: &str = "uploads";

/// Fallback slug when a project name has no usable characters.
const DEFAULT_SLUG: &str = "project";

/// Owner of the projects base directory.
#[derive(Debug, Clone)]
pub struct ProjectDirectories {
    base_dir: PathBuf,
}

impl ProjectDirectories {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Create a fresh directory for a project named `name`.
    ///
    /// The directory name is [`slugify`]d. If it is already taken a numeric
    /// suffix is appended, so every project gets its own location.
    pub fn create(&self, name: &str) -> Result<PathBuf, CoreError> {
        std::fs::create_dir_all(&self.base_dir).map_err(|e| {
            CoreError::io(format!("create base directory {}", self.base_dir.display()), e)
        })?;

        let slug = slugify(name);
        let mut candidate = self.base_dir.join(&slug);
        let mut suffix = 2u32;
        loop {
            match std::fs::create_dir(&candidate) {
                Ok(()) => return Ok(candidate),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    candidate = self.base_dir.join(format!("{slug}-{suffix}"));
                    suffix += 1;
                }
                Err(e) => {
                    return Err(CoreError::io(
                        format!("create project directory {}", candidate.display()),
                        e,
                    ))
                }
            }
        }
    }

    /// Recursively remove a project directory. A directory that is already
    /// gone counts as removed.
    pub fn remove(&self, location: &Path) -> Result<(), CoreError> {
        match std::fs::remove_dir_all(location) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::io(
                format!("remove project directory {}", location.display()),
                e,
            )),
        }
    }

    /// Store uploaded bytes under `<location>/uploads/` with a unique name
    /// that keeps the original extension.
    pub fn save_upload(
        &self,
        location: &Path,
        project_id: DbId,
        file_name: &str,
        data: &[u8],
    ) -> Result<PathBuf, CoreError> {
        let uploads = location.join(UPLOADS_DIR_NAME);
        std::fs::create_dir_all(&uploads)
            .map_err(|e| CoreError::io(format!("create {}", uploads.display()), e))?;

        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        let stamp = chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default();
        let path = uploads.join(format!("{project_id}_{stamp}{ext}"));

        std::fs::write(&path, data)
            .map_err(|e| CoreError::io(format!("write {}", path.display()), e))?;
        Ok(path)
    }

    /// Resolve `path` and check that it lives under the base directory.
    ///
    /// Returns the canonical path. Fails with `InvalidInput` for anything
    /// outside the base dir and `Io` when the file cannot be resolved.
    pub fn resolve_within(&self, path: &Path) -> Result<PathBuf, CoreError> {
        let base = self
            .base_dir
            .canonicalize()
            .map_err(|e| CoreError::io(format!("resolve {}", self.base_dir.display()), e))?;
        let resolved = path
            .canonicalize()
            .map_err(|e| CoreError::io(format!("resolve {}", path.display()), e))?;
        if resolved.starts_with(&base) {
            Ok(resolved)
        } else {
            Err(CoreError::InvalidInput(format!(
                "'{}' is outside the projects directory",
                path.display()
            )))
        }
    }
}

/// Directory-safe form of a project name: lowercase, whitespace runs become
/// `-`, anything other than ASCII alphanumerics, `-` and `_` is dropped.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.trim().chars() {
        if ch.is_whitespace() {
            if !slug.ends_with('-') {
                slug.push('-');
            }
        } else if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            slug.push(ch.to_ascii_lowercase());
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        DEFAULT_SLUG.to_string()
    } else {
        slug.to_string()
    }
}
