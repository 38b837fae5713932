//! Decode / resize / encode pipeline for a single image.
//!
//! All functions here are synchronous and CPU or disk bound. Async callers
//! should run [`resize_file`] on a blocking thread.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Seek, Write};
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageFormat, Limits};

use crate::error::CoreError;
use crate::output_path::resized_path_for;

/// Resampling filter used for every resize.
pub const RESIZE_FILTER: FilterType = FilterType::Lanczos3;

/// Memory a single resize may allocate for its output and scratch buffers.
pub const MAX_RESIZE_ALLOC: u64 = 512 * 1024 * 1024;

/// The raster formats the pipeline understands, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Jpeg,
    Png,
}

impl SourceFormat {
    /// Pick the codec from the path's extension (ASCII case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg") {
            Ok(Self::Jpeg)
        } else if ext.eq_ignore_ascii_case("png") {
            Ok(Self::Png)
        } else if ext.is_empty() {
            Err(CoreError::UnsupportedFormat(format!(
                "'{}' has no file extension",
                path.display()
            )))
        } else {
            Err(CoreError::UnsupportedFormat(format!(".{ext}")))
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
        }
    }
}

/// Exact output dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    /// Accepts only dimensions that fit a `u32` and are non-zero.
    pub fn new(width: i64, height: i64) -> Result<Self, CoreError> {
        let to_px = |value: i64, name: &str| {
            u32::try_from(value)
                .ok()
                .filter(|v| *v > 0)
                .ok_or_else(|| {
                    CoreError::InvalidInput(format!("target {name} must be positive, got {value}"))
                })
        };
        Ok(Self {
            width: to_px(width, "width")?,
            height: to_px(height, "height")?,
        })
    }
}

/// Open the source image for reading.
pub fn open_source(path: &Path) -> Result<File, CoreError> {
    File::open(path).map_err(|e| CoreError::io(format!("open {}", path.display()), e))
}

/// Decode an image stream with the given codec.
pub fn decode<R: BufRead + Seek>(reader: R, format: SourceFormat) -> Result<DynamicImage, CoreError> {
    image::load(reader, format.image_format()).map_err(CoreError::Decode)
}

/// Check that resizing `image` to `size` fits [`MAX_RESIZE_ALLOC`].
///
/// Counts the output buffer plus the `f32` RGBA buffer of the vertical pass
/// (source width x target height).
pub fn check_resize_budget(image: &DynamicImage, size: TargetSize) -> Result<(), CoreError> {
    let mut limits = Limits::default();
    limits.max_alloc = Some(MAX_RESIZE_ALLOC);

    limits
        .reserve_buffer(size.width, size.height, image.color())
        .and_then(|()| limits.reserve_buffer(image.width(), size.height, ColorType::Rgba32F))
        .map_err(|e| {
            CoreError::InvalidInput(format!(
                "target size {}x{} is too large: {e}",
                size.width, size.height
            ))
        })
}

/// Resize to exactly `size`. Aspect ratio is not preserved.
pub fn resize(image: &DynamicImage, size: TargetSize) -> DynamicImage {
    image.resize_exact(size.width, size.height, RESIZE_FILTER)
}

/// Create (or truncate) `path` and encode `image` into it.
pub fn write_output(image: &DynamicImage, path: &Path, format: SourceFormat) -> Result<(), CoreError> {
    let file = File::create(path).map_err(|e| CoreError::io(format!("create {}", path.display()), e))?;
    let mut writer = BufWriter::new(file);
    image
        .write_to(&mut writer, format.image_format())
        .map_err(CoreError::Encode)?;
    writer
        .flush()
        .map_err(|e| CoreError::io(format!("flush {}", path.display()), e))
}

/// Run the whole pipeline for one source file and return the output path.
///
/// Order matters for error reporting: the file is opened before the
/// extension is checked, and the output directory is only created once the
/// image has been decoded and resized.
pub fn resize_file(source: &Path, width: i64, height: i64) -> Result<PathBuf, CoreError> {
    let file = open_source(source)?;
    let format = SourceFormat::from_path(source)?;
    let decoded = decode(BufReader::new(file), format)?;

    let size = TargetSize::new(width, height)?;
    check_resize_budget(&decoded, size)?;
    let resized = resize(&decoded, size);

    let output = resized_path_for(source)?;
    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .map_err(|e| CoreError::io(format!("create directory {}", dir.display()), e))?;
    }

    write_output(&resized, &output, format)?;
    Ok(output)
}
