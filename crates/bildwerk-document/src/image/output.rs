// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output writer — deterministic file naming next to the input PDF and PNG
// encoding of extracted images and page renders.

use std::path::{Path, PathBuf};

use bildwerk_core::error::{BildwerkError, Result};
use image::{DynamicImage, ImageFormat};
use tracing::{debug, instrument};

/// Builds output paths for one input document.
///
/// Files land in the input's directory (`.` when the path has none) and are
/// prefixed with the input's file name minus its last extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNamer {
    dir: PathBuf,
    base_name: String,
}

impl OutputNamer {
    // -- Construction ---------------------------------------------------------

    pub fn for_input(input: impl AsRef<Path>) -> Self {
        let input = input.as_ref();
        let dir = match input.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let base_name = input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        Self { dir, base_name }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    // -- Names ----------------------------------------------------------------

    /// `{base}_page{page}_img{counter}_{w}x{h}.png`
    pub fn image_path(&self, page: u32, counter: u32, width: u32, height: u32) -> PathBuf {
        self.dir.join(format!(
            "{}_page{}_img{}_{}x{}.png",
            self.base_name, page, counter, width, height
        ))
    }

    /// `{base}_page{page}_rendered_{w}x{h}.png`
    pub fn render_path(&self, page: u32, width: u32, height: u32) -> PathBuf {
        self.dir.join(format!(
            "{}_page{}_rendered_{}x{}.png",
            self.base_name, page, width, height
        ))
    }
}

/// Encode `image` as PNG at `path`, replacing any existing file.
#[instrument(skip(image), fields(path = %path.display()))]
pub fn write_png(image: &DynamicImage, path: &Path) -> Result<()> {
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|err| {
            BildwerkError::ImageEncode(format!(
                "failed to write {}: {}",
                path.display(),
                err
            ))
        })?;
    debug!(width = image.width(), height = image.height(), "PNG written");
    Ok(())
}
