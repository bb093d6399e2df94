// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Whole-page rasterization seam.
//
// The extractor only needs "page N of this file at this scale, as pixels".
// The PDFium binding lives behind the `pdfium` feature; tests plug in their
// own implementation.

use std::path::Path;

use bildwerk_core::error::Result;
use image::DynamicImage;

#[cfg(feature = "pdfium")]
pub mod pdfium;

#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRasterizer;

/// Renders whole PDF pages to pixels.
pub trait PageRasterizer {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Render the page at 0-based `page_index` of `document`, scaled by
    /// `scale` relative to PDF user space (1.0 = 72 DPI).
    fn render_page(&self, document: &Path, page_index: u32, scale: f32) -> Result<DynamicImage>;
}

/// The rasterizer compiled into this build, bound to a system library.
#[cfg(feature = "pdfium")]
pub fn default_rasterizer() -> Result<Box<dyn PageRasterizer>> {
    Ok(Box::new(PdfiumRasterizer::bind()?))
}

/// The rasterizer compiled into this build. Without the `pdfium` feature
/// there is none.
#[cfg(not(feature = "pdfium"))]
pub fn default_rasterizer() -> Result<Box<dyn PageRasterizer>> {
    Err(bildwerk_core::BildwerkError::RendererUnavailable(
        "built without the `pdfium` feature".into(),
    ))
}
