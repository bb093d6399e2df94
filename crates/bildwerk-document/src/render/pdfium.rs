// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDFium page rasterizer via `pdfium-render`. The PDFium shared library is
// bound at runtime: first from the working directory, then from the system.

use std::path::Path;

use bildwerk_core::error::{BildwerkError, Result};
use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, info, instrument};

use crate::render::PageRasterizer;

/// Renders pages with a bound PDFium library.
pub struct PdfiumRasterizer {
    pdfium: Pdfium,
}

impl PdfiumRasterizer {
    /// Bind to `./libpdfium` or the system library.
    pub fn bind() -> Result<Self> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|err| {
                BildwerkError::RendererUnavailable(format!("PDFium library not found: {err:?}"))
            })?;
        info!("PDFium bound");
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn name(&self) -> &str {
        "pdfium"
    }

    #[instrument(skip(self), fields(document = %document.display()))]
    fn render_page(&self, document: &Path, page_index: u32, scale: f32) -> Result<DynamicImage> {
        let index = u16::try_from(page_index)
            .map_err(|_| BildwerkError::Render(format!("page index {page_index} exceeds PDFium's range")))?;

        let pdf = self
            .pdfium
            .load_pdf_from_file(document, None)
            .map_err(|err| BildwerkError::Render(format!("PDFium could not open document: {err:?}")))?;
        let page = pdf
            .pages()
            .get(index)
            .map_err(|err| BildwerkError::Render(format!("page index {page_index}: {err:?}")))?;

        let config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let bitmap = page
            .render_with_config(&config)
            .map_err(|err| BildwerkError::Render(format!("page index {page_index}: {err:?}")))?;

        let image = bitmap.as_image();
        debug!(width = image.width(), height = image.height(), "Page rasterized");
        Ok(image)
    }
}
