// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bildwerk-document — Image extraction from PDF documents.
//
// Walks every page of a PDF (resource dictionaries and content-stream draw
// operators), decodes embedded images, keeps those that are large and
// coloured enough, writes them as PNG, and finally removes "furniture":
// images repeated often enough across the document to be decoration.
// Selected pages can also be rasterized whole.

pub mod extract;
pub mod image;
pub mod inspect;
pub mod pdf;
pub mod render;

// Re-export the primary entry points so callers can use
// `bildwerk_document::ImageExtractor` etc.
pub use extract::ImageExtractor;
pub use inspect::{PageInspection, inspect_page};
pub use pdf::reader::PdfReader;
pub use render::{PageRasterizer, default_rasterizer};

#[cfg(feature = "pdfium")]
pub use render::PdfiumRasterizer;
