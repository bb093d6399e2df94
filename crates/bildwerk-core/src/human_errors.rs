// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the command line.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The error class decides whether the run stops.

use crate::error::{BildwerkError, ErrorClass};

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (printed first).
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    /// How far the failure reaches.
    pub class: ErrorClass,
}

/// Convert a `BildwerkError` into a `HumanError` suitable for terminal output.
pub fn humanize_error(err: &BildwerkError) -> HumanError {
    let class = err.class();
    match err {
        BildwerkError::PdfOpen(detail) => humanize_open_error(detail),

        BildwerkError::PageResources { page, .. } => HumanError {
            message: format!("Page {page} could not be read."),
            suggestion: "Its images were skipped. The rest of the document was still processed."
                .into(),
            class,
        },

        BildwerkError::PageOutOfRange { page, total } => HumanError {
            message: format!("There is no page {page} in this document."),
            suggestion: format!("Choose a page between 1 and {total}."),
            class,
        },

        BildwerkError::ImageDecode(_) => HumanError {
            message: "One image in the document could not be decoded.".into(),
            suggestion: "It uses an unusual encoding. Run `bildwerk inspect` on its page for details."
                .into(),
            class,
        },

        BildwerkError::ImageEncode(_) => HumanError {
            message: "An image could not be saved as PNG.".into(),
            suggestion: "Check that the folder next to the PDF is writable and has free space."
                .into(),
            class,
        },

        BildwerkError::Render(_) => HumanError {
            message: "A page could not be rendered.".into(),
            suggestion: "Try a lower --dpi; very large renders can exhaust memory.".into(),
            class,
        },

        BildwerkError::RendererUnavailable(_) => HumanError {
            message: "Whole-page rendering is not available.".into(),
            suggestion: "Install the PDFium library (libpdfium) next to the binary or system-wide, or pass --no-render.".into(),
            class,
        },

        BildwerkError::FurnitureDelete { path, .. } => HumanError {
            message: format!("A decorative image could not be removed: {path}"),
            suggestion: "Delete it by hand; the other results are unaffected.".into(),
            class,
        },

        BildwerkError::Config(detail) => HumanError {
            message: "The configuration is not valid.".into(),
            suggestion: format!("Fix the setting and run again. ({detail})"),
            class,
        },

        BildwerkError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "Check the path and try again.".into(),
                    class,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "Bildwerk doesn't have permission to use that file.".into(),
                    suggestion: "Check the file permissions, or copy the file to a different location first.".into(),
                    class,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, the disk may be full.".into(),
                    class,
                }
            }
        }

        BildwerkError::Serialization(_) => HumanError {
            message: "A JSON file could not be read or written.".into(),
            suggestion: "Check the configuration file syntax.".into(),
            class,
        },
    }
}

/// Parse document-open failures into human-readable messages.
fn humanize_open_error(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("not found") || lower.contains("no such file") {
        HumanError {
            message: "The PDF file couldn't be found.".into(),
            suggestion: "Check the path and try again.".into(),
            class: ErrorClass::Fatal,
        }
    } else if lower.contains("encrypt") || lower.contains("password") {
        HumanError {
            message: "This PDF is password protected.".into(),
            suggestion: "Remove the password with your PDF viewer, save a copy, and extract from the copy.".into(),
            class: ErrorClass::Fatal,
        }
    } else if lower.contains("header") || lower.contains("xref") || lower.contains("trailer") {
        HumanError {
            message: "This file is damaged or is not a PDF.".into(),
            suggestion: "Try opening it in a PDF viewer and saving a fresh copy.".into(),
            class: ErrorClass::Fatal,
        }
    } else {
        HumanError {
            message: "There's a problem with this PDF file.".into(),
            suggestion: format!("The file may be damaged. Try re-saving it from a PDF viewer. (Detail: {detail})"),
            class: ErrorClass::Fatal,
        }
    }
}
