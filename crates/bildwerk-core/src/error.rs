// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Bildwerk.

use thiserror::Error;

/// How far a failure reaches.
///
/// Only [`ErrorClass::Fatal`] stops a run. Every other class is caught at the
/// smallest enclosing unit (page, image, furniture file) and tallied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The document (or the run configuration) is unusable.
    Fatal,
    /// One page yields nothing; the walk continues with the next page.
    PageRecoverable,
    /// One image is skipped; the page continues.
    ImageRecoverable,
    /// One furniture file survives; the run still succeeds.
    CleanupRecoverable,
}

/// Top-level error type for all Bildwerk operations.
#[derive(Debug, Error)]
pub enum BildwerkError {
    // -- Document errors --
    #[error("failed to open PDF: {0}")]
    PdfOpen(String),

    #[error("page {page}: resources could not be resolved: {reason}")]
    PageResources { page: u32, reason: String },

    #[error("page {page} out of range (document has {total} pages)")]
    PageOutOfRange { page: u32, total: u32 },

    // -- Image errors --
    #[error("image decode failed: {0}")]
    ImageDecode(String),

    #[error("image encode failed: {0}")]
    ImageEncode(String),

    // -- Rendering --
    #[error("page render failed: {0}")]
    Render(String),

    #[error("page renderer unavailable: {0}")]
    RendererUnavailable(String),

    // -- Cleanup --
    #[error("failed to delete furniture file {path}: {source}")]
    FurnitureDelete {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BildwerkError {
    /// The reach of this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            BildwerkError::PdfOpen(_)
            | BildwerkError::PageOutOfRange { .. }
            | BildwerkError::Config(_)
            | BildwerkError::Io(_)
            | BildwerkError::Serialization(_) => ErrorClass::Fatal,
            BildwerkError::PageResources { .. }
            | BildwerkError::Render(_)
            | BildwerkError::RendererUnavailable(_) => ErrorClass::PageRecoverable,
            BildwerkError::ImageDecode(_) | BildwerkError::ImageEncode(_) => {
                ErrorClass::ImageRecoverable
            }
            BildwerkError::FurnitureDelete { .. } => ErrorClass::CleanupRecoverable,
        }
    }

    /// Shorthand for `self.class() == ErrorClass::Fatal`.
    pub fn is_fatal(&self) -> bool {
        self.class() == ErrorClass::Fatal
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BildwerkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_open_and_config_failures_are_fatal() {
        assert!(BildwerkError::PdfOpen("truncated".into()).is_fatal());
        assert!(BildwerkError::Config("dpi 0".into()).is_fatal());
        assert!(!BildwerkError::ImageDecode("bad jpeg".into()).is_fatal());
        assert!(
            !BildwerkError::PageResources {
                page: 3,
                reason: "dangling".into()
            }
            .is_fatal()
        );
    }

    #[test]
    fn delete_failure_is_cleanup_class() {
        let err = BildwerkError::FurnitureDelete {
            path: "a.png".into(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(err.class(), ErrorClass::CleanupRecoverable);
        assert!(err.to_string().contains("a.png"));
    }

    #[test]
    fn render_failure_is_page_class() {
        let err = BildwerkError::Render("bitmap allocation failed".into());
        assert_eq!(err.class(), ErrorClass::PageRecoverable);
    }
}
