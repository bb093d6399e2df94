// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Extractor configuration. Fixed for the duration of a run.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BildwerkError, Result};

/// Images narrower or shorter than this (in pixels) are never extracted.
pub const DEFAULT_MIN_DIMENSION: u32 = 150;
/// A fingerprint seen this many times is decorative furniture.
pub const DEFAULT_FURNITURE_THRESHOLD: u32 = 3;
/// Resolution of whole-page renders.
pub const DEFAULT_RENDER_DPI: u32 = 300;
/// PDF user space is 72 units per inch.
pub const PDF_POINTS_PER_INCH: f32 = 72.0;

const MAX_RENDER_DPI: u32 = 2400;

/// Settings for one extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Minimum width and height (pixels) of an extracted image.
    pub min_dimension: u32,
    /// Occurrence count at which a fingerprint is classified as furniture.
    pub furniture_threshold: u32,
    /// 1-based page numbers rendered as whole-page rasters.
    pub render_pages: BTreeSet<u32>,
    /// Target resolution for whole-page renders.
    pub render_dpi: u32,
    /// Master switch for whole-page rendering; `render_pages` is ignored when off.
    pub render_vector_pages: bool,
    /// Emit per-image gate decisions at debug level.
    pub verbose: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_dimension: DEFAULT_MIN_DIMENSION,
            furniture_threshold: DEFAULT_FURNITURE_THRESHOLD,
            render_pages: BTreeSet::new(),
            render_dpi: DEFAULT_RENDER_DPI,
            render_vector_pages: true,
            verbose: false,
        }
    }
}

impl ExtractorConfig {
    /// Load a configuration from a JSON file. Missing keys take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make a run meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.min_dimension == 0 {
            return Err(BildwerkError::Config(
                "min_dimension must be at least 1".into(),
            ));
        }
        if self.furniture_threshold == 0 {
            return Err(BildwerkError::Config(
                "furniture_threshold must be at least 1".into(),
            ));
        }
        if self.render_dpi == 0 || self.render_dpi > MAX_RENDER_DPI {
            return Err(BildwerkError::Config(format!(
                "render_dpi must be between 1 and {MAX_RENDER_DPI}, got {}",
                self.render_dpi
            )));
        }
        if self.render_pages.contains(&0) {
            return Err(BildwerkError::Config(
                "render_pages are 1-based; page 0 does not exist".into(),
            ));
        }
        Ok(())
    }

    /// Whether the given 1-based page is rendered as a whole.
    pub fn should_render(&self, page_number: u32) -> bool {
        self.render_vector_pages && self.render_pages.contains(&page_number)
    }

    /// Render scale relative to PDF user space.
    pub fn render_scale(&self) -> f32 {
        self.render_dpi as f32 / PDF_POINTS_PER_INCH
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_constants() {
        let config = ExtractorConfig::default();
        assert_eq!(config.min_dimension, 150);
        assert_eq!(config.furniture_threshold, 3);
        assert_eq!(config.render_dpi, 300);
        assert!(config.render_pages.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn render_scale_is_dpi_over_72() {
        let config = ExtractorConfig::default();
        assert!((config.render_scale() - 300.0 / 72.0).abs() < 1e-6);
    }

    #[test]
    fn master_switch_disables_rendering() {
        let mut config = ExtractorConfig {
            render_pages: [26, 27].into_iter().collect(),
            ..ExtractorConfig::default()
        };
        assert!(config.should_render(26));
        assert!(!config.should_render(28));
        config.render_vector_pages = false;
        assert!(!config.should_render(26));
    }

    #[test]
    fn zero_dpi_is_rejected() {
        let config = ExtractorConfig {
            render_dpi: 0,
            ..ExtractorConfig::default()
        };
        assert!(matches!(config.validate(), Err(BildwerkError::Config(_))));
    }

    #[test]
    fn page_zero_is_rejected() {
        let config = ExtractorConfig {
            render_pages: [0].into_iter().collect(),
            ..ExtractorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "render_pages": [5], "render_dpi": 150 }}"#).expect("write");

        let config = ExtractorConfig::from_json_file(file.path()).expect("load");
        assert_eq!(config.render_dpi, 150);
        assert!(config.render_pages.contains(&5));
        assert_eq!(config.min_dimension, DEFAULT_MIN_DIMENSION);
    }

    #[test]
    fn invalid_json_file_is_serialization_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "{{ not json").expect("write");

        let result = ExtractorConfig::from_json_file(file.path());
        assert!(matches!(result, Err(BildwerkError::Serialization(_))));
    }
}
