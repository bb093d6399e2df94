// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types shared between the extractor and the command line.

use serde::{Deserialize, Serialize};

/// Content identity of a decoded image: dimensions plus sparse-sampled hash.
///
/// Two placements with equal keys are treated as the same visual element,
/// whatever resource they were drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FingerprintKey {
    pub width: u32,
    pub height: u32,
    pub hash: i64,
}

impl std::fmt::Display for FingerprintKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}_{}", self.width, self.height, self.hash)
    }
}

/// Which discovery path surfaced an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscoveryPath {
    /// Found by enumerating a resource dictionary (recursively through Forms).
    Resources,
    /// Found by observing a `Do` operator in a content stream.
    ContentStream,
}

impl std::fmt::Display for DiscoveryPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscoveryPath::Resources => f.write_str("resources"),
            DiscoveryPath::ContentStream => f.write_str("content-stream"),
        }
    }
}

/// Why a candidate image produced no file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Width or height under the minimum dimension.
    TooSmall,
    /// Same fingerprint already handled on this page.
    DuplicateOnPage,
    /// Colour gate rejected it.
    Monochrome,
    /// Image data could not be turned into pixels.
    DecodeFailed,
    /// PNG encoding or file write failed.
    EncodeFailed,
}

/// Per-reason skip counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipTally {
    pub too_small: u32,
    pub duplicate_on_page: u32,
    pub monochrome: u32,
    pub decode_failed: u32,
    pub encode_failed: u32,
}

impl SkipTally {
    pub fn record(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::TooSmall => self.too_small += 1,
            SkipReason::DuplicateOnPage => self.duplicate_on_page += 1,
            SkipReason::Monochrome => self.monochrome += 1,
            SkipReason::DecodeFailed => self.decode_failed += 1,
            SkipReason::EncodeFailed => self.encode_failed += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.too_small
            + self.duplicate_on_page
            + self.monochrome
            + self.decode_failed
            + self.encode_failed
    }
}

/// One fingerprint classified as furniture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FurniturePattern {
    /// `"{width}x{height}_{hash}"`.
    pub key: String,
    pub width: u32,
    pub height: u32,
    pub occurrences: u32,
    /// Files removed for this pattern.
    pub deleted: u32,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// Input file name as given.
    pub source: String,
    pub pages_total: u32,
    /// Pages whose resources could not be resolved.
    pub pages_failed: u32,
    /// Image files written during the walk.
    pub images_extracted: u32,
    /// Whole-page renders written.
    pub pages_rendered: u32,
    /// Configured renders that failed.
    pub render_failures: u32,
    pub skipped: SkipTally,
    /// Distinct fingerprints counted document-wide.
    pub unique_fingerprints: u32,
    pub furniture: Vec<FurniturePattern>,
    pub furniture_deleted: u32,
    pub furniture_delete_failures: u32,
}

impl ExtractionReport {
    /// Files written by the run, renders included.
    pub fn files_written(&self) -> u32 {
        self.images_extracted + self.pages_rendered
    }

    /// Files still on disk after furniture cleanup.
    pub fn content_retained(&self) -> u32 {
        self.files_written().saturating_sub(self.furniture_deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_key_display() {
        let key = FingerprintKey {
            width: 300,
            height: 200,
            hash: -42,
        };
        assert_eq!(key.to_string(), "300x200_-42");
    }

    #[test]
    fn skip_tally_counts_each_reason() {
        let mut tally = SkipTally::default();
        tally.record(SkipReason::TooSmall);
        tally.record(SkipReason::TooSmall);
        tally.record(SkipReason::Monochrome);
        assert_eq!(tally.too_small, 2);
        assert_eq!(tally.monochrome, 1);
        assert_eq!(tally.total(), 3);
    }

    #[test]
    fn retained_excludes_deleted_furniture() {
        let report = ExtractionReport {
            images_extracted: 7,
            pages_rendered: 1,
            furniture_deleted: 3,
            ..ExtractionReport::default()
        };
        assert_eq!(report.files_written(), 8);
        assert_eq!(report.content_retained(), 5);
    }
}
