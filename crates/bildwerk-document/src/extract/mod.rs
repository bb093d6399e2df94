// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Extraction pipeline — session state, the per-image gates in order, and
// the furniture pass that follows the walk.

pub mod extractor;
pub mod furniture;
pub mod session;

pub use extractor::ImageExtractor;
pub use furniture::{FurnitureOutcome, remove_furniture};
pub use session::{ExtractionSession, FingerprintRecord};
