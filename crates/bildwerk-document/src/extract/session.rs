// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Extraction session — all state that outlives a single image: the shared
// output counter, the document-wide fingerprint table, the current page's
// checksum set and the running report.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use bildwerk_core::types::{ExtractionReport, FingerprintKey, SkipReason};

/// Everything known about one fingerprint across the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FingerprintRecord {
    /// First file successfully written under this key.
    pub representative: Option<PathBuf>,
    /// Every file written under this key, in write order.
    pub paths: Vec<PathBuf>,
    /// Post-page-dedup matches across the whole document.
    pub occurrences: u32,
}

/// Mutable state threaded through one extraction run.
#[derive(Debug)]
pub struct ExtractionSession {
    counter: u32,
    current_page: u32,
    page_checksums: HashSet<FingerprintKey>,
    fingerprints: HashMap<FingerprintKey, FingerprintRecord>,
    report: ExtractionReport,
}

impl ExtractionSession {
    pub fn new(source: impl Into<String>, pages_total: u32) -> Self {
        Self {
            counter: 0,
            current_page: 0,
            page_checksums: HashSet::new(),
            fingerprints: HashMap::new(),
            report: ExtractionReport {
                source: source.into(),
                pages_total,
                ..ExtractionReport::default()
            },
        }
    }

    // -- Page scope -----------------------------------------------------------

    /// Start a page: forget which fingerprints the previous page emitted.
    pub fn begin_page(&mut self, page_number: u32) {
        self.current_page = page_number;
        self.page_checksums.clear();
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Mark `key` as seen on the current page. Returns `false` when it
    /// already was.
    pub fn mark_on_page(&mut self, key: FingerprintKey) -> bool {
        self.page_checksums.insert(key)
    }

    // -- Document scope -------------------------------------------------------

    /// Count one document-wide occurrence of `key` and return the new total.
    pub fn record_occurrence(&mut self, key: FingerprintKey) -> u32 {
        let record = self.fingerprints.entry(key).or_default();
        record.occurrences += 1;
        record.occurrences
    }

    /// Claim the next output number. Numbers start at 1 and are never reused.
    pub fn next_counter(&mut self) -> u32 {
        self.counter += 1;
        self.counter
    }

    /// Record a file successfully written under `key`.
    pub fn attach_output(&mut self, key: FingerprintKey, path: &Path) {
        let record = self.fingerprints.entry(key).or_default();
        if record.representative.is_none() {
            record.representative = Some(path.to_path_buf());
        }
        record.paths.push(path.to_path_buf());
        self.report.images_extracted += 1;
    }

    // -- Tallies --------------------------------------------------------------

    pub fn record_skip(&mut self, reason: SkipReason) {
        self.report.skipped.record(reason);
    }

    pub fn record_page_failure(&mut self) {
        self.report.pages_failed += 1;
    }

    pub fn record_render(&mut self) {
        self.report.pages_rendered += 1;
    }

    pub fn record_render_failure(&mut self) {
        self.report.render_failures += 1;
    }

    pub fn report(&self) -> &ExtractionReport {
        &self.report
    }

    /// Close the walk. The fingerprint table is handed back for the
    /// furniture pass; the report is final apart from furniture fields.
    pub fn finish(self) -> (ExtractionReport, HashMap<FingerprintKey, FingerprintRecord>) {
        let mut report = self.report;
        report.unique_fingerprints = self.fingerprints.len() as u32;
        (report, self.fingerprints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(hash: i64) -> FingerprintKey {
        FingerprintKey {
            width: 300,
            height: 300,
            hash,
        }
    }

    #[test]
    fn page_checksums_reset_per_page() {
        let mut session = ExtractionSession::new("doc.pdf", 2);
        session.begin_page(1);
        assert!(session.mark_on_page(key(1)));
        assert!(!session.mark_on_page(key(1)));

        session.begin_page(2);
        assert_eq!(session.current_page(), 2);
        assert!(session.mark_on_page(key(1)));
    }

    #[test]
    fn counter_is_shared_and_monotonic() {
        let mut session = ExtractionSession::new("doc.pdf", 1);
        assert_eq!(session.next_counter(), 1);
        session.begin_page(2);
        assert_eq!(session.next_counter(), 2);
    }

    #[test]
    fn representative_is_first_written_path() {
        let mut session = ExtractionSession::new("doc.pdf", 3);
        assert_eq!(session.record_occurrence(key(9)), 1);
        session.attach_output(key(9), Path::new("a.png"));
        assert_eq!(session.record_occurrence(key(9)), 2);
        session.attach_output(key(9), Path::new("b.png"));
        assert_eq!(session.report().images_extracted, 2);

        let (_, fingerprints) = session.finish();
        let record = &fingerprints[&key(9)];
        assert_eq!(record.occurrences, 2);
        assert_eq!(record.representative.as_deref(), Some(Path::new("a.png")));
        assert_eq!(record.paths.len(), 2);
    }

    #[test]
    fn occurrence_without_write_still_counts() {
        let mut session = ExtractionSession::new("doc.pdf", 1);
        session.record_occurrence(key(4));
        let (report, fingerprints) = session.finish();
        assert_eq!(report.unique_fingerprints, 1);
        assert_eq!(report.images_extracted, 0);
        let record = &fingerprints[&key(4)];
        assert!(record.representative.is_none());
        assert!(record.paths.is_empty());
    }

    #[test]
    fn tallies_reach_the_report() {
        let mut session = ExtractionSession::new("doc.pdf", 10);
        session.record_skip(SkipReason::TooSmall);
        session.record_page_failure();
        session.record_render();
        session.record_render_failure();

        let (report, _) = session.finish();
        assert_eq!(report.source, "doc.pdf");
        assert_eq!(report.pages_total, 10);
        assert_eq!(report.skipped.too_small, 1);
        assert_eq!(report.pages_failed, 1);
        assert_eq!(report.pages_rendered, 1);
        assert_eq!(report.render_failures, 1);
    }
}
