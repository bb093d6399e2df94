// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Furniture classifier — runs once the walk is complete. A fingerprint seen
// at least `threshold` times is decorative; every file written under it is
// removed.

use std::collections::HashMap;
use std::path::Path;

use bildwerk_core::error::BildwerkError;
use bildwerk_core::types::{FingerprintKey, FurniturePattern};
use tracing::{info, instrument, warn};

use crate::extract::session::FingerprintRecord;

/// Result of the furniture pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FurnitureOutcome {
    /// Patterns by descending occurrence count, then key.
    pub patterns: Vec<FurniturePattern>,
    pub deleted: u32,
    pub delete_failures: u32,
}

/// Keys whose final occurrence count reaches `threshold`, in report order.
pub fn classify(
    fingerprints: &HashMap<FingerprintKey, FingerprintRecord>,
    threshold: u32,
) -> Vec<(FingerprintKey, &FingerprintRecord)> {
    let mut furniture: Vec<_> = fingerprints
        .iter()
        .filter(|(_, record)| record.occurrences >= threshold)
        .map(|(key, record)| (*key, record))
        .collect();
    furniture.sort_by(|(a_key, a), (b_key, b)| {
        b.occurrences
            .cmp(&a.occurrences)
            .then_with(|| a_key.to_string().cmp(&b_key.to_string()))
    });
    furniture
}

/// Classify and delete. Deletion failures are logged and counted; they never
/// stop the pass.
#[instrument(skip_all, fields(threshold = threshold))]
pub fn remove_furniture(
    fingerprints: &HashMap<FingerprintKey, FingerprintRecord>,
    threshold: u32,
) -> FurnitureOutcome {
    let mut outcome = FurnitureOutcome::default();

    for (key, record) in classify(fingerprints, threshold) {
        info!(
            pattern = %key,
            occurrences = record.occurrences,
            "Furniture detected: {}x{}px",
            key.width,
            key.height
        );

        let mut deleted = 0;
        for path in &record.paths {
            match delete_file(path) {
                Ok(()) => {
                    deleted += 1;
                    info!(path = %path.display(), "Deleted furniture");
                }
                Err(err) => {
                    outcome.delete_failures += 1;
                    warn!(%err, "Furniture file kept");
                }
            }
        }

        outcome.deleted += deleted;
        outcome.patterns.push(FurniturePattern {
            key: key.to_string(),
            width: key.width,
            height: key.height,
            occurrences: record.occurrences,
            deleted,
        });
    }

    outcome
}

fn delete_file(path: &Path) -> Result<(), BildwerkError> {
    std::fs::remove_file(path).map_err(|source| BildwerkError::FurnitureDelete {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn key(width: u32, hash: i64) -> FingerprintKey {
        FingerprintKey {
            width,
            height: 200,
            hash,
        }
    }

    fn record(occurrences: u32, paths: Vec<PathBuf>) -> FingerprintRecord {
        FingerprintRecord {
            representative: paths.first().cloned(),
            paths,
            occurrences,
        }
    }

    #[test]
    fn threshold_is_inclusive_and_order_is_stable() {
        let mut table = HashMap::new();
        table.insert(key(300, 2), record(3, Vec::new()));
        table.insert(key(300, 1), record(3, Vec::new()));
        table.insert(key(400, 7), record(5, Vec::new()));
        table.insert(key(500, 9), record(2, Vec::new()));

        let keys: Vec<String> = classify(&table, 3)
            .into_iter()
            .map(|(key, _)| key.to_string())
            .collect();
        assert_eq!(keys, vec!["400x200_7", "300x200_1", "300x200_2"]);
    }

    #[test]
    fn deletes_every_path_of_a_furniture_key() {
        let dir = tempfile::tempdir().expect("temp dir");
        let paths: Vec<PathBuf> = (1..=3)
            .map(|n| {
                let path = dir.path().join(format!("logo_{n}.png"));
                std::fs::write(&path, b"png").expect("write");
                path
            })
            .collect();
        let keeper = dir.path().join("photo.png");
        std::fs::write(&keeper, b"png").expect("write");

        let mut table = HashMap::new();
        table.insert(key(300, 1), record(3, paths.clone()));
        table.insert(key(600, 2), record(2, vec![keeper.clone()]));

        let outcome = remove_furniture(&table, 3);
        assert_eq!(outcome.deleted, 3);
        assert_eq!(outcome.delete_failures, 0);
        assert_eq!(outcome.patterns.len(), 1);
        assert_eq!(outcome.patterns[0].deleted, 3);
        assert!(paths.iter().all(|p| !p.exists()));
        assert!(keeper.exists());
    }

    #[test]
    fn missing_file_is_a_failure_not_an_abort() {
        let dir = tempfile::tempdir().expect("temp dir");
        let present = dir.path().join("present.png");
        std::fs::write(&present, b"png").expect("write");
        let gone = dir.path().join("gone.png");

        let mut table = HashMap::new();
        table.insert(key(300, 1), record(4, vec![gone, present.clone()]));

        let outcome = remove_furniture(&table, 3);
        assert_eq!(outcome.deleted, 1);
        assert_eq!(outcome.delete_failures, 1);
        assert!(!present.exists());
    }
}
