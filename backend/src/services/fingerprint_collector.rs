//! Ordered, append-only log of fingerprint submissions for one scoring round.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::fingerprint::FingerprintRecord;

/// Point-in-time view of a round. Later appends never alter it.
pub type Snapshot = Arc<Vec<FingerprintRecord>>;

#[derive(Debug, Default)]
pub struct FingerprintCollector {
    records: Mutex<Snapshot>,
}

impl FingerprintCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn append(&self, record: FingerprintRecord) {
        let mut records = self.lock();
        // Copies the log only while an older snapshot is still alive.
        Arc::make_mut(&mut *records).push(record);
    }

    /// Empties the log, starting a fresh round.
    pub fn clear(&self) -> usize {
        let mut records = self.lock();
        let cleared = records.len();
        *records = Snapshot::default();
        cleared
    }

    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&*self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_preserves_submission_order() {
        let collector = FingerprintCollector::new();
        collector.append(FingerprintRecord::new("a", "fp-1"));
        collector.append(FingerprintRecord::new("b", "fp-2"));
        collector.append(FingerprintRecord::new("a", "fp-1"));

        let snapshot = collector.snapshot();
        let labels: Vec<&str> = snapshot.iter().map(|r| r.device_label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b", "a"]);
    }

    #[test]
    fn snapshot_is_not_affected_by_later_appends() {
        let collector = FingerprintCollector::new();
        collector.append(FingerprintRecord::new("a", "fp-1"));
        let snapshot = collector.snapshot();

        collector.append(FingerprintRecord::new("b", "fp-2"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(collector.len(), 2);
    }

    #[test]
    fn clear_starts_new_round_without_touching_snapshots() {
        let collector = FingerprintCollector::new();
        collector.append(FingerprintRecord::new("a", "fp-1"));
        let snapshot = collector.snapshot();

        assert_eq!(collector.clear(), 1);
        assert!(collector.is_empty());
        assert_eq!(snapshot.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_appends_are_all_recorded() {
        let collector = Arc::new(FingerprintCollector::new());
        let mut handles = Vec::new();
        for task in 0..4 {
            let collector = collector.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..250 {
                    collector.append(FingerprintRecord::new(
                        format!("device-{task}"),
                        format!("fp-{i}"),
                    ));
                    if i % 50 == 0 {
                        let _ = collector.snapshot();
                    }
                }
            }));
        }
        for handle in handles {
            handle.await.expect("task");
        }
        assert_eq!(collector.len(), 1000);
    }
}
