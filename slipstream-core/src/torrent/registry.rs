//! Live registry of in-flight and recently-finished download jobs.
//!
//! The registry is the only state shared between concurrent download
//! callbacks and progress polling. Access is serialized through a single
//! read-write lock; event volume is far too low to justify anything
//! fancier.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use super::InfoHash;

/// One file in a job's manifest, with its final per-owner absolute path.
#[derive(Debug, Clone, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
}

/// Lifecycle state of a download job.
///
/// There is no failed state: a job that fails is evicted from the registry
/// immediately, so a registered entry is always pending, active, or inside
/// its post-completion grace window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Active,
    Completed,
}

/// Live state of one download job, keyed by info hash.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub info_hash: InfoHash,
    /// Percent complete, clamped to [0, 100] and monotonic non-decreasing.
    pub progress: f64,
    pub files: Vec<FileEntry>,
    pub state: JobState,
    pub started_at: DateTime<Utc>,
}

/// Concurrency-safe map from info hash to live job state.
///
/// Cloning the registry clones a handle to the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct DownloadRegistry {
    jobs: Arc<RwLock<HashMap<InfoHash, DownloadJob>>>,
}

impl DownloadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a job with its initial manifest at 0% progress.
    ///
    /// Any stale entry under the same info hash is replaced; a repeated
    /// submission is a fresh job, never a resurrection of the old record.
    pub fn create(&self, info_hash: InfoHash, files: Vec<FileEntry>) {
        let job = DownloadJob {
            info_hash,
            progress: 0.0,
            files,
            state: JobState::Pending,
            started_at: Utc::now(),
        };
        self.jobs.write().insert(info_hash, job);
    }

    /// Updates a job's progress percentage.
    ///
    /// The value is clamped to [0, 100] and never regresses: an engine
    /// reporting a lower fraction than previously observed holds the last
    /// known value. Unknown info hashes are ignored; a progress event can
    /// legitimately race job eviction.
    pub fn update_progress(&self, info_hash: InfoHash, percent: f64) {
        let mut jobs = self.jobs.write();
        if let Some(job) = jobs.get_mut(&info_hash) {
            job.progress = job.progress.max(percent.clamp(0.0, 100.0));
            job.state = JobState::Active;
        }
    }

    /// Marks a job complete, pinning progress at exactly 100.
    pub fn mark_complete(&self, info_hash: InfoHash) {
        let mut jobs = self.jobs.write();
        if let Some(job) = jobs.get_mut(&info_hash) {
            job.progress = 100.0;
            job.state = JobState::Completed;
        }
    }

    /// Returns a snapshot of the job, if present.
    pub fn job(&self, info_hash: InfoHash) -> Option<DownloadJob> {
        self.jobs.read().get(&info_hash).cloned()
    }

    /// Returns the job's progress percentage, if present.
    ///
    /// `None` means the job is unknown, which callers must keep distinct
    /// from a known job at 0%.
    pub fn progress(&self, info_hash: InfoHash) -> Option<f64> {
        self.jobs.read().get(&info_hash).map(|job| job.progress)
    }

    /// Removes a job immediately.
    pub fn remove(&self, info_hash: InfoHash) {
        self.jobs.write().remove(&info_hash);
    }

    /// Removes a job after a delay.
    ///
    /// The grace period keeps a completed job queryable so a client polling
    /// progress right after completion still observes 100% before the entry
    /// disappears.
    pub fn remove_after(&self, info_hash: InfoHash, delay: Duration) {
        let registry = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            registry.remove(info_hash);
            tracing::debug!("Evicted completed job {info_hash} from registry");
        });
    }

    /// Number of jobs currently tracked.
    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(byte: u8) -> InfoHash {
        InfoHash::new([byte; 20])
    }

    #[test]
    fn test_unknown_hash_is_distinct_from_zero_progress() {
        let registry = DownloadRegistry::new();
        assert_eq!(registry.progress(hash(1)), None);

        registry.create(hash(1), Vec::new());
        assert_eq!(registry.progress(hash(1)), Some(0.0));
    }

    #[test]
    fn test_progress_is_clamped_to_percent_range() {
        let registry = DownloadRegistry::new();
        registry.create(hash(1), Vec::new());

        registry.update_progress(hash(1), 120.0);
        assert_eq!(registry.progress(hash(1)), Some(100.0));

        registry.create(hash(2), Vec::new());
        registry.update_progress(hash(2), -5.0);
        assert_eq!(registry.progress(hash(2)), Some(0.0));
    }

    #[test]
    fn test_progress_never_regresses() {
        let registry = DownloadRegistry::new();
        registry.create(hash(1), Vec::new());

        registry.update_progress(hash(1), 60.0);
        registry.update_progress(hash(1), 40.0);
        assert_eq!(registry.progress(hash(1)), Some(60.0));
    }

    #[test]
    fn test_job_snapshot_tracks_lifecycle() {
        let registry = DownloadRegistry::new();
        let before = Utc::now();
        registry.create(
            hash(1),
            vec![FileEntry {
                name: "a.bin".to_string(),
                path: "alice/a.bin".into(),
                size: 3,
            }],
        );

        let job = registry.job(hash(1)).unwrap();
        assert_eq!(job.state, JobState::Pending);
        assert_eq!(job.files.len(), 1);
        assert!(job.started_at >= before);

        registry.update_progress(hash(1), 40.0);
        assert_eq!(registry.job(hash(1)).unwrap().state, JobState::Active);

        registry.mark_complete(hash(1));
        let job = registry.job(hash(1)).unwrap();
        assert_eq!(job.state, JobState::Completed);
        assert_eq!(job.progress, 100.0);

        assert!(registry.job(hash(2)).is_none());
    }

    #[test]
    fn test_resubmission_replaces_entry() {
        let registry = DownloadRegistry::new();
        registry.create(hash(1), Vec::new());
        registry.update_progress(hash(1), 80.0);

        registry.create(hash(1), Vec::new());
        assert_eq!(registry.progress(hash(1)), Some(0.0));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_independent_jobs_do_not_interfere() {
        let registry = DownloadRegistry::new();
        registry.create(hash(1), Vec::new());
        registry.create(hash(2), Vec::new());

        registry.update_progress(hash(1), 30.0);
        registry.update_progress(hash(2), 70.0);

        assert_eq!(registry.progress(hash(1)), Some(30.0));
        assert_eq!(registry.progress(hash(2)), Some(70.0));
    }

    #[tokio::test]
    async fn test_remove_after_grace_period() {
        let registry = DownloadRegistry::new();
        registry.create(hash(1), Vec::new());
        registry.mark_complete(hash(1));

        registry.remove_after(hash(1), Duration::from_millis(30));

        // Still visible at 100% within the grace window.
        assert_eq!(registry.progress(hash(1)), Some(100.0));

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(registry.progress(hash(1)), None);
    }

    #[tokio::test]
    async fn test_concurrent_updates_from_many_tasks() {
        let registry = DownloadRegistry::new();
        registry.create(hash(1), Vec::new());
        registry.create(hash(2), Vec::new());

        let mut tasks = Vec::new();
        for step in 1..=50u32 {
            let registry = registry.clone();
            tasks.push(tokio::spawn(async move {
                registry.update_progress(hash(1), f64::from(step));
                registry.update_progress(hash(2), f64::from(step) / 2.0);
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(registry.progress(hash(1)), Some(50.0));
        assert_eq!(registry.progress(hash(2)), Some(25.0));
    }
}
