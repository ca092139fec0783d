//! Report/Announcement Store
//!
//! The in-process owner of both lists. Seeded from the cache at boot,
//! mutated by local actions, and overwritten (or merged into) by successful
//! remote pulls. Every change is pushed to the observer, which in practice
//! is the local cache.

use crate::cache::LocalCache;
use crate::merge::{merge_union, MergePolicy, PendingChanges, SyncOutcome};
use crate::types::{Announcement, Report};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Receives the full list after every change
///
/// Called synchronously while the caller holds the store's write lock, so
/// implementations block the calling runtime worker until they return.
/// Snapshots must land in mutation order; an observer that persists in the
/// background has to serialize its own writes. The JSON cache writes a few
/// kilobytes per call and does it inline.
pub trait StoreObserver: Send + Sync {
    fn reports_changed(&self, reports: &[Report]);
    fn announcements_changed(&self, announcements: &[Announcement]);
}

pub struct FloodStore {
    reports: Vec<Report>,
    announcements: Vec<Announcement>,
    pending: PendingChanges,
    observer: Option<Box<dyn StoreObserver>>,
}

/// Store handle shared between the sync loop and request handlers
pub type SharedStore = Arc<RwLock<FloodStore>>;

impl FloodStore {
    /// Store without persistence
    pub fn new(reports: Vec<Report>, announcements: Vec<Announcement>) -> Self {
        Self {
            reports,
            announcements,
            pending: PendingChanges::default(),
            observer: None,
        }
    }

    /// Seed from the cache and write every change back to it
    pub fn open(cache: LocalCache) -> Self {
        let reports = cache.load_reports();
        let announcements = cache.load_announcements();
        info!(
            "Loaded {} reports and {} announcements from {}",
            reports.len(),
            announcements.len(),
            cache.dir().display()
        );
        Self::new(reports, announcements).with_observer(Box::new(cache))
    }

    pub fn with_observer(mut self, observer: Box<dyn StoreObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    fn reports_changed(&self) {
        if let Some(observer) = &self.observer {
            observer.reports_changed(&self.reports);
        }
    }

    fn announcements_changed(&self) {
        if let Some(observer) = &self.observer {
            observer.announcements_changed(&self.announcements);
        }
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn announcements(&self) -> &[Announcement] {
        &self.announcements
    }

    pub fn pending(&self) -> &PendingChanges {
        &self.pending
    }

    pub fn find_report(&self, id: &str) -> Option<&Report> {
        self.reports.iter().find(|r| r.id == id)
    }

    pub fn contains_report(&self, id: &str) -> bool {
        self.find_report(id).is_some()
    }

    /// Append a newly created report
    pub fn add_report(&mut self, report: Report) {
        debug!("Adding report {} ({})", report.id, report.risk_level);
        self.pending.created.insert(report.id.clone());
        self.reports.push(report);
        self.reports_changed();
    }

    /// Mark a report resolved. Returns false (and changes nothing) for an unknown id.
    pub fn resolve(&mut self, id: &str) -> bool {
        let Some(report) = self.reports.iter_mut().find(|r| r.id == id) else {
            return false;
        };
        report.is_resolved = true;
        self.pending.resolved.insert(id.to_string());
        self.reports_changed();
        true
    }

    /// Remove a report. Returns false for an unknown id.
    pub fn delete_report(&mut self, id: &str) -> bool {
        let before = self.reports.len();
        self.reports.retain(|r| r.id != id);
        if self.reports.len() == before {
            return false;
        }
        self.pending.created.remove(id);
        self.pending.resolved.remove(id);
        self.reports_changed();
        true
    }

    /// Newest announcement goes first
    pub fn post_announcement(&mut self, announcement: Announcement) {
        self.announcements.insert(0, announcement);
        self.announcements_changed();
    }

    pub fn delete_announcement(&mut self, id: &str) -> bool {
        let before = self.announcements.len();
        self.announcements.retain(|a| a.id != id);
        if self.announcements.len() == before {
            return false;
        }
        self.announcements_changed();
        true
    }

    /// Apply a remote pull. An empty pull never touches the store.
    pub fn apply_remote(&mut self, remote: Vec<Report>, policy: MergePolicy) -> SyncOutcome {
        if remote.is_empty() {
            return SyncOutcome::NoUpdate;
        }

        let outcome = match policy {
            MergePolicy::Replace => {
                let count = remote.len();
                self.reports = remote;
                self.pending.clear();
                SyncOutcome::Replaced { count }
            }
            MergePolicy::Union => {
                let (merged, kept_local) = merge_union(&self.reports, remote, &mut self.pending);
                let count = merged.len();
                self.reports = merged;
                SyncOutcome::Merged { count, kept_local }
            }
        };

        self.reports_changed();
        outcome
    }

    /// Admin queue: highest risk first, newest first within a level
    pub fn priority_queue(&self) -> Vec<Report> {
        let mut queue = self.reports.clone();
        sort_by_priority(&mut queue);
        queue
    }

    pub fn unresolved_count(&self) -> usize {
        self.reports.iter().filter(|r| !r.is_resolved).count()
    }
}

/// Risk descending, then timestamp descending
pub fn sort_by_priority(reports: &mut [Report]) {
    reports.sort_by(|a, b| {
        b.risk_level
            .cmp(&a.risk_level)
            .then_with(|| b.timestamp.cmp(&a.timestamp))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnnouncementKind, Category, RiskLevel};
    use chrono::{Duration, Utc};
    use std::sync::Mutex;

    fn report(id: &str, risk: RiskLevel, age_secs: i64) -> Report {
        Report {
            id: id.to_string(),
            student_name: "Aisha".into(),
            phone_number: Some("0812345678".into()),
            dormitory: "หอ 8".into(),
            timestamp: Utc::now() - Duration::seconds(age_secs),
            location: None,
            message: "msg".into(),
            category: Category::Other,
            risk_level: risk,
            image_url: None,
            is_resolved: false,
        }
    }

    #[derive(Default)]
    struct Recorder {
        report_writes: Mutex<Vec<usize>>,
        announcement_writes: Mutex<Vec<usize>>,
    }

    impl StoreObserver for Arc<Recorder> {
        fn reports_changed(&self, reports: &[Report]) {
            self.report_writes.lock().unwrap().push(reports.len());
        }

        fn announcements_changed(&self, announcements: &[Announcement]) {
            self.announcement_writes.lock().unwrap().push(announcements.len());
        }
    }

    fn observed_store() -> (FloodStore, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let store = FloodStore::new(vec![], vec![]).with_observer(Box::new(recorder.clone()));
        (store, recorder)
    }

    #[test]
    fn test_resolve_known_id() {
        let mut store = FloodStore::new(vec![report("1", RiskLevel::High, 5)], vec![]);
        let before = store.reports()[0].clone();
        assert!(store.resolve("1"));
        let after = &store.reports()[0];
        assert!(after.is_resolved);
        assert_eq!(Report { is_resolved: false, ..after.clone() }, before);
    }

    #[test]
    fn test_resolve_unknown_id_is_noop() {
        let (mut store, recorder) = observed_store();
        store.add_report(report("1", RiskLevel::Low, 5));
        let snapshot = store.reports().to_vec();
        assert!(!store.resolve("missing"));
        assert_eq!(store.reports(), snapshot.as_slice());
        assert_eq!(recorder.report_writes.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_every_mutation_notifies() {
        let (mut store, recorder) = observed_store();
        store.add_report(report("1", RiskLevel::Low, 5));
        store.add_report(report("2", RiskLevel::Low, 4));
        store.resolve("1");
        store.delete_report("2");
        store.delete_report("2");
        assert_eq!(*recorder.report_writes.lock().unwrap(), vec![1, 2, 2, 1]);

        let a = Announcement::new("t", "c", AnnouncementKind::Info);
        let id = a.id.clone();
        store.post_announcement(a);
        store.delete_announcement(&id);
        store.delete_announcement(&id);
        assert_eq!(*recorder.announcement_writes.lock().unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_post_announcement_goes_first() {
        let mut store = FloodStore::new(vec![], vec![]);
        store.post_announcement(Announcement::new("old", "", AnnouncementKind::Info));
        store.post_announcement(Announcement::new("new", "", AnnouncementKind::Emergency));
        assert_eq!(store.announcements()[0].title, "new");
    }

    #[test]
    fn test_empty_pull_leaves_store_untouched() {
        let (mut store, recorder) = observed_store();
        store.add_report(report("1", RiskLevel::Low, 5));
        let snapshot = store.reports().to_vec();

        for policy in [MergePolicy::Replace, MergePolicy::Union] {
            assert_eq!(store.apply_remote(vec![], policy), SyncOutcome::NoUpdate);
        }
        assert_eq!(store.reports(), snapshot.as_slice());
        assert_eq!(recorder.report_writes.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_replace_pull_takes_exactly_remote() {
        let mut store = FloodStore::new(vec![report("local", RiskLevel::Critical, 1)], vec![]);
        let remote = vec![report("3", RiskLevel::Low, 1), report("2", RiskLevel::High, 2)];
        let outcome = store.apply_remote(remote.clone(), MergePolicy::Replace);
        assert_eq!(outcome, SyncOutcome::Replaced { count: 2 });
        assert_eq!(store.reports(), remote.as_slice());
        assert!(store.pending().is_empty());
    }

    #[test]
    fn test_union_pull_keeps_unconfirmed_report() {
        let mut store = FloodStore::new(vec![], vec![]);
        store.add_report(report("local", RiskLevel::Critical, 1));
        let outcome = store.apply_remote(vec![report("r", RiskLevel::Low, 9)], MergePolicy::Union);
        assert_eq!(outcome, SyncOutcome::Merged { count: 2, kept_local: 1 });
        assert!(store.contains_report("local"));
    }

    #[test]
    fn test_priority_queue_order() {
        let store = FloodStore::new(
            vec![
                report("low-new", RiskLevel::Low, 1),
                report("crit-old", RiskLevel::Critical, 1000),
                report("high-new", RiskLevel::High, 2),
                report("high-old", RiskLevel::High, 500),
                report("med", RiskLevel::Medium, 3),
            ],
            vec![],
        );
        let ids: Vec<String> = store.priority_queue().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["crit-old", "high-new", "high-old", "med", "low-new"]);
    }

    #[test]
    fn test_unresolved_count() {
        let mut store = FloodStore::new(
            vec![report("1", RiskLevel::Low, 1), report("2", RiskLevel::Low, 2)],
            vec![],
        );
        assert_eq!(store.unresolved_count(), 2);
        store.resolve("2");
        assert_eq!(store.unresolved_count(), 1);
    }

    #[test]
    fn test_open_seeds_from_cache_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::new(dir.path());
        cache.save_reports(&[report("1", RiskLevel::High, 5)]).unwrap();

        let mut store = FloodStore::open(cache.clone());
        assert_eq!(store.reports().len(), 1);
        store.resolve("1");

        let reloaded = cache.load_reports();
        assert!(reloaded[0].is_resolved);
    }

    #[test]
    fn test_cache_holds_latest_snapshot_after_each_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::new(dir.path());
        let mut store = FloodStore::open(cache.clone());

        store.add_report(report("1", RiskLevel::Low, 30));
        assert_eq!(cache.load_reports().len(), 1);

        store.add_report(report("2", RiskLevel::Critical, 10));
        store.resolve("1");
        store.delete_report("2");

        let on_disk = cache.load_reports();
        assert_eq!(on_disk.len(), 1);
        assert_eq!(on_disk[0].id, "1");
        assert!(on_disk[0].is_resolved);
        assert!(!dir.path().join("reports.json.tmp").exists());
    }
}
