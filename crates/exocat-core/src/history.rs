//! Bounded, newest-first activity log.
//!
//! Entries are inserted at the head and the log is truncated to
//! [`MAX_HISTORY_ENTRIES`] after every insert, so the oldest entry is the one
//! dropped. Ids come from a per-log counter and are strictly increasing.

use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Duration, Months, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::errors::{ExocatError, ExocatResult};
use crate::models::{ActivityEvent, EntryKind, EntryStatus, HistoryEntry};
use crate::query::guards::MAX_HISTORY_ENTRIES;

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Date window offered by the history timeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryWindow {
    #[default]
    All,
    Today,
    Week,
    Month,
}

impl HistoryWindow {
    /// Inclusive lower bound of the window relative to `now`.
    pub fn since(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            HistoryWindow::All => None,
            HistoryWindow::Today => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map(|midnight| midnight.and_utc()),
            HistoryWindow::Week => Some(now - Duration::days(7)),
            HistoryWindow::Month => now.checked_sub_months(Months::new(1)),
        }
    }
}

impl FromStr for HistoryWindow {
    type Err = ExocatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "all" => Ok(HistoryWindow::All),
            "today" => Ok(HistoryWindow::Today),
            "week" => Ok(HistoryWindow::Week),
            "month" => Ok(HistoryWindow::Month),
            other => Err(ExocatError::InvalidFilter(format!(
                "unknown history window '{other}'"
            ))),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryFilter {
    pub kind: Option<EntryKind>,
    /// Entries strictly older than this are excluded.
    pub since: Option<DateTime<Utc>>,
}

impl HistoryFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn of_kind(kind: EntryKind) -> Self {
        Self {
            kind: Some(kind),
            since: None,
        }
    }

    pub fn with_window(mut self, window: HistoryWindow, now: DateTime<Utc>) -> Self {
        self.since = window.since(now);
        self
    }

    fn matches(&self, entry: &HistoryEntry) -> bool {
        if let Some(kind) = self.kind {
            if entry.kind() != kind {
                return false;
            }
        }
        match self.since {
            Some(since) => entry.timestamp >= since,
            None => true,
        }
    }
}

// ---------------------------------------------------------------------------
// ActivityHistory
// ---------------------------------------------------------------------------

pub struct ActivityHistory {
    entries: VecDeque<HistoryEntry>,
    next_id: u64,
    clock: Arc<dyn Clock>,
}

impl ActivityHistory {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: VecDeque::with_capacity(MAX_HISTORY_ENTRIES + 1),
            next_id: 1,
            clock,
        }
    }

    /// Append `event` stamped with the current clock time.
    pub fn append(&mut self, event: ActivityEvent, status: EntryStatus) -> u64 {
        let timestamp = self.clock.now();
        self.append_at(event, status, timestamp)
    }

    pub fn append_at(
        &mut self,
        event: ActivityEvent,
        status: EntryStatus,
        timestamp: DateTime<Utc>,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        debug!(id, kind = ?event.kind(), status = ?status, "history append");
        self.entries.push_front(HistoryEntry {
            id,
            timestamp,
            status,
            event,
        });
        self.entries.truncate(MAX_HISTORY_ENTRIES);
        id
    }

    /// Matching entries, newest first.
    pub fn list(&self, filter: &HistoryFilter) -> Vec<HistoryEntry> {
        self.entries
            .iter()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect()
    }

    pub fn clear(&mut self) {
        info!(dropped = self.entries.len(), "history cleared");
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

// ---------------------------------------------------------------------------
// SharedHistory
// ---------------------------------------------------------------------------

/// [`ActivityHistory`] behind a mutex. Append and truncate happen inside one
/// critical section.
pub struct SharedHistory {
    inner: Mutex<ActivityHistory>,
}

impl SharedHistory {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(ActivityHistory::new(clock)),
        }
    }

    pub fn append(&self, event: ActivityEvent, status: EntryStatus) -> u64 {
        self.inner.lock().append(event, status)
    }

    pub fn append_at(
        &self,
        event: ActivityEvent,
        status: EntryStatus,
        timestamp: DateTime<Utc>,
    ) -> u64 {
        self.inner.lock().append_at(event, status, timestamp)
    }

    pub fn list(&self, filter: &HistoryFilter) -> Vec<HistoryEntry> {
        self.inner.lock().list(filter)
    }

    /// Entries inside `window`, measured from the log's clock.
    pub fn list_window(&self, kind: Option<EntryKind>, window: HistoryWindow) -> Vec<HistoryEntry> {
        let history = self.inner.lock();
        let filter = HistoryFilter {
            kind,
            since: window.since(history.now()),
        };
        history.list(&filter)
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

/// Parse an optional entry-type filter, treating `"all"` as no filter.
pub fn parse_kind_filter(value: Option<&str>) -> ExocatResult<Option<EntryKind>> {
    match value.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(kind) => kind.parse().map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::AnalysisEvent;

    fn start() -> DateTime<Utc> {
        "2025-10-04T14:32:00Z".parse().unwrap()
    }

    fn history() -> (ActivityHistory, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start()));
        (ActivityHistory::new(clock.clone()), clock)
    }

    #[test]
    fn test_append_newest_first_with_increasing_ids() {
        let (mut history, clock) = history();
        let first = history.append(ActivityEvent::search("kepler", 1), EntryStatus::Completed);
        clock.advance(Duration::seconds(5));
        let second = history.append(ActivityEvent::export("x"), EntryStatus::Completed);
        assert!(second > first);

        let entries = history.list(&HistoryFilter::all());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, second);
        assert_eq!(entries[1].id, first);
        assert_eq!(entries[0].timestamp, start() + Duration::seconds(5));
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let (mut history, _) = history();
        let mut ids = Vec::new();
        for i in 0..51 {
            ids.push(history.append(
                ActivityEvent::search(format!("q{i}"), i),
                EntryStatus::Completed,
            ));
        }
        assert_eq!(history.len(), MAX_HISTORY_ENTRIES);
        let entries = history.list(&HistoryFilter::all());
        assert_eq!(entries[0].id, ids[50]);
        assert!(entries.iter().all(|entry| entry.id != ids[0]));
    }

    #[test]
    fn test_filter_by_kind() {
        let (mut history, _) = history();
        history.append(ActivityEvent::search("a", 1), EntryStatus::Completed);
        history.append(
            ActivityEvent::Analysis(AnalysisEvent::default()),
            EntryStatus::InProgress,
        );
        history.append(ActivityEvent::search("b", 2), EntryStatus::Completed);

        let searches = history.list(&HistoryFilter::of_kind(EntryKind::Search));
        assert_eq!(searches.len(), 2);
        assert!(searches.iter().all(|e| e.kind() == EntryKind::Search));
        let exports = history.list(&HistoryFilter::of_kind(EntryKind::Export));
        assert!(exports.is_empty());
    }

    #[test]
    fn test_since_is_inclusive() {
        let (mut history, _) = history();
        history.append_at(
            ActivityEvent::export("old"),
            EntryStatus::Completed,
            start() - Duration::days(10),
        );
        history.append_at(ActivityEvent::export("edge"), EntryStatus::Completed, start());
        let filter = HistoryFilter {
            kind: None,
            since: Some(start()),
        };
        let entries = history.list(&filter);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, ActivityEvent::export("edge"));
    }

    #[test]
    fn test_windows() {
        let now = start();
        assert_eq!(HistoryWindow::All.since(now), None);
        assert_eq!(
            HistoryWindow::Today.since(now),
            Some("2025-10-04T00:00:00Z".parse().unwrap())
        );
        assert_eq!(
            HistoryWindow::Week.since(now),
            Some("2025-09-27T14:32:00Z".parse().unwrap())
        );
        assert_eq!(
            HistoryWindow::Month.since(now),
            Some("2025-09-04T14:32:00Z".parse().unwrap())
        );
        assert_eq!("week".parse::<HistoryWindow>().unwrap(), HistoryWindow::Week);
        assert!("fortnight".parse::<HistoryWindow>().is_err());
    }

    #[test]
    fn test_clear() {
        let (mut history, _) = history();
        history.append(ActivityEvent::export("x"), EntryStatus::Completed);
        history.clear();
        assert!(history.is_empty());
        assert!(history.list(&HistoryFilter::all()).is_empty());
    }

    #[test]
    fn test_parse_kind_filter() {
        assert_eq!(parse_kind_filter(None).unwrap(), None);
        assert_eq!(parse_kind_filter(Some("all")).unwrap(), None);
        assert_eq!(
            parse_kind_filter(Some("analysis")).unwrap(),
            Some(EntryKind::Analysis)
        );
        assert!(parse_kind_filter(Some("bogus")).is_err());
    }

    #[test]
    fn test_shared_history_bounded_under_concurrency() {
        let shared = Arc::new(SharedHistory::new(Arc::new(ManualClock::new(start()))));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        shared.append(
                            ActivityEvent::search(format!("t{t}-{i}"), i),
                            EntryStatus::Completed,
                        );
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(shared.len(), MAX_HISTORY_ENTRIES);
        let entries = shared.list(&HistoryFilter::all());
        for pair in entries.windows(2) {
            assert!(pair[0].id > pair[1].id);
        }
        assert_eq!(entries[0].id, 200);
    }

    #[test]
    fn test_shared_window_uses_clock() {
        let clock = Arc::new(ManualClock::new(start()));
        let shared = SharedHistory::new(clock.clone());
        shared.append(ActivityEvent::export("yesterday"), EntryStatus::Completed);
        clock.advance(Duration::days(1));
        shared.append(ActivityEvent::export("today"), EntryStatus::Completed);
        let today = shared.list_window(None, HistoryWindow::Today);
        assert_eq!(today.len(), 1);
        let week = shared.list_window(Some(EntryKind::Export), HistoryWindow::Week);
        assert_eq!(week.len(), 2);
    }
}
