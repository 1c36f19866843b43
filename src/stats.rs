//! Read-side aggregation over the three tables.
//!
//! All aggregates are per (user, week) partition scans. An empty
//! partition is a valid result of all zeros, never an error.

use chrono::{DateTime, FixedOffset};
use sambo_core::catalog::{ConsumptionKind, LanguageCode, ACTIVITY_HABITS, CHECKMARK};
use sambo_core::error::SamboError;
use sambo_core::week;
use sambo_sheets::table::{ActivityRecord, ConsumptionRecord, LanguageRecord};
use sambo_sheets::{RowStore, Table};
use std::collections::BTreeMap;

/// Per-week activity aggregate: completion counts per habit id plus the
/// number of days with at least one row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityStats {
    /// Completions for habit ids 1-5, in id order.
    pub counts: [u32; 5],
    pub days_tracked: u32,
}

impl ActivityStats {
    /// Completion count for a habit id (1-5).
    pub fn count(&self, id: u8) -> u32 {
        self.counts[(id - 1) as usize]
    }
}

/// Per-week consumption aggregate, in x, y, z order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumptionStats {
    pub counts: [u32; 3],
    pub costs: [u32; 3],
}

impl ConsumptionStats {
    pub fn count(&self, kind: ConsumptionKind) -> u32 {
        self.counts[kind.index()]
    }

    pub fn cost(&self, kind: ConsumptionKind) -> u32 {
        self.costs[kind.index()]
    }
}

/// Per-week language-session aggregate, in ch, he, ta order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageStats {
    pub counts: [u32; 3],
}

impl LanguageStats {
    pub fn count(&self, code: LanguageCode) -> u32 {
        self.counts[code.index()]
    }
}

/// Sum the checkmarks of one user's activity rows for one week.
pub async fn activity_stats(
    store: &dyn RowStore,
    user_id: &str,
    week: &str,
) -> Result<ActivityStats, SamboError> {
    let mut stats = ActivityStats::default();
    for row in store.rows(Table::Activity).await? {
        let record = ActivityRecord::from_row(&row);
        if record.user_id != user_id || record.week != week {
            continue;
        }
        stats.days_tracked += 1;
        for habit in &ACTIVITY_HABITS {
            if record.mark(habit.id) == CHECKMARK {
                stats.counts[(habit.id - 1) as usize] += 1;
            }
        }
    }
    Ok(stats)
}

/// Sum one user's dose counts and ruble costs for one week.
pub async fn consumption_stats(
    store: &dyn RowStore,
    user_id: &str,
    week: &str,
) -> Result<ConsumptionStats, SamboError> {
    let mut stats = ConsumptionStats::default();
    for row in store.rows(Table::Consumption).await? {
        let record = ConsumptionRecord::from_row(&row);
        if record.user_id != user_id || record.week != week {
            continue;
        }
        for kind in ConsumptionKind::ALL {
            stats.counts[kind.index()] += record.count(kind);
            stats.costs[kind.index()] += record.cost(kind);
        }
    }
    Ok(stats)
}

/// Count one user's language sessions for one week.
pub async fn language_stats(
    store: &dyn RowStore,
    user_id: &str,
    week: &str,
) -> Result<LanguageStats, SamboError> {
    let mut stats = LanguageStats::default();
    for row in store.rows(Table::Language).await? {
        let record = LanguageRecord::from_row(&row);
        if record.user_id != user_id || record.week != week {
            continue;
        }
        for code in LanguageCode::ALL {
            if record.mark(code) == CHECKMARK {
                stats.counts[code.index()] += 1;
            }
        }
    }
    Ok(stats)
}

/// Activity aggregates for the `weeks` weeks preceding `now`, keyed by
/// week id. Always returns exactly `weeks` entries; untracked weeks map
/// to all zeros. BTreeMap ordering makes the newest week `next_back()`.
pub async fn trailing_activity_stats(
    store: &dyn RowStore,
    user_id: &str,
    now: DateTime<FixedOffset>,
    weeks: u32,
) -> Result<BTreeMap<String, ActivityStats>, SamboError> {
    let mut out = BTreeMap::new();
    for n in 1..=weeks {
        let week = week::week_id_back(now, n);
        let stats = activity_stats(store, user_id, &week).await?;
        out.insert(week, stats);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder;
    use chrono::TimeZone;
    use sambo_sheets::MemStore;

    fn at(y: i32, m: u32, d: u32) -> DateTime<FixedOffset> {
        week::moscow_offset()
            .with_ymd_and_hms(y, m, d, 12, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn empty_partition_is_all_zeros() {
        let store = MemStore::with_schema().await;
        let stats = activity_stats(&store, "42", "2025-06-09").await.unwrap();
        assert_eq!(stats, ActivityStats::default());
        let stats = consumption_stats(&store, "42", "2025-06-09").await.unwrap();
        assert_eq!(stats, ConsumptionStats::default());
        let stats = language_stats(&store, "42", "2025-06-09").await.unwrap();
        assert_eq!(stats, LanguageStats::default());
    }

    #[tokio::test]
    async fn activity_counts_span_days_and_ignore_other_users() {
        let store = MemStore::with_schema().await;
        // Week of 2025-06-09.
        recorder::record_activity(&store, "42", 1, at(2025, 6, 9)).await.unwrap();
        recorder::record_activity(&store, "42", 1, at(2025, 6, 10)).await.unwrap();
        recorder::record_activity(&store, "42", 4, at(2025, 6, 10)).await.unwrap();
        recorder::record_activity(&store, "99", 1, at(2025, 6, 10)).await.unwrap();
        // Previous week, must not count.
        recorder::record_activity(&store, "42", 1, at(2025, 6, 5)).await.unwrap();

        let stats = activity_stats(&store, "42", "2025-06-09").await.unwrap();
        assert_eq!(stats.count(1), 2);
        assert_eq!(stats.count(4), 1);
        assert_eq!(stats.count(2), 0);
        assert_eq!(stats.days_tracked, 2);
    }

    #[tokio::test]
    async fn consumption_sums_across_days() {
        let store = MemStore::with_schema().await;
        recorder::record_consumption(&store, "42", ConsumptionKind::Coffee, 2, 100, at(2025, 6, 9))
            .await
            .unwrap();
        recorder::record_consumption(&store, "42", ConsumptionKind::Coffee, 1, 0, at(2025, 6, 11))
            .await
            .unwrap();
        recorder::record_consumption(&store, "42", ConsumptionKind::Flour, 3, 200, at(2025, 6, 11))
            .await
            .unwrap();

        let stats = consumption_stats(&store, "42", "2025-06-09").await.unwrap();
        assert_eq!(stats.count(ConsumptionKind::Coffee), 3);
        assert_eq!(stats.cost(ConsumptionKind::Coffee), 100);
        assert_eq!(stats.count(ConsumptionKind::Flour), 3);
        assert_eq!(stats.cost(ConsumptionKind::Flour), 200);
        assert_eq!(stats.count(ConsumptionKind::Sugar), 0);
    }

    #[tokio::test]
    async fn trailing_weeks_are_complete_and_ordered() {
        let store = MemStore::with_schema().await;
        // One entry two weeks back, nothing else.
        recorder::record_activity(&store, "42", 3, at(2025, 5, 28)).await.unwrap();

        let trailing = trailing_activity_stats(&store, "42", at(2025, 6, 10), 3)
            .await
            .unwrap();
        let weeks: Vec<&String> = trailing.keys().collect();
        assert_eq!(weeks, ["2025-05-19", "2025-05-26", "2025-06-02"]);
        assert_eq!(trailing["2025-05-26"].count(3), 1);
        assert_eq!(trailing["2025-06-02"], ActivityStats::default());
        // Newest trailing week is the map's last entry.
        let (newest, _) = trailing.iter().next_back().unwrap();
        assert_eq!(newest, "2025-06-02");
    }

    #[tokio::test]
    async fn language_sessions_counted_per_day() {
        let store = MemStore::with_schema().await;
        recorder::record_language(&store, "42", LanguageCode::Tatar, at(2025, 6, 9))
            .await
            .unwrap();
        recorder::record_language(&store, "42", LanguageCode::Tatar, at(2025, 6, 10))
            .await
            .unwrap();
        let stats = language_stats(&store, "42", "2025-06-09").await.unwrap();
        assert_eq!(stats.count(LanguageCode::Tatar), 2);
        assert_eq!(stats.count(LanguageCode::Hebrew), 0);
    }
}
