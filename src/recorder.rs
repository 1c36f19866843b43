//! Write-side operations: one function per recordable input kind.
//!
//! Each recorder resolves today's row through `find_or_create`, applies
//! its idempotency or accumulation rule, and returns the confirmation
//! text to send back to the chat. Validation and duplicate failures carry
//! the user-facing wording in the error itself.

use chrono::{DateTime, FixedOffset};
use sambo_core::catalog::{activity_habit, ConsumptionKind, LanguageCode, CHECKMARK};
use sambo_core::error::SamboError;
use sambo_core::week;
use sambo_sheets::table::{
    activity_mark_col, consumption_cost_col, consumption_count_col, language_mark_col,
    ActivityRecord, ConsumptionRecord, LanguageRecord, ACTIVITY_DATE_COL, ACTIVITY_GOALS_COL,
};
use sambo_sheets::{find_or_create, RowStore, Table};
use tracing::debug;

/// Mark an activity habit done for today. First write wins; a second
/// attempt the same day is a duplicate.
pub async fn record_activity(
    store: &dyn RowStore,
    user_id: &str,
    habit_id: u8,
    now: DateTime<FixedOffset>,
) -> Result<String, SamboError> {
    let habit = activity_habit(habit_id)
        .ok_or_else(|| SamboError::Validation("Invalid habit number. Use 1-5.".to_string()))?;

    let date = week::date_id(now);
    let week = week::week_id(now);
    let row = find_or_create(store, Table::Activity, user_id, &date, &week).await?;
    let record = ActivityRecord::from_row(&row);
    if !record.mark(habit_id).is_empty() {
        return Err(SamboError::Duplicate(format!(
            "{} already recorded today",
            habit.name
        )));
    }

    store
        .update_cell(
            Table::Activity,
            row.number,
            activity_mark_col(habit_id) + 1,
            CHECKMARK,
        )
        .await?;
    // Rewrite the date cell: a row found by a stale scan could predate
    // today if the clock crossed midnight between scan and write.
    store
        .update_cell(Table::Activity, row.number, ACTIVITY_DATE_COL + 1, &date)
        .await?;
    debug!("activity {} recorded for {user_id} on {date}", habit.name);
    Ok(format!("✓ {} recorded!", habit.name))
}

/// Add doses (and optionally rubles) to today's consumption row. Counts
/// and costs accumulate; the cost cell is only touched when the entry
/// carries a cost.
pub async fn record_consumption(
    store: &dyn RowStore,
    user_id: &str,
    kind: ConsumptionKind,
    count: u32,
    cost: u32,
    now: DateTime<FixedOffset>,
) -> Result<String, SamboError> {
    let date = week::date_id(now);
    let week = week::week_id(now);
    let row = find_or_create(store, Table::Consumption, user_id, &date, &week).await?;
    let record = ConsumptionRecord::from_row(&row);

    let new_count = record.count(kind) + count;
    store
        .update_cell(
            Table::Consumption,
            row.number,
            consumption_count_col(kind) + 1,
            &new_count.to_string(),
        )
        .await?;

    let mut new_cost = record.cost(kind);
    if cost > 0 {
        new_cost += cost;
        store
            .update_cell(
                Table::Consumption,
                row.number,
                consumption_cost_col(kind) + 1,
                &new_cost.to_string(),
            )
            .await?;
    }
    debug!(
        "consumption {} +{count} (cost +{cost}) for {user_id} on {date}",
        kind.name()
    );

    let mut reply = format!("✓ {}: +{count} dose(s)", kind.name());
    if cost > 0 {
        reply.push_str(&format!(", +{cost} руб"));
    }
    reply.push_str(&format!("\nToday's total: {new_count} dose(s)"));
    if new_cost > 0 {
        reply.push_str(&format!(", {new_cost} руб"));
    }
    Ok(reply)
}

/// Mark a language-learning session done for today. Same-day duplicate
/// attempts are rejected, like activity habits.
pub async fn record_language(
    store: &dyn RowStore,
    user_id: &str,
    code: LanguageCode,
    now: DateTime<FixedOffset>,
) -> Result<String, SamboError> {
    let date = week::date_id(now);
    let week = week::week_id(now);
    let row = find_or_create(store, Table::Language, user_id, &date, &week).await?;
    let record = LanguageRecord::from_row(&row);
    if !record.mark(code).is_empty() {
        return Err(SamboError::Duplicate(format!(
            "{} already recorded today",
            code.name()
        )));
    }

    store
        .update_cell(
            Table::Language,
            row.number,
            language_mark_col(code) + 1,
            CHECKMARK,
        )
        .await?;
    debug!("language {} recorded for {user_id} on {date}", code.code());
    Ok(format!("✓ {} recorded!", code.name()))
}

/// Save a free-text improvement goal on today's activity row. One goal
/// per week: any non-empty goals cell in the current week blocks a
/// second write.
pub async fn set_weekly_goal(
    store: &dyn RowStore,
    user_id: &str,
    goal: &str,
    now: DateTime<FixedOffset>,
) -> Result<String, SamboError> {
    let goal = goal.trim();
    if goal.is_empty() {
        return Err(SamboError::Validation(
            "Goal text cannot be empty.".to_string(),
        ));
    }

    let week = week::week_id(now);
    for row in store.rows(Table::Activity).await? {
        let record = ActivityRecord::from_row(&row);
        if record.user_id == user_id && record.week == week && !record.goals.is_empty() {
            return Err(SamboError::Duplicate(
                "A goal is already set for this week.".to_string(),
            ));
        }
    }

    let date = week::date_id(now);
    let row = find_or_create(store, Table::Activity, user_id, &date, &week).await?;
    store
        .update_cell(Table::Activity, row.number, ACTIVITY_GOALS_COL + 1, goal)
        .await?;
    debug!("weekly goal saved for {user_id} in week {week}");
    Ok("✓ Weekly goal saved.".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sambo_sheets::MemStore;

    fn tuesday() -> DateTime<FixedOffset> {
        week::moscow_offset()
            .with_ymd_and_hms(2025, 6, 10, 12, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn activity_roundtrip_and_duplicate() {
        let store = MemStore::with_schema().await;
        let now = tuesday();

        let reply = record_activity(&store, "42", 1, now).await.unwrap();
        assert_eq!(reply, "✓ Prayer with first water recorded!");

        let err = record_activity(&store, "42", 1, now).await.unwrap_err();
        assert!(matches!(err, SamboError::Duplicate(_)));
        assert_eq!(
            err.to_string(),
            "Prayer with first water already recorded today"
        );

        // A different habit the same day reuses the row.
        record_activity(&store, "42", 2, now).await.unwrap();
        let rows = store.rows(Table::Activity).await.unwrap();
        assert_eq!(rows.len(), 1);
        let record = ActivityRecord::from_row(&rows[0]);
        assert_eq!(record.mark(1), CHECKMARK);
        assert_eq!(record.mark(2), CHECKMARK);
        assert_eq!(record.mark(3), "");
    }

    #[tokio::test]
    async fn activity_rejects_bad_id() {
        let store = MemStore::with_schema().await;
        let err = record_activity(&store, "42", 0, tuesday()).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid habit number. Use 1-5.");
        let err = record_activity(&store, "42", 6, tuesday()).await.unwrap_err();
        assert!(matches!(err, SamboError::Validation(_)));
    }

    #[tokio::test]
    async fn consumption_accumulates_counts_and_costs() {
        let store = MemStore::with_schema().await;
        let now = tuesday();

        let reply = record_consumption(&store, "42", ConsumptionKind::Coffee, 1, 100, now)
            .await
            .unwrap();
        assert_eq!(reply, "✓ Coffee: +1 dose(s), +100 руб\nToday's total: 1 dose(s), 100 руб");

        let reply = record_consumption(&store, "42", ConsumptionKind::Coffee, 2, 50, now)
            .await
            .unwrap();
        assert_eq!(reply, "✓ Coffee: +2 dose(s), +50 руб\nToday's total: 3 dose(s), 150 руб");

        let rows = store.rows(Table::Consumption).await.unwrap();
        assert_eq!(rows.len(), 1);
        let record = ConsumptionRecord::from_row(&rows[0]);
        assert_eq!(record.count(ConsumptionKind::Coffee), 3);
        assert_eq!(record.cost(ConsumptionKind::Coffee), 150);
    }

    #[tokio::test]
    async fn consumption_without_cost_leaves_cost_cell_alone() {
        let store = MemStore::with_schema().await;
        let now = tuesday();

        record_consumption(&store, "42", ConsumptionKind::Sugar, 1, 75, now)
            .await
            .unwrap();
        let reply = record_consumption(&store, "42", ConsumptionKind::Sugar, 1, 0, now)
            .await
            .unwrap();
        assert_eq!(reply, "✓ Sugary food: +1 dose(s)\nToday's total: 2 dose(s), 75 руб");
    }

    #[tokio::test]
    async fn language_duplicate_guard() {
        let store = MemStore::with_schema().await;
        let now = tuesday();

        let reply = record_language(&store, "42", LanguageCode::Chinese, now)
            .await
            .unwrap();
        assert_eq!(reply, "✓ Chinese activation recorded!");
        let err = record_language(&store, "42", LanguageCode::Chinese, now)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Chinese activation already recorded today");

        // Other codes remain recordable.
        record_language(&store, "42", LanguageCode::Hebrew, now)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn one_goal_per_week() {
        let store = MemStore::with_schema().await;
        let now = tuesday();

        let reply = set_weekly_goal(&store, "42", "run twice", now).await.unwrap();
        assert_eq!(reply, "✓ Weekly goal saved.");

        // Next day, same week.
        let wednesday = week::moscow_offset()
            .with_ymd_and_hms(2025, 6, 11, 9, 0, 0)
            .unwrap();
        let err = set_weekly_goal(&store, "42", "run thrice", wednesday)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "A goal is already set for this week.");

        // Next week is fine again.
        let next_monday = week::moscow_offset()
            .with_ymd_and_hms(2025, 6, 16, 9, 0, 0)
            .unwrap();
        set_weekly_goal(&store, "42", "new week, new goal", next_monday)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn goal_rejects_empty_text() {
        let store = MemStore::with_schema().await;
        let err = set_weekly_goal(&store, "42", "   ", tuesday()).await.unwrap_err();
        assert!(matches!(err, SamboError::Validation(_)));
    }
}
