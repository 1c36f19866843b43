//! The `RowStore` trait seam and the in-memory implementation.
//!
//! Rows and columns are addressed by 1-based coordinates; row 1 is the
//! header, data rows start at 2. Read-modify-write sequences are not
//! atomic: the deployment guarantees at most one writer per user at a
//! time, this layer does not.

use crate::table::Table;
use async_trait::async_trait;
use sambo_core::error::SamboError;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::info;

/// A data row with its 1-based sheet row number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub number: usize,
    pub cells: Vec<String>,
}

/// Positional access to a named-sheet remote store.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// All data rows of a table in storage order (header excluded).
    async fn rows(&self, table: Table) -> Result<Vec<Row>, SamboError>;

    /// Append a row; returns its 1-based row number.
    async fn append(&self, table: Table, cells: Vec<String>) -> Result<usize, SamboError>;

    /// Write a single cell, 1-based row and column.
    async fn update_cell(
        &self,
        table: Table,
        row: usize,
        col: usize,
        value: &str,
    ) -> Result<(), SamboError>;

    /// Create the table if absent; if the stored header row differs from
    /// the expected list, destructively clear the table and rewrite the
    /// headers. Data loss on schema drift is intentional.
    async fn ensure_schema(&self, table: Table) -> Result<(), SamboError>;
}

/// Find the first row matching the table's logical key, or append a new
/// blank row seeded with the key columns. First match wins in storage
/// order.
pub async fn find_or_create(
    store: &dyn RowStore,
    table: Table,
    user_id: &str,
    date: &str,
    week: &str,
) -> Result<Row, SamboError> {
    let rows = store.rows(table).await?;
    for row in rows {
        if table.key_matches(&row.cells, user_id, date, week) {
            return Ok(row);
        }
    }

    let cells = table.seed_row(user_id, date, week);
    let number = store.append(table, cells.clone()).await?;
    info!(
        "{}: created row {number} for user {user_id} on {date}",
        table.title()
    );
    Ok(Row { number, cells })
}

/// In-memory store. Backs the tests and local dry runs; the same code
/// paths as the remote client, minus the network.
#[derive(Default)]
pub struct MemStore {
    sheets: Mutex<HashMap<&'static str, Vec<Vec<String>>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with all three tables pre-initialized.
    pub async fn with_schema() -> Self {
        let store = Self::new();
        for table in Table::ALL {
            store
                .ensure_schema(table)
                .await
                .expect("memstore schema init cannot fail");
        }
        store
    }
}

#[async_trait]
impl RowStore for MemStore {
    async fn rows(&self, table: Table) -> Result<Vec<Row>, SamboError> {
        let sheets = self.sheets.lock().await;
        let grid = sheets.get(table.title()).cloned().unwrap_or_default();
        Ok(grid
            .into_iter()
            .enumerate()
            .skip(1)
            .map(|(i, cells)| Row {
                number: i + 1,
                cells,
            })
            .collect())
    }

    async fn append(&self, table: Table, cells: Vec<String>) -> Result<usize, SamboError> {
        let mut sheets = self.sheets.lock().await;
        let grid = sheets.entry(table.title()).or_default();
        grid.push(cells);
        Ok(grid.len())
    }

    async fn update_cell(
        &self,
        table: Table,
        row: usize,
        col: usize,
        value: &str,
    ) -> Result<(), SamboError> {
        if row == 0 || col == 0 {
            return Err(SamboError::Store(format!(
                "coordinates are 1-based, got row {row} col {col}"
            )));
        }
        let mut sheets = self.sheets.lock().await;
        let grid = sheets
            .get_mut(table.title())
            .ok_or_else(|| SamboError::Store(format!("no such table: {}", table.title())))?;
        let cells = grid
            .get_mut(row - 1)
            .ok_or_else(|| SamboError::Store(format!("{}: no row {row}", table.title())))?;
        if cells.len() < col {
            cells.resize(col, String::new());
        }
        cells[col - 1] = value.to_string();
        Ok(())
    }

    async fn ensure_schema(&self, table: Table) -> Result<(), SamboError> {
        let expected: Vec<String> = table.headers().iter().map(|h| h.to_string()).collect();
        let mut sheets = self.sheets.lock().await;
        let grid = sheets.entry(table.title()).or_default();
        if grid.first() != Some(&expected) {
            grid.clear();
            grid.push(expected);
            info!("{}: sheet structure initialized", table.title());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_or_create_reuses_row() {
        let store = MemStore::with_schema().await;

        let first = find_or_create(&store, Table::Activity, "42", "2025-06-11", "2025-06-09")
            .await
            .unwrap();
        assert_eq!(first.number, 2);

        let again = find_or_create(&store, Table::Activity, "42", "2025-06-11", "2025-06-09")
            .await
            .unwrap();
        assert_eq!(again.number, 2, "same key must resolve to the same row");

        let other_day = find_or_create(&store, Table::Activity, "42", "2025-06-12", "2025-06-09")
            .await
            .unwrap();
        assert_eq!(other_day.number, 3);
    }

    #[tokio::test]
    async fn test_find_or_create_first_match_wins() {
        let store = MemStore::with_schema().await;
        // Two rows with the same key; storage order decides.
        store
            .append(
                Table::Language,
                Table::Language.seed_row("42", "2025-06-11", "2025-06-09"),
            )
            .await
            .unwrap();
        store
            .append(
                Table::Language,
                Table::Language.seed_row("42", "2025-06-11", "2025-06-09"),
            )
            .await
            .unwrap();

        let found = find_or_create(&store, Table::Language, "42", "2025-06-11", "2025-06-09")
            .await
            .unwrap();
        assert_eq!(found.number, 2);
    }

    #[tokio::test]
    async fn test_update_cell_round_trip() {
        let store = MemStore::with_schema().await;
        let row = find_or_create(&store, Table::Activity, "42", "2025-06-11", "2025-06-09")
            .await
            .unwrap();

        store
            .update_cell(Table::Activity, row.number, 3, "✓")
            .await
            .unwrap();

        let rows = store.rows(Table::Activity).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cells[2], "✓");
    }

    #[tokio::test]
    async fn test_update_cell_rejects_zero_coordinates() {
        let store = MemStore::with_schema().await;
        let err = store
            .update_cell(Table::Activity, 0, 1, "x")
            .await
            .unwrap_err();
        assert!(matches!(err, SamboError::Store(_)));
    }

    #[tokio::test]
    async fn test_ensure_schema_resets_on_drift() {
        let store = MemStore::with_schema().await;
        store
            .append(
                Table::Activity,
                Table::Activity.seed_row("42", "2025-06-11", "2025-06-09"),
            )
            .await
            .unwrap();
        // Corrupt the header.
        store
            .update_cell(Table::Activity, 1, 1, "Wrong Header")
            .await
            .unwrap();

        store.ensure_schema(Table::Activity).await.unwrap();

        // Drift wipes the data too.
        let rows = store.rows(Table::Activity).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_ensure_schema_keeps_matching_data() {
        let store = MemStore::with_schema().await;
        store
            .append(
                Table::Activity,
                Table::Activity.seed_row("42", "2025-06-11", "2025-06-09"),
            )
            .await
            .unwrap();

        store.ensure_schema(Table::Activity).await.unwrap();

        let rows = store.rows(Table::Activity).await.unwrap();
        assert_eq!(rows.len(), 1);
    }
}
