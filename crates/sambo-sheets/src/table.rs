//! Table schemas and typed row views.
//!
//! Each logical table has a fixed sheet title and header list. The store
//! itself is cell-oriented; everything above it goes through the typed
//! record types here, so positional indexing stays confined to this module.

use crate::store::Row;
use sambo_core::catalog::{ConsumptionKind, LanguageCode};

/// The three logical tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Activity,
    Consumption,
    Language,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Activity, Table::Consumption, Table::Language];

    /// Sheet title in the remote store.
    pub fn title(self) -> &'static str {
        match self {
            Table::Activity => "Activity",
            Table::Consumption => "Consumption",
            Table::Language => "Language",
        }
    }

    /// The exact header row the sheet must carry. A stored header that
    /// differs from this list is cleared and rewritten (data loss on
    /// schema drift is intentional).
    pub fn headers(self) -> &'static [&'static str] {
        match self {
            Table::Activity => &[
                "User ID",
                "Date",
                "Prayer",
                "Qi Gong",
                "Ball",
                "Run/Stretch",
                "Strength/Stretch",
                "Week Number",
                "Goals",
            ],
            Table::Consumption => &[
                "User ID",
                "Date",
                "Week Number",
                "Coffee (x)",
                "Coffee Cost",
                "Sugary (y)",
                "Sugary Cost",
                "Flour (z)",
                "Flour Cost",
            ],
            Table::Language => &[
                "User ID",
                "Date",
                "Week Number",
                "Chinese (ch)",
                "Hebrew (he)",
                "Tatar (ta)",
            ],
        }
    }

    pub fn width(self) -> usize {
        self.headers().len()
    }

    /// 0-based column of the week id.
    pub fn week_col(self) -> usize {
        match self {
            Table::Activity => 7,
            Table::Consumption | Table::Language => 2,
        }
    }

    /// A fresh all-blank row seeded with the key columns.
    pub fn seed_row(self, user_id: &str, date: &str, week: &str) -> Vec<String> {
        let mut cells = vec![String::new(); self.width()];
        cells[0] = user_id.to_string();
        cells[1] = date.to_string();
        cells[self.week_col()] = week.to_string();
        cells
    }

    /// Whether `cells` matches the table's logical key. Activity keys on
    /// user+date; Consumption and Language key on user+date+week.
    pub fn key_matches(self, cells: &[String], user_id: &str, date: &str, week: &str) -> bool {
        let user_date = cells.first().is_some_and(|c| c == user_id)
            && cells.get(1).is_some_and(|c| c == date);
        match self {
            Table::Activity => user_date,
            Table::Consumption | Table::Language => {
                user_date && cells.get(2).is_some_and(|c| c == week)
            }
        }
    }
}

// --- Column positions for targeted cell writes (0-based) ---

/// Checkmark column for an activity habit id (1-5).
pub fn activity_mark_col(id: u8) -> usize {
    1 + id as usize
}

/// Free-text goals column on the Activity table.
pub const ACTIVITY_DATE_COL: usize = 1;
pub const ACTIVITY_GOALS_COL: usize = 8;

/// Count column for a consumption kind.
pub fn consumption_count_col(kind: ConsumptionKind) -> usize {
    3 + 2 * kind.index()
}

/// Cost column for a consumption kind.
pub fn consumption_cost_col(kind: ConsumptionKind) -> usize {
    consumption_count_col(kind) + 1
}

/// Checkmark column for a language code.
pub fn language_mark_col(code: LanguageCode) -> usize {
    3 + code.index()
}

/// Numeric accumulator cells hold plain digit strings; anything else
/// (blank, junk, overflow) reads as 0.
pub fn cell_number(cell: &str) -> u32 {
    if !cell.is_empty() && cell.chars().all(|c| c.is_ascii_digit()) {
        cell.parse().unwrap_or(0)
    } else {
        0
    }
}

fn cell(cells: &[String], idx: usize) -> String {
    cells.get(idx).cloned().unwrap_or_default()
}

/// A typed view of an Activity row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRecord {
    pub user_id: String,
    pub date: String,
    /// Checkmark cells for habit ids 1-5, in id order.
    pub marks: [String; 5],
    pub week: String,
    pub goals: String,
}

impl ActivityRecord {
    pub fn from_row(row: &Row) -> Self {
        let c = &row.cells;
        Self {
            user_id: cell(c, 0),
            date: cell(c, 1),
            marks: std::array::from_fn(|i| cell(c, activity_mark_col(i as u8 + 1))),
            week: cell(c, Table::Activity.week_col()),
            goals: cell(c, ACTIVITY_GOALS_COL),
        }
    }

    /// Checkmark cell for a habit id (1-5).
    pub fn mark(&self, id: u8) -> &str {
        &self.marks[(id - 1) as usize]
    }
}

/// A typed view of a Consumption row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumptionRecord {
    pub user_id: String,
    pub date: String,
    pub week: String,
    /// Dose counts in x, y, z order.
    pub counts: [u32; 3],
    /// Ruble costs in x, y, z order.
    pub costs: [u32; 3],
}

impl ConsumptionRecord {
    pub fn from_row(row: &Row) -> Self {
        let c = &row.cells;
        Self {
            user_id: cell(c, 0),
            date: cell(c, 1),
            week: cell(c, 2),
            counts: std::array::from_fn(|i| {
                cell_number(&cell(c, consumption_count_col(ConsumptionKind::ALL[i])))
            }),
            costs: std::array::from_fn(|i| {
                cell_number(&cell(c, consumption_cost_col(ConsumptionKind::ALL[i])))
            }),
        }
    }

    pub fn count(&self, kind: ConsumptionKind) -> u32 {
        self.counts[kind.index()]
    }

    pub fn cost(&self, kind: ConsumptionKind) -> u32 {
        self.costs[kind.index()]
    }
}

/// A typed view of a Language row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageRecord {
    pub user_id: String,
    pub date: String,
    pub week: String,
    /// Checkmark cells in ch, he, ta order.
    pub marks: [String; 3],
}

impl LanguageRecord {
    pub fn from_row(row: &Row) -> Self {
        let c = &row.cells;
        Self {
            user_id: cell(c, 0),
            date: cell(c, 1),
            week: cell(c, 2),
            marks: std::array::from_fn(|i| cell(c, language_mark_col(LanguageCode::ALL[i]))),
        }
    }

    pub fn mark(&self, code: LanguageCode) -> &str {
        &self.marks[code.index()]
    }
}
