//! # sambo-sheets
//!
//! Row-oriented persistence against a named-sheet remote store. Three
//! fixed-schema tables (Activity, Consumption, Language), a `RowStore`
//! trait seam, a Google Sheets REST client, and an in-memory store used
//! in tests and local runs.

pub mod client;
pub mod store;
pub mod table;

pub use client::SheetsClient;
pub use store::{find_or_create, MemStore, Row, RowStore};
pub use table::Table;
