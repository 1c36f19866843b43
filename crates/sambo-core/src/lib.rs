//! # sambo-core
//!
//! Core types for the Sambo habits tracker: configuration, errors,
//! messages, the static habit catalogue, week arithmetic, and input
//! classification.

pub mod catalog;
pub mod config;
pub mod error;
pub mod message;
pub mod parse;
pub mod traits;
pub mod week;
