//! # sambo-providers
//!
//! Text-generation backends for weekly feedback reports.

pub mod deepseek;

pub use deepseek::DeepSeekGenerator;
