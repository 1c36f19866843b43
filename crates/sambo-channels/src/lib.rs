//! # sambo-channels
//!
//! Messaging platform integrations for the habits tracker.

pub mod telegram;

pub use telegram::TelegramChannel;
