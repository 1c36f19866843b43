use crate::{
    error::SamboError,
    message::{IncomingMessage, OutgoingMessage},
};
use async_trait::async_trait;

/// Messaging Channel trait.
///
/// Every messaging platform (Telegram today) implements this trait to
/// receive and send messages.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Start listening for incoming messages.
    /// Returns a receiver that yields incoming messages.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<IncomingMessage>, SamboError>;

    /// Send a response back through this channel.
    async fn send(&self, message: OutgoingMessage) -> Result<(), SamboError>;

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), SamboError>;
}

/// Text-generation trait for narrative weekly feedback.
///
/// A single request/response exchange; the caller falls back to a
/// deterministic template on any failure.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Human-readable generator name.
    fn name(&self) -> &str;

    /// Whether the generator has everything it needs to make a call.
    fn is_configured(&self) -> bool;

    /// Generate text for a prompt, within the generator's own timeout.
    async fn generate(&self, prompt: &str) -> Result<String, SamboError>;
}
