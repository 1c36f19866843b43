//! Gateway — the main event loop connecting channels, the row store,
//! and the feedback generator.
//!
//! Includes: message routing, the weekly report scheduler, the per-user
//! "awaiting goal" conversation state, and graceful shutdown.

mod routing;
mod scheduler;

use sambo_core::config::ReportConfig;
use sambo_core::message::{IncomingMessage, OutgoingMessage};
use sambo_core::traits::{Channel, Generator};
use sambo_sheets::RowStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info, warn};

/// The central gateway that routes messages between channels and the
/// recorders, and drives the weekly report job.
pub struct Gateway {
    pub(super) channels: HashMap<String, Arc<dyn Channel>>,
    /// `None` when the sheet backend is not configured; recording and
    /// reports are disabled but the process keeps answering.
    pub(super) store: Option<Arc<dyn RowStore>>,
    pub(super) generator: Option<Arc<dyn Generator>>,
    pub(super) report_config: ReportConfig,
    /// Users we asked for an improvement goal, mapped to the week id the
    /// prompt was sent for. Cleared on first consumed reply and at the
    /// start of every scheduled run.
    pub(super) awaiting_goal: Mutex<HashMap<String, String>>,
}

impl Gateway {
    /// Create a new gateway.
    pub fn new(
        channels: HashMap<String, Arc<dyn Channel>>,
        store: Option<Arc<dyn RowStore>>,
        generator: Option<Arc<dyn Generator>>,
        report_config: ReportConfig,
    ) -> Self {
        Self {
            channels,
            store,
            generator,
            report_config,
            awaiting_goal: Mutex::new(HashMap::new()),
        }
    }

    /// Run the main event loop.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        info!(
            "Sambo gateway running | channels: {} | store: {} | generator: {}",
            self.channels.keys().cloned().collect::<Vec<_>>().join(", "),
            if self.store.is_some() {
                "connected"
            } else {
                "disabled"
            },
            self.generator
                .as_ref()
                .map(|g| g.name().to_string())
                .unwrap_or_else(|| "template only".to_string()),
        );

        let (tx, mut rx) = mpsc::channel::<IncomingMessage>(256);

        for (name, channel) in &self.channels {
            let mut channel_rx = channel
                .start()
                .await
                .map_err(|e| anyhow::anyhow!("failed to start channel {name}: {e}"))?;
            let tx = tx.clone();
            let channel_name = name.clone();

            tokio::spawn(async move {
                while let Some(msg) = channel_rx.recv().await {
                    if tx.send(msg).await.is_err() {
                        info!("gateway receiver dropped, stopping {channel_name} forwarder");
                        break;
                    }
                }
            });

            info!("Channel started: {name}");
        }

        drop(tx);

        // Spawn the weekly report loop.
        let report_handle = if self.report_config.enabled && self.store.is_some() {
            let gw = self.clone();
            Some(tokio::spawn(async move {
                gw.report_loop().await;
            }))
        } else {
            if self.report_config.enabled {
                warn!("weekly reports disabled: no row store configured");
            }
            None
        };

        // Main event loop with graceful shutdown. Messages are handled one
        // at a time: the store's read-modify-write sequences assume a
        // single writer, so inbound handling must never interleave.
        loop {
            tokio::select! {
                Some(incoming) = rx.recv() => {
                    self.handle_message(incoming).await;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        if let Some(handle) = &report_handle {
            handle.abort();
        }
        for (name, channel) in &self.channels {
            if let Err(e) = channel.stop().await {
                warn!("error stopping channel {name}: {e}");
            }
        }
        info!("Gateway stopped");
        Ok(())
    }

    /// Send text through a named channel; delivery failures are logged,
    /// never propagated.
    pub(super) async fn send_text(&self, channel: &str, reply_target: Option<String>, text: &str) {
        let Some(channel_impl) = self.channels.get(channel) else {
            error!("cannot send reply: unknown channel {channel}");
            return;
        };
        if let Err(e) = channel_impl
            .send(OutgoingMessage::text(text, reply_target))
            .await
        {
            error!("failed to send via {channel}: {e}");
        }
    }

    /// The channel that delivers scheduled reports, falling back to any
    /// running channel if the configured one is absent.
    pub(super) fn report_channel(&self) -> Option<&Arc<dyn Channel>> {
        self.channels
            .get(&self.report_config.channel)
            .or_else(|| self.channels.values().next())
    }
}
