//! Classification-based routing: commands, goal capture, and the three
//! recorders.

use super::Gateway;
use crate::recorder;
use sambo_core::catalog::{ConsumptionKind, LanguageCode, ACTIVITY_HABITS};
use sambo_core::error::SamboError;
use sambo_core::message::IncomingMessage;
use sambo_core::parse::{classify, looks_like_consumption, Input};
use sambo_core::week;
use tracing::{error, info, warn};

const STORE_DISABLED_REPLY: &str =
    "Tracking is not configured — recordings are currently disabled.";
const STORE_FAILED_REPLY: &str = "Failed to record, please try again later.";
const CONSUMPTION_FORMAT_REPLY: &str =
    "Invalid format. Use: 'x', 'xxx', 'xx 150', 'y 75', 'zzz 200'";

impl Gateway {
    /// Handle one inbound message end to end: classify, apply exactly one
    /// recorder (or command), reply to the same chat.
    pub(super) async fn handle_message(&self, incoming: IncomingMessage) {
        let text = incoming.text.trim().to_string();
        if text.is_empty() {
            return;
        }
        info!(
            "[{}] message from {}",
            incoming.channel, incoming.sender_id
        );

        if text.starts_with('/') {
            self.handle_command(&incoming, &text).await;
            return;
        }

        // A pending goal prompt consumes the next message whole,
        // whatever it looks like.
        let pending_goal = {
            self.awaiting_goal
                .lock()
                .await
                .remove(&incoming.sender_id)
                .is_some()
        };
        if pending_goal {
            self.handle_goal_reply(&incoming, &text).await;
            return;
        }

        let Some(store) = self.store.clone() else {
            warn!(
                "dropping entry from {}: no row store configured",
                incoming.sender_id
            );
            self.send_text(&incoming.channel, incoming.reply_target.clone(), STORE_DISABLED_REPLY)
                .await;
            return;
        };

        let now = week::moscow_now();
        let result = match classify(&text) {
            Input::Activity(id) => {
                recorder::record_activity(store.as_ref(), &incoming.sender_id, id, now).await
            }
            Input::Consumption { kind, count, cost } => {
                recorder::record_consumption(
                    store.as_ref(),
                    &incoming.sender_id,
                    kind,
                    count,
                    cost,
                    now,
                )
                .await
            }
            Input::Language(code) => {
                recorder::record_language(store.as_ref(), &incoming.sender_id, code, now).await
            }
            Input::Unrecognized => {
                let reply = if looks_like_consumption(&text) {
                    CONSUMPTION_FORMAT_REPLY.to_string()
                } else {
                    usage_text()
                };
                self.send_text(&incoming.channel, incoming.reply_target.clone(), &reply)
                    .await;
                return;
            }
        };

        let reply = match result {
            Ok(message) => message,
            Err(SamboError::Validation(message)) | Err(SamboError::Duplicate(message)) => message,
            Err(e) => {
                error!("recording failed for {}: {e}", incoming.sender_id);
                STORE_FAILED_REPLY.to_string()
            }
        };
        self.send_text(&incoming.channel, incoming.reply_target.clone(), &reply)
            .await;
    }

    /// Slash commands. Unknown commands get the help text.
    async fn handle_command(&self, incoming: &IncomingMessage, text: &str) {
        let command = text.split_whitespace().next().unwrap_or("");
        // Telegram appends "@botname" in some clients.
        let command = command.split('@').next().unwrap_or(command);

        match command {
            "/start" | "/help" => {
                self.send_text(&incoming.channel, incoming.reply_target.clone(), &help_text())
                    .await;
            }
            "/report" => {
                let target = incoming
                    .reply_target
                    .clone()
                    .unwrap_or_else(|| incoming.sender_id.clone());
                if let Err(e) = self.deliver_report(&incoming.sender_id, &target).await {
                    error!(
                        "on-demand report for {} failed: {e}",
                        incoming.sender_id
                    );
                    let reply = match e {
                        SamboError::Config(_) => STORE_DISABLED_REPLY,
                        _ => "Failed to build your report, please try again later.",
                    };
                    self.send_text(&incoming.channel, incoming.reply_target.clone(), reply)
                        .await;
                }
            }
            _ => {
                self.send_text(&incoming.channel, incoming.reply_target.clone(), &help_text())
                    .await;
            }
        }
    }

    /// Free-form reply to a goal prompt: the whole message becomes the
    /// weekly goal.
    async fn handle_goal_reply(&self, incoming: &IncomingMessage, text: &str) {
        let Some(store) = self.store.clone() else {
            self.send_text(&incoming.channel, incoming.reply_target.clone(), STORE_DISABLED_REPLY)
                .await;
            return;
        };
        let now = week::moscow_now();
        let reply = match recorder::set_weekly_goal(store.as_ref(), &incoming.sender_id, text, now)
            .await
        {
            Ok(message) => message,
            Err(SamboError::Validation(message)) | Err(SamboError::Duplicate(message)) => message,
            Err(e) => {
                error!("saving goal for {} failed: {e}", incoming.sender_id);
                STORE_FAILED_REPLY.to_string()
            }
        };
        self.send_text(&incoming.channel, incoming.reply_target.clone(), &reply)
            .await;
    }
}

/// Welcome and command reference, built from the habit catalogue.
fn help_text() -> String {
    let mut out = String::from("🥋 Welcome to Sambo Habits Tracker!\n\n*Activity habits (1-5):*\n");
    for habit in &ACTIVITY_HABITS {
        out.push_str(&format!("{} — {}\n", habit.id, habit.name));
    }
    out.push_str("\n*Consumption (add a ruble cost after a space):*\n");
    for kind in ConsumptionKind::ALL {
        out.push_str(&format!(
            "{} — {} (e.g. '{}' or '{}{} 150')\n",
            kind.letter(),
            kind.name(),
            kind.letter(),
            kind.letter(),
            kind.letter()
        ));
    }
    out.push_str("\n*Language learning:*\n");
    for code in LanguageCode::ALL {
        out.push_str(&format!("{} — {}\n", code.code(), code.name()));
    }
    out.push_str("\nSend each entry separately. Sunday is rest day.\n/report — this week's summary");
    out
}

/// Corrective reply for text that matches nothing.
fn usage_text() -> String {
    "Please send one entry at a time:\n\
     • 1-5 — activity habits\n\
     • x/y/z — consumption, optional cost (e.g. 'xx 150')\n\
     • ch/he/ta — language learning\n\
     /help — full list"
        .to_string()
}
