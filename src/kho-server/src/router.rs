// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Inbound message routing: commands and report submissions.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use tokio::sync::watch;
use tokio::time::{self, Duration};
use tracing::{debug, info, warn};

use kho_core::messages::usage_text;
use kho_core::Trigger;

use crate::context::BotContext;
use crate::dispatch::dispatch;
use crate::telegram::{Message, TelegramClient};
use crate::transport::{ChatId, ChatTransport};
use crate::wait_for_shutdown;

const POLL_RETRY_BASE: Duration = Duration::from_secs(1);
const POLL_RETRY_MAX: Duration = Duration::from_secs(60);

/// Exponential delay between failed `getUpdates` calls.
#[derive(Debug, Clone)]
pub struct PollBackoff {
    failures: u32,
    base: Duration,
    max: Duration,
}

impl Default for PollBackoff {
    fn default() -> Self {
        Self::new(POLL_RETRY_BASE, POLL_RETRY_MAX)
    }
}

impl PollBackoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            failures: 0,
            base,
            max,
        }
    }

    /// Delay before the next attempt; each call doubles the following one.
    pub fn on_failure(&mut self) -> Duration {
        let delay = self
            .base
            .saturating_mul(2u32.saturating_pow(self.failures))
            .min(self.max);
        self.failures = self.failures.saturating_add(1);
        delay
    }

    pub fn reset(&mut self) {
        self.failures = 0;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Summary,
    Unknown(String),
}

/// Parse a `/command[@botname] [args]` message. Returns `None` for text
/// that is not a command.
pub fn parse_command(text: &str) -> Option<Command> {
    let word = text.trim_start().strip_prefix('/')?.split_whitespace().next()?;
    let name = word.split('@').next().unwrap_or(word).to_lowercase();
    Some(match name.as_str() {
        "start" => Command::Start,
        "help" => Command::Help,
        "tonghop" | "summary" => Command::Summary,
        _ => Command::Unknown(name),
    })
}

/// A text message received from some chat.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub chat_id: ChatId,
    pub message_id: i64,
    pub text: Option<String>,
}

impl From<Message> for InboundMessage {
    fn from(msg: Message) -> Self {
        Self {
            chat_id: msg.chat.id,
            message_id: msg.message_id,
            text: msg.text,
        }
    }
}

pub async fn handle_message<T: ChatTransport>(
    ctx: &BotContext<T>,
    msg: &InboundMessage,
    now: DateTime<FixedOffset>,
) {
    let Some(text) = msg.text.as_deref() else {
        return;
    };

    let reply = match parse_command(text) {
        Some(Command::Start) | Some(Command::Help) => {
            let policy = ctx.tracker.lock().await.policy();
            Some(usage_text(policy))
        }
        Some(Command::Summary) => Some(manual_summary(ctx, msg.chat_id, now).await),
        Some(Command::Unknown(name)) => {
            debug!("Ignoring unknown command /{} from {}", name, msg.chat_id);
            None
        }
        None => {
            let verdict = ctx
                .tracker
                .lock()
                .await
                .handle_report(text, now.date_naive());
            verdict.reply_text()
        }
    };

    if let Some(reply) = reply {
        if let Err(e) = ctx
            .transport
            .reply_text(msg.chat_id, msg.message_id, &reply)
            .await
        {
            warn!("Reply to chat {} failed: {}", msg.chat_id, e);
        }
    }
}

async fn manual_summary<T: ChatTransport>(
    ctx: &BotContext<T>,
    requested_by: ChatId,
    now: DateTime<FixedOffset>,
) -> String {
    let summary = ctx
        .tracker
        .lock()
        .await
        .summary(Trigger::Manual, now.naive_local());
    info!("Manual summary requested from chat {}", requested_by);
    let report = dispatch(
        ctx.transport.as_ref(),
        &ctx.destinations,
        &summary.to_string(),
    )
    .await;
    format!(
        "📨 Đã gửi tổng hợp tới {}/{} nhóm.",
        report.delivered.len(),
        report.attempted()
    )
}

/// Long-poll the Bot API and route every incoming message until shutdown.
pub async fn run_update_loop(
    ctx: Arc<BotContext<TelegramClient>>,
    poll_timeout_secs: u64,
    shutdown_rx: watch::Receiver<bool>,
) {
    let mut offset: Option<i64> = None;
    let mut backoff = PollBackoff::default();

    loop {
        let result = tokio::select! {
            res = ctx.transport.get_updates(offset, poll_timeout_secs) => res,
            _ = wait_for_shutdown(shutdown_rx.clone()) => return,
        };

        let updates = match result {
            Ok(updates) => {
                backoff.reset();
                updates
            }
            Err(e) => {
                let delay = backoff.on_failure();
                warn!("getUpdates failed: {}, retrying in {}s", e, delay.as_secs());
                tokio::select! {
                    _ = time::sleep(delay) => {}
                    _ = wait_for_shutdown(shutdown_rx.clone()) => return,
                }
                continue;
            }
        };

        for update in updates {
            offset = Some(update.update_id + 1);
            if let Some(message) = update.message {
                let msg = InboundMessage::from(message);
                handle_message(&ctx, &msg, ctx.now()).await;
            }
        }
    }
}
