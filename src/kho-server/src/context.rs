// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use tokio::sync::Mutex;

use kho_core::ComplianceTracker;

use crate::transport::{ChatId, ChatTransport};

/// Shared state handed to the update loop and the scheduler.
pub struct BotContext<T: ChatTransport> {
    pub tracker: Mutex<ComplianceTracker>,
    pub transport: Arc<T>,
    pub destinations: Vec<ChatId>,
    pub utc_offset: FixedOffset,
}

impl<T: ChatTransport> BotContext<T> {
    pub fn new(
        tracker: ComplianceTracker,
        transport: Arc<T>,
        destinations: Vec<ChatId>,
        utc_offset: FixedOffset,
    ) -> Self {
        Self {
            tracker: Mutex::new(tracker),
            transport,
            destinations,
            utc_offset,
        }
    }

    /// Current wall-clock time in the operating timezone.
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.utc_offset)
    }
}
