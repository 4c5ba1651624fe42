// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Outbound side of the chat transport.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

/// Chat / group identifier as used by the Bot API.
pub type ChatId = i64;

/// Longest text the Bot API accepts in one message, in UTF-16 code units.
pub const MAX_MESSAGE_LEN: usize = 4096;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Bot API error: {0}")]
    Api(String),
}

/// Alias to reduce type complexity in ChatTransport.
pub type SendFuture<'a> = Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + 'a>>;

/// Anything that can deliver plain text to a chat.
pub trait ChatTransport: Send + Sync {
    /// Send a standalone message to `chat_id`.
    fn send_text<'a>(&'a self, chat_id: ChatId, text: &'a str) -> SendFuture<'a>;

    /// Reply to a specific message. Transports without threading fall back
    /// to a plain message in the same chat.
    fn reply_text<'a>(
        &'a self,
        chat_id: ChatId,
        _message_id: i64,
        text: &'a str,
    ) -> SendFuture<'a> {
        self.send_text(chat_id, text)
    }
}
