// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Fan-out of a summary to every configured destination.
//!
//! Each destination is attempted independently; a failure is logged and
//! recorded but never stops the remaining sends. No retries. Texts over
//! the transport limit go out as several messages split at line breaks.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::transport::{ChatId, ChatTransport, TransportError, MAX_MESSAGE_LEN};

#[derive(Debug, Error)]
#[error("delivery to {destination} failed: {message}")]
pub struct DispatchError {
    pub destination: ChatId,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct DispatchReport {
    pub delivered: Vec<ChatId>,
    pub failed: Vec<DispatchError>,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }
}

fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Cut an over-long line into pieces of at most `limit` UTF-16 units.
fn hard_wrap(line: &str, limit: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut piece_len = 0;
    for ch in line.chars() {
        if piece_len + ch.len_utf16() > limit && !piece.is_empty() {
            pieces.push(std::mem::take(&mut piece));
            piece_len = 0;
        }
        piece.push(ch);
        piece_len += ch.len_utf16();
    }
    pieces.push(piece);
    pieces
}

/// Split `text` into messages of at most `limit` UTF-16 units, breaking
/// between lines where possible. Joining the parts with `\n` restores
/// the text unless a single line had to be cut.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(2);
    if utf16_len(text) <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current: Option<(String, usize)> = None;
    for line in text.split('\n') {
        for piece in hard_wrap(line, limit) {
            let piece_len = utf16_len(&piece);
            current = match current.take() {
                Some((mut chunk, len)) if len + 1 + piece_len <= limit => {
                    chunk.push('\n');
                    chunk.push_str(&piece);
                    Some((chunk, len + 1 + piece_len))
                }
                Some((chunk, _)) => {
                    chunks.push(chunk);
                    Some((piece, piece_len))
                }
                None => Some((piece, piece_len)),
            };
        }
    }
    if let Some((chunk, _)) = current {
        chunks.push(chunk);
    }
    chunks
}

async fn send_parts<T>(transport: &T, destination: ChatId, parts: &[String]) -> Result<(), TransportError>
where
    T: ChatTransport + ?Sized,
{
    for part in parts {
        transport.send_text(destination, part).await?;
    }
    Ok(())
}

pub async fn dispatch<T>(transport: &T, destinations: &[ChatId], text: &str) -> DispatchReport
where
    T: ChatTransport + ?Sized,
{
    let parts = split_message(text, MAX_MESSAGE_LEN);
    if parts.len() > 1 {
        debug!("Summary split into {} messages", parts.len());
    }

    let mut report = DispatchReport::default();
    for &destination in destinations {
        match send_parts(transport, destination, &parts).await {
            Ok(()) => report.delivered.push(destination),
            Err(e) => {
                let err = DispatchError {
                    destination,
                    message: e.to_string(),
                };
                warn!("Summary dispatch: {}", err);
                report.failed.push(err);
            }
        }
    }
    info!(
        "Summary dispatched to {}/{} destinations",
        report.delivered.len(),
        report.attempted()
    );
    report
}
