// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Minimal Telegram Bot API client (long polling + sendMessage).

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::transport::{ChatId, ChatTransport, SendFuture, TransportError};

/// Slack added on top of the long-poll timeout before the HTTP request
/// itself is abandoned.
const HTTP_TIMEOUT_MARGIN_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: ChatId,
}

pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(api_url: &str, token: &str, poll_timeout_secs: u64) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(
                poll_timeout_secs + HTTP_TIMEOUT_MARGIN_SECS,
            ))
            .build()?;
        Ok(Self {
            http,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T, TransportError> {
        let resp = self
            .http
            .post(format!("{}/{}", self.base_url, method))
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Http(e.without_url()))?;
        let status = resp.status();
        let api: ApiResponse<T> = match resp.json().await {
            Ok(api) => api,
            Err(_) if !status.is_success() => {
                return Err(TransportError::Api(format!("{method}: HTTP {status}")))
            }
            Err(e) => return Err(TransportError::Http(e.without_url())),
        };
        if !api.ok {
            let description = api
                .description
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(TransportError::Api(format!("{method}: {description}")));
        }
        api.result
            .ok_or_else(|| TransportError::Api(format!("{method}: response without result")))
    }

    /// Long-poll for new updates starting at `offset`.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TransportError> {
        let mut body = json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }
        self.call("getUpdates", &body).await
    }

    pub async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<(), TransportError> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(message_id) = reply_to {
            body["reply_parameters"] = json!({
                "message_id": message_id,
                "allow_sending_without_reply": true,
            });
        }
        self.call::<Value>("sendMessage", &body).await.map(|_| ())
    }
}

impl ChatTransport for TelegramClient {
    fn send_text<'a>(&'a self, chat_id: ChatId, text: &'a str) -> SendFuture<'a> {
        Box::pin(async move { self.send_message(chat_id, text, None).await })
    }

    fn reply_text<'a>(&'a self, chat_id: ChatId, message_id: i64, text: &'a str) -> SendFuture<'a> {
        Box::pin(async move { self.send_message(chat_id, text, Some(message_id)).await })
    }
}
