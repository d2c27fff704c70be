//! Telegram Bot API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::TelegramConfig;

use super::{InboundEvent, Messenger, MessagingError, UpdateSource};

/// Extra time on top of the long-poll timeout before the HTTP call gives up.
const POLL_GRACE_SECS: u64 = 15;

/// Envelope every Bot API method answers with.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct BotUser {
    pub id: i64,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    from: Option<BotUser>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

/// Telegram client implementing both the update stream and replies.
pub struct TelegramClient {
    client: Client,
    config: TelegramConfig,
    /// Next update id to request; advanced past every batch received.
    offset: Mutex<i64>,
}

impl TelegramClient {
    /// Create a new Telegram client.
    pub fn new(config: TelegramConfig) -> Result<Self, MessagingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(
                config.timeout_secs as u64 + POLL_GRACE_SECS,
            ))
            .build()
            .map_err(|e| MessagingError::Transport(e.without_url().to_string()))?;

        Ok(Self {
            client,
            config,
            offset: Mutex::new(0),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.secret,
            method
        )
    }

    /// Checks the bot token with `getMe` and returns the bot account.
    pub async fn authorize(&self) -> Result<BotUser, MessagingError> {
        let request = self.client.get(self.method_url("getMe"));
        let me: BotUser = self.call("getMe", request).await?;
        info!(
            "Authorized on account {}",
            me.username.as_deref().unwrap_or("<unnamed>")
        );
        Ok(me)
    }

    /// Send a request and unwrap the Bot API envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        request: RequestBuilder,
    ) -> Result<T, MessagingError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                MessagingError::Timeout
            } else {
                // Request URLs embed the bot token.
                MessagingError::Transport(e.without_url().to_string())
            }
        })?;

        let body = response
            .text()
            .await
            .map_err(|e| MessagingError::Transport(e.without_url().to_string()))?;

        if self.config.debug {
            debug!(method, body = %body, "Bot API response");
        }

        let envelope: ApiResponse<T> = serde_json::from_str(&body)
            .map_err(|e| MessagingError::Api(format!("{}: invalid response: {}", method, e)))?;
        unwrap_envelope(method, envelope)
    }

    async fn fetch_updates(&self) -> Result<Vec<Update>, MessagingError> {
        let offset = *self.offset.lock().await;
        let request = self.client.get(self.method_url("getUpdates")).query(&[
            ("offset", offset.to_string()),
            ("timeout", self.config.timeout_secs.to_string()),
        ]);
        self.call("getUpdates", request).await
    }
}

#[async_trait]
impl UpdateSource for TelegramClient {
    async fn next_events(&self) -> Result<Vec<InboundEvent>, MessagingError> {
        let updates = self.fetch_updates().await?;
        let (events, next_offset) = events_from_updates(updates);
        if let Some(next) = next_offset {
            let mut offset = self.offset.lock().await;
            *offset = (*offset).max(next);
        }
        Ok(events)
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), MessagingError> {
        let request = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&json!({ "chat_id": chat_id, "text": text }));
        let _: serde_json::Value = self.call("sendMessage", request).await?;
        Ok(())
    }

    async fn send_image(&self, chat_id: i64, image: Vec<u8>) -> Result<(), MessagingError> {
        let photo = multipart::Part::bytes(image)
            .file_name("Image")
            .mime_str("image/png")
            .map_err(|e| MessagingError::Transport(e.to_string()))?;
        let form = multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .part("photo", photo);

        let request = self
            .client
            .post(self.method_url("sendPhoto"))
            .multipart(form);
        let _: serde_json::Value = self.call("sendPhoto", request).await?;
        Ok(())
    }
}

fn unwrap_envelope<T>(method: &str, envelope: ApiResponse<T>) -> Result<T, MessagingError> {
    if envelope.ok {
        return envelope
            .result
            .ok_or_else(|| MessagingError::Api(format!("{}: response had no result", method)));
    }

    let description = envelope
        .description
        .unwrap_or_else(|| "no description".to_string());
    match envelope.error_code {
        Some(401) | Some(404) => Err(MessagingError::Unauthorized(description)),
        Some(code) => Err(MessagingError::Api(format!(
            "{}: {} ({})",
            method, description, code
        ))),
        None => Err(MessagingError::Api(format!("{}: {}", method, description))),
    }
}

/// Converts a getUpdates batch into events and the offset that acknowledges it.
fn events_from_updates(updates: Vec<Update>) -> (Vec<InboundEvent>, Option<i64>) {
    let next_offset = updates.iter().map(|u| u.update_id + 1).max();
    let events = updates
        .into_iter()
        .filter_map(|update| {
            let message = update.message?;
            Some(InboundEvent {
                update_id: update.update_id,
                chat_id: message.chat.id,
                username: message.from.and_then(|u| u.username),
                text: message.text.unwrap_or_default(),
            })
        })
        .collect();
    (events, next_offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TelegramConfig {
        TelegramConfig {
            secret: "123:abc".to_string(),
            timeout_secs: 1,
            debug: false,
            api_url: "http://127.0.0.1:1/".to_string(),
        }
    }

    #[test]
    fn test_method_url() {
        let client = TelegramClient::new(config()).unwrap();
        assert_eq!(
            client.method_url("getMe"),
            "http://127.0.0.1:1/bot123:abc/getMe"
        );
    }

    #[test]
    fn test_events_from_updates() {
        let updates: Vec<Update> = serde_json::from_value(json!([
            {
                "update_id": 10,
                "message": {
                    "chat": { "id": 7 },
                    "from": { "id": 1, "username": "alice" },
                    "text": "hello"
                }
            },
            { "update_id": 11 },
            {
                "update_id": 12,
                "message": { "chat": { "id": 8 } }
            }
        ]))
        .unwrap();

        let (events, next_offset) = events_from_updates(updates);
        assert_eq!(next_offset, Some(13));
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            InboundEvent {
                update_id: 10,
                chat_id: 7,
                username: Some("alice".to_string()),
                text: "hello".to_string(),
            }
        );
        assert_eq!(events[1].text, "");
        assert!(events[1].username.is_none());
    }

    #[test]
    fn test_events_from_empty_batch() {
        let (events, next_offset) = events_from_updates(vec![]);
        assert!(events.is_empty());
        assert!(next_offset.is_none());
    }

    #[test]
    fn test_unwrap_envelope_ok() {
        let envelope: ApiResponse<BotUser> = serde_json::from_value(json!({
            "ok": true,
            "result": { "id": 1, "username": "textshot_bot" }
        }))
        .unwrap();
        let me = unwrap_envelope("getMe", envelope).unwrap();
        assert_eq!(me.username.as_deref(), Some("textshot_bot"));
    }

    #[test]
    fn test_unwrap_envelope_unauthorized() {
        let envelope: ApiResponse<BotUser> = serde_json::from_value(json!({
            "ok": false,
            "error_code": 401,
            "description": "Unauthorized"
        }))
        .unwrap();
        let err = unwrap_envelope("getMe", envelope).unwrap_err();
        assert!(matches!(err, MessagingError::Unauthorized(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_unwrap_envelope_api_error() {
        let envelope: ApiResponse<serde_json::Value> = serde_json::from_value(json!({
            "ok": false,
            "error_code": 429,
            "description": "Too Many Requests: retry after 5"
        }))
        .unwrap();
        let err = unwrap_envelope("sendMessage", envelope).unwrap_err();
        assert!(matches!(err, MessagingError::Api(ref m) if m.contains("429")));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_transport_error_hides_token() {
        let client = TelegramClient::new(config()).unwrap();
        let err = client.authorize().await.unwrap_err();
        assert!(!err.to_string().contains("123:abc"));
    }
}
