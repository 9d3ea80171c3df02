//! Telegram Bot API transport
//!
//! Hand-rolled client over the HTTPS Bot API: long-poll `getUpdates` plus
//! the handful of send/edit methods the bot uses. Routing code depends on
//! the [`ChatApi`] trait, not this client, so flows are testable offline.
//!
//! The bot token is part of every request URL, which is why the logging
//! layer redacts `bot<id>:<token>` shapes before lines reach stdout.

use crate::error::{BotError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(30);
/// Overall request deadline. Slightly above the long-poll window so a full
/// `getUpdates` wait is not cut off by the transport.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(125);

/// One incoming event from getUpdates
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
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
    pub id: i64,
}

/// A button press on an inline keyboard
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineKeyboardButton {
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// Rendering and keyboard options for an outgoing message
#[derive(Debug, Clone, Default)]
pub struct MessageOptions {
    pub html: bool,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

impl MessageOptions {
    /// Render the text as HTML
    pub fn html() -> Self {
        Self {
            html: true,
            keyboard: None,
        }
    }

    /// Attach an inline keyboard
    pub fn with_keyboard(keyboard: InlineKeyboardMarkup) -> Self {
        Self {
            html: false,
            keyboard: Some(keyboard),
        }
    }
}

/// Outbound chat operations the routing layer needs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Send a text message; answers the sent message so it can be edited
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        options: MessageOptions,
    ) -> Result<Message>;

    /// Replace the text of an already-sent message
    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        options: MessageOptions,
    ) -> Result<()>;

    /// Send an image with a caption
    async fn send_photo(&self, chat_id: i64, photo: Vec<u8>, caption: &str) -> Result<()>;

    /// Acknowledge a callback query so the client stops its spinner
    async fn answer_callback(&self, callback_id: &str) -> Result<()>;
}

/// Envelope every Bot API method answers with
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendMessagePayload<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
struct EditMessagePayload<'a> {
    chat_id: i64,
    message_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct GetUpdatesPayload {
    offset: i64,
    timeout: u64,
}

#[derive(Debug, Serialize)]
struct AnswerCallbackPayload<'a> {
    callback_query_id: &'a str,
}

/// Bot API client bound to one token
pub struct TelegramClient {
    client: reqwest::Client,
    base: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base: format!("https://api.telegram.org/bot{token}"),
        })
    }

    /// Point the client at a different API host (tests, local bot server)
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    /// Long-poll for new updates past `offset`
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        self.call(
            "getUpdates",
            &GetUpdatesPayload {
                offset,
                timeout: timeout_secs,
            },
        )
        .await
    }

    async fn call<T, P>(&self, method: &str, payload: &P) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize + Sync,
    {
        let response = self
            .client
            .post(format!("{}/{method}", self.base))
            .json(payload)
            .send()
            .await?;
        let envelope: ApiResponse<T> = response.json().await?;
        unwrap_envelope(method, envelope)
    }
}

fn unwrap_envelope<T>(method: &str, envelope: ApiResponse<T>) -> Result<T> {
    if !envelope.ok {
        let description = envelope
            .description
            .unwrap_or_else(|| "no description".to_string());
        return Err(BotError::Telegram(format!("{method}: {description}")));
    }
    envelope
        .result
        .ok_or_else(|| BotError::Telegram(format!("{method}: ok without result")))
}

fn parse_mode(options: &MessageOptions) -> Option<&'static str> {
    options.html.then_some("HTML")
}

#[async_trait]
impl ChatApi for TelegramClient {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        options: MessageOptions,
    ) -> Result<Message> {
        self.call(
            "sendMessage",
            &SendMessagePayload {
                chat_id,
                text,
                parse_mode: parse_mode(&options),
                reply_markup: options.keyboard.as_ref(),
            },
        )
        .await
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        options: MessageOptions,
    ) -> Result<()> {
        let _edited: Message = self
            .call(
                "editMessageText",
                &EditMessagePayload {
                    chat_id,
                    message_id,
                    text,
                    parse_mode: parse_mode(&options),
                },
            )
            .await?;
        Ok(())
    }

    async fn send_photo(&self, chat_id: i64, photo: Vec<u8>, caption: &str) -> Result<()> {
        let part = reqwest::multipart::Part::bytes(photo)
            .file_name("image")
            .mime_str("application/octet-stream")?;
        let form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part("photo", part);
        let response = self
            .client
            .post(format!("{}/sendPhoto", self.base))
            .multipart(form)
            .send()
            .await?;
        let envelope: ApiResponse<Message> = response.json().await?;
        unwrap_envelope("sendPhoto", envelope).map(|_| ())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<()> {
        let _acknowledged: bool = self
            .call(
                "answerCallbackQuery",
                &AnswerCallbackPayload {
                    callback_query_id: callback_id,
                },
            )
            .await?;
        Ok(())
    }
}
