//! Chat API abstraction layer.
//!
//! This module provides:
//! - [`ChatApi`] trait for the two REST calls the client needs
//! - [`ChatMessage`] as returned by the message listing endpoint
//! - [`DiscordClient`], the concrete implementation

pub mod discord;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::Error;
use crate::Result;

pub use discord::DiscordClient;

/// Message returned by the recent-messages endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub author: Author,

    #[serde(default)]
    pub content: String,
}

impl ChatMessage {
    pub fn new(username: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: Author {
                username: username.into(),
            },
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub username: String,
}

/// Chat API trait for the REST surface used by the dispatcher.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Post `text` to a channel. Succeeds only on HTTP 200.
    async fn post_message(&self, channel_id: &str, text: &str) -> Result<()>;

    /// Fetch up to 100 recent messages, newest first.
    async fn list_recent_messages(&self, channel_id: &str) -> Result<Vec<ChatMessage>>;
}

/// Encode the body of a post-message request.
pub fn message_payload(text: &str) -> Result<String> {
    serde_json::to_string(&json!({ "content": text })).map_err(|e| Error::Parse(e.to_string()))
}

/// Fake chat API for testing.
#[cfg(test)]
pub struct FakeChatApi {
    messages: Vec<ChatMessage>,
    post_result: std::sync::Mutex<Option<Error>>,
    list_result: std::sync::Mutex<Option<Error>>,
    pub posted: std::sync::Mutex<Vec<(String, String)>>,
    pub list_calls: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl FakeChatApi {
    /// Create with messages returned (newest first) by every listing.
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            post_result: std::sync::Mutex::new(None),
            list_result: std::sync::Mutex::new(None),
            posted: std::sync::Mutex::new(Vec::new()),
            list_calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Fail the next post with `err`.
    pub fn fail_next_post(self, err: Error) -> Self {
        *self.post_result.lock().unwrap() = Some(err);
        self
    }

    /// Fail the next listing with `err`.
    pub fn fail_next_list(self, err: Error) -> Self {
        *self.list_result.lock().unwrap() = Some(err);
        self
    }

    pub fn call_count(&self) -> usize {
        self.posted.lock().unwrap().len() + self.list_calls.lock().unwrap().len()
    }
}

#[cfg(test)]
#[async_trait]
impl ChatApi for FakeChatApi {
    async fn post_message(&self, channel_id: &str, text: &str) -> Result<()> {
        self.posted
            .lock()
            .unwrap()
            .push((channel_id.to_string(), text.to_string()));
        match self.post_result.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn list_recent_messages(&self, channel_id: &str) -> Result<Vec<ChatMessage>> {
        self.list_calls.lock().unwrap().push(channel_id.to_string());
        match self.list_result.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(self.messages.clone()),
        }
    }
}
