//! Discord REST client implementation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

use super::{message_payload, ChatApi, ChatMessage};
use crate::error::Error;
use crate::Result;

/// Default Discord API base URL
pub const DISCORD_API_URL: &str = "https://discord.com/api/v10";

/// Environment variable overriding the API base URL
pub const API_BASE_ENV: &str = "DCLI_API_BASE";

/// Maximum page size of the message listing endpoint
const RECENT_LIMIT: u32 = 100;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Discord API client.
///
/// The connection pool and the authenticated header set are built once
/// and reused for every request of the session.
#[derive(Clone)]
pub struct DiscordClient {
    base_url: Url,
    client: Client,
}

impl DiscordClient {
    /// Create a client against `$DCLI_API_BASE` or the public Discord API.
    pub fn new(token: &str) -> Result<Self> {
        let base = std::env::var(API_BASE_ENV).unwrap_or_else(|_| DISCORD_API_URL.to_string());
        Self::with_base_url(token, &base)
    }

    /// Create a client against a custom base URL.
    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid API base URL {base_url:?}: {e}")))?;

        let mut auth = HeaderValue::from_str(token)
            .map_err(|_| Error::Config("Token contains characters not allowed in a header".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { base_url, client })
    }

    /// Build `<base>/channels/{channel_id}/messages`.
    pub fn messages_url(&self, channel_id: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("API base URL {} cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend(["channels", channel_id, "messages"]);
        Ok(url)
    }
}

#[async_trait]
impl ChatApi for DiscordClient {
    async fn post_message(&self, channel_id: &str, text: &str) -> Result<()> {
        let url = self.messages_url(channel_id)?;
        let payload = message_payload(text)?;

        debug!("POST {}", url);
        let response = self.client.post(url).body(payload).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!("Post to channel {} failed with {}", channel_id, status);
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    async fn list_recent_messages(&self, channel_id: &str) -> Result<Vec<ChatMessage>> {
        let mut url = self.messages_url(channel_id)?;
        url.query_pairs_mut()
            .append_pair("limit", &RECENT_LIMIT.to_string());

        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::OK {
            warn!("Listing channel {} failed with {}", channel_id, status);
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        let messages: Vec<ChatMessage> =
            serde_json::from_str(&body).map_err(|e| Error::Parse(e.to_string()))?;
        debug!("Fetched {} messages from channel {}", messages.len(), channel_id);
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn test_messages_url() {
        let client = DiscordClient::with_base_url("T1", DISCORD_API_URL).unwrap();
        assert_eq!(
            client.messages_url("123").unwrap().as_str(),
            "https://discord.com/api/v10/channels/123/messages"
        );

        let client = DiscordClient::with_base_url("T1", "http://localhost:8080/").unwrap();
        assert_eq!(
            client.messages_url("123").unwrap().as_str(),
            "http://localhost:8080/channels/123/messages"
        );
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert!(matches!(
            DiscordClient::with_base_url("T1", "not a url"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            DiscordClient::with_base_url("bad\ntoken", DISCORD_API_URL),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_post_message_sends_auth_and_payload() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/channels/C1/messages")
                    .header("Authorization", "T1")
                    .header("Content-Type", "application/json")
                    .json_body(json!({"content": "line \"one\"\nline two"}));
                then.status(200).json_body(json!({"id": "1"}));
            })
            .await;

        let client = DiscordClient::with_base_url("T1", &server.base_url()).unwrap();
        client
            .post_message("C1", "line \"one\"\nline two")
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_message_non_200_is_api_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/channels/C1/messages");
                then.status(403).body(r#"{"message": "Missing Access", "code": 50001}"#);
            })
            .await;

        let client = DiscordClient::with_base_url("T1", &server.base_url()).unwrap();
        let err = client.post_message("C1", "hi").await.unwrap_err();

        match err {
            Error::Api { status, body } => {
                assert_eq!(status, 403);
                assert!(body.contains("Missing Access"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_reports_status_zero() {
        // Nothing listens on port 1.
        let client = DiscordClient::with_base_url("T1", "http://127.0.0.1:1").unwrap();
        let err = client.post_message("C1", "hi").await.unwrap_err();

        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(err.status(), Some(0));
    }

    #[tokio::test]
    async fn test_list_recent_messages() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/channels/C1/messages")
                    .query_param("limit", "100")
                    .header("Authorization", "T1");
                then.status(200).json_body(json!([
                    {"id": "2", "author": {"username": "a"}, "content": "yo"},
                    {"id": "1", "author": {"username": "a"}, "content": "hi"}
                ]));
            })
            .await;

        let client = DiscordClient::with_base_url("T1", &server.base_url()).unwrap();
        let messages = client.list_recent_messages("C1").await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            messages,
            vec![ChatMessage::new("a", "yo"), ChatMessage::new("a", "hi")]
        );
    }

    #[tokio::test]
    async fn test_list_malformed_json_is_parse_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/channels/C1/messages");
                then.status(200).body("not json");
            })
            .await;

        let client = DiscordClient::with_base_url("T1", &server.base_url()).unwrap();
        let err = client.list_recent_messages("C1").await.unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[tokio::test]
    async fn test_list_non_200_is_api_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/channels/C1/messages");
                then.status(401).body("401: Unauthorized");
            })
            .await;

        let client = DiscordClient::with_base_url("T1", &server.base_url()).unwrap();
        let err = client.list_recent_messages("C1").await.unwrap_err();
        assert_eq!(err.status(), Some(401));
    }
}
