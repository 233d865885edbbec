use anyhow::Result;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::state::{ChatRequest, ChatResponse};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to coach server failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("coach server returned status {0}")]
    Status(StatusCode),
}

/// Talks to the coach server's `/chat` endpoint.
///
/// Cookies are kept across calls so the server sees one session.
#[derive(Clone)]
pub struct CoachClient {
    client: Client,
    base_url: String,
}

impl CoachClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder().cookie_store(true).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn send(&self, message: &str) -> Result<ChatResponse, ClientError> {
        let url = format!("{}/chat", self.base_url);

        let request = ChatRequest {
            message: message.to_string(),
        };

        // .json() sets Content-Type: application/json
        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }

        let chat_response: ChatResponse = response.json().await?;
        Ok(chat_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_send_posts_json_and_decodes_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({"message": "help"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "reply": "You can try...",
                "state": {"topic": null, "word_count": null, "notes": [], "explain": false}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CoachClient::new(&server.uri()).unwrap();
        let resp = client.send("help").await.unwrap();
        assert_eq!(resp.reply, "You can try...");
        assert_eq!(resp.state.topic, None);
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = CoachClient::new(&server.uri()).unwrap();
        let err = client.send("hello").await.unwrap_err();
        assert!(matches!(err, ClientError::Status(s) if s == StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn test_malformed_body_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = CoachClient::new(&server.uri()).unwrap();
        assert!(client.send("hello").await.is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = CoachClient::new("http://127.0.0.1:5000/").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:5000");
    }
}
