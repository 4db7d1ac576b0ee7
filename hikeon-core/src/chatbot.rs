use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::{error::ServiceError, http::HttpClient, model::SessionId};

/// JSON fields checked, in order, for the assistant's reply.
const REPLY_FIELDS: [&str; 3] = ["response", "reply", "message"];

/// Forwards user messages to the HikeOn assistant endpoint.
#[derive(Debug, Clone)]
pub struct ChatbotService {
    endpoint: String,
    http: Arc<dyn HttpClient>,
}

impl ChatbotService {
    pub fn new(endpoint: impl Into<String>, http: Arc<dyn HttpClient>) -> Self {
        Self { endpoint: endpoint.into(), http }
    }

    /// A fresh session label. Nothing is registered client- or server-side.
    pub fn start_session(&self) -> SessionId {
        SessionId::new(Uuid::new_v4().to_string())
    }

    pub async fn get_chatbot_response(
        &self,
        session: &SessionId,
        message: &str,
    ) -> Result<String, ServiceError> {
        let body = self
            .http
            .get(&self.endpoint, &[("session_id", session.as_str()), ("message", message)])
            .await?;

        tracing::debug!(session = %session, bytes = body.len(), "chatbot replied");
        Ok(extract_reply(&body))
    }
}

fn extract_reply(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for field in REPLY_FIELDS {
            if let Some(Value::String(reply)) = map.get(field) {
                return reply.clone();
            }
        }
    }

    body.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::FakeHttpClient;

    #[test]
    fn sessions_are_distinct() {
        let service = ChatbotService::new("http://bot.test/chat", Arc::new(FakeHttpClient::new()));
        assert_ne!(service.start_session(), service.start_session());
    }

    #[tokio::test]
    async fn forwards_session_and_message() {
        let fake = Arc::new(FakeHttpClient::new().with_body("Try the Lake 22 trail.\n"));
        let service = ChatbotService::new("http://bot.test/chat", fake.clone());
        let session = SessionId::new("abc");

        let reply = service.get_chatbot_response(&session, "Where should I hike?").await.unwrap();

        assert_eq!(reply, "Try the Lake 22 trail.");
        let req = &fake.requests()[0];
        assert_eq!(req.url, "http://bot.test/chat");
        assert_eq!(req.param("session_id"), Some("abc"));
        assert_eq!(req.param("message"), Some("Where should I hike?"));
    }

    #[test]
    fn reply_extracted_from_json_fields() {
        assert_eq!(extract_reply(r#"{"response":"hello"}"#), "hello");
        assert_eq!(extract_reply(r#"{"session_id":"x","reply":"hi"}"#), "hi");
        assert_eq!(extract_reply(r#"{"message":"hey"}"#), "hey");
    }

    #[test]
    fn non_reply_json_is_returned_verbatim() {
        assert_eq!(extract_reply(r#"{"answer": 42}"#), r#"{"answer": 42}"#);
        assert_eq!(extract_reply("\"quoted\""), "\"quoted\"");
    }
}
