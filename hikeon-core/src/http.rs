use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

use crate::error::ServiceError;

/// Minimal transport used by every service: send a GET, hand back the body text.
#[async_trait]
pub trait HttpClient: Send + Sync + Debug {
    /// Query pairs are form-urlencoded, so spaces go over the wire as `+`.
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<String, ServiceError>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestHttpClient {
    http: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self { http: Client::new() }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<String, ServiceError> {
        // Query values are left out of the log: most of them carry an API key.
        tracing::debug!(url, params = query.len(), "GET");

        let res = self.http.get(url).query(query).send().await.map_err(|e| {
            ServiceError::Transport { url: url.to_string(), source: Box::new(e) }
        })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| ServiceError::Transport { url: url.to_string(), source: Box::new(e) })?;

        if !status.is_success() {
            tracing::debug!(url, status = status.as_u16(), "request failed");
            return Err(ServiceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(body)
    }
}

pub fn parse_json<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, ServiceError> {
    serde_json::from_str(body).map_err(|source| ServiceError::Parse { url: url.to_string(), source })
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
