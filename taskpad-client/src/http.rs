use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::ClientError;

/// Client-wide bound on how long a single request may hang.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin JSON transport over the task service REST API.
///
/// Every transport failure is converted to [`ClientError`] here. An
/// unauthorized response to a token-bearing request becomes
/// [`ClientError::AuthorizationExpired`]; other non-success statuses become
/// [`ClientError::Rejected`], which the owning component maps to its
/// operation-specific error kind.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T, ClientError> {
        let resp = self
            .send(self.request(Method::GET, path, token), token.is_some())
            .await?;
        Self::parse_json(resp).await
    }

    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T, ClientError> {
        let resp = self
            .send(
                self.request(Method::POST, path, token).json(body),
                token.is_some(),
            )
            .await?;
        Self::parse_json(resp).await
    }

    /// POST with no body and no interesting response, e.g. `/logout`.
    pub(crate) async fn post_empty(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<(), ClientError> {
        self.send(self.request(Method::POST, path, token), token.is_some())
            .await?;
        Ok(())
    }

    pub(crate) async fn patch_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T, ClientError> {
        let resp = self
            .send(
                self.request(Method::PATCH, path, token).json(body),
                token.is_some(),
            )
            .await?;
        Self::parse_json(resp).await
    }

    pub(crate) async fn delete(&self, path: &str, token: Option<&str>) -> Result<(), ClientError> {
        self.send(self.request(Method::DELETE, path, token), token.is_some())
            .await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.request(method, url);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn send(
        &self,
        req: RequestBuilder,
        authorized: bool,
    ) -> Result<reqwest::Response, ClientError> {
        let resp = req
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        if authorized && (status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN) {
            tracing::warn!("Server rejected bearer credential with {}", status);
            return Err(ClientError::AuthorizationExpired);
        }

        let message = Self::error_message(resp).await;
        Err(ClientError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
        resp.json()
            .await
            .map_err(|e| ClientError::Network(format!("invalid response body: {}", e)))
    }

    /// Pulls a human-readable reason out of an error response, preferring the
    /// server's `{"message": ...}` convention over the raw body.
    async fn error_message(resp: reqwest::Response) -> String {
        let status = resp.status();
        match resp.text().await {
            Ok(body) if !body.is_empty() => serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| {
                    v.get("message")
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                })
                .unwrap_or(body),
            _ => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        }
    }
}
