//! Review API adapter (reqwest).
//!
//! Implements the `hwb-core` ReviewApi port over the Practicum
//! `homework_statuses` endpoint.

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, StatusCode};

use hwb_core::{
    config::Config, domain::Cursor, errors::Error, ports::ReviewApi, RequestError, Result,
};

#[derive(Clone, Debug)]
pub struct PracticumClient {
    endpoint: String,
    token: String,
    http: reqwest::Client,
}

impl PracticumClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(cfg.http_timeout)
            .build()
            .map_err(|e| Error::Config(format!("http client build failed: {e}")))?;
        Ok(Self {
            endpoint: cfg.endpoint.clone(),
            token: cfg.practicum_token.clone(),
            http,
        })
    }

    fn transport_error(&self, from_date: Cursor, e: impl std::fmt::Display) -> Error {
        RequestError::Transport {
            endpoint: self.endpoint.clone(),
            from_date: from_date.0,
            reason: e.to_string(),
        }
        .into()
    }
}

#[async_trait]
impl ReviewApi for PracticumClient {
    async fn fetch(&self, from_date: Cursor) -> Result<serde_json::Value> {
        tracing::debug!(endpoint = %self.endpoint, from_date = from_date.0, "GET homework statuses");

        let resp = self
            .http
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date.0)])
            .send()
            .await
            .map_err(|e| self.transport_error(from_date, e))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(RequestError::Status {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            }
            .into());
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| self.transport_error(from_date, format!("invalid JSON body: {e}")))?;

        tracing::debug!(endpoint = %self.endpoint, from_date = from_date.0, "GET homework statuses -> 200");
        Ok(body)
    }
}
