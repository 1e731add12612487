//! Client for the model-serving API the console fronts.
//!
//! Every call forwards the caller's bearer token untouched; the console holds
//! no credentials of its own for the upstream. Failures keep the upstream
//! status and body so the API layer can surface them.

use anyhow::{Context, Result};
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use utoipa::ToSchema;

use crate::APP_USER_AGENT;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Assistant definition as the upstream stores it. `tools` is a single
/// comma-joined string on the wire, not a list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AssistantConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub system_prompt: String,
    #[serde(default)]
    pub tools: String,
    #[serde(default)]
    pub index_retrievers: Vec<String>,
    #[serde(default)]
    pub temp: f64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(rename = "employeeID", default)]
    pub employee_id: String,
    #[serde(default)]
    pub input_variables: Vec<String>,
    #[serde(default)]
    pub optional_variables: Vec<String>,
}

impl AssistantConfig {
    /// Field checks applied before an upsert leaves the console. Collects
    /// every problem instead of stopping at the first one.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();

        if !Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").is_ok_and(|re| re.is_match(&self.id)) {
            problems.push("id must start with an alphanumeric and contain only alphanumerics, dots, underscores or dashes".to_string());
        }

        if self.name.trim().is_empty() {
            problems.push("name must not be empty".to_string());
        }

        if self.system_prompt.trim().is_empty() {
            problems.push("system_prompt must not be empty".to_string());
        }

        if !(0.0..=2.0).contains(&self.temp) {
            problems.push("temp must be between 0.0 and 2.0".to_string());
        }

        if !self.employee_id.is_empty()
            && !Regex::new(r"^\d+$").is_ok_and(|re| re.is_match(&self.employee_id))
        {
            problems.push("employeeID must contain only digits".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Upstream returned {status}: {message}")]
    Rejected { status: StatusCode, message: String },
    #[error("Upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(base_url: String) -> Result<Self> {
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("Failed to build upstream HTTP client")?;

        Ok(Self { http, base_url })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }

    pub async fn list_assistants(&self, access_token: &str) -> Result<Vec<String>, UpstreamError> {
        self.get_json("assistants", &[], access_token).await
    }

    pub async fn assistant(&self, access_token: &str, name: &str) -> Result<Value, UpstreamError> {
        self.get_json("assistant", &[("name", name)], access_token)
            .await
    }

    pub async fn upsert_assistant(
        &self,
        access_token: &str,
        config: &AssistantConfig,
    ) -> Result<Value, UpstreamError> {
        let response = self
            .http
            .post(self.endpoint("assistants"))
            .bearer_auth(access_token)
            .json(config)
            .send()
            .await?;

        Self::parse(response).await
    }

    pub async fn list_tools(&self, access_token: &str) -> Result<Vec<String>, UpstreamError> {
        self.get_json("tools", &[], access_token).await
    }

    /// Indexes arrive as `[name, description]` pairs.
    pub async fn list_indexes(
        &self,
        access_token: &str,
    ) -> Result<Vec<(String, String)>, UpstreamError> {
        self.get_json("indexes", &[], access_token).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        access_token: &str,
    ) -> Result<T, UpstreamError> {
        let response = self
            .http
            .get(self.endpoint(path))
            .query(query)
            .bearer_auth(access_token)
            .send()
            .await?;

        Self::parse(response).await
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, UpstreamError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Rejected { status, message });
        }

        Ok(response.json().await?)
    }
}
