//! HTTP query engine for ClickHouse-compatible endpoints
//!
//! Statements are POSTed as the request body. Result sets are requested in
//! the `JSON` output format and mapped onto [`QueryResult`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::config::EngineSection;
use super::{DatabaseError, DatabaseResult, QueryEngine, QueryResult};

#[derive(Debug, Deserialize)]
struct JsonResponse {
    #[serde(default)]
    meta: Vec<JsonColumn>,
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct JsonColumn {
    name: String,
}

/// Query engine speaking the ClickHouse HTTP interface
pub struct HttpQueryEngine {
    client: Client,
    url: String,
    user: String,
    password: Option<String>,
    database: String,
}

impl HttpQueryEngine {
    /// Create an engine from the `[engine]` configuration section
    pub fn new(config: &EngineSection) -> DatabaseResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                DatabaseError::ConnectionFailed(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            url: config.url.trim_end_matches('/').to_string(),
            user: config.user.clone(),
            password: config.password.clone(),
            database: config.database.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl QueryEngine for HttpQueryEngine {
    async fn execute(&self, sql: &str) -> DatabaseResult<QueryResult> {
        let started = Instant::now();
        let mut request = self
            .client
            .post(&self.url)
            .query(&[("database", self.database.as_str()), ("default_format", "JSON")])
            .header("X-ClickHouse-User", &self.user)
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(sql.to_string());
        if let Some(password) = &self.password {
            request = request.header("X-ClickHouse-Key", password);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(format!("{}: {}", self.url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| {
                DatabaseError::ConnectionFailed(format!("Failed to read response: {}", e))
            })?;

        if !status.is_success() {
            let message = body.trim();
            return Err(DatabaseError::QueryFailed(if message.is_empty() {
                format!("HTTP {}", status)
            } else {
                message.to_string()
            }));
        }

        let mut result = parse_response(&body)?;
        result.execution_time_ms = started.elapsed().as_millis() as u64;
        debug!(
            "Executed statement ({} bytes) in {}ms, {} rows returned",
            sql.len(),
            result.execution_time_ms,
            result.row_count()
        );
        Ok(result)
    }

    fn engine_type(&self) -> &'static str {
        "clickhouse-http"
    }
}

/// Map a response body onto a result set. Statements without output (DDL,
/// INSERT) return an empty body.
fn parse_response(body: &str) -> DatabaseResult<QueryResult> {
    if body.trim().is_empty() {
        return Ok(QueryResult::empty());
    }
    let response: JsonResponse = serde_json::from_str(body).map_err(|e| {
        DatabaseError::SerializationError(format!("Failed to parse engine response: {}", e))
    })?;
    Ok(QueryResult::new(
        response.meta.into_iter().map(|c| c.name).collect(),
        response.data,
    ))
}
