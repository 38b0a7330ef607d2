/// Record store HTTP client implementation.
///
/// This module provides `StoreClient` for making synchronous HTTP requests to a
/// PostgREST-compatible record store, along with error types and a builder for
/// configuration.
use std::time::Duration;

use reqwest::blocking::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use super::RecordQuery;
use crate::models::{Record, TopicRow};

/// Number of records fetched per listing when nothing else is configured.
pub const DEFAULT_FETCH_LIMIT: usize = 200;

const DEFAULT_RECORDS_TABLE: &str = "prasangs";
const DEFAULT_TOPICS_TABLE: &str = "prasang_topics";
const RECORD_COLUMNS: &str = "id,text,notes,topics,event_date,created_at";

/// Errors that can occur when reading from the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request or response timeout errors
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// Non-success HTTP status, with whatever body the store sent back
    #[error("HTTP error: status {status}: {message}")]
    Http { status: u16, message: String },

    /// Response body was not the JSON shape we expected
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A required setting was neither passed nor found in the environment
    #[error("Missing configuration: {0}")]
    MissingConfig(String),
}

impl StoreError {
    /// Returns `true` for errors caused by how the user configured the client.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidUrl(_) | Self::MissingConfig(_))
    }

    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error)
        } else {
            Self::Network(error)
        }
    }
}

/// Read operations the browser needs from a record store.
///
/// This trait lets the browser and the tests swap the HTTP client for an
/// in-memory fake.
pub trait RecordStore: Send + Sync {
    /// Lists raw topic rows, one per occurrence, in no particular order.
    fn list_topics(&self) -> Result<Vec<TopicRow>, StoreError>;

    /// Lists the most recent records whose text or notes match the query.
    fn list_records(&self, query: &RecordQuery) -> Result<Vec<Record>, StoreError>;
}

/// Builder for constructing `StoreClient` instances.
///
/// # Examples
///
/// ```
/// use prasang::store::StoreClientBuilder;
///
/// let client = StoreClientBuilder::new()
///     .base_url("http://localhost:54321")
///     .api_key("anon-key")
///     .build()
///     .expect("Failed to create client");
///
/// assert_eq!(client.base_url(), "http://localhost:54321");
/// ```
#[derive(Debug, Default)]
pub struct StoreClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    fetch_limit: Option<usize>,
    records_table: Option<String>,
    topics_table: Option<String>,
}

impl StoreClientBuilder {
    /// Creates a new `StoreClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL of the store (e.g. "https://xyz.supabase.co").
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the API key sent with every request.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the maximum number of records fetched per listing.
    pub fn fetch_limit(mut self, limit: usize) -> Self {
        self.fetch_limit = Some(limit);
        self
    }

    /// Overrides the records table name.
    pub fn records_table(mut self, table: impl Into<String>) -> Self {
        self.records_table = Some(table.into());
        self
    }

    /// Overrides the topics table or view name.
    pub fn topics_table(mut self, table: impl Into<String>) -> Self {
        self.topics_table = Some(table.into());
        self
    }

    /// Builds the `StoreClient` with the configured settings.
    ///
    /// # Environment Variables
    ///
    /// Settings not passed to the builder fall back to:
    ///
    /// - `PRASANG_STORE_URL` for the base URL (required)
    /// - `PRASANG_STORE_KEY` for the API key (optional)
    /// - `PRASANG_FETCH_LIMIT` for the fetch limit (defaults to 200)
    ///
    /// # Errors
    ///
    /// Returns `StoreError::MissingConfig` if no base URL is available or the
    /// fetch limit is not a positive number, `StoreError::InvalidUrl` if the
    /// URL does not parse, and `StoreError::Network` if the HTTP client cannot
    /// be created.
    pub fn build(self) -> Result<StoreClient, StoreError> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => std::env::var("PRASANG_STORE_URL").map_err(|_| {
                StoreError::MissingConfig(
                    "store URL not set (use --url or PRASANG_STORE_URL)".to_string(),
                )
            })?,
        };
        let base_url = base_url.trim_end_matches('/').to_string();

        reqwest::Url::parse(&base_url)
            .map_err(|e| StoreError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let api_key = self
            .api_key
            .or_else(|| std::env::var("PRASANG_STORE_KEY").ok())
            .filter(|key| !key.is_empty());

        let fetch_limit = match self.fetch_limit {
            Some(limit) => limit,
            None => match std::env::var("PRASANG_FETCH_LIMIT") {
                Ok(raw) => raw.trim().parse().map_err(|_| {
                    StoreError::MissingConfig(format!(
                        "PRASANG_FETCH_LIMIT is not a number: {raw}"
                    ))
                })?,
                Err(_) => DEFAULT_FETCH_LIMIT,
            },
        };
        if fetch_limit == 0 {
            return Err(StoreError::MissingConfig(
                "fetch limit must be at least 1".to_string(),
            ));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(StoreError::Network)?;

        Ok(StoreClient {
            client,
            base_url,
            api_key,
            fetch_limit,
            records_table: self
                .records_table
                .unwrap_or_else(|| DEFAULT_RECORDS_TABLE.to_string()),
            topics_table: self
                .topics_table
                .unwrap_or_else(|| DEFAULT_TOPICS_TABLE.to_string()),
        })
    }
}

/// Synchronous HTTP client for a PostgREST-compatible record store.
///
/// Construct it with `StoreClientBuilder`. A failed request is reported once;
/// the client never retries on its own.
pub struct StoreClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: Option<String>,
    fetch_limit: usize,
    records_table: String,
    topics_table: String,
}

impl StoreClient {
    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the maximum number of records fetched per listing.
    pub fn fetch_limit(&self) -> usize {
        self.fetch_limit
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("apikey", key).bearer_auth(key),
            None => request,
        }
    }

    fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, StoreError> {
        let response = self
            .authorize(request)
            .header("Accept", "application/json")
            .send()
            .map_err(StoreError::from_reqwest)?;

        let response = check_status(response)?;
        let body = response.text().map_err(StoreError::from_reqwest)?;
        serde_json::from_str(&body).map_err(StoreError::Serialization)
    }
}

/// Turns non-2xx responses into `StoreError::Http`, keeping the body for context.
fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .ok()
        .filter(|body| !body.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string()
        });
    Err(StoreError::Http {
        status: status.as_u16(),
        message,
    })
}

impl RecordStore for StoreClient {
    fn list_topics(&self) -> Result<Vec<TopicRow>, StoreError> {
        let url = self.table_url(&self.topics_table);
        debug!(url = %url, "listing topics");

        let request = self.client.get(&url).query(&[("select", "topic")]);
        let rows: Vec<TopicRow> = self.send_json(request).inspect_err(|e| {
            warn!(error = %e, "topic listing failed");
        })?;

        debug!(count = rows.len(), "topic rows received");
        Ok(rows)
    }

    fn list_records(&self, query: &RecordQuery) -> Result<Vec<Record>, StoreError> {
        let url = self.table_url(&self.records_table);
        let limit = self.fetch_limit.to_string();
        debug!(url = %url, search = ?query.search_text(), limit = self.fetch_limit, "listing records");

        let mut params: Vec<(&str, String)> = vec![
            ("select", RECORD_COLUMNS.to_string()),
            ("order", "created_at.desc".to_string()),
            ("limit", limit),
        ];
        if let Some(filter) = query.or_filter() {
            params.push(("or", filter));
        }

        let request = self.client.get(&url).query(&params);
        let records: Vec<Record> = self.send_json(request).inspect_err(|e| {
            warn!(error = %e, "record listing failed");
        })?;

        debug!(count = records.len(), "records received");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::error::Error;

    fn clear_env() {
        unsafe {
            std::env::remove_var("PRASANG_STORE_URL");
            std::env::remove_var("PRASANG_STORE_KEY");
            std::env::remove_var("PRASANG_FETCH_LIMIT");
        }
    }

    #[test]
    fn network_error_variant_display() {
        let client = reqwest::blocking::Client::new();
        let reqwest_error = client.get("not-a-valid-url").build().unwrap_err();
        let error = StoreError::Network(reqwest_error);

        assert!(error.to_string().contains("Network error"));
        assert!(error.source().is_some());
    }

    #[test]
    fn http_error_includes_status_and_message() {
        let error = StoreError::Http {
            status: 404,
            message: "relation \"prasangs\" does not exist".to_string(),
        };

        let msg = error.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("does not exist"));
    }

    #[test]
    fn serialization_error_chains_source() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error = StoreError::Serialization(json_error);

        assert!(error.to_string().contains("Serialization error"));
        assert!(error.source().is_some());
    }

    #[test]
    fn config_errors_are_flagged() {
        assert!(StoreError::InvalidUrl("x".to_string()).is_config_error());
        assert!(StoreError::MissingConfig("x".to_string()).is_config_error());
        assert!(
            !StoreError::Http {
                status: 500,
                message: String::new()
            }
            .is_config_error()
        );
    }

    #[test]
    fn builder_new_has_no_settings() {
        let builder = StoreClientBuilder::new();
        assert!(builder.base_url.is_none());
        assert!(builder.api_key.is_none());
        assert!(builder.fetch_limit.is_none());
    }

    #[test]
    #[serial]
    fn build_fails_without_url() {
        clear_env();

        let result = StoreClientBuilder::new().build();
        assert!(matches!(result, Err(StoreError::MissingConfig(_))));
    }

    #[test]
    #[serial]
    fn build_reads_url_and_limit_from_environment() {
        clear_env();
        unsafe {
            std::env::set_var("PRASANG_STORE_URL", "http://store.local:54321/");
            std::env::set_var("PRASANG_FETCH_LIMIT", "50");
        }

        let client = StoreClientBuilder::new().build().unwrap();
        assert_eq!(client.base_url(), "http://store.local:54321");
        assert_eq!(client.fetch_limit(), 50);

        clear_env();
    }

    #[test]
    #[serial]
    fn builder_values_override_environment() {
        clear_env();
        unsafe {
            std::env::set_var("PRASANG_STORE_URL", "http://from-env:1");
            std::env::set_var("PRASANG_FETCH_LIMIT", "50");
        }

        let client = StoreClientBuilder::new()
            .base_url("http://from-flag:2")
            .fetch_limit(10)
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://from-flag:2");
        assert_eq!(client.fetch_limit(), 10);

        clear_env();
    }

    #[test]
    #[serial]
    fn build_uses_default_limit() {
        clear_env();

        let client = StoreClientBuilder::new()
            .base_url("http://localhost:54321")
            .build()
            .unwrap();
        assert_eq!(client.fetch_limit(), DEFAULT_FETCH_LIMIT);
    }

    #[test]
    #[serial]
    fn build_rejects_bad_limit() {
        clear_env();
        unsafe {
            std::env::set_var("PRASANG_FETCH_LIMIT", "lots");
        }

        let result = StoreClientBuilder::new()
            .base_url("http://localhost:54321")
            .build();
        assert!(matches!(result, Err(StoreError::MissingConfig(_))));

        let result = StoreClientBuilder::new()
            .base_url("http://localhost:54321")
            .fetch_limit(0)
            .build();
        assert!(matches!(result, Err(StoreError::MissingConfig(_))));

        clear_env();
    }

    #[test]
    #[serial]
    fn build_returns_error_if_invalid_url_provided() {
        let result = StoreClientBuilder::new()
            .base_url("not-a-valid-url")
            .build();
        assert!(matches!(result, Err(StoreError::InvalidUrl(_))));
    }

    #[test]
    #[serial]
    fn table_urls_use_rest_prefix() {
        clear_env();

        let client = StoreClientBuilder::new()
            .base_url("http://localhost:54321")
            .records_table("stories")
            .build()
            .unwrap();

        assert_eq!(
            client.table_url(&client.records_table),
            "http://localhost:54321/rest/v1/stories"
        );
        assert_eq!(
            client.table_url(&client.topics_table),
            "http://localhost:54321/rest/v1/prasang_topics"
        );
    }
}
