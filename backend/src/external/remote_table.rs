//! Hosted table client for weather rows
//!
//! Talks to a PostgREST-style endpoint (`{url}/rest/v1/{table}`) with the
//! project API key sent as both `apikey` and bearer token.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use shared::{DateRange, NewWeatherRecord, RecordId, WeatherRecord, WeatherRecordPatch};
use thiserror::Error;

/// Connection settings for the hosted table
#[derive(Clone)]
pub struct RemoteTableConfig {
    pub base_url: String,
    pub api_key: String,
    pub table: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for RemoteTableConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteTableConfig")
            .field("base_url", &self.base_url)
            .field("table", &self.table)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Remote request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Remote table error: {status} - {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to parse remote response: {0}")]
    Decode(String),

    #[error("Remote table returned no row")]
    EmptyResponse,
}

/// Row sent on insert; the table assigns the id
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertRow<'a> {
    #[serde(flatten)]
    record: &'a NewWeatherRecord,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PatchRow<'a> {
    #[serde(flatten)]
    patch: &'a WeatherRecordPatch,
    updated_at: DateTime<Utc>,
}

/// Weather table client
#[derive(Clone)]
pub struct RemoteTableClient {
    client: Client,
    endpoint: String,
    api_key: String,
    table: String,
}

impl RemoteTableClient {
    pub fn new(config: &RemoteTableConfig) -> Result<Self, RemoteError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/rest/v1/{}", config.base_url, config.table),
            api_key: config.api_key.clone(),
            table: config.table.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Every row, most recent date first
    pub async fn list_all(&self) -> Result<Vec<WeatherRecord>, RemoteError> {
        self.send(self.client.get(&self.endpoint).query(&[("order", "date.desc")]))
            .await
    }

    pub async fn find_by_id(&self, id: &RecordId) -> Result<Option<WeatherRecord>, RemoteError> {
        let rows = self
            .send(self.client.get(&self.endpoint).query(&[id_filter(id)]))
            .await?;
        Ok(rows.into_iter().next())
    }

    pub async fn find_by_date(&self, date: NaiveDate) -> Result<Option<WeatherRecord>, RemoteError> {
        let rows = self
            .send(
                self.client
                    .get(&self.endpoint)
                    .query(&[("date", format!("eq.{}", date))]),
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Rows inside `range` (both ends inclusive), most recent first
    pub async fn list_range(&self, range: DateRange) -> Result<Vec<WeatherRecord>, RemoteError> {
        self.send(self.client.get(&self.endpoint).query(&range_query(range)))
            .await
    }

    pub async fn insert(
        &self,
        record: &NewWeatherRecord,
        now: DateTime<Utc>,
    ) -> Result<WeatherRecord, RemoteError> {
        let row = InsertRow {
            record,
            created_at: now,
            updated_at: now,
        };
        let rows = self
            .send(self.client.post(&self.endpoint).json(&[row]))
            .await?;
        rows.into_iter().next().ok_or(RemoteError::EmptyResponse)
    }

    /// `None` when no row has `id`
    pub async fn update(
        &self,
        id: &RecordId,
        patch: &WeatherRecordPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<WeatherRecord>, RemoteError> {
        let row = PatchRow {
            patch,
            updated_at: now,
        };
        let rows = self
            .send(
                self.client
                    .patch(&self.endpoint)
                    .query(&[id_filter(id)])
                    .json(&row),
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    /// `true` when the table reports a deleted row
    pub async fn delete(&self, id: &RecordId) -> Result<bool, RemoteError> {
        let rows = self
            .send(self.client.delete(&self.endpoint).query(&[id_filter(id)]))
            .await?;
        Ok(!rows.is_empty())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Vec<WeatherRecord>, RemoteError> {
        let response = request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status { status, body });
        }

        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&body).map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

fn id_filter(id: &RecordId) -> (&'static str, String) {
    ("id", format!("eq.{}", id))
}

fn range_query(range: DateRange) -> [(&'static str, String); 3] {
    [
        ("date", format!("gte.{}", range.start)),
        ("date", format!("lte.{}", range.end)),
        ("order", "date.desc".to_string()),
    ]
}
