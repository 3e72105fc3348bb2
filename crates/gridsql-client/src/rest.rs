//! REST implementation of [`RecordStore`].
//!
//! Speaks the Airtable-compatible surface: `/v0/meta/bases` (paginated),
//! `/v0/meta/bases/{base}/tables`, and `/v0/{base}/{table}?offset=…`, all
//! under bearer authentication.

use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use gridsql_commons::{BaseId, BaseInfo, RecordPage, TableId, TableSchema};

use crate::error::ClientError;
use crate::RecordStore;

/// HTTP client for the upstream record store.
pub struct RestClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct BasesResponse {
    #[serde(default)]
    bases: Vec<BaseInfo>,
    #[serde(default)]
    offset: String,
}

#[derive(Debug, Deserialize)]
struct TablesResponse {
    #[serde(default)]
    tables: Vec<TableSchema>,
}

impl RestClient {
    /// Create a client for `api_url` (no trailing slash) with a bearer token.
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        debug!("GET {}", url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl RecordStore for RestClient {
    async fn list_bases(&self) -> Result<Vec<BaseInfo>, ClientError> {
        // The meta listing is itself paginated.
        let mut bases = Vec::new();
        let mut offset = String::new();
        loop {
            let query: Vec<(&str, &str)> = if offset.is_empty() {
                Vec::new()
            } else {
                vec![("offset", offset.as_str())]
            };
            let page: BasesResponse = self
                .get_json(format!("{}/v0/meta/bases", self.api_url), &query)
                .await?;
            bases.extend(page.bases);
            if page.offset.is_empty() {
                break;
            }
            offset = page.offset;
        }
        debug!("listed {} bases", bases.len());
        Ok(bases)
    }

    async fn base_schema(&self, base: &BaseId) -> Result<Vec<TableSchema>, ClientError> {
        let response: TablesResponse = self
            .get_json(
                format!("{}/v0/meta/bases/{}/tables", self.api_url, base),
                &[],
            )
            .await?;
        Ok(response.tables)
    }

    async fn list_records(
        &self,
        base: &BaseId,
        table: &TableId,
        cursor: Option<&str>,
    ) -> Result<RecordPage, ClientError> {
        let query: Vec<(&str, &str)> = match cursor {
            Some(cursor) => vec![("offset", cursor)],
            None => Vec::new(),
        };
        self.get_json(
            format!("{}/v0/{}/{}", self.api_url, base, table),
            &query,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash_from_api_url() {
        let client = RestClient::new("https://api.example.com/", "key");
        assert_eq!(client.api_url, "https://api.example.com");
    }

    #[test]
    fn decodes_a_bases_listing_page() {
        let body = serde_json::json!({
            "bases": [{"id": "app01", "name": "Game Journal"}],
            "offset": "next"
        });
        let page: BasesResponse = serde_json::from_value(body).unwrap();
        assert_eq!(page.bases.len(), 1);
        assert_eq!(page.offset, "next");

        let last: BasesResponse =
            serde_json::from_value(serde_json::json!({"bases": []})).unwrap();
        assert!(last.offset.is_empty());
    }
}
