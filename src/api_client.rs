use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::config::ApiConfig;
use crate::filter::FilterValues;
use crate::table::{PaginationMetadata, SortState};

/// Monitoring snapshot families exposed by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotKind {
    Health,
    Metrics,
    Queue,
    Database,
    Application,
}

impl SnapshotKind {
    pub const ALL: [SnapshotKind; 5] = [
        SnapshotKind::Health,
        SnapshotKind::Metrics,
        SnapshotKind::Queue,
        SnapshotKind::Database,
        SnapshotKind::Application,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            SnapshotKind::Health => "health",
            SnapshotKind::Metrics => "metrics",
            SnapshotKind::Queue => "queue/stats",
            SnapshotKind::Database => "database/stats",
            SnapshotKind::Application => "application/stats",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SnapshotKind::Health => "Health",
            SnapshotKind::Metrics => "Metrics",
            SnapshotKind::Queue => "Queue",
            SnapshotKind::Database => "Database",
            SnapshotKind::Application => "Application",
        }
    }
}

/// A JSON snapshot and when it was fetched
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub kind: SnapshotKind,
    pub fetched_at: DateTime<Local>,
    pub body: Value,
}

/// Backend integrations that can be smoke-tested from the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceTest {
    Kcb,
    Sms,
    Email,
}

impl ServiceTest {
    pub fn path(&self) -> &'static str {
        match self {
            ServiceTest::Kcb => "test/kcb",
            ServiceTest::Sms => "test/sms",
            ServiceTest::Email => "test/email",
        }
    }
}

impl fmt::Display for ServiceTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServiceTest::Kcb => "KCB",
            ServiceTest::Sms => "SMS",
            ServiceTest::Email => "Email",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Page request for a list resource.
///
/// The console's own query convention; the table core knows nothing of it.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub search: String,
    pub filters: FilterValues,
    pub sort: SortState,
}

impl ListQuery {
    pub fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit,
            ..Default::default()
        }
    }

    /// Query-string pairs; empty search and unset filters are omitted
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        if !self.search.is_empty() {
            params.push(("search".to_string(), self.search.clone()));
        }
        for (key, value) in &self.filters {
            if !value.is_empty() {
                params.push((key.clone(), value.clone()));
            }
        }
        if let Some(column) = self.sort.column() {
            params.push(("sortBy".to_string(), column.to_string()));
            params.push((
                "sortOrder".to_string(),
                self.sort.direction().as_str().to_string(),
            ));
        }
        params
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse {
    pub data: Vec<Value>,
    pub pagination: Option<PaginationMetadata>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(response: Response, what: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        warn!(target: "api", "{} failed: {} {}", what, status, body);
        Err(anyhow!("API error ({}) for {}: {}", status, what, body))
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T> {
        let url = self.url(path);
        debug!(target: "api", "GET {} {:?}", url, params);
        let response = self
            .authorize(self.client.get(&url).query(params))
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;
        let response = Self::check(response, path).await?;
        response
            .json()
            .await
            .with_context(|| format!("Invalid JSON from {}", url))
    }

    async fn post_action(&self, path: &str) -> Result<ActionResult> {
        let url = self.url(path);
        debug!(target: "api", "POST {}", url);
        let response = self
            .authorize(self.client.post(&url))
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;
        let response = Self::check(response, path).await?;

        // Some actions answer with an empty body
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(ActionResult {
                success: true,
                message: String::new(),
            });
        }
        serde_json::from_str(&text).with_context(|| format!("Invalid JSON from {}", url))
    }

    pub async fn snapshot(&self, kind: SnapshotKind) -> Result<Snapshot> {
        let body: Value = self.get_json(kind.path(), &[]).await?;
        Ok(Snapshot {
            kind,
            fetched_at: Local::now(),
            body,
        })
    }

    pub async fn clear_cache(&self) -> Result<ActionResult> {
        self.post_action("cache/clear").await
    }

    pub async fn test_service(&self, service: ServiceTest) -> Result<ActionResult> {
        self.post_action(service.path()).await
    }

    /// Fetch one page of a list resource
    pub async fn list(&self, resource: &str, query: &ListQuery) -> Result<ListResponse> {
        let response: ListResponse = self.get_json(resource, &query.to_params()).await?;
        if let Some(meta) = &response.pagination {
            meta.validate()
                .with_context(|| format!("Backend sent bad pagination for {}", resource))?;
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_params_skip_empty_values() {
        let mut query = ListQuery::new(10);
        query.filters.insert("status".into(), "".into());
        query.filters.insert("channel".into(), "mpesa".into());
        let params = query.to_params();
        assert_eq!(
            params,
            vec![
                ("page".to_string(), "1".to_string()),
                ("limit".to_string(), "10".to_string()),
                ("channel".to_string(), "mpesa".to_string()),
            ]
        );
    }

    #[test]
    fn test_list_query_params_carry_sort_and_search() {
        let mut query = ListQuery::new(25);
        query.page = 3;
        query.search = "wanjiru".into();
        query.sort.toggle("amount");
        query.sort.toggle("amount");
        let params = query.to_params();
        assert!(params.contains(&("search".to_string(), "wanjiru".to_string())));
        assert!(params.contains(&("sortBy".to_string(), "amount".to_string())));
        assert!(params.contains(&("sortOrder".to_string(), "desc".to_string())));
    }

    #[test]
    fn test_url_joining() {
        let config = ApiConfig {
            base_url: "http://host/api/admin/".into(),
            ..Default::default()
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.url("/cache/clear"), "http://host/api/admin/cache/clear");
    }

    #[test]
    fn test_list_response_parses() {
        let body = r#"{"data":[{"id":"1"}],"pagination":{"total":25,"page":1,"limit":10,"pages":3}}"#;
        let parsed: ListResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.data.len(), 1);
        assert_eq!(parsed.pagination.unwrap().pages, 3);
    }
}
