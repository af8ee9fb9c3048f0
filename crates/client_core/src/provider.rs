//! Catalog API seam: the provider trait, the HTTP implementation, and a
//! null object used until a real provider is attached.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use shared::domain::SetId;
use shared::protocol::{
    ApiErrorBody, CardPageResponse, CardSearchResponse, CardSummary, SetListResponse, SetSummary,
};

use crate::config::Settings;
use crate::state::PAGE_SIZE;

const API_KEY_HEADER: &str = "X-Api-Key";

/// One page of a set's card listing, along with the server-side total used
/// to recompute the page count.
#[derive(Debug, Clone)]
pub struct CardPage {
    pub cards: Vec<CardSummary>,
    pub total_count: u64,
}

#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn list_sets(&self) -> Result<Vec<SetSummary>>;
    async fn list_set_cards(&self, set_id: &SetId, page: u32) -> Result<CardPage>;
    async fn search_cards(&self, term: &str) -> Result<Vec<CardSummary>>;
}

pub struct MissingCatalogProvider;

#[async_trait]
impl CatalogProvider for MissingCatalogProvider {
    async fn list_sets(&self) -> Result<Vec<SetSummary>> {
        Err(anyhow!("catalog provider is unavailable"))
    }

    async fn list_set_cards(&self, set_id: &SetId, _page: u32) -> Result<CardPage> {
        Err(anyhow!("catalog provider is unavailable for set {set_id}"))
    }

    async fn search_cards(&self, _term: &str) -> Result<Vec<CardSummary>> {
        Err(anyhow!("catalog provider is unavailable"))
    }
}

#[derive(Serialize)]
struct CardPageQuery {
    q: String,
    page: u32,
    #[serde(rename = "pageSize")]
    page_size: u32,
}

/// Read-only client of the upstream catalog API. The API key, when
/// configured, rides along as a default header on every request.
pub struct HttpCatalogProvider {
    http: Client,
    base_url: Url,
}

impl HttpCatalogProvider {
    pub fn new(settings: &Settings) -> Result<Self> {
        let base_url = Url::parse(settings.api_base_url.trim_end_matches('/'))
            .with_context(|| format!("invalid catalog base url '{}'", settings.api_base_url))?;

        let mut headers = HeaderMap::new();
        if let Some(api_key) = &settings.api_key {
            let mut value = HeaderValue::from_str(api_key)
                .context("configured API key is not a valid header value")?;
            value.set_sensitive(true);
            headers.insert(API_KEY_HEADER, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .build()
            .context("failed to build catalog http client")?;

        Ok(Self { http, base_url })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.as_str().trim_end_matches('/'))
    }
}

/// Decode a catalog response, surfacing the provider's error envelope on a
/// non-2xx status. No retries; a failure stands for this request cycle.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            });
        return Err(anyhow!(
            "catalog request failed with status {}: {detail}",
            status.as_u16()
        ));
    }

    response
        .json()
        .await
        .context("invalid catalog response payload")
}

#[async_trait]
impl CatalogProvider for HttpCatalogProvider {
    async fn list_sets(&self) -> Result<Vec<SetSummary>> {
        let response = self.http.get(self.endpoint("sets")).send().await?;
        let body: SetListResponse = read_json(response).await?;
        Ok(body.data)
    }

    async fn list_set_cards(&self, set_id: &SetId, page: u32) -> Result<CardPage> {
        let response = self
            .http
            .get(self.endpoint("cards"))
            .query(&CardPageQuery {
                q: format!("set.id:{set_id}"),
                page,
                page_size: PAGE_SIZE,
            })
            .send()
            .await?;
        let body: CardPageResponse = read_json(response).await?;
        Ok(CardPage {
            cards: body.data,
            total_count: body.total_count,
        })
    }

    async fn search_cards(&self, term: &str) -> Result<Vec<CardSummary>> {
        let response = self
            .http
            .get(self.endpoint("cards"))
            .query(&[("q", format!("name:*{term}*"))])
            .send()
            .await?;
        let body: CardSearchResponse = read_json(response).await?;
        Ok(body.data)
    }
}

#[cfg(test)]
#[path = "tests/provider_tests.rs"]
mod tests;
