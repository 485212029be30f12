//! HTTP client for the remote statistics API.
//!
//! Pagination strategy:
//!
//! 1. Request page 1 with the configured page-size hint.
//! 2. If the response spans more than one page, re-request once with
//!    `per_page` set to the reported total, which normally returns
//!    everything in a single page.
//! 3. If the server still splits the result (it caps page sizes), walk the
//!    remaining pages, up to `remote.max_pages`.
//!
//! There are no other retries. Every request carries the configured timeout.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, info, warn};

use indicator_core::remote::{normalize_rows, parse_page, IndicatorDataset, IndicatorSource, Page};
use indicator_core::{Error, Result};

use crate::config::RemoteConfig;

/// [`IndicatorSource`] backed by the remote API over HTTP.
pub struct HttpIndicatorSource {
    client: reqwest::Client,
    base_url: String,
    date_range: String,
    per_page: u64,
    max_pages: u32,
}

impl HttpIndicatorSource {
    pub fn new(config: &RemoteConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            date_range: config.date_range.clone(),
            per_page: config.per_page,
            max_pages: config.max_pages,
        })
    }

    /// `<base>/countries/all/indicators/<id>?date=..&format=json&per_page=..[&page=..]`
    fn indicator_url(&self, indicator_id: &str, per_page: u64, page: Option<u32>) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| Error::Network {
            url: self.base_url.clone(),
            message: e.to_string(),
        })?;

        url.path_segments_mut()
            .map_err(|_| Error::Network {
                url: self.base_url.clone(),
                message: "base URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(["countries", "all", "indicators", indicator_id]);

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("date", &self.date_range)
                .append_pair("format", "json")
                .append_pair("per_page", &per_page.to_string());
            if let Some(page) = page {
                query.append_pair("page", &page.to_string());
            }
        }

        Ok(url)
    }

    async fn get_page(&self, url: Url) -> Result<Page> {
        debug!(%url, "requesting indicator page");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::Network {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::RemoteFetch {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body: Value = response.json().await.map_err(|e| {
            Error::MalformedRemoteData(format!("response from {} is not JSON: {}", url, e))
        })?;

        parse_page(body)
    }
}

#[async_trait]
impl IndicatorSource for HttpIndicatorSource {
    async fn fetch(&self, indicator_id: &str) -> Result<IndicatorDataset> {
        let first = self
            .get_page(self.indicator_url(indicator_id, self.per_page, None)?)
            .await?;

        if first.info.pages == 1 || first.info.total == 0 {
            return normalize_rows(&first.rows);
        }

        info!(
            indicator_id,
            pages = first.info.pages,
            total = first.info.total,
            "result spans several pages, re-requesting at full size"
        );
        let total = first.info.total;
        let resized = self
            .get_page(self.indicator_url(indicator_id, total, None)?)
            .await?;

        let pages = resized.info.pages;
        let mut rows = resized.rows;
        if pages > 1 {
            let last = pages.min(self.max_pages);
            if last < pages {
                warn!(
                    indicator_id,
                    pages,
                    max_pages = self.max_pages,
                    "truncating paged fetch at max_pages"
                );
            }
            for page in 2..=last {
                let next = self
                    .get_page(self.indicator_url(indicator_id, total, Some(page))?)
                    .await?;
                rows.extend(next.rows);
            }
        }

        normalize_rows(&rows)
    }
}
