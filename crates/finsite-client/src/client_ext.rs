use crate::www::{self, IndicatorQuery};
use anyhow::Result;
use finsite_core::model::{Company, Fundamental, IndicatorBundle, PriceSnapshot, SeriesItem};
use finsite_core::PriceSource;
use reqwest::header::CACHE_CONTROL;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::future::Future;
use tracing::{debug, trace};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{what} fetch failed: {status}")]
    Status { what: &'static str, status: StatusCode },
}

impl FetchError {
    pub fn status(&self) -> StatusCode {
        match self {
            FetchError::Status { status, .. } => *status,
        }
    }
}

/// Backend endpoints as add-on methods for [`reqwest::Client`].
///
/// Every request is an uncached GET; a non-2xx status is an error ([`FetchError`]).
///
/// [`reqwest::Client`]: https://docs.rs/reqwest/latest/reqwest/struct.Client.html
pub trait BackendExt {
    fn get_json<T>(
        &self,
        what: &'static str,
        url: Url,
    ) -> impl Future<Output = Result<T>> + Send
    where
        T: DeserializeOwned + Send;

    fn fetch_fundamental(&self, url: Url) -> impl Future<Output = Result<Fundamental>> + Send;

    fn fetch_price(
        &self,
        base: &str,
        ticker: &str,
    ) -> impl Future<Output = Result<PriceSnapshot>> + Send;

    fn fetch_series(
        &self,
        base: &str,
        ticker: &str,
        from: &str,
        to: &str,
    ) -> impl Future<Output = Result<Vec<SeriesItem>>> + Send;

    fn fetch_indicators(
        &self,
        base: &str,
        ticker: &str,
        query: &IndicatorQuery,
    ) -> impl Future<Output = Result<IndicatorBundle>> + Send;

    fn fetch_companies(&self, base: &str) -> impl Future<Output = Result<Vec<Company>>> + Send;
}

impl BackendExt for Client {
    async fn get_json<T>(&self, what: &'static str, url: Url) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        let time = std::time::Instant::now();
        trace!("GET {url}");
        let response = self
            .get(url.clone())
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!("GET {url} -> {status}");
            return Err(FetchError::Status { what, status }.into());
        }

        let data = response.json::<T>().await?;
        debug!("GET {url} -> {status}. Elapsed time: {} ms", time.elapsed().as_millis());
        Ok(data)
    }

    /// Fundamentals come either from the backend or from the mock endpoint, so the
    /// caller picks the URL.
    async fn fetch_fundamental(&self, url: Url) -> Result<Fundamental> {
        self.get_json("fundamental", url).await
    }

    async fn fetch_price(&self, base: &str, ticker: &str) -> Result<PriceSnapshot> {
        self.get_json("price", www::price_url(base, ticker)?).await
    }

    async fn fetch_series(
        &self,
        base: &str,
        ticker: &str,
        from: &str,
        to: &str,
    ) -> Result<Vec<SeriesItem>> {
        self.get_json("series", www::series_url(base, ticker, from, to)?)
            .await
    }

    async fn fetch_indicators(
        &self,
        base: &str,
        ticker: &str,
        query: &IndicatorQuery,
    ) -> Result<IndicatorBundle> {
        self.get_json("indicators", query.url(base, ticker)?).await
    }

    async fn fetch_companies(&self, base: &str) -> Result<Vec<Company>> {
        self.get_json("companies", www::companies_url(base, www::COMPANY_LIMIT)?)
            .await
    }
}

/// A client bound to one backend; feeds the realtime price card.
#[derive(Debug, Clone)]
pub struct Backend {
    client: Client,
    base: String,
}

impl Backend {
    pub fn new(client: Client, base: impl Into<String>) -> Self {
        Backend {
            client,
            base: base.into(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl PriceSource for Backend {
    async fn fetch_price(&self, ticker: &str) -> Result<PriceSnapshot> {
        BackendExt::fetch_price(&self.client, &self.base, ticker).await
    }
}
