use anyhow::Result;
use serde::{Deserialize, Serialize};
use url::Url;

pub const COMPANY_LIMIT: u32 = 5000;

fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("cannot use {base} as a base URL"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

pub fn fundamental_url(base: &str, ticker: &str) -> Result<Url> {
    endpoint(base, &["api", "stocks", ticker, "fundamental"])
}

/// Mock fundamentals served by this site, used when no backend is configured.
pub fn mock_fundamental_url(origin: &str, ticker: &str) -> Result<Url> {
    endpoint(origin, &["mock", "fundamental", ticker])
}

pub fn price_url(base: &str, ticker: &str) -> Result<Url> {
    endpoint(base, &["api", "stocks", ticker, "price"])
}

pub fn series_url(base: &str, ticker: &str, from: &str, to: &str) -> Result<Url> {
    let mut url = endpoint(base, &["api", "stocks", ticker, "series"])?;
    url.query_pairs_mut().append_pair("from", from).append_pair("to", to);
    Ok(url)
}

pub fn companies_url(base: &str, limit: u32) -> Result<Url> {
    let mut url = endpoint(base, &["api", "admin", "companies"])?;
    url.query_pairs_mut().append_pair("limit", &limit.to_string());
    Ok(url)
}

/// Parameters of the backend `/indicators` endpoint. Empty parameters are left
/// out of the query so that the backend skips that indicator family.
/// ```text
/// /api/stocks/2330/indicators?from=2025-01-01&to=2025-03-31&ma=5,20,60&macd=12,26,9&rsiperiod=14&bb=20,2
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct IndicatorQuery {
    pub from: String,
    pub to: String,
    pub ma: String,
    pub macd: String,
    pub rsiperiod: u32,
    pub bb: String,
}

impl IndicatorQuery {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        IndicatorQuery {
            from: from.into(),
            to: to.into(),
            ma: "5,20,60".to_string(),
            macd: "12,26,9".to_string(),
            rsiperiod: 14,
            bb: "20,2".to_string(),
        }
    }

    pub fn url(&self, base: &str, ticker: &str) -> Result<Url> {
        let mut url = endpoint(base, &["api", "stocks", ticker, "indicators"])?;
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("from", &self.from).append_pair("to", &self.to);
            if !self.ma.trim().is_empty() {
                q.append_pair("ma", self.ma.trim());
            }
            if !self.macd.trim().is_empty() {
                q.append_pair("macd", self.macd.trim());
            }
            if self.rsiperiod > 0 {
                q.append_pair("rsiperiod", &self.rsiperiod.to_string());
            }
            if !self.bb.trim().is_empty() {
                q.append_pair("bb", self.bb.trim());
            }
        }
        Ok(url)
    }
}
