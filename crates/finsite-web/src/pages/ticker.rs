use actix_web::http::header::{ContentType, CACHE_CONTROL};
use actix_web::{get, web, HttpResponse};
use finsite_client::{www, BackendExt};
use finsite_core::model::{Fundamental, PriceSnapshot, Timestamp};
use finsite_core::{CardState, Config};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::{esc, layout, page, segment};
use crate::error::PageError;
use crate::state::AppState;

/// Where fundamentals come from: the backend when one is configured, otherwise this
/// site's own mock endpoint.
pub fn fundamental_source(config: &Config, ticker: &str) -> anyhow::Result<Url> {
    if config.has_backend() {
        www::fundamental_url(&config.api_base(), ticker)
    } else {
        www::mock_fundamental_url(&config.site_origin, ticker)
    }
}

/// Company header plus the realtime price card.
#[get("/stocks/{ticker}")]
pub async fn ticker_page(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, PageError> {
    let ticker = path.into_inner();
    let url = fundamental_source(&state.config, &ticker)?;
    log::debug!("[{ticker}] fetching fundamentals from {url}");
    let fundamental = state.http.fetch_fundamental(url).await?;
    Ok(page(&render(&ticker, &fundamental)))
}

pub fn render(ticker: &str, fundamental: &Fundamental) -> String {
    let multiple = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_else(|| "—".to_string());
    format!(
        "<main style='padding: 24px'>
  <h1>{name}（{ticker_v}）</h1>
  <p>產業：{sector}．P/E：{pe}．P/B：{pb}</p>
  <iframe src='/stocks/{href}/price-card' title='Realtime price' style='border: 0; width: 100%; height: 160px'></iframe>
  <p><a href='/stocks?ticker={href}'>Close prices</a> · <a href='/ta?ticker={href}'>Technical analysis</a></p>
</main>",
        name = esc(&fundamental.name),
        ticker_v = esc(ticker),
        sector = esc(fundamental.sector.as_deref().unwrap_or("—")),
        pe = multiple(fundamental.pe),
        pb = multiple(fundamental.pb),
        href = segment(ticker),
    )
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// Last good snapshot, carried from one refresh of the card to the next.
#[derive(Deserialize, Debug, Default)]
pub struct CardQuery {
    pub price: Option<f64>,
    pub ts: Option<String>,
}

impl CardQuery {
    fn previous(&self) -> CardState {
        match (self.price.filter(|p| p.is_finite()), &self.ts) {
            (Some(price), Some(ts)) => CardState::Ready(PriceSnapshot {
                price,
                ts: ts
                    .parse::<i64>()
                    .map(Timestamp::Millis)
                    .unwrap_or_else(|_| Timestamp::Text(ts.clone())),
            }),
            _ => CardState::Loading,
        }
    }
}

/// One poll of the realtime price card. The fragment reloads itself every poll
/// interval; a failed poll is shown inside the card and keeps the previous price.
#[get("/stocks/{ticker}/price-card")]
pub async fn price_card(
    path: web::Path<String>,
    query: web::Query<CardQuery>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let ticker = path.into_inner();
    let result = state.http.fetch_price(&state.api_base(), &ticker).await;
    if let Err(e) = &result {
        log::warn!("[{ticker}] price poll failed: {e:#}");
    }
    let card = query.previous().apply(result);

    HttpResponse::Ok()
        .insert_header((CACHE_CONTROL, "no-store"))
        .content_type(ContentType::html())
        .body(render_card(&ticker, &card, refresh_secs(state.config.poll_interval)))
}

/// `<meta refresh>` only takes whole seconds; round up so the card never polls faster
/// than configured.
pub fn refresh_secs(interval: Duration) -> u64 {
    let secs = interval.as_millis().div_ceil(1000).max(1);
    u64::try_from(secs).unwrap_or(u64::MAX)
}

pub fn render_card(ticker: &str, card: &CardState, every: u64) -> String {
    let mut next = format!("/stocks/{}/price-card", segment(ticker));
    if let Some(s) = card.snapshot() {
        next.push_str(&format!("?price={}&ts={}", s.price, segment(&s.ts.to_string())));
    }
    let head = format!("<meta http-equiv='refresh' content='{every}; url={}'>\n", esc(&next));
    // the card fragment lives in its own document inside the ticker page
    layout(&format!("{head}{}", card.render_html()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tsmc() -> Fundamental {
        Fundamental {
            ticker: "2330".into(),
            name: "TSMC".into(),
            sector: Some("Semiconductor".into()),
            pe: Some(25.0),
            pb: Some(5.0),
        }
    }

    #[test]
    fn mock_is_used_without_backend() {
        let config = Config::default();
        let url = fundamental_source(&config, "2330").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/mock/fundamental/2330");
    }

    #[test]
    fn backend_is_preferred_when_configured() {
        let config = Config {
            public_api_base: Some("http://pub:8000".into()),
            ..Config::default()
        };
        let url = fundamental_source(&config, "2330").unwrap();
        assert_eq!(url.as_str(), "http://pub:8000/api/stocks/2330/fundamental");

        let config = Config {
            api_base: Some("http://srv:8000".into()),
            ..config
        };
        let url = fundamental_source(&config, "2330").unwrap();
        assert_eq!(url.as_str(), "http://srv:8000/api/stocks/2330/fundamental");
    }

    #[test]
    fn renders_header() {
        let html = render("2330", &tsmc());
        assert!(html.contains("<h1>TSMC（2330）</h1>"));
        assert!(html.contains("產業：Semiconductor．P/E：25．P/B：5"));
        assert!(html.contains("src='/stocks/2330/price-card'"));
    }

    #[test]
    fn null_multiples_render_as_dash() {
        let fundamental = Fundamental {
            ticker: "AAPL".into(),
            name: "Unknown".into(),
            sector: Some("N/A".into()),
            pe: None,
            pb: None,
        };
        let html = render("AAPL", &fundamental);
        assert!(html.contains("P/E：—．P/B：—"));
    }

    #[test]
    fn previous_snapshot_is_restored_from_query() {
        let query = CardQuery {
            price: Some(801.0),
            ts: Some("1700000000000".into()),
        };
        assert_eq!(
            query.previous(),
            CardState::Ready(PriceSnapshot {
                price: 801.0,
                ts: Timestamp::Millis(1_700_000_000_000),
            })
        );
        assert_eq!(CardQuery::default().previous(), CardState::Loading);
    }

    #[test]
    fn failed_poll_keeps_the_carried_price() {
        let query = CardQuery {
            price: Some(801.0),
            ts: Some("1700000000000".into()),
        };
        let err = anyhow::anyhow!("price fetch failed: 502 Bad Gateway");
        let card = query.previous().apply(Err(err));
        let html = render_card("2330", &card, 5);
        assert!(html.contains("801 @ 1700000000000"));
        assert!(html.contains("price fetch failed: 502 Bad Gateway"));
        assert!(html.contains(
            "content='5; url=/stocks/2330/price-card?price=801&amp;ts=1700000000000'"
        ));
    }

    #[test]
    fn loading_card_refreshes_without_carry() {
        let html = render_card("2330", &CardState::Loading, 5);
        assert!(html.contains("Loading…"));
        assert!(html.contains("content='5; url=/stocks/2330/price-card'"));
    }

    #[test]
    fn refresh_rounds_up_to_whole_seconds() {
        assert_eq!(refresh_secs(Duration::from_millis(5000)), 5);
        assert_eq!(refresh_secs(Duration::from_millis(7500)), 8);
        assert_eq!(refresh_secs(Duration::from_millis(250)), 1);
        assert_eq!(refresh_secs(Duration::from_millis(1001)), 2);
    }
}
