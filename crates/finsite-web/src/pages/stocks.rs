use actix_web::{get, web, HttpResponse};
use finsite_client::BackendExt;
use finsite_core::chart::{self, Viewport};
use finsite_core::model::{close_series, Company, SeriesItem};
use finsite_core::stats::{format_pct, format_value, SeriesStats};
use serde::Deserialize;

use super::{company_options, esc, non_blank, page, segment};
use crate::error::PageError;
use crate::state::AppState;

pub const DEFAULT_TICKER: &str = "2330";
pub const DEFAULT_FROM: &str = "2025-01-01";
pub const DEFAULT_TO: &str = "2025-12-31";

#[derive(Deserialize, Debug, Default)]
pub struct StocksQuery {
    pub ticker: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Query with defaults filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub ticker: String,
    pub from: String,
    pub to: String,
}

impl From<StocksQuery> for Selection {
    fn from(q: StocksQuery) -> Self {
        Selection {
            ticker: non_blank(q.ticker).unwrap_or_else(|| DEFAULT_TICKER.to_string()),
            from: non_blank(q.from).unwrap_or_else(|| DEFAULT_FROM.to_string()),
            to: non_blank(q.to).unwrap_or_else(|| DEFAULT_TO.to_string()),
        }
    }
}

/// Company picker, close chart, summary statistics and the raw close list.
#[get("/stocks")]
pub async fn stocks(
    query: web::Query<StocksQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, PageError> {
    let selection = Selection::from(query.into_inner());
    let base = state.api_base();
    log::debug!("rendering /stocks for {selection:?} from {base}");

    // both requests go out together; either failing aborts the page
    let (companies, series) = futures::try_join!(
        state.http.fetch_companies(&base),
        state
            .http
            .fetch_series(&base, &selection.ticker, &selection.from, &selection.to),
    )?;

    Ok(page(&render(&selection, &companies, &series)))
}

pub fn render(selection: &Selection, companies: &[Company], series: &[SeriesItem]) -> String {
    let Selection { ticker, from, to } = selection;
    let points = close_series(series);
    let stats = SeriesStats::from_series(&points);
    let chart = chart::render_labelled(&points, Viewport::default(), &format!("{ticker} close"));

    let rows: String = series
        .iter()
        .map(|row| {
            let close = row.close.map(|c| c.to_string()).unwrap_or_default();
            format!("      <li>{}  {}</li>\n", esc(&row.date), close)
        })
        .collect();

    format!(
        "<main style='padding: 24px'>
  <form method='get' style='display: flex; gap: 8px; align-items: center'>
    <select name='ticker'>{options}</select>
    <input type='date' name='from' value='{from_v}'>
    <input type='date' name='to' value='{to_v}'>
    <button type='submit'>Load</button>
  </form>

  <div style='margin-top: 16px'>
    <h3>{ticker_v} Close ( {from_v} → {to_v} )</h3>
    <dl class='stats' style='display: flex; gap: 24px'>
      <div><dt>Latest</dt><dd>{latest}</dd></div>
      <div><dt>Return</dt><dd>{ret}</dd></div>
      <div><dt>Points</dt><dd>{count}</dd></div>
    </dl>
    {chart}
    <ul style='max-height: 320px; overflow: auto; font-family: monospace'>
{rows}    </ul>
  </div>

  <p><a href='/stocks/{href}'>Fundamentals</a> · <a href='/ta?ticker={href}'>Technical analysis</a></p>
</main>",
        options = company_options(companies, ticker),
        ticker_v = esc(ticker),
        from_v = esc(from),
        to_v = esc(to),
        latest = format_value(stats.latest),
        ret = format_pct(stats.return_pct()),
        count = stats.count,
        chart = chart.to_markup(),
        href = segment(ticker),
    )
}
