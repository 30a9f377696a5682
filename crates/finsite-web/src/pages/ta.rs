use actix_web::{get, web, HttpRequest, HttpResponse};
use chrono::{NaiveDate, Utc};
use finsite_client::{BackendExt, IndicatorQuery};
use finsite_core::chart::{self, Viewport};
use finsite_core::model::{close_series, Company, IndicatorBundle, SeriesItem};

use super::{esc, non_blank, page};
use crate::state::AppState;

/// Days shown by default, counted back from today.
pub const DEFAULT_SPAN_DAYS: i64 = 90;

/// Raw `/ta` query string. `load` may repeat; for every other key the last value wins.
#[derive(Debug, Default)]
pub struct TaQuery {
    pub ticker: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub ma: Option<String>,
    pub macd: Option<String>,
    pub rsiperiod: Option<String>,
    pub bb: Option<String>,
    pub load: Vec<String>,
}

impl TaQuery {
    pub fn parse(query: &str) -> Self {
        let mut q = TaQuery::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = value.into_owned();
            match key.as_ref() {
                "ticker" => q.ticker = Some(value),
                "from" => q.from = Some(value),
                "to" => q.to = Some(value),
                "ma" => q.ma = Some(value),
                "macd" => q.macd = Some(value),
                "rsiperiod" => q.rsiperiod = Some(value),
                "bb" => q.bb = Some(value),
                "load" => q.load.push(value),
                _ => {}
            }
        }
        q
    }
}

/// Which datasets to fetch. Both can be on at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Loads {
    pub series: bool,
    pub indicators: bool,
}

impl Loads {
    fn parse<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        values
            .into_iter()
            .fold(Loads::default(), |mut loads, value| {
                match value.trim() {
                    "series" => loads.series = true,
                    "indicators" => loads.indicators = true,
                    _ => {}
                }
                loads
            })
    }

    // resubmitted with the form so a loaded dataset stays on the page
    fn hidden_inputs(&self) -> String {
        let mut html = String::new();
        if self.series {
            html.push_str("<input type='hidden' name='load' value='series'>");
        }
        if self.indicators {
            html.push_str("<input type='hidden' name='load' value='indicators'>");
        }
        html
    }
}

/// Form values after defaults. An indicator parameter that was submitted empty stays
/// empty so the backend leaves that family out.
#[derive(Debug, Clone, PartialEq)]
pub struct TaForm {
    pub ticker: String,
    pub indicators: IndicatorQuery,
    pub load: Loads,
}

impl TaForm {
    pub fn from_query(q: TaQuery, today: NaiveDate) -> Self {
        let from = today - chrono::Duration::days(DEFAULT_SPAN_DAYS);
        let mut indicators = IndicatorQuery::new(
            non_blank(q.from).unwrap_or_else(|| from.to_string()),
            non_blank(q.to).unwrap_or_else(|| today.to_string()),
        );
        if let Some(ma) = q.ma {
            indicators.ma = ma.trim().to_string();
        }
        if let Some(macd) = q.macd {
            indicators.macd = macd.trim().to_string();
        }
        if let Some(period) = q.rsiperiod {
            indicators.rsiperiod = period.trim().parse().unwrap_or(0);
        }
        if let Some(bb) = q.bb {
            indicators.bb = bb.trim().to_string();
        }

        TaForm {
            ticker: non_blank(q.ticker)
                .unwrap_or_else(|| super::stocks::DEFAULT_TICKER.to_string()),
            indicators,
            load: Loads::parse(q.load.iter().map(String::as_str)),
        }
    }
}

/// Result of the requested loads. Failures are kept as messages and shown inline.
#[derive(Debug, Default)]
pub struct Loaded {
    pub series: Option<Vec<SeriesItem>>,
    pub indicators: Option<IndicatorBundle>,
    pub errors: Vec<String>,
}

/// Technical-analysis playground.
#[get("/ta")]
pub async fn ta(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let form = TaForm::from_query(TaQuery::parse(req.query_string()), Utc::now().date_naive());
    let base = state.api_base();
    let q = &form.indicators;

    let series = async {
        if form.load.series {
            Some(state.http.fetch_series(&base, &form.ticker, &q.from, &q.to).await)
        } else {
            None
        }
    };
    let indicators = async {
        if form.load.indicators {
            Some(state.http.fetch_indicators(&base, &form.ticker, q).await)
        } else {
            None
        }
    };
    let (companies, series, indicators) =
        futures::join!(state.http.fetch_companies(&base), series, indicators);

    // the ticker list only feeds the datalist; losing it is not worth an error
    let companies = companies.unwrap_or_else(|e| {
        log::warn!("load companies failed: {e:#}");
        Vec::new()
    });

    let mut loaded = Loaded::default();
    match series {
        Some(Ok(series)) => loaded.series = Some(series),
        Some(Err(e)) => loaded.errors.push(format!("{e:#}")),
        None => {}
    }
    match indicators {
        Some(Ok(bundle)) => loaded.indicators = Some(bundle),
        Some(Err(e)) => loaded.errors.push(format!("{e:#}")),
        None => {}
    }

    page(&render(&form, &companies, &loaded))
}

fn datalist(companies: &[Company]) -> String {
    companies
        .iter()
        .map(|c| {
            let label = match c.name.as_deref() {
                Some(name) if !name.is_empty() => format!("{} - {}", c.ticker, name),
                _ => c.ticker.clone(),
            };
            format!("<option value='{}'>{}</option>", esc(&c.ticker), esc(&label))
        })
        .collect()
}

fn indicator_sections(bundle: &IndicatorBundle) -> String {
    let compact = Viewport::compact();
    let mut html = String::new();
    let mut group = "";
    for panel in bundle.panels() {
        if panel.group != group {
            if !group.is_empty() {
                html.push_str("    </div>\n");
            }
            group = panel.group;
            html.push_str(&format!(
                "    <h3>{group}</h3>\n    <div class='panels' style='display: grid; gap: 16px'>\n"
            ));
        }
        let chart = chart::render_labelled(&panel.points, compact, &panel.label);
        html.push_str(&format!(
            "      <div class='panel'><div>{}</div>{}</div>\n",
            esc(&panel.label),
            chart.to_markup()
        ));
    }
    if !group.is_empty() {
        html.push_str("    </div>\n");
    }
    html
}

pub fn render(form: &TaForm, companies: &[Company], loaded: &Loaded) -> String {
    let q = &form.indicators;

    let status: String = loaded
        .errors
        .iter()
        .map(|e| format!("<span style='color: tomato'>Error: {}</span>", esc(e)))
        .collect();

    let close = match &loaded.series {
        Some(series) => {
            let points = close_series(series);
            let label = format!("{} close", form.ticker);
            chart::render_labelled(&points, Viewport::compact(), &label).to_markup()
        }
        None => "<div class='hint'>Load /series first</div>".to_string(),
    };

    let indicators = match &loaded.indicators {
        Some(bundle) => indicator_sections(bundle),
        None => "    <div class='hint'>Load /indicators first</div>\n".to_string(),
    };

    let rsi = if q.rsiperiod > 0 { q.rsiperiod.to_string() } else { String::new() };

    format!(
        "<main style='padding: 24px'>
  <h1>技術分析（可選股票 / 時間區間 / 指標）</h1>
  <form method='get' style='display: grid; gap: 12px'>
    <label>Ticker <input name='ticker' list='tickers' value='{ticker}'></label>
    <datalist id='tickers'>{options}</datalist>
    <label>From <input type='date' name='from' value='{from}'></label>
    <label>To <input type='date' name='to' value='{to}'></label>
    <label>MA windows <input name='ma' value='{ma}'></label>
    <label>MACD (fast,slow,signal) <input name='macd' value='{macd}'></label>
    <label>RSI period <input type='number' name='rsiperiod' value='{rsi}'></label>
    <label>Bollinger (window,k) <input name='bb' value='{bb}'></label>
    {hidden}
    <div style='display: flex; gap: 12px'>
      <button type='submit' name='load' value='series'>Load /series</button>
      <button type='submit' name='load' value='indicators'>Load /indicators</button>
      {status}
    </div>
  </form>

  <section style='margin-top: 16px'>
    <h2>Close (/series)</h2>
    {close}
  </section>

  <section style='margin-top: 16px'>
    <h2>Indicators (/indicators)</h2>
{indicators}  </section>
</main>",
        ticker = esc(&form.ticker),
        options = datalist(companies),
        from = esc(&q.from),
        to = esc(&q.to),
        ma = esc(&q.ma),
        macd = esc(&q.macd),
        bb = esc(&q.bb),
        hidden = form.load.hidden_inputs(),
    )
}
