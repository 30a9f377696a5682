use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Series
//
////////////////////////////////////////////////////////////////////////////////////////////////////

/// A single date-keyed observation. `None` (or a non-finite value) is a gap.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub date: String,
    pub value: Option<f64>,
}

impl SeriesPoint {
    pub fn new(date: impl Into<String>, value: Option<f64>) -> Self {
        SeriesPoint {
            date: date.into(),
            value,
        }
    }

    /// The value, if it can be plotted.
    pub fn finite(&self) -> Option<f64> {
        self.value.filter(|v| v.is_finite())
    }
}

/// Row of the backend `/series` endpoint.
/// ```json
/// [
///     { "date": "2025-01-02", "close": 1075.0 },
///     { "date": "2025-01-03", "close": 1090.0 },
///     // ...
/// ]
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SeriesItem {
    pub date: String,
    #[serde(default)]
    pub close: Option<f64>,
}

impl From<&SeriesItem> for SeriesPoint {
    fn from(item: &SeriesItem) -> Self {
        SeriesPoint::new(item.date.clone(), item.close)
    }
}

/// Daily OHLCV row; only `close` feeds charts and statistics.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PriceRow {
    pub trade_date: String,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub close: Option<f64>,
    #[serde(default)]
    pub volume: Option<i64>,
}

impl From<&PriceRow> for SeriesPoint {
    fn from(row: &PriceRow) -> Self {
        SeriesPoint::new(row.trade_date.clone(), row.close)
    }
}

/// Close prices as chartable points, gaps included.
pub fn close_series(items: &[SeriesItem]) -> Vec<SeriesPoint> {
    items.iter().map(SeriesPoint::from).collect()
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Indicators
//
////////////////////////////////////////////////////////////////////////////////////////////////////

pub type Sequence = Vec<Option<f64>>;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct MacdSet {
    pub dif: Sequence,
    pub signal: Sequence,
    pub hist: Sequence,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct BollingerSet {
    pub mid: Sequence,
    pub upper: Sequence,
    pub lower: Sequence,
}

/// Indicator sequences computed by the backend, aligned by index to `dates`.
/// ```json
/// {
///     "dates": ["2025-01-02", "2025-01-03"],
///     "ma": { "5": [null, 1082.5] },
///     "macd": { "dif": [...], "signal": [...], "hist": [...] },
///     "rsi": [null, 55.1],
///     "bb": { "mid": [...], "upper": [...], "lower": [...] }
/// }
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct IndicatorBundle {
    pub dates: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ma: Option<BTreeMap<String, Sequence>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macd: Option<MacdSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsi: Option<Sequence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bb: Option<BollingerSet>,
}

/// A labelled indicator sequence, zipped with the shared date axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub group: &'static str,
    pub label: String,
    pub points: Vec<SeriesPoint>,
}

impl IndicatorBundle {
    /// Flatten the bundle into display order: MA windows (numerically), MACD, RSI, Bollinger.
    pub fn panels(&self) -> Vec<Panel> {
        let mut panels = Vec::new();

        if let Some(ma) = &self.ma {
            let mut windows: Vec<(&String, &Sequence)> = ma.iter().collect();
            windows.sort_by_key(|(k, _)| (k.parse::<u32>().unwrap_or(u32::MAX), k.to_string()));
            for (window, seq) in windows {
                panels.push(self.panel("MA", format!("MA {window}"), seq));
            }
        }

        if let Some(macd) = &self.macd {
            panels.push(self.panel("MACD", "MACD DIF".into(), &macd.dif));
            panels.push(self.panel("MACD", "MACD Signal".into(), &macd.signal));
            panels.push(self.panel("MACD", "MACD Hist".into(), &macd.hist));
        }

        if let Some(rsi) = &self.rsi {
            panels.push(self.panel("RSI", "RSI".into(), rsi));
        }

        if let Some(bb) = &self.bb {
            panels.push(self.panel("BB", "BB Mid".into(), &bb.mid));
            panels.push(self.panel("BB", "BB Upper".into(), &bb.upper));
            panels.push(self.panel("BB", "BB Lower".into(), &bb.lower));
        }

        panels
    }

    // a sequence shorter than `dates` is padded with gaps rather than shifted
    fn panel(&self, group: &'static str, label: String, seq: &Sequence) -> Panel {
        let points = self
            .dates
            .iter()
            .enumerate()
            .map(|(i, date)| SeriesPoint::new(date.clone(), seq.get(i).copied().flatten()))
            .collect();
        Panel {
            group,
            label,
            points,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Company data
//
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Company {
    pub ticker: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Fundamental {
    pub ticker: String,
    pub name: String,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub pe: Option<f64>,
    #[serde(default)]
    pub pb: Option<f64>,
}

/// Backend timestamps arrive either as epoch millis or as preformatted text.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Timestamp {
    Millis(i64),
    Text(String),
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Millis(ms) => write!(f, "{ms}"),
            Timestamp::Text(s) => f.write_str(s),
        }
    }
}

/// Latest price of a ticker; the card replaces it wholesale on every poll.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PriceSnapshot {
    pub price: f64,
    pub ts: Timestamp,
}
