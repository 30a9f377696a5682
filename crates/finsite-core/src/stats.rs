use crate::model::SeriesPoint;

/// Summary of a plotted series: the finite values only.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SeriesStats {
    pub count: usize,
    pub first: Option<f64>,
    pub latest: Option<f64>,
}

impl SeriesStats {
    pub fn from_series(series: &[SeriesPoint]) -> Self {
        let mut finite = series.iter().filter_map(SeriesPoint::finite);
        let first = finite.next();
        let (count, latest) = finite.fold((first.map_or(0, |_| 1), first), |(n, _), v| {
            (n + 1, Some(v))
        });
        SeriesStats {
            count,
            first,
            latest,
        }
    }

    /// Percentage return from `first` to `latest`; `None` when there is no
    /// usable baseline (no data, or a zero first value).
    pub fn return_pct(&self) -> Option<f64> {
        let (first, latest) = (self.first?, self.latest?);
        if first == 0.0 {
            return None;
        }
        Some((latest - first) / first * 100.0)
    }
}

/// `10.00%`, or `—` when the value is not computable.
pub fn format_pct(value: Option<f64>) -> String {
    value
        .filter(|v| v.is_finite())
        .map(|v| format!("{v:.2}%"))
        .unwrap_or_else(|| "—".to_string())
}

/// `1234.50`, or `—` for a missing field.
pub fn format_value(value: Option<f64>) -> String {
    value
        .filter(|v| v.is_finite())
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "—".to_string())
}
