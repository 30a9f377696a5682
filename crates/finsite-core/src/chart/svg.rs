use super::{Scale, Viewport};
use crate::model::SeriesPoint;
use std::fmt::Write;

const GRID_LINES: usize = 4;
const STROKE: &str = "#1f77b4";
const PLACEHOLDER: &str =
    "<div class='chart-empty' style='padding: 8px; color: #888'>No data</div>";

/// Rendered chart, or the placeholder for a series with nothing to plot.
#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    Svg(String),
    NoData,
}

impl Chart {
    pub fn is_empty(&self) -> bool {
        matches!(self, Chart::NoData)
    }

    pub fn to_markup(&self) -> String {
        match self {
            Chart::Svg(svg) => svg.clone(),
            Chart::NoData => PLACEHOLDER.to_string(),
        }
    }
}

pub fn render(series: &[SeriesPoint], viewport: Viewport) -> Chart {
    render_labelled(series, viewport, "line chart")
}

/// Render `series` as an SVG line chart with reference lines and a frame.
///
/// Gaps split the line into separate segments instead of being bridged.
pub fn render_labelled(series: &[SeriesPoint], viewport: Viewport, label: &str) -> Chart {
    let scale = match Scale::fit(series.iter().map(SeriesPoint::finite), viewport) {
        Some(scale) => scale,
        None => return Chart::NoData,
    };

    let Viewport {
        width: w,
        height: h,
        padding: p,
    } = viewport;

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        "<svg xmlns='http://www.w3.org/2000/svg' width='{w}' height='{h}' viewBox='0 0 {w} {h}' role='img' aria-label='{}'>",
        escape_text(label)
    );

    // reference lines
    for i in 0..=GRID_LINES {
        let value = scale.value_at(i as f64 / GRID_LINES as f64);
        let y = scale.y(value);
        let _ = writeln!(svg, "  <g class='grid'>");
        let _ = writeln!(
            svg,
            "    <line x1='{p}' x2='{:.2}' y1='{y:.2}' y2='{y:.2}' stroke='#eee' stroke-dasharray='4 4'/>",
            w - p
        );
        let _ = writeln!(
            svg,
            "    <text x='{:.2}' y='{y:.2}' font-size='10' text-anchor='end' dy='0.33em' fill='#999'>{value:.2}</text>",
            p - 6.0
        );
        let _ = writeln!(svg, "  </g>");
    }

    // series
    let _ = writeln!(
        svg,
        "  <path d='{}' fill='none' stroke='{STROKE}' stroke-width='2'/>",
        path_data(series, &scale)
    );

    // frame
    let _ = writeln!(
        svg,
        "  <rect x='{p}' y='{p}' width='{:.2}' height='{:.2}' fill='none' stroke='#ddd'/>",
        viewport.plot_width(),
        viewport.plot_height()
    );
    svg.push_str("</svg>");

    Chart::Svg(svg)
}

/// Path commands for `series`; every run of consecutive finite values becomes one
/// `M … L …` segment.
pub fn path_data(series: &[SeriesPoint], scale: &Scale) -> String {
    let mut commands = Vec::with_capacity(series.len());
    let mut pen_down = false;

    for (i, point) in series.iter().enumerate() {
        match point.finite() {
            Some(v) => {
                let cmd = if pen_down { 'L' } else { 'M' };
                commands.push(format!("{cmd} {:.2} {:.2}", scale.x(i), scale.y(v)));
                pen_down = true;
            }
            None => pen_down = false,
        }
    }

    commands.join(" ")
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[Option<f64>]) -> Vec<SeriesPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| SeriesPoint::new(format!("2025-01-{:02}", i + 1), *v))
            .collect()
    }

    fn path_of(chart: &Chart) -> String {
        let svg = match chart {
            Chart::Svg(svg) => svg,
            Chart::NoData => panic!("expected a chart"),
        };
        let start = svg.find("d='").unwrap() + 3;
        let end = start + svg[start..].find('\'').unwrap();
        svg[start..end].to_string()
    }

    #[test]
    fn empty_series_is_a_placeholder() {
        let chart = render(&[], Viewport::default());
        assert_eq!(chart, Chart::NoData);
        assert!(chart.to_markup().contains("No data"));
        assert!(!chart.to_markup().contains("<path"));
    }

    #[test]
    fn all_gaps_is_a_placeholder() {
        let chart = render(&series(&[None, Some(f64::NAN)]), Viewport::default());
        assert!(chart.is_empty());
    }

    #[test]
    fn path_starts_at_first_index_and_spans_plot_width() {
        let chart = render(&series(&[Some(1.0), Some(3.0), Some(2.0)]), Viewport::default());
        let path = path_of(&chart);
        assert!(path.starts_with("M 24.00 "), "{path}");
        assert!(path.contains("L 776.00 "), "{path}");
        assert_eq!(path.matches('M').count(), 1);
        assert_eq!(path.matches('L').count(), 2);
    }

    #[test]
    fn flat_series_sits_on_the_midline() {
        let chart = render(&series(&[Some(5.0), Some(5.0), Some(5.0)]), Viewport::default());
        let path = path_of(&chart);
        assert_eq!(path, "M 24.00 130.00 L 400.00 130.00 L 776.00 130.00");
        assert!(!chart.to_markup().contains("NaN"));
        assert!(!chart.to_markup().contains("inf"));
    }

    #[test]
    fn gaps_break_the_line() {
        let chart = render(
            &series(&[Some(1.0), Some(2.0), None, Some(3.0), Some(4.0)]),
            Viewport::default(),
        );
        let path = path_of(&chart);
        assert_eq!(path.matches('M').count(), 2, "{path}");
        // the gap keeps its x slot: the second segment starts at index 3
        assert!(path.contains("M 588.00 "), "{path}");
    }

    #[test]
    fn isolated_point_is_its_own_segment() {
        let values = series(&[Some(1.0), None, Some(2.0), None, Some(3.0)]);
        let chart = render(&values, Viewport::default());
        let path = path_of(&chart);
        assert_eq!(path.matches('M').count(), 3);
        assert_eq!(path.matches('L').count(), 0);
    }

    #[test]
    fn five_labelled_reference_lines_and_a_frame() {
        let chart = render(&series(&[Some(100.0), Some(110.0)]), Viewport::default());
        let svg = chart.to_markup();
        assert_eq!(svg.matches("<line").count(), 5);
        for label in [">100.00<", ">102.50<", ">105.00<", ">107.50<", ">110.00<"] {
            assert!(svg.contains(label), "missing {label}");
        }
        assert!(svg.contains("<rect x='24' y='24' width='752.00' height='212.00'"));
    }

    #[test]
    fn rendering_is_deterministic_and_leaves_input_untouched() {
        let input = series(&[Some(3.0), None, Some(1.0)]);
        let copy = input.clone();
        let a = render(&input, Viewport::compact());
        let b = render(&input, Viewport::compact());
        assert_eq!(a, b);
        assert_eq!(input, copy);
    }

    #[test]
    fn label_is_escaped() {
        let chart = render_labelled(&series(&[Some(1.0)]), Viewport::default(), "a<b & 'c'");
        assert!(chart.to_markup().contains("aria-label='a&lt;b &amp; &#39;c&#39;'"));
    }

    #[test]
    fn huge_range_renders_finite_coordinates() {
        let chart = render(&series(&[Some(-1e308), Some(1e308)]), Viewport::default());
        let markup = chart.to_markup();
        assert!(!markup.contains("NaN"));
        assert!(!markup.contains("inf"));
        assert!(path_of(&chart).starts_with("M 24.00 236.00 L 776.00 24.00"));
    }
}
