//! Hand-built SVG line charts.
//!
//! ```rust
//! use finsite_core::chart::{self, Viewport};
//! use finsite_core::model::SeriesPoint;
//!
//! let series = vec![
//!     SeriesPoint::new("2025-01-02", Some(100.0)),
//!     SeriesPoint::new("2025-01-03", Some(110.0)),
//! ];
//! let chart = chart::render(&series, Viewport::default());
//! assert!(chart.to_markup().starts_with("<svg"));
//! ```
pub mod scale;
pub mod svg;

pub use scale::Scale;
pub use svg::{escape_text, render, render_labelled, Chart};

/// Pixel dimensions of a chart, with `padding` on every side of the plot area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64, padding: f64) -> Self {
        Viewport {
            width,
            height,
            padding,
        }
    }

    /// Small panel used for indicator sequences.
    pub const fn compact() -> Self {
        Viewport::new(720.0, 160.0, 16.0)
    }

    pub fn plot_width(&self) -> f64 {
        self.width - 2.0 * self.padding
    }

    pub fn plot_height(&self) -> f64 {
        self.height - 2.0 * self.padding
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport::new(800.0, 260.0, 24.0)
    }
}
