use super::Viewport;

/// Maps series indices and values onto pixel coordinates.
///
/// Built from the finite values only; gaps still count towards the number of x slots
/// so that the time axis stays aligned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    viewport: Viewport,
    step: f64,
    min: f64,
    max: f64,
}

impl Scale {
    /// Fit a scale to `values`. Returns `None` when there is nothing to plot.
    pub fn fit<I>(values: I, viewport: Viewport) -> Option<Self>
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut count = 0usize;
        let mut bounds: Option<(f64, f64)> = None;

        for value in values {
            count += 1;
            if let Some(v) = value.filter(|v| v.is_finite()) {
                bounds = Some(match bounds {
                    Some((lo, hi)) => (lo.min(v), hi.max(v)),
                    None => (v, v),
                });
            }
        }

        let (min, max) = bounds?;
        let slots = count.saturating_sub(1).max(1) as f64;

        Some(Scale {
            viewport,
            step: viewport.plot_width() / slots,
            min,
            max,
        })
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn is_flat(&self) -> bool {
        self.max == self.min
    }

    /// Value at fraction `t` of the way from `min` to `max`.
    pub fn value_at(&self, t: f64) -> f64 {
        self.min * (1.0 - t) + self.max * t
    }

    pub fn x(&self, index: usize) -> f64 {
        self.viewport.padding + index as f64 * self.step
    }

    /// Larger values map to smaller y. A flat range puts everything on the midline.
    pub fn y(&self, value: f64) -> f64 {
        if self.is_flat() {
            return self.viewport.height / 2.0;
        }
        // halved first so that ranges wider than f64::MAX stay finite
        let ratio = (value / 2.0 - self.min / 2.0) / (self.max / 2.0 - self.min / 2.0);
        self.viewport.height - self.viewport.padding - ratio * self.viewport.plot_height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vp() -> Viewport {
        Viewport::new(800.0, 260.0, 24.0)
    }

    #[test]
    fn empty_and_all_gaps_do_not_fit() {
        assert!(Scale::fit(Vec::<Option<f64>>::new(), vp()).is_none());
        assert!(Scale::fit(vec![None, Some(f64::NAN), Some(f64::INFINITY)], vp()).is_none());
    }

    #[test]
    fn step_spans_plot_width() {
        let values = vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)];
        let scale = Scale::fit(values, vp()).unwrap();
        assert_eq!(scale.step(), 752.0 / 4.0);
        assert_eq!(scale.x(0), 24.0);
        assert_eq!(scale.x(4), 776.0);
    }

    #[test]
    fn single_point_uses_one_slot() {
        let scale = Scale::fit(vec![Some(7.0)], vp()).unwrap();
        assert_eq!(scale.step(), 752.0);
        assert_eq!(scale.x(0), 24.0);
        assert_eq!(scale.y(7.0), 130.0);
    }

    #[test]
    fn values_are_inverted_onto_the_plot() {
        let scale = Scale::fit(vec![Some(10.0), None, Some(20.0)], vp()).unwrap();
        assert_eq!(scale.min(), 10.0);
        assert_eq!(scale.max(), 20.0);
        assert_eq!(scale.y(10.0), 236.0);
        assert_eq!(scale.y(20.0), 24.0);
        assert_eq!(scale.y(15.0), 130.0);
        // the gap still occupies index 1
        assert_eq!(scale.x(2), 776.0);
    }

    #[test]
    fn flat_range_maps_to_midpoint() {
        let scale = Scale::fit(vec![Some(5.0), Some(5.0), Some(5.0)], vp()).unwrap();
        assert!(scale.is_flat());
        assert_eq!(scale.y(5.0), 130.0);
        assert!(scale.y(5.0).is_finite());
    }

    #[test]
    fn extreme_range_stays_finite() {
        let scale = Scale::fit(vec![Some(-1e308), Some(1e308)], vp()).unwrap();
        assert_eq!(scale.y(-1e308), 236.0);
        assert_eq!(scale.y(1e308), 24.0);
        assert_eq!(scale.y(0.0), 130.0);
        assert_eq!(scale.value_at(0.5), 0.0);
        assert_eq!(scale.value_at(1.0), 1e308);
    }
}
