//! Linear date-to-pixel mapping.

use chrono::NaiveDate;

use crate::model::TimeDomain;

/// Maps calendar dates to unscaled world-space X coordinates.
///
/// World X zero sits at the domain start; one day maps to `px_per_day`
/// pixels. The mapping is linear and unclamped — dates outside the domain
/// still map, so content may exceed the declared bounds and be panned to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    domain_start: NaiveDate,
    px_per_day: f64,
}

impl TimeScale {
    pub fn new(domain_start: NaiveDate, px_per_day: f64) -> Self {
        Self {
            domain_start,
            px_per_day,
        }
    }

    /// Derive the base density so the whole domain fits `drawable_width`
    /// pixels. `TimeDomain::span_days` is never zero, so the division is
    /// safe even for single-instant documents.
    pub fn fit(domain: &TimeDomain, drawable_width: f64) -> Self {
        Self {
            domain_start: domain.start,
            px_per_day: drawable_width / domain.span_days(),
        }
    }

    pub fn px_per_day(&self) -> f64 {
        self.px_per_day
    }

    /// World-space X for a date. Dates before the domain start map to
    /// negative X.
    pub fn time_to_x(&self, date: NaiveDate) -> f64 {
        (date - self.domain_start).num_days() as f64 * self.px_per_day
    }
}
