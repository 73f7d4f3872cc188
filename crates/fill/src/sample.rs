//! Rate samples for plotting.

use tankfill_core::Model;

use crate::result::FillTime;

/// Default number of sample points.
pub const DEFAULT_SAMPLE_POINTS: usize = 200;

/// Default time past the fill time covered by a chart.
pub const DEFAULT_MARGIN: f64 = 2.0;

/// Why a sample time was left out.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SkipReason {
    /// The rate could not be evaluated.
    Failed(String),
    /// The rate evaluated to a non-finite value.
    NonFinite(f64),
}

/// A time the sampler skipped, and why.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SkippedSample {
    pub t: f64,
    pub reason: SkipReason,
}

/// Rate values over `[0, end]`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RateSamples {
    /// `(t, R(t))` pairs in increasing `t`, finite values only.
    pub points: Vec<(f64, f64)>,
    /// Times whose rate could not be plotted.
    pub skipped: Vec<SkippedSample>,
}

impl RateSamples {
    /// Returns true if no point could be sampled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Samples `rate` at `count` evenly spaced times over `[0, end]`.
///
/// Both ends are included. Times where the rate fails or is not finite are
/// recorded in [`RateSamples::skipped`] instead of aborting the whole series.
/// A negative or non-finite `end` yields no samples.
pub fn sample_rate<R>(rate: &R, end: f64, count: usize) -> RateSamples
where
    R: Model<Input = f64, Output = f64>,
{
    let mut samples = RateSamples::default();
    if !end.is_finite() || end < 0.0 {
        return samples;
    }

    for t in linspace(end, count) {
        match rate.call(&t) {
            Ok(value) if value.is_finite() => samples.points.push((t, value)),
            Ok(value) => samples.skipped.push(SkippedSample {
                t,
                reason: SkipReason::NonFinite(value),
            }),
            Err(err) => samples.skipped.push(SkippedSample {
                t,
                reason: SkipReason::Failed(err.to_string()),
            }),
        }
    }
    samples
}

/// Samples `rate` over `[0, fill time + margin]` with the default density.
pub fn sample_for_chart<R>(rate: &R, fill: &FillTime) -> RateSamples
where
    R: Model<Input = f64, Output = f64>,
{
    sample_rate(rate, fill.time + DEFAULT_MARGIN, DEFAULT_SAMPLE_POINTS)
}

#[allow(clippy::cast_precision_loss)]
fn linspace(end: f64, count: usize) -> impl Iterator<Item = f64> {
    let last = count.saturating_sub(1);
    let step = if last > 0 { end / last as f64 } else { 0.0 };
    (0..count).map(move |i| {
        if i == last && last > 0 {
            end
        } else {
            i as f64 * step
        }
    })
}
