//! Cumulative volume `V(u) = ∫₀ᵘ R(t) dt`.

use std::cell::{Cell, RefCell};

use tracing::{trace, warn};

use tankfill_core::Model;
use tankfill_solvers::quadrature;

use crate::{error::IntegrationError, options::RatePolicy};

/// Relative round-off allowed before a volume decrease is reported.
const ROUNDING_SLACK: f64 = 1e3 * f64::EPSILON;

/// The cumulative volume at one time.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VolumeSample {
    /// Upper integration bound.
    pub t: f64,
    /// Volume delivered over `[0, t]`.
    pub volume: f64,
    /// Estimated absolute error in `volume`.
    pub error: f64,
}

impl VolumeSample {
    const ORIGIN: Self = Self {
        t: 0.0,
        volume: 0.0,
        error: 0.0,
    };
}

/// Returns the volume delivered by `rate` over `[0, u]`.
///
/// `u = 0` returns zero without evaluating the rate.
///
/// # Errors
///
/// Returns an [`IntegrationError`] if `u` is negative or not finite, or if
/// quadrature fails to produce a finite, converged value.
pub fn volume_up_to<R>(
    rate: &R,
    u: f64,
    policy: RatePolicy,
    config: &quadrature::Config,
) -> Result<VolumeSample, IntegrationError>
where
    R: Model<Input = f64, Output = f64>,
{
    check_bound(u)?;
    let integrand = PolicyRate::new(rate, policy);
    let solution = quadrature::integrate(&integrand, [0.0, u], config)?;
    Ok(VolumeSample {
        t: u,
        volume: solution.value,
        error: solution.error,
    })
}

fn check_bound(u: f64) -> Result<(), IntegrationError> {
    if u.is_finite() && u >= 0.0 {
        Ok(())
    } else {
        Err(IntegrationError::InvalidBound { u })
    }
}

/// A rate as seen by the integrator under a [`RatePolicy`].
#[derive(Debug)]
pub(crate) struct PolicyRate<'a, R> {
    rate: &'a R,
    policy: RatePolicy,
}

impl<'a, R> PolicyRate<'a, R> {
    pub(crate) fn new(rate: &'a R, policy: RatePolicy) -> Self {
        Self { rate, policy }
    }
}

impl<R> Model for PolicyRate<'_, R>
where
    R: Model<Input = f64, Output = f64>,
{
    type Input = f64;
    type Output = f64;
    type Error = R::Error;

    fn call(&self, t: &f64) -> Result<f64, Self::Error> {
        let rate = self.rate.call(t)?;
        Ok(match self.policy {
            RatePolicy::InflowOnly if rate < 0.0 => 0.0,
            _ => rate,
        })
    }
}

/// Cumulative volume with a per-solve cache of evaluated samples.
///
/// Each new upper bound is integrated from the nearest cached sample below
/// it, so the doubling and bisection phases only pay for the new stretch of
/// the time axis. The cache is owned by one solve and dropped with it.
#[derive(Debug)]
pub(crate) struct CumulativeVolume<'a, R> {
    rate: PolicyRate<'a, R>,
    config: &'a quadrature::Config,
    samples: RefCell<Vec<VolumeSample>>,
    evaluations: Cell<usize>,
    monotone: Cell<bool>,
}

impl<'a, R> CumulativeVolume<'a, R>
where
    R: Model<Input = f64, Output = f64>,
{
    pub(crate) fn new(rate: &'a R, policy: RatePolicy, config: &'a quadrature::Config) -> Self {
        Self {
            rate: PolicyRate::new(rate, policy),
            config,
            samples: RefCell::new(vec![VolumeSample::ORIGIN]),
            evaluations: Cell::new(0),
            monotone: Cell::new(true),
        }
    }

    /// Returns the volume sample at `u`, integrating only what is not cached.
    pub(crate) fn sample(&self, u: f64) -> Result<VolumeSample, IntegrationError> {
        check_bound(u)?;

        let (base, next) = {
            let samples = self.samples.borrow();
            let index = samples.partition_point(|sample| sample.t <= u);
            (samples[index - 1], samples.get(index).copied())
        };

        #[allow(clippy::float_cmp)]
        if base.t == u {
            return Ok(base);
        }

        let segment = quadrature::integrate(&self.rate, [base.t, u], self.config)?;
        self.evaluations.set(self.evaluations.get() + segment.evaluations);

        let sample = VolumeSample {
            t: u,
            volume: base.volume + segment.value,
            error: base.error + segment.error,
        };
        trace!(
            from = base.t,
            to = u,
            increment = segment.value,
            evaluations = segment.evaluations,
            "integrated volume segment"
        );

        let slack = ROUNDING_SLACK * sample.volume.abs().max(1.0);
        let falls_after = segment.value + segment.error + slack < 0.0;
        let falls_before = next.is_some_and(|next| {
            next.volume + next.error + sample.error + slack < sample.volume
        });
        if (falls_after || falls_before) && self.monotone.replace(false) {
            warn!(
                t = u,
                "cumulative volume decreases; the fill time may not be the first crossing"
            );
        }

        let mut samples = self.samples.borrow_mut();
        let index = samples.partition_point(|s| s.t < u);
        samples.insert(index, sample);
        Ok(sample)
    }

    /// Returns the cached sample at exactly `t`, if there is one.
    #[allow(clippy::float_cmp)]
    pub(crate) fn cached(&self, t: f64) -> Option<VolumeSample> {
        self.samples
            .borrow()
            .iter()
            .find(|sample| sample.t == t)
            .copied()
    }

    /// Returns the number of distinct upper bounds evaluated so far.
    pub(crate) fn sample_count(&self) -> usize {
        self.samples.borrow().len() - 1
    }

    /// Returns the number of rate evaluations made so far.
    pub(crate) fn evaluations(&self) -> usize {
        self.evaluations.get()
    }

    /// Returns false once a decrease in volume has been observed.
    pub(crate) fn is_monotone(&self) -> bool {
        self.monotone.get()
    }

    /// Returns the largest volume among the evaluated samples.
    pub(crate) fn max_volume(&self) -> f64 {
        self.samples
            .borrow()
            .iter()
            .map(|sample| sample.volume)
            .fold(0.0, f64::max)
    }
}

impl<R> Model for CumulativeVolume<'_, R>
where
    R: Model<Input = f64, Output = f64>,
{
    type Input = f64;
    type Output = f64;
    type Error = IntegrationError;

    fn call(&self, u: &f64) -> Result<f64, Self::Error> {
        self.sample(*u).map(|sample| sample.volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    use approx::assert_relative_eq;

    use tankfill_expr::RateFunction;

    struct Linear {
        offset: f64,
        slope: f64,
    }

    impl Model for Linear {
        type Input = f64;
        type Output = f64;
        type Error = Infallible;

        fn call(&self, t: &f64) -> Result<f64, Self::Error> {
            Ok(self.offset + self.slope * t)
        }
    }

    fn config() -> quadrature::Config {
        quadrature::Config::default()
    }

    #[test]
    fn constant_rate_volume() {
        let rate = RateFunction::compile("5").unwrap();
        let sample = volume_up_to(&rate, 10.0, RatePolicy::Net, &config()).unwrap();
        assert_relative_eq!(sample.volume, 50.0, max_relative = 1e-12);
        assert_eq!(sample.t, 10.0);
    }

    #[test]
    fn zero_bound_is_zero_without_evaluating() {
        struct Untouchable;

        impl Model for Untouchable {
            type Input = f64;
            type Output = f64;
            type Error = Infallible;

            fn call(&self, _t: &f64) -> Result<f64, Self::Error> {
                panic!("rate must not be evaluated")
            }
        }

        let sample = volume_up_to(&Untouchable, 0.0, RatePolicy::Net, &config()).unwrap();
        assert_eq!(sample.volume, 0.0);
    }

    #[test]
    fn rejects_negative_and_non_finite_bounds() {
        let rate = RateFunction::compile("1").unwrap();
        for u in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                volume_up_to(&rate, u, RatePolicy::Net, &config()),
                Err(IntegrationError::InvalidBound { .. })
            ));
        }
    }

    #[test]
    fn singular_rate_fails_to_integrate() {
        let rate = RateFunction::compile("1/(t-1)").unwrap();
        assert!(matches!(
            volume_up_to(&rate, 2.0, RatePolicy::Net, &config()),
            Err(IntegrationError::Quadrature(_))
        ));
    }

    #[test]
    fn inflow_only_clamps_negative_rates() {
        let rate = Linear {
            offset: -5.0,
            slope: 1.0,
        };
        let net = volume_up_to(&rate, 10.0, RatePolicy::Net, &config()).unwrap();
        let inflow = volume_up_to(&rate, 10.0, RatePolicy::InflowOnly, &config()).unwrap();

        // ∫₀¹⁰ (t - 5) dt = 0, ∫₅¹⁰ (t - 5) dt = 12.5
        assert_relative_eq!(net.volume, 0.0, epsilon = 1e-9);
        assert_relative_eq!(inflow.volume, 12.5, epsilon = 1e-6);
    }

    #[test]
    fn cache_integrates_only_new_segments() {
        let rate = Linear {
            offset: 0.0,
            slope: 2.0,
        };
        let config = config();
        let volume = CumulativeVolume::new(&rate, RatePolicy::Net, &config);

        assert_relative_eq!(volume.call(&4.0).unwrap(), 16.0, epsilon = 1e-9);
        let after_first = volume.evaluations();
        assert!(after_first > 0);

        assert_relative_eq!(volume.call(&4.0).unwrap(), 16.0, epsilon = 1e-9);
        assert_eq!(volume.evaluations(), after_first);

        assert_relative_eq!(volume.call(&2.0).unwrap(), 4.0, epsilon = 1e-9);
        assert_relative_eq!(volume.call(&8.0).unwrap(), 64.0, epsilon = 1e-9);
        assert_relative_eq!(volume.call(&3.0).unwrap(), 9.0, epsilon = 1e-9);
        assert!(volume.is_monotone());

        assert_eq!(volume.cached(8.0).map(|s| s.t), Some(8.0));
        assert!(volume.cached(5.0).is_none());
    }

    #[test]
    fn detects_decreasing_volume() {
        let rate = Linear {
            offset: 5.0,
            slope: -1.0,
        };
        let config = config();
        let volume = CumulativeVolume::new(&rate, RatePolicy::Net, &config);

        volume.call(&5.0).unwrap();
        assert!(volume.is_monotone());
        volume.call(&10.0).unwrap();
        assert!(!volume.is_monotone());
        assert_relative_eq!(volume.max_volume(), 12.5, epsilon = 1e-9);
    }

    #[test]
    fn inflow_only_stays_monotone() {
        let rate = Linear {
            offset: 5.0,
            slope: -1.0,
        };
        let config = config();
        let volume = CumulativeVolume::new(&rate, RatePolicy::InflowOnly, &config);

        volume.call(&5.0).unwrap();
        volume.call(&10.0).unwrap();
        assert!(volume.is_monotone());
        assert_relative_eq!(volume.call(&10.0).unwrap(), 12.5, epsilon = 1e-6);
    }
}
