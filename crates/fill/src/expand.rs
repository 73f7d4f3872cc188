//! Bracket discovery by doubling the upper bound.

use tracing::debug;

use tankfill_core::Model;
use tankfill_solvers::equation::bisection::Bracket;

use crate::{cancel::Interrupt, error::FillError, problem::FillProblem, volume::CumulativeVolume};

/// First upper bound tried.
const INITIAL_HIGH: f64 = 1.0;

/// Finds a bracket `[low, high]` with `V(low) < C <= V(high)`.
///
/// Starts from `[0, min(1, max_time)]` and doubles `high`, clamped to
/// `max_time`. Each bound that stays short of capacity becomes the new `low`,
/// so the returned bracket is as tight as the doubling allows. If `max_time`
/// itself falls short the tank never fills within the horizon.
///
/// Expects `capacity > 0`, so `V(0) = 0` is always short.
pub(crate) fn discover<R>(
    volume: &CumulativeVolume<'_, R>,
    problem: &FillProblem,
    capacity: f64,
    max_time: f64,
    interrupt: &Interrupt<'_>,
) -> Result<Bracket, FillError>
where
    R: Model<Input = f64, Output = f64>,
{
    let mut low = 0.0;
    let mut low_residual = problem.residual(0.0);
    let mut high = INITIAL_HIGH.min(max_time);

    loop {
        if let Some(reason) = interrupt.check() {
            return Err(FillError::Cancelled { reason });
        }

        let v = volume.call(&high)?;
        let residual = problem.residual(v);
        debug!(low, high, volume = v, "bracket doubling");

        if residual >= 0.0 {
            return Ok(Bracket::new([low, high], [low_residual, residual])?);
        }

        if high >= max_time {
            return Err(FillError::NeverFills {
                capacity,
                max_time,
                volume_at_max_time: v,
                max_volume_seen: volume.max_volume(),
                monotone: volume.is_monotone(),
            });
        }

        low = high;
        low_residual = residual;
        high = (2.0 * high).min(max_time);
    }
}
