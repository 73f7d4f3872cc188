use std::{thread, time::Duration};

use approx::assert_relative_eq;
use proptest::prelude::*;

use tankfill::{
    CancelReason, CancelToken, ErrorKind, FillError, FlowPreset, Method, RatePolicy,
    RateFunction, SolveOptions, fill_time, sample_for_chart, solve, solve_fill_time,
};

fn rate(expr: &str) -> RateFunction {
    RateFunction::compile(expr).unwrap()
}

#[test]
fn constant_flow_preset() {
    let expr = FlowPreset::Constant.resolve(None);
    let fill = fill_time(expr, 50.0, &SolveOptions::default()).unwrap();
    assert_eq!(fill.to_string(), "10.00");
}

#[test]
fn increasing_flow_preset() {
    let expr = FlowPreset::Increasing.resolve(None);
    let fill = fill_time(expr, 50.0, &SolveOptions::default()).unwrap();
    assert_eq!(fill.to_string(), "7.07");
}

#[test]
fn decreasing_flow_preset_just_fills() {
    let expr = FlowPreset::Decreasing.resolve(None);
    let fill = fill_time(expr, 50.0, &SolveOptions::default()).unwrap();
    assert_eq!(fill.to_string(), "10.00");
}

#[test]
fn oscillating_rate_solves_numerically() {
    // V(t) = 2t + 1 - cos(t)
    let fill = fill_time("2 + sin(t)", 20.0, &SolveOptions::default()).unwrap();
    assert_eq!(fill.method, Method::Numeric);
    let volume = 2.0 * fill.time + 1.0 - fill.time.cos();
    assert_relative_eq!(volume, 20.0, epsilon = 0.05);
}

#[test]
fn zero_rate_never_fills() {
    let options = SolveOptions::new(10.0, 0.01).unwrap();
    let err = fill_time("0", 1.0, &options).unwrap_err();
    match err {
        FillError::NeverFills {
            max_time,
            volume_at_max_time,
            ..
        } => {
            assert_eq!(max_time, 10.0);
            assert_eq!(volume_at_max_time, 0.0);
        }
        other => panic!("expected NeverFills, got {other:?}"),
    }
}

#[test]
fn incomplete_expression_is_invalid() {
    let err = fill_time("4*t +", 50.0, &SolveOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidExpression);
    assert!(matches!(err, FillError::InvalidExpression(_)));
}

#[test]
fn slow_rate_needs_a_long_horizon() {
    let short = SolveOptions::default();
    let err = solve(&rate("0.01"), 1000.0, &short).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NeverFills);

    let long = SolveOptions::new(1e6, 0.01).unwrap();
    let fill = solve(&rate("0.01"), 1000.0, &long).unwrap();
    assert_relative_eq!(fill.time, 100_000.0, epsilon = 0.01);
    assert_eq!(fill.method, Method::Numeric);
}

#[test]
fn zero_capacity_fills_immediately() {
    let fill = fill_time("1/t", 0.0, &SolveOptions::default()).unwrap();
    assert_eq!(fill.time, 0.0);
}

#[test]
fn invalid_inputs_are_rejected() {
    assert_eq!(
        fill_time("5", -5.0, &SolveOptions::default())
            .unwrap_err()
            .kind(),
        ErrorKind::InvalidOptions
    );
    assert_eq!(
        fill_time("5", f64::NAN, &SolveOptions::default())
            .unwrap_err()
            .kind(),
        ErrorKind::InvalidOptions
    );
}

#[test]
fn domain_errors_surface_as_integration_errors() {
    let err = fill_time("sqrt(t - 3)", 50.0, &SolveOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Integration);
}

#[test]
fn net_and_inflow_only_differ_for_draining_rates() {
    // Net volume of 5*sin(t) oscillates between 0 and 10.
    let net = SolveOptions::default();
    assert_eq!(
        fill_time("5*sin(t)", 20.0, &net).unwrap_err().kind(),
        ErrorKind::NeverFills
    );

    let inflow = SolveOptions::default().with_rate_policy(RatePolicy::InflowOnly);
    let fill = fill_time("5*sin(t)", 15.0, &inflow).unwrap();
    // Each positive half wave adds 10; the second is half done at 5π/2.
    assert_relative_eq!(fill.time, 2.5 * std::f64::consts::PI, epsilon = 0.01);
    assert!(fill.monotone);
}

#[test]
fn cancellation_from_another_thread() {
    let token = CancelToken::new();
    let handle = token.clone();
    let canceller = thread::spawn(move || handle.cancel());
    canceller.join().unwrap();

    let options = SolveOptions::default().with_cancel_token(token);
    let err = fill_time("2 + sin(t)", 20.0, &options).unwrap_err();
    assert!(matches!(
        err,
        FillError::Cancelled {
            reason: CancelReason::Token
        }
    ));
}

#[test]
fn generous_time_limit_does_not_interfere() {
    let options = SolveOptions::default().with_time_limit(Duration::from_secs(60));
    let fill = fill_time("2 + sin(t)", 20.0, &options).unwrap();
    assert_eq!(fill.method, Method::Numeric);
}

#[test]
fn chart_samples_follow_the_fill_time() {
    let rate = rate("2*t");
    let fill = solve_fill_time(&rate, 50.0, &SolveOptions::default()).unwrap();
    let samples = sample_for_chart(&rate, &fill);

    assert!(samples.skipped.is_empty());
    let (last_t, last_rate) = *samples.points.last().unwrap();
    assert_relative_eq!(last_t, fill.time + 2.0);
    assert_relative_eq!(last_rate, 2.0 * last_t);
}

#[test]
fn chart_sampling_survives_singularities() {
    let rate = rate("1/(t-1)");
    let samples = tankfill::sample_rate(&rate, 2.0, 201);
    assert_eq!(samples.points.len(), 200);
    assert_eq!(samples.skipped.len(), 1);
}

proptest! {
    #[test]
    fn larger_capacity_never_fills_sooner(
        k in 1.0_f64..20.0,
        c1 in 1.0_f64..200.0,
        extra in 0.0_f64..200.0,
    ) {
        let options = SolveOptions::new(1e4, 0.01).unwrap();
        let rate = rate(&format!("{k} + sin(t)"));
        let small = solve(&rate, c1, &options).unwrap();
        let large = solve(&rate, c1 + extra, &options).unwrap();
        prop_assert!(large.time >= small.time - options.tolerance());
    }

    #[test]
    fn constant_rates_fill_at_capacity_over_rate(
        k in 0.1_f64..50.0,
        capacity in 0.1_f64..500.0,
    ) {
        let options = SolveOptions::new(1e4, 0.01).unwrap();
        let fill = solve(&rate(&format!("{k}")), capacity, &options).unwrap();
        prop_assert!((fill.time - capacity / k).abs() <= options.tolerance());
    }

    #[test]
    fn repeated_solves_agree(k in 0.5_f64..10.0, capacity in 1.0_f64..100.0) {
        let options = SolveOptions::default();
        let rate = rate(&format!("{k} * (1 + 0.5 * cos(t))"));
        let first = solve(&rate, capacity, &options);
        let second = solve(&rate, capacity, &options);
        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(a), Err(b)) => prop_assert_eq!(a.kind(), b.kind()),
            _ => prop_assert!(false, "solves disagree"),
        }
    }
}
