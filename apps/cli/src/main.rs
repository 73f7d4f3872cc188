use std::{process::ExitCode, time::Duration};

use clap::{ArgAction, Parser};
use serde::Serialize;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use tankfill::{
    DEFAULT_CAPACITY, DEFAULT_MARGIN, DEFAULT_MAX_TIME, DEFAULT_TOLERANCE, ErrorKind, FillError,
    FillTime, FlowPreset, RatePolicy, RateFunction, RateSamples, SolveOptions, error_chain,
    sample_rate, solve_fill_time,
};

#[derive(Parser, Debug)]
#[command(name = "tankfill-cli")]
#[command(about = "Estimate the time to fill a tank from an inflow rate R(t)", long_about = None)]
struct Cli {
    /// Named inflow profile: constant, increasing, decreasing or custom
    #[arg(long, default_value_t = FlowPreset::Constant)]
    preset: FlowPreset,

    /// Custom rate expression in `t`, e.g. "4*t + 1" (implies the custom preset)
    #[arg(long, value_name = "EXPR")]
    rate: Option<String>,

    /// Tank capacity
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    capacity: f64,

    /// Give up if the tank is not full by this time
    #[arg(long, default_value_t = DEFAULT_MAX_TIME)]
    max_time: f64,

    /// Width of the final bracket around the fill time
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Ignore negative rates instead of draining the tank
    #[arg(long)]
    inflow_only: bool,

    /// Abort the solve after this many milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Print N evenly spaced (t, rate) samples as CSV
    #[arg(long, value_name = "N", num_args = 0..=1, default_missing_value = "200")]
    samples: Option<usize>,

    /// Print a JSON report instead of text
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Returns the rate expression selected by `--rate` or `--preset`.
    fn expression(&self) -> &str {
        match &self.rate {
            Some(rate) => rate.as_str(),
            None => self.preset.resolve(None),
        }
    }

    fn options(&self) -> Result<SolveOptions, FillError> {
        let policy = if self.inflow_only {
            RatePolicy::InflowOnly
        } else {
            RatePolicy::Net
        };
        let mut options = SolveOptions::new(self.max_time, self.tolerance)?.with_rate_policy(policy);
        if let Some(ms) = self.timeout_ms {
            options = options.with_time_limit(Duration::from_millis(ms));
        }
        Ok(options)
    }
}

#[derive(Serialize)]
struct Report<'a> {
    expression: &'a str,
    capacity: f64,
    fill_time: f64,
    result: &'a FillTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    samples: Option<&'a RateSamples>,
}

#[derive(Serialize)]
struct ErrorReport<'a> {
    expression: &'a str,
    kind: ErrorKind,
    error: String,
    causes: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&cli, &err);
            exit_code(err.kind())
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), FillError> {
    let expression = cli.expression();
    let options = cli.options()?;
    let rate = RateFunction::compile(expression)?;
    debug!(%rate, capacity = cli.capacity, ?options, "solving");

    let fill = solve_fill_time(&rate, cli.capacity, &options)?;
    let samples = cli
        .samples
        .map(|count| sample_rate(&rate, fill.time + DEFAULT_MARGIN, count));
    if let Some(samples) = &samples {
        for skipped in &samples.skipped {
            warn!(t = skipped.t, reason = ?skipped.reason, "rate sample skipped");
        }
    }

    if cli.json {
        let report = Report {
            expression,
            capacity: cli.capacity,
            fill_time: fill.rounded(),
            result: &fill,
            samples: samples.as_ref(),
        };
        print_json(&report);
    } else {
        println!("Estimated time to fill the tank: {fill} minutes");
        if let Some(samples) = &samples {
            println!("t,rate");
            for (t, value) in &samples.points {
                println!("{t},{value}");
            }
        }
    }
    Ok(())
}

fn report_error(cli: &Cli, err: &FillError) {
    let causes = error_chain(err);
    if cli.json {
        let report = ErrorReport {
            expression: cli.expression(),
            kind: err.kind(),
            error: err.to_string(),
            causes: causes.into_iter().skip(1).collect(),
        };
        print_json(&report);
    } else {
        eprintln!("error: {}", causes.join(": "));
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("error: failed to serialize report: {err}"),
    }
}

/// Input problems exit with 2, like argument errors; solve failures with 1.
fn exit_code(kind: ErrorKind) -> ExitCode {
    match kind {
        ErrorKind::InvalidExpression | ErrorKind::InvalidOptions => ExitCode::from(2),
        ErrorKind::Integration | ErrorKind::NeverFills | ErrorKind::Cancelled | ErrorKind::Solver => {
            ExitCode::FAILURE
        }
    }
}
