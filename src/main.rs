//! SkyCast entrypoint: load the artifact bundle once, then predict booking
//! completion for attributes given as flags or a JSON file.

use chrono::Weekday;
use clap::{Args, Parser, Subcommand};
use skycast::{
    artifacts::ArtifactBundle,
    booking::{RawBookingAttributes, SalesChannel, TripType},
    config::PredictorConfig,
    error::{Error, ErrorCategory},
    features::Reconstruction,
    logging::StructuredLogger,
    prediction::{PredictionRecord, Predictor},
};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error as ThisError;
use tracing::info;

/// Failures of one CLI run: library errors keep their category, output errors sit outside it.
#[derive(Debug, ThisError)]
enum CliError {
    #[error(transparent)]
    Skycast(#[from] Error),

    #[error("cannot write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Predict whether a customer will complete a flight booking
#[derive(Parser, Debug)]
#[command(name = "skycast")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Artifact bundle path (overrides the config file)
    #[arg(long, global = true)]
    artifacts: Option<PathBuf>,

    /// Config file (default: $SKYCAST_CONFIG_PATH or ./config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Predict completion for one booking
    Predict(PredictArgs),
    /// List the routes and booking origins the encoders know
    Options,
}

#[derive(Args, Debug)]
struct PredictArgs {
    /// Read the booking from a JSON file instead of flags
    #[arg(long)]
    input: Option<PathBuf>,

    #[arg(long, default_value_t = 1)]
    passengers: u32,

    /// Internet or Mobile
    #[arg(long, default_value = "Internet")]
    sales_channel: SalesChannel,

    /// RoundTrip, OneWay or CircleTrip
    #[arg(long, default_value = "RoundTrip")]
    trip_type: TripType,

    /// Days between purchase and departure
    #[arg(long, default_value_t = 30)]
    purchase_lead: u32,

    /// Days
    #[arg(long, default_value_t = 7)]
    length_of_stay: u32,

    /// Departure hour, 0-23
    #[arg(long, default_value_t = 10)]
    flight_hour: u8,

    /// Mon..Sun
    #[arg(long, default_value = "Mon")]
    flight_day: Weekday,

    /// Defaults to the first known route
    #[arg(long)]
    route: Option<String>,

    /// Defaults to the first known origin country
    #[arg(long)]
    booking_origin: Option<String>,

    #[arg(long)]
    extra_baggage: bool,

    #[arg(long)]
    preferred_seat: bool,

    #[arg(long)]
    in_flight_meals: bool,

    /// Hours
    #[arg(long, default_value_t = 5.0)]
    flight_duration: f64,

    /// Decision threshold for label and verdict (overrides config)
    #[arg(long)]
    threshold: Option<f64>,

    /// Print the prediction record as one JSON line
    #[arg(long)]
    json: bool,

    /// Also show every aligned and scaled feature
    #[arg(long)]
    explain: bool,
}

impl PredictArgs {
    fn booking(&self, bundle: &ArtifactBundle) -> Result<RawBookingAttributes, Error> {
        if let Some(ref path) = self.input {
            let data = std::fs::read_to_string(path)
                .map_err(|e| Error::InvalidAttribute {
                    field: "input",
                    reason: format!("{}: {}", path.display(), e),
                })?;
            return serde_json::from_str(&data).map_err(|e| Error::InvalidAttribute {
                field: "input",
                reason: format!("{}: {}", path.display(), e),
            });
        }

        // Unset categoricals fall back to the first encoder class, like the form's dropdowns.
        let first = |options: &[String]| options.first().cloned().unwrap_or_default();
        Ok(RawBookingAttributes {
            num_passengers: self.passengers,
            sales_channel: self.sales_channel,
            trip_type: self.trip_type,
            purchase_lead: self.purchase_lead,
            length_of_stay: self.length_of_stay,
            flight_hour: self.flight_hour,
            flight_day: self.flight_day,
            route: self
                .route
                .clone()
                .unwrap_or_else(|| first(bundle.route_options())),
            booking_origin: self
                .booking_origin
                .clone()
                .unwrap_or_else(|| first(bundle.origin_options())),
            wants_extra_baggage: self.extra_baggage,
            wants_preferred_seat: self.preferred_seat,
            wants_in_flight_meals: self.in_flight_meals,
            flight_duration: self.flight_duration,
        })
    }
}

fn print_review(raw: &RawBookingAttributes) {
    println!("Booking input");
    if let Ok(serde_json::Value::Object(fields)) = serde_json::to_value(raw) {
        for (name, value) in fields {
            println!("  {:<24} {}", name, value);
        }
    }
}

fn print_features(stages: &Reconstruction) {
    println!();
    println!("  {:<28} {:>12} {:>12}", "column", "aligned", "scaled");
    for ((column, aligned), (_, scaled)) in stages.aligned.iter().zip(stages.scaled.iter()) {
        println!("  {:<28} {:>12.4} {:>12.4}", column, aligned, scaled);
    }
}

fn print_record(record: &PredictionRecord) {
    println!();
    println!("{}", record.verdict.headline());
    println!("  {}", record.verdict.detail());
    println!(
        "  Probability of completion: {:.2}% (threshold {:.2})",
        record.probability_pct, record.threshold
    );
    if let Some(ref advice) = record.recommendation {
        println!("  Suggestion: {}", advice);
    }
}

fn predict(predictor: &Predictor, args: &PredictArgs) -> Result<(), CliError> {
    let raw = args.booking(predictor.bundle())?;
    let (record, stages) = predictor.explain(&raw)?;
    info!(id = %record.id, label = record.label, probability = record.probability, "prediction");

    if args.json {
        let mut out = std::io::stdout().lock();
        if args.explain {
            let features: Vec<serde_json::Value> = stages
                .aligned
                .iter()
                .zip(stages.scaled.iter())
                .map(|((column, aligned), (_, scaled))| {
                    serde_json::json!({ "column": column, "aligned": aligned, "scaled": scaled })
                })
                .collect();
            StructuredLogger::emit_json(
                &serde_json::json!({ "input": raw, "record": record, "features": features }),
                &mut out,
            )?;
        } else {
            StructuredLogger::emit_json(&record, &mut out)?;
        }
        return Ok(());
    }

    print_review(&raw);
    if args.explain {
        print_features(&stages);
    }
    print_record(&record);
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.clone().unwrap_or_else(PredictorConfig::default_path);
    let mut config = PredictorConfig::load(&config_path)?;

    StructuredLogger::init(config.log.json, &config.log.level);

    if let Some(path) = cli.artifacts {
        config.artifact_path = path;
    }
    if let Commands::Predict(ref args) = cli.command {
        if args.threshold.is_some() {
            config.prediction.decision_threshold = args.threshold;
        }
    }

    info!(artifacts = %config.artifact_path.display(), "SkyCast starting");
    let bundle = ArtifactBundle::load(&config.artifact_path)?;

    match cli.command {
        Commands::Options => {
            println!("Routes ({})", bundle.route_options().len());
            for route in bundle.route_options() {
                println!("  {}", route);
            }
            println!("Booking origins ({})", bundle.origin_options().len());
            for origin in bundle.origin_options() {
                println!("  {}", origin);
            }
            Ok(())
        }
        Commands::Predict(args) => {
            let predictor = Predictor::new(bundle, &config.prediction)?;
            predict(&predictor, &args)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Output(e)) => {
            tracing::error!(error = %e, "output failed");
            eprintln!("error: cannot write output: {}", e);
            ExitCode::FAILURE
        }
        Err(CliError::Skycast(e)) => {
            let category = e.category();
            tracing::error!(category = category.as_str(), error = %e, "request failed");
            eprintln!("error [{}]: {}", category.as_str(), e);
            if category == ErrorCategory::ArtifactLoad {
                eprintln!("Make sure the training job has exported the artifact bundle.");
            }
            ExitCode::from(category.exit_code())
        }
    }
}
