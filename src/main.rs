use clap::{Args, Parser, Subcommand};
use rainfall_classifier::config::{self, Config};
use rainfall_classifier::data::observation::Field;
use rainfall_classifier::model::classifier::ClassifierArtifact;
use rainfall_classifier::model::labels::RainfallCategory;
use rainfall_classifier::utils::input::{get_direction, get_input};
use rainfall_classifier::{CompassDirection, RawObservation, Session};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rainfall", about = "Classify daily rainfall intensity from station readings")]
struct Cli {
    /// TOML config file; defaults are used if it does not exist
    #[arg(long, global = true, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify one day of readings, prompting for anything not given
    Classify(ClassifyArgs),
    /// Show the loaded artifacts and any load warnings
    Inspect,
}

#[derive(Args)]
struct ClassifyArgs {
    #[arg(long)]
    tn: Option<f64>,
    #[arg(long)]
    tx: Option<f64>,
    #[arg(long)]
    tavg: Option<f64>,
    #[arg(long)]
    rhavg: Option<f64>,
    #[arg(long)]
    ss: Option<f64>,
    #[arg(long)]
    ffx: Option<f64>,
    #[arg(long)]
    ffavg: Option<f64>,
    /// Direction at maximum wind speed, in degrees
    #[arg(long)]
    dddx: Option<f64>,
    /// Most frequent wind direction, e.g. "East (E)" or "E"
    #[arg(long)]
    dddcar: Option<CompassDirection>,
    /// Never prompt; fields not given stay unset
    #[arg(long)]
    no_prompt: bool,
}

impl ClassifyArgs {
    fn observation(&self) -> RawObservation {
        RawObservation {
            tn: self.tn,
            tx: self.tx,
            tavg: self.tavg,
            rhavg: self.rhavg,
            ss: self.ss,
            ffx: self.ffx,
            ffavg: self.ffavg,
            dddx: self.dddx,
            dddcar: self.dddcar,
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let session = Session::open(&config)?;
    for warning in session.warnings() {
        println!("Warning: {}", warning);
    }

    match cli.command {
        Command::Classify(args) => classify(&session, &args),
        Command::Inspect => {
            inspect(&session, &config);
            Ok(())
        }
    }
}

fn classify(session: &Session, args: &ClassifyArgs) -> anyhow::Result<()> {
    let mut raw = args.observation();
    if !args.no_prompt {
        prompt_missing(&mut raw)?;
    }

    match session.classify(&raw) {
        Ok(result) => {
            println!("\nPrediction Results:");
            println!("Category: {} ({})", result.category, result.category.english());
            println!("Description: {}", result.category.description());
            println!("Confidence: {:.2}%", result.confidence() * 100.0);
            println!("\nProbabilities:");
            for category in RainfallCategory::ALL {
                let p = result.probabilities.get(category.class_id()).copied().unwrap_or(0.0);
                println!("{:<20} {:>6.2}%", category.label(), p * 100.0);
            }
            if let Some(warning) = result.scaling_warning() {
                println!("\nWarning: {}", warning);
            }
        }
        Err(e) if e.is_validation() => {
            println!("Warning: {}", e);
            println!("{}", e.hint());
        }
        Err(e) => {
            println!("Error: {}", e);
            println!("{}", e.hint());
        }
    }
    Ok(())
}

fn prompt_missing(raw: &mut RawObservation) -> io::Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let pending: Vec<Field> = Field::ALL.into_iter().filter(|f| raw.get(*f).is_none()).collect();
    if !pending.is_empty() || raw.dddcar.is_none() {
        writeln!(output, "\nEnter the day's readings (leave blank to skip):")?;
    }
    for field in pending {
        let value = get_input(&mut input, &mut output, &format!("{}: ", field))?;
        raw.set(field, value);
    }
    if raw.dddcar.is_none() {
        raw.dddcar = get_direction(&mut input, &mut output)?;
    }
    Ok(())
}

fn inspect(session: &Session, config: &Config) {
    let bundle = session.bundle();
    let paths = &config.artifacts;

    match &bundle.classifier {
        ClassifierArtifact::TreeEnsemble(model) => println!(
            "Classifier: {} ({} trees, {} classes) from {}",
            bundle.classifier.kind(),
            model.trees.len(),
            model.n_classes,
            paths.classifier.display()
        ),
        ClassifierArtifact::Network(network) => println!(
            "Classifier: {} ({:?}) from {}",
            bundle.classifier.kind(),
            network,
            paths.classifier.display()
        ),
    }

    match &bundle.robust {
        Some(scaler) => println!(
            "Robust scaler: center {} scale {}",
            scaler.center, scaler.scale
        ),
        None => println!("Robust scaler: unavailable"),
    }
    match &bundle.minmax {
        Some(scaler) => println!(
            "Min-max scaler: min {} max {} range {:?}",
            scaler.data_min, scaler.data_max, scaler.feature_range
        ),
        None => println!("Min-max scaler: unavailable"),
    }

    let settings = session.settings();
    println!(
        "Zero counts as missing: {}, ranges enforced: {}, missing scaler policy: {:?}",
        settings.validation.zero_is_missing, settings.validation.enforce_ranges, settings.missing_scaler
    );
    if session.warnings().is_empty() {
        println!("No load warnings");
    }
}
