use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use webhallen_harvester::config::{Config, ConfigLoader, ConfigOverrides};
use webhallen_harvester::error::HarvestError;
use webhallen_harvester::harvest::{Harvester, ProgressSink};
use webhallen_harvester::output::{ConsoleProgress, OutputMode, PlainOutput};
use webhallen_harvester::store::MongoStore;
use webhallen_harvester::webhallen::WebhallenHttpClient;

#[derive(Parser)]
#[command(name = "webhallen-harvest")]
#[command(about = "Download Webhallen products by id and archive them in MongoDB")]
#[command(version, author)]
struct Cli {
    /// First product id to download (inclusive)
    #[arg(long)]
    start: Option<u32>,

    /// Product id to stop at (exclusive)
    #[arg(long)]
    end: Option<u32>,

    /// MongoDB connection string, overrides MONGO_URI
    #[arg(long)]
    mongo_uri: Option<String>,

    #[arg(long)]
    database: Option<String>,

    #[arg(long)]
    collection: Option<String>,

    /// Base URL of the Webhallen API
    #[arg(long)]
    api_base: Option<String>,

    /// Read settings from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Plain status lines, no progress bar or colours
    #[arg(long)]
    non_interactive: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<HarvestError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &HarvestError) -> u8 {
    match error {
        err if err.is_config_error() => 2,
        HarvestError::Store(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = OutputMode::detect(cli.non_interactive, std::io::stderr().is_terminal());

    let overrides = ConfigOverrides {
        mongo_uri: cli.mongo_uri,
        database: cli.database,
        collection: cli.collection,
        api_base: cli.api_base,
        start: cli.start,
        end: cli.end,
    };
    let config = match &cli.env_file {
        Some(path) => ConfigLoader::resolve_from_file(path, overrides)?,
        None => ConfigLoader::resolve(overrides)?,
    };
    announce(&config);

    let client = WebhallenHttpClient::with_base_url(&config.api_base)?;
    let store = MongoStore::connect(&config.mongo_uri, &config.database, &config.collection)?;
    let harvester = Harvester::new(client, store);

    let sink: Box<dyn ProgressSink> = match output_mode {
        OutputMode::Interactive => Box::new(ConsoleProgress::new(config.range.len())),
        OutputMode::NonInteractive => Box::new(PlainOutput::new()),
    };
    harvester.run(config.range, sink.as_ref())?;
    Ok(())
}

fn announce(config: &Config) {
    tracing::info!(
        database = %config.database,
        collection = %config.collection,
        range = %config.range,
        "configuration resolved"
    );
    println!("MongoDB URI: '{}'", config.redacted_mongo_uri());
    println!(
        "I will download everything between {} and {} :-)",
        config.range.start(),
        config.range.end()
    );
}
