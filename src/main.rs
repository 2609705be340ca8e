use std::path::PathBuf;

use carpool_map::enrich::{Enricher, Geocoder};
use carpool_map::geo::IMPLAUSIBLE_AREA;
use carpool_map::io::fixture::FixtureGeocoder;
use carpool_map::io::nominatim::{DEFAULT_ENDPOINT, DEFAULT_USER_AGENT, NominatimGeocoder};
use carpool_map::{DiscardSink, Result, logging, pipeline};
use clap::{Parser, Subcommand};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(error) = logging::init(cli.verbose) {
        eprintln!("warning: {error}");
    }
    if let Err(error) = run(cli).await {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Parse(args) => execute_parse(args),
        Command::Map(args) => execute_map(args).await,
    }
}

fn execute_parse(args: ParseArgs) -> Result<()> {
    let mut sink = DiscardSink;
    let graph = pipeline::parse_file(&args.input.input, args.input.sheet.as_deref(), &mut sink)?;
    pipeline::export(&graph, &args.output)
}

async fn execute_map(args: MapArgs) -> Result<()> {
    let geocoder: Box<dyn Geocoder> = match &args.fixture {
        Some(path) => Box::new(FixtureGeocoder::from_path(path)?),
        None => Box::new(NominatimGeocoder::new(
            args.endpoint.clone(),
            &args.user_agent,
        )?),
    };
    let enricher = Enricher::new(geocoder).with_area_threshold(args.area_threshold);

    let mut sink = DiscardSink;
    let (graph, summary) = pipeline::map_file(
        &args.input.input,
        args.input.sheet.as_deref(),
        &enricher,
        &mut sink,
    )
    .await?;
    pipeline::export(&graph, &args.output)?;

    eprintln!(
        "{} of {} locations geocoded ({} failed, {} suspicious), {} seats offered",
        summary.resolved,
        graph.locations.len(),
        summary.failed,
        summary.flagged,
        graph.seat_count()
    );
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Turn a carpool roster spreadsheet into a geocoded map graph."
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a roster and export the entity graph without geocoding.
    Parse(ParseArgs),
    /// Parse a roster, geocode every address and export the result.
    Map(MapArgs),
}

#[derive(clap::Args)]
struct InputArgs {
    /// Roster file (.xlsx or .json).
    #[arg(long)]
    input: PathBuf,

    /// Worksheet to read from an .xlsx roster. Defaults to the first sheet.
    #[arg(long)]
    sheet: Option<String>,
}

#[derive(clap::Args)]
struct ParseArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output file (.json or .xlsx).
    #[arg(long)]
    output: PathBuf,
}

#[derive(clap::Args)]
struct MapArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output file (.json or .xlsx).
    #[arg(long)]
    output: PathBuf,

    /// Base URL of a Nominatim-compatible geocoding service.
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// User agent sent to the geocoding service.
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Answer geocoding queries from a JSON fixture instead of the network.
    #[arg(long, conflicts_with = "endpoint")]
    fixture: Option<PathBuf>,

    /// Bounding-box area in square metres above which a match is reported.
    #[arg(long, default_value_t = IMPLAUSIBLE_AREA)]
    area_threshold: f64,
}
