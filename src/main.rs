use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use gmaps_geocode::api::{ComponentFilter, GeocodeResponse, GeocodingRequest, ReqwestTransport};
use gmaps_geocode::config::FileConfig;

/// Query the Google Maps geocoding service from the command line
///
/// Examples:
///   # Forward geocode an address given as separate lines
///   gmaps-geocode --key $KEY geocode "1600 Amphitheatre Pkwy" "Mountain View, CA"
///
///   # Restrict results to one country
///   gmaps-geocode geocode "Springfield" --components country:US
///
///   # Reverse geocode and print only the locality component
///   gmaps-geocode reverse "40.7128, -74.0060" --component locality,political
#[derive(Parser, Debug)]
#[command(name = "gmaps-geocode")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches gmaps-geocode.toml if not provided)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API key (overrides the config file)
    #[arg(long, global = true)]
    key: Option<String>,

    /// Language for returned results
    #[arg(long, global = true)]
    language: Option<String>,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert an address into coordinates
    Geocode {
        /// Address lines, joined with ", "
        #[arg(required = true)]
        address: Vec<String>,

        /// Bounding box to bias results: "south,west|north,east"
        #[arg(long)]
        bounds: Option<String>,

        /// Component filter, TYPE:VALUE (repeatable)
        #[arg(long = "components", value_name = "TYPE:VALUE")]
        components: Vec<String>,

        /// Region code used to bias results (ccTLD)
        #[arg(long)]
        region: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Convert coordinates into an address
    Reverse {
        /// Latitude and longitude, e.g. "40.7128, -74.0060" or 40.7128 -74.0060
        #[arg(required = true, allow_hyphen_values = true)]
        latlng: Vec<String>,

        /// ROOFTOP, RANGE_INTERPOLATED, GEOMETRIC_CENTER or APPROXIMATE
        #[arg(long)]
        location_type: Option<String>,

        /// Address type filter, e.g. street_address
        #[arg(long)]
        result_type: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Print only the first result's component with exactly these types (comma separated)
    #[arg(long, value_delimiter = ',')]
    component: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let (file_config, skipped) = match args.config {
        Some(ref path) => (FileConfig::load_from(path)?, Vec::new()),
        None => {
            let (config, skipped) = FileConfig::load();
            (config.unwrap_or_default(), skipped)
        }
    };
    init_tracing(args.verbose || file_config.verbose);
    for skip in &skipped {
        warn!(path = %skip.path.display(), error = %skip.error, "Failed to parse config file");
    }

    let transport = file_config.transport()?;
    let mut request = GeocodingRequest::with_transport(transport);
    request.key = args.key.clone();
    request.language = args.language.clone();

    let (response, output) = match args.command {
        Command::Geocode {
            address,
            bounds,
            components,
            region,
            output,
        } => {
            request.address = address;
            request.bounds = bounds;
            request.region = region;
            if !components.is_empty() {
                let filter = parse_components(&components)?;
                request = request.component_filter(&filter);
            }
            file_config.apply_defaults(&mut request);
            let response = run("Geocoding address...", || request.try_geocode())?;
            (response, output)
        }
        Command::Reverse {
            latlng,
            location_type,
            result_type,
            output,
        } => {
            request.latlng = latlng;
            request.location_type = location_type;
            request.result_type = result_type;
            file_config.apply_defaults(&mut request);
            let response = run("Reverse geocoding coordinates...", || {
                request.try_reverse_geocode()
            })?;
            (response, output)
        }
    };

    print_response(&request, &response, &output.component)
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "gmaps_geocode=debug"
    } else {
        "gmaps_geocode=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn parse_components(raw: &[String]) -> Result<ComponentFilter> {
    let mut filter = ComponentFilter::new();
    for pair in raw {
        let parsed: ComponentFilter = pair
            .parse()
            .map_err(|e| anyhow!("Invalid --components value '{pair}': {e}"))?;
        filter = filter.with_all(parsed);
    }
    Ok(filter)
}

fn run<F>(message: &str, call: F) -> Result<GeocodeResponse>
where
    F: FnOnce() -> gmaps_geocode::error::Result<GeocodeResponse>,
{
    let spinner = create_spinner(message);
    let start = Instant::now();
    let result = call();
    match &result {
        Ok(response) => spinner.finish_with_message(format!(
            "{} result(s) [{:.1}s]",
            response.results().len(),
            start.elapsed().as_secs_f32()
        )),
        Err(_) => spinner.finish_and_clear(),
    }
    result.context("No geocoding result")
}

fn print_response(
    request: &GeocodingRequest<ReqwestTransport>,
    response: &GeocodeResponse,
    component_types: &[String],
) -> Result<()> {
    if component_types.is_empty() {
        println!("{}", serde_json::to_string_pretty(response)?);
        return Ok(());
    }

    let components = response.address_components(0);
    let component = request
        .get_address_component(component_types, &components)
        .ok_or_else(|| {
            anyhow!(
                "No address component with types [{}]",
                component_types.join(", ")
            )
        })?;
    println!("{}", serde_json::to_string_pretty(component)?);
    Ok(())
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
