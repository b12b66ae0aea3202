// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use phototour_core::apt_dat::{self, AirportIndex, AirportType, AptDatParser};
use phototour_core::catalog::PhotoCatalog;
use phototour_core::engine::EXHAUSTED_HINT;
use phototour_core::export::{self, DEFAULT_TOUR_ALTITUDE_FT};
use phototour_core::remote::HttpPhotoSource;
use phototour_core::{AttemptFailure, Discovery, PhotoSource, TourConfig, TourSearchEngine};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for a photo tour between two airports
    Discover(DiscoverArgs),
    /// Inspect or create the saved tour constraints
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective constraints
    Show,
    /// Write the default constraints to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print where the config file lives
    Path,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Fms,
}

#[derive(Args)]
struct DiscoverArgs {
    /// Path to X-Plane root, used to find apt.dat
    #[arg(short, long, env = "XPLANE_ROOT")]
    root: Option<PathBuf>,

    /// Explicit apt.dat to take airports from
    #[arg(long)]
    apt_dat: Option<PathBuf>,

    /// Local JSON photo catalog
    #[arg(long, conflicts_with = "photo_url", required_unless_present = "photo_url")]
    catalog: Option<PathBuf>,

    /// Base URL of a JSON photo service
    #[arg(long)]
    photo_url: Option<String>,

    /// Per-request timeout for the photo service, in seconds
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Seed for the catalog's random photo picks
    #[arg(long)]
    seed: Option<u64>,

    /// Constraints file (defaults to the saved config)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    attempts: Option<u32>,
    #[arg(long)]
    min_legs: Option<u32>,
    #[arg(long)]
    max_legs: Option<u32>,
    /// Shortest allowed leg, nautical miles
    #[arg(long)]
    min_leg_nm: Option<f64>,
    /// Longest allowed leg, nautical miles
    #[arg(long)]
    max_leg_nm: Option<f64>,
    /// Largest heading change allowed at a photo, degrees
    #[arg(long)]
    max_turn: Option<f64>,

    /// Also anchor at seaplane bases
    #[arg(long)]
    seaplanes: bool,
    /// Also anchor at heliports
    #[arg(long)]
    heliports: bool,

    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Cruise altitude written for photo fixes in FMS output, feet
    #[arg(long, default_value_t = DEFAULT_TOUR_ALTITUDE_FT)]
    altitude: u32,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Discover(args) => discover(args),
        Commands::Config { action } => run_config(action),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let config = ConfigBuilder::new()
        .add_filter_allow_str("phototour")
        .build();
    // A logger may already be installed when embedded; keep going without ours
    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto);
}

fn load_constraints(args: &DiscoverArgs) -> Result<TourConfig> {
    let mut config = match &args.config {
        Some(path) => TourConfig::load(path)
            .with_context(|| format!("Failed to read constraints from {}", path.display()))?,
        None => TourConfig::load_or_default().context("Failed to read saved constraints")?,
    };

    if let Some(v) = args.attempts {
        config.max_attempts = v;
    }
    if let Some(v) = args.min_legs {
        config.min_legs = v;
    }
    if let Some(v) = args.max_legs {
        config.max_legs = v;
    }
    if let Some(v) = args.min_leg_nm {
        config.min_leg_dist_nm = v;
    }
    if let Some(v) = args.max_leg_nm {
        config.max_leg_dist_nm = v;
    }
    if let Some(v) = args.max_turn {
        config.max_bearing_change = v;
    }

    config.validate()?;
    Ok(config)
}

fn load_airports(args: &DiscoverArgs) -> Result<AirportIndex> {
    let path = match &args.apt_dat {
        Some(path) => path.clone(),
        None => {
            let root = match &args.root {
                Some(root) => root.clone(),
                None => phototour_core::find_xplane_root().ok_or_else(|| {
                    anyhow::anyhow!(
                        "Could not find X-Plane root. Please specify with --root or --apt-dat."
                    )
                })?,
            };
            apt_dat::locate_apt_dat(&root)?
        }
    };

    let airports = AptDatParser::parse_file(&path)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let mut allowed = vec![AirportType::Land];
    if args.seaplanes {
        allowed.push(AirportType::Seaplane);
    }
    if args.heliports {
        allowed.push(AirportType::Heliport);
    }

    log::info!(
        "Airport index ready — path={} airports={}",
        path.display(),
        airports.len()
    );
    Ok(AirportIndex::with_types(airports, allowed))
}

fn load_photos(args: &DiscoverArgs) -> Result<Box<dyn PhotoSource>> {
    if let Some(url) = &args.photo_url {
        let source = HttpPhotoSource::with_timeout(url, Duration::from_secs(args.timeout))?;
        return Ok(Box::new(source));
    }

    let Some(path) = &args.catalog else {
        bail!("Specify a photo source with --catalog or --photo-url");
    };
    let catalog = PhotoCatalog::load(path, args.seed)
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    if catalog.is_empty() {
        bail!("Catalog {} contains no photos", path.display());
    }
    Ok(Box::new(catalog))
}

fn discover(args: DiscoverArgs) -> Result<()> {
    let config = load_constraints(&args)?;
    let anchors = load_airports(&args)?;
    let photos = load_photos(&args)?;

    let mut engine = TourSearchEngine::new(config.clone(), photos, &anchors);
    let (tour, attempts) = match engine.discover()? {
        Discovery::Complete { tour, attempts } => (tour, attempts),
        Discovery::Exhausted { attempts, failures } => {
            eprintln!(
                "Could not generate a tour within the configured constraints after {} attempt(s).",
                attempts
            );
            for (reason, count) in failure_tally(&failures) {
                eprintln!("  {:>3} x {}", count, reason);
            }
            eprintln!("{}", EXHAUSTED_HINT);
            bail!("tour search exhausted");
        }
    };

    let rendered = match args.format {
        OutputFormat::Text => export::summary(&tour),
        OutputFormat::Json => export::export_json(&tour, &config, attempts)?,
        OutputFormat::Fms => export::export_fms(&tour, args.altitude),
    };

    match &args.out {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Tour written to {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

/// Counts failures per reason, in a stable order.
fn failure_tally(failures: &[AttemptFailure]) -> BTreeMap<&'static str, usize> {
    let mut tally = BTreeMap::new();
    for f in failures {
        let key = match f {
            AttemptFailure::NoStartAnchor { .. } => "no start airport",
            AttemptFailure::TooFewLegs { .. } => "too few legs",
            AttemptFailure::NoEndAnchor { .. } => "no end airport",
        };
        *tally.entry(key).or_default() += 1;
    }
    tally
}

fn run_config(action: ConfigAction) -> Result<()> {
    let path = TourConfig::default_path();
    match action {
        ConfigAction::Show => {
            let config = TourConfig::load_or_default()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                bail!(
                    "{} already exists; pass --force to overwrite",
                    path.display()
                );
            }
            TourConfig::default().save(&path)?;
            println!("Wrote default constraints to {}", path.display());
        }
        ConfigAction::Path => println!("{}", path.display()),
    }
    Ok(())
}
