#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for parcel zoning lookups and acquisition
//! analytics.
//!
//! ```text
//! acquisitions lookup "1200 MAIN ST"
//! acquisitions zoning --lat 32.7555 --lon -97.3308
//! acquisitions undervalued --subdivision "OAK HILLS"
//! acquisitions distressed --subdivision "OAK HILLS"
//! acquisitions poor --subdivision "OAK HILLS"
//! acquisitions large-land [--min-acres 10] [--max-acres 200] [--min-miles 10]
//! ```
//!
//! Results are printed to stdout as pretty JSON. Logs and progress go to
//! stderr through [`acquisitions_cli_utils::init_logger`].

mod config;

use std::path::PathBuf;

use acquisitions_analytics::{
    find_distressed, find_large_land_far, find_poor_condition, find_undervalued_in_subdivision,
    is_large_land,
};
use acquisitions_analytics_models::LargeLandCriteria;
use acquisitions_cli_utils::{IndicatifProgress, MultiProgress};
use acquisitions_geography::LambertConformalConic;
use acquisitions_geography_models::GeoPoint;
use acquisitions_parcel_models::{Parcel, normalize_address};
use acquisitions_source::ParcelSource;
use acquisitions_source::flat_file::FlatFileSource;
use acquisitions_spatial::{PolygonSet, ZoningLookup, ZoningResolver, load_layers};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::AppConfig;

#[derive(Parser)]
#[command(
    name = "acquisitions",
    about = "Zoning lookups and comparative-market analytics over appraisal district parcels"
)]
struct Cli {
    /// Config file (defaults to ./acquisitions.toml when present)
    #[arg(long, global = true, env = "ACQUISITIONS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a parcel's current and prior records with its zoning
    Lookup {
        /// Situs address, e.g. "1200 Main St"
        address: String,
    },
    /// Resolve the zoning designation at a coordinate
    Zoning {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },
    /// Parcels with improvement values one sigma below nearby comps
    Undervalued {
        #[arg(long)]
        subdivision: String,
    },
    /// Parcels priced well below their subdivision with distress signals
    Distressed {
        #[arg(long)]
        subdivision: String,
    },
    /// Parcels in "Poor" condition
    Poor {
        #[arg(long)]
        subdivision: String,
    },
    /// Large tracts far from the reference point
    LargeLand {
        #[arg(long)]
        min_acres: Option<f64>,
        #[arg(long)]
        max_acres: Option<f64>,
        /// Parcels must lie strictly farther than this many miles away
        #[arg(long)]
        min_miles: Option<f64>,
        #[arg(long, allow_negative_numbers = true, requires = "ref_lon")]
        ref_lat: Option<f64>,
        #[arg(long, allow_negative_numbers = true, requires = "ref_lat")]
        ref_lon: Option<f64>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupReport<'a> {
    address: String,
    current: Option<Parcel>,
    prior: Option<Parcel>,
    zoning: Option<ZoningLookup<'a>>,
}

type BoxError = Box<dyn std::error::Error>;

fn main() -> Result<(), BoxError> {
    let multi = acquisitions_cli_utils::init_logger();
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Lookup { address } => lookup(&config, &multi, &address),
        Commands::Zoning { lat, lon } => {
            let resolver = load_resolver(&config);
            print_json(&resolver.resolve(GeoPoint::new(lat, lon)))
        }
        Commands::Undervalued { subdivision } => {
            let universe = all_parcels(&load_current(&config, &multi)?);
            let results =
                find_undervalued_in_subdivision(&subdivision, &universe, &config.undervaluation);
            log::info!("Found {} undervalued parcels in {subdivision}", results.len());
            print_json(&results)
        }
        Commands::Distressed { subdivision } => distressed(&config, &multi, &subdivision),
        Commands::Poor { subdivision } => {
            let parcels = load_current(&config, &multi)?.by_subdivision(&subdivision)?;
            let results = find_poor_condition(&subdivision, &parcels);
            log::info!("Found {} poor-condition parcels in {subdivision}", results.len());
            print_json(&results)
        }
        Commands::LargeLand {
            min_acres,
            max_acres,
            min_miles,
            ref_lat,
            ref_lon,
        } => {
            let mut criteria = config.large_land;
            if let Some(min_acres) = min_acres {
                criteria.min_acres = min_acres;
            }
            if let Some(max_acres) = max_acres {
                criteria.max_acres = max_acres;
            }
            if let Some(min_miles) = min_miles {
                criteria.min_miles = min_miles;
            }
            if let (Some(lat), Some(lon)) = (ref_lat, ref_lon) {
                criteria.reference = GeoPoint::new(lat, lon);
            }
            large_land(&config, &multi, &criteria)
        }
    }
}

fn lookup(config: &AppConfig, multi: &MultiProgress, address: &str) -> Result<(), BoxError> {
    let current = load_current(config, multi)?;
    let prior = load_prior(config, multi);
    let resolver = load_resolver(config);

    let key = normalize_address(address);
    let current = current.by_address(&key)?;
    let prior = match &prior {
        Some(prior) => prior.by_address(&key)?,
        None => None,
    };
    if current.is_none() && prior.is_some() {
        log::info!("No current record for {key}; using the prior period");
    }

    let zoning = current
        .as_ref()
        .or(prior.as_ref())
        .and_then(Parcel::coordinates)
        .map(|(lat, lon)| resolver.resolve(GeoPoint::new(lat, lon)));

    print_json(&LookupReport {
        address: key,
        current,
        prior,
        zoning,
    })
}

fn distressed(config: &AppConfig, multi: &MultiProgress, subdivision: &str) -> Result<(), BoxError> {
    let universe = all_parcels(&load_current(config, multi)?);
    let prior = load_prior(config, multi);
    let today = chrono::Local::now().date_naive();
    let results = find_distressed(
        subdivision,
        &universe,
        prior.as_ref().map(|p| p as &dyn ParcelSource),
        today,
        &config.distress,
    );
    log::info!("Found {} distressed parcels in {subdivision}", results.len());
    print_json(&results)
}

fn large_land(
    config: &AppConfig,
    multi: &MultiProgress,
    criteria: &LargeLandCriteria,
) -> Result<(), BoxError> {
    let candidates =
        load_current(config, multi)?.filtered(&|parcel| is_large_land(parcel, criteria))?;
    let results = find_large_land_far(&candidates, criteria);
    log::info!(
        "Found {} parcels of {}-{} acres more than {} miles from ({}, {})",
        results.len(),
        criteria.min_acres,
        criteria.max_acres,
        criteria.min_miles,
        criteria.reference.lat,
        criteria.reference.lon
    );
    print_json(&results)
}

fn load_current(
    config: &AppConfig,
    multi: &MultiProgress,
) -> Result<FlatFileSource, acquisitions_source::SourceError> {
    let progress = IndicatifProgress::lines_spinner(multi, "Loading parcels");
    FlatFileSource::load(
        &config.data.primary,
        config.data.supplemental.as_deref(),
        config.data.delimiter,
        progress.as_ref(),
    )
}

/// The prior period is optional: when it cannot be read, tax-shock signals
/// and prior lookups are simply unavailable.
fn load_prior(config: &AppConfig, multi: &MultiProgress) -> Option<FlatFileSource> {
    let path = config.data.prior.as_deref()?;
    let progress = IndicatifProgress::lines_spinner(multi, "Loading prior period");
    match FlatFileSource::load(path, None, config.data.delimiter, progress.as_ref()) {
        Ok(source) => Some(source),
        Err(e) => {
            log::warn!("Prior period unavailable ({}): {e}", path.display());
            None
        }
    }
}

/// Loads the configured zoning layers. A failed load leaves zoning
/// disabled: every lookup reports not found.
fn load_resolver(config: &AppConfig) -> ZoningResolver {
    let projection = LambertConformalConic::new(config.projection_params());
    let polygons = load_layers(&config.zoning.paths()).unwrap_or_else(|e| {
        log::warn!("Zoning unavailable: {e}");
        PolygonSet::empty()
    });
    ZoningResolver::new(projection, polygons)
}

fn all_parcels(source: &FlatFileSource) -> Vec<Parcel> {
    source.parcels().cloned().collect()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), BoxError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_negative_coordinates() {
        let cli = Cli::try_parse_from(["acquisitions", "zoning", "--lat", "32.75", "--lon", "-97.33"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Zoning { lat, lon } if (lat - 32.75).abs() < 1e-9 && (lon + 97.33).abs() < 1e-9
        ));
    }

    #[test]
    fn reference_point_requires_both_coordinates() {
        assert!(
            Cli::try_parse_from(["acquisitions", "large-land", "--ref-lat", "33.0"]).is_err()
        );
        let cli = Cli::try_parse_from([
            "acquisitions",
            "large-land",
            "--min-acres",
            "25",
            "--ref-lat",
            "33.0",
            "--ref-lon",
            "-97.0",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::LargeLand {
                min_acres: Some(_),
                max_acres: None,
                ref_lat: Some(_),
                ..
            }
        ));
    }
}
