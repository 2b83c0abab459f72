#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the urban growth analyzer.
//!
//! Reads one postal code (from the command line, or interactively via
//! `dialoguer` when omitted), prints the report as JSON, and optionally
//! writes an illustrative SVG bar chart.
//!
//! Growth metrics in the report are non-authoritative placeholders.

mod chart;

use std::path::PathBuf;

use clap::Parser;
use dialoguer::Input;
use urban_growth_analysis::{Analyzer, AnalyzerConfig};
use urban_growth_models::{AreaUnit, PostalCode};

#[derive(Parser)]
#[command(
    name = "urban_growth",
    about = "Land-use summary and placeholder growth indicators for a postal code"
)]
struct Cli {
    /// Postal code to analyze. Prompted for when omitted.
    postal_code: Option<String>,
    /// Analyzer configuration TOML file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Skip the live postal lookup and use only the built-in table
    #[arg(long)]
    no_live_lookup: bool,
    /// Feature search radius in metres (default: 10000)
    #[arg(long)]
    radius_m: Option<f64>,
    /// Unit of the reported land-use area (`square_degrees` or `square_meters`)
    #[arg(long)]
    area_unit: Option<AreaUnit>,
    /// Timeout for each HTTP request, in seconds (default: 10)
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Omit the placeholder growth metrics from the report
    #[arg(long)]
    no_growth: bool,
    /// Write an illustrative SVG bar chart of land-use types to this path
    #[arg(long)]
    chart: Option<PathBuf>,
}

impl Cli {
    fn analyzer_config(&self) -> Result<AnalyzerConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => AnalyzerConfig::load(path)?,
            None => AnalyzerConfig::default(),
        };

        if self.no_live_lookup {
            config.live_lookup = false;
        }
        if self.no_growth {
            config.include_growth = false;
        }
        if let Some(radius_m) = self.radius_m {
            config.radius_m = radius_m;
        }
        if let Some(area_unit) = self.area_unit {
            config.area_unit = area_unit;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.http_timeout_secs = timeout_secs;
        }

        config.validate()?;
        Ok(config)
    }
}

fn prompt_postal_code() -> Result<String, dialoguer::Error> {
    Input::new().with_prompt("Postal code").interact_text()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = cli.analyzer_config()?;
    let analyzer = Analyzer::from_config(&config)?;

    let raw = match &cli.postal_code {
        Some(code) => code.clone(),
        None => prompt_postal_code()?,
    };
    let postal_code = PostalCode::new(raw)?;

    let report = analyzer.build(&postal_code).await;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(path) = &cli.chart {
        let shares = chart::synthetic_shares(&report, &mut rand::thread_rng());
        let title = format!("Land use around {postal_code} (illustrative)");
        std::fs::write(path, chart::render_svg(&title, &shares))?;
        log::info!("Wrote chart to {}", path.display());
    }

    Ok(())
}
