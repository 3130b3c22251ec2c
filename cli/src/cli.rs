use clap::{Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

/// Areal interpolation CLI (argument schema only)
#[derive(Parser, Debug)]
#[command(name = "areawalk", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert attribute columns from one boundary set onto another
    Convert(ConvertArgs),

    /// Report source regions not properly accounted for by the target set
    Diagnose(DiagnoseArgs),
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Source boundaries carrying the data to convert (.shp or .geojson)
    #[arg(value_hint = ValueHint::FilePath)]
    pub source: PathBuf,

    /// Target boundaries to convert onto (.shp or .geojson)
    #[arg(value_hint = ValueHint::FilePath)]
    pub target: PathBuf,

    /// Comma-separated attribute columns to convert
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub columns: Vec<String>,

    /// Output table (.csv) or feature collection (.geojson)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Minimum coverage a target region needs to keep its converted value
    #[arg(long, default_value_t = areawalk::DEFAULT_COVERAGE_THRESHOLD)]
    pub threshold: f64,

    /// EPSG code the inputs are expressed in (must be planar equal-area)
    #[arg(long)]
    pub epsg: Option<u32>,

    /// Overwrite if the output file exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct DiagnoseArgs {
    /// Source boundaries (.shp or .geojson)
    #[arg(value_hint = ValueHint::FilePath)]
    pub source: PathBuf,

    /// Target boundaries (.shp or .geojson)
    #[arg(value_hint = ValueHint::FilePath)]
    pub target: PathBuf,

    /// Lower edge of the acceptance band on accounted share
    #[arg(long, default_value_t = 0.95)]
    pub min: f64,

    /// Upper edge of the acceptance band on accounted share
    #[arg(long, default_value_t = 1.05)]
    pub max: f64,
}
