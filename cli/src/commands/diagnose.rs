use anyhow::Result;
use areawalk::{CoverageBand, Overlap};

use crate::cli::{Cli, DiagnoseArgs};
use super::read_partition;

pub fn run(cli: &Cli, args: &DiagnoseArgs) -> Result<()> {
    let source = read_partition(&args.source, None)?;
    let target = read_partition(&args.target, None)?;

    let overlap = Overlap::build(&source, &target);
    let band = CoverageBand { min: args.min, max: args.max };
    let outliers = overlap.coverage_outliers(band);
    if cli.verbose > 0 {
        eprintln!(
            "[diagnose] {} of {} source regions outside [{}, {}]",
            outliers.len(), source.len(), band.min, band.max,
        );
    }

    let coverage = overlap.source_coverage();
    for &idx in &outliers {
        println!("{}\t{:.3}", idx, coverage[idx]);
    }
    Ok(())
}
