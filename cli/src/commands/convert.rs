use anyhow::{bail, Result};
use areawalk::{Converter, Overlap};

use crate::cli::{Cli, ConvertArgs};
use super::{read_partition, write_partition};

pub fn run(cli: &Cli, args: &ConvertArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        bail!("Output file already exists: {} (use --force to overwrite)", args.output.display());
    }

    let source = read_partition(&args.source, args.epsg)?;
    let target = read_partition(&args.target, args.epsg)?;
    if cli.verbose > 0 {
        eprintln!("[convert] {} source regions -> {} target regions", source.len(), target.len());
    }

    let overlap = Overlap::build(&source, &target);
    let converter = Converter { coverage_threshold: args.threshold };
    let columns = args.columns.iter().map(String::as_str).collect::<Vec<_>>();
    let converted = converter.convert(&source, &target, &overlap, &columns)?;

    write_partition(&args.output, &converted)?;
    if cli.verbose > 0 {
        eprintln!("[convert] wrote {}", args.output.display());
    }
    Ok(())
}
