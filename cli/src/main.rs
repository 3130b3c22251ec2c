use anyhow::Result;
use clap::Parser;

use areawalk_cli::{Cli, Commands};
use areawalk_cli::commands::{convert, diagnose};

fn main() -> Result<()> {
    let cli = Cli::parse();
    match &cli.command {
        Commands::Convert(args) => convert::run(&cli, args),
        Commands::Diagnose(args) => diagnose::run(&cli, args),
    }
}
