use clap::Parser;

use crate::cli::Cli;
use gltf_dropview::run;

mod cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(cli.into())
}
