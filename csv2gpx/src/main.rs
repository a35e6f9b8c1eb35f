//! Command line tool to convert track logs to GPX
mod cli;

use cli::Cli;
use env_logger::{Builder, Target};
use thiserror::Error;

#[macro_use]
extern crate log;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    TournavError(#[from] tournav::Error),
}

pub fn main() -> Result<(), Error> {
    let mut builder = Builder::from_default_env();
    builder
        .target(Target::Stdout)
        .format_timestamp_secs()
        .format_module_path(false)
        .init();

    let cli = Cli::new();
    let cfg = cli.config()?;
    let options = cli.gpx_options(cfg.gpx);

    let input = cli.input_path();
    let (summary, output) =
        tournav::prelude::convert_file(input, cli.output_path(), &options, cli.gzip())?;

    if summary.points == 0 {
        warn!("\"{}\": no row with both coordinates", input.display());
    }

    info!(
        "{} rows converted to {} points",
        summary.rows, summary.points
    );
    println!("{} generated", output.display());
    Ok(())
}
