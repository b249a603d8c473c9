use std::process::ExitCode;

use clap::Parser;

use pixelfe::cli::{self, CliArgs};
use pixelfe::logger;

fn main() -> ExitCode {
    logger::init();
    cli::run(CliArgs::parse())
}
