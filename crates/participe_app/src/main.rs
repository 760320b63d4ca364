mod platform;

use std::process::ExitCode;

use clap::Parser;

fn main() -> anyhow::Result<ExitCode> {
    platform::run_app(platform::cli::Args::parse())
}
