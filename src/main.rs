use std::io;

use clap::Parser;
use superhub_stats::{api::SuperHubClient, config::Opts, execute};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    execute(Opts::parse(), SuperHubClient::new, io::stdout().lock())
}
