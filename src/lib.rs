#[macro_use]
pub mod macros;

pub mod api;
pub mod channel_table;
pub mod config;
pub mod sink;
pub mod stats_row;

use std::io::Write;

use anyhow::Context;
use log::{info, warn};

use crate::{
    api::{StatusPage, StatusSource},
    channel_table::{parse_channel_table, ChannelTable},
    config::{Config, Mode, Opts, StatGroup},
    sink::print_stat,
    stats_row::{find_channel_stat, StatsRow},
};

/// Validates `opts`, and only then connects to the device and runs one poll.
pub fn execute<S, F>(opts: Opts, connect: F, stdout: impl Write) -> anyhow::Result<()>
where
    S: StatusSource,
    F: FnOnce(&str) -> anyhow::Result<S>,
{
    let config = opts.into_config()?;
    let source = connect(&config.device)?;
    run(&config, &source, stdout)
}

/// Fetches both status pages and writes either the full row or the selected stat.
pub fn run(config: &Config, source: &impl StatusSource, stdout: impl Write) -> anyhow::Result<()> {
    let upstream = fetch_table(source, StatusPage::Upstream)?;
    let downstream = fetch_table(source, StatusPage::Downstream)?;
    // Assembled in both modes so that a page of the wrong shape is never reported from.
    let row = StatsRow::now(&upstream, &downstream)
        .context("The status pages do not have the expected channels")?;

    match &config.mode {
        Mode::FullRow(output) => output.write_row(&row, stdout)?,
        Mode::SingleStat(selection) => {
            let table = match selection.group {
                StatGroup::Upstream => &upstream,
                StatGroup::Downstream => &downstream,
            };
            let value = find_channel_stat(table, &selection.channel, &selection.stat)?;
            match value {
                Some(value) => info!(
                    "{} of channel {} is {value:?}",
                    selection.stat, selection.channel
                ),
                None => warn!("No channel has Channel ID {:?}", selection.channel),
            }
            print_stat(stdout, value)?;
        }
    }
    Ok(())
}

fn fetch_table(source: &impl StatusSource, page: StatusPage) -> anyhow::Result<ChannelTable> {
    let html = source
        .fetch(page)
        .with_context(|| format!("While fetching the {page} status page"))?;
    let table = parse_channel_table(&html)
        .with_context(|| format!("While reading the {page} status page"))?;
    info!("Read {} channels from the {page} status page", table.len());
    Ok(table)
}
