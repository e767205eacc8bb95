use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use typed_builder::TypedBuilder;

use crate::sink::Output;

pub const DEFAULT_DEVICE: &str = "192.168.100.1";
pub const DEFAULT_OUTPUT_FILE: &str = "vm.csv";

/// Records the channel statistics of a Virgin Media SuperHub as CSV rows.
#[derive(Debug, Parser)]
#[command(version)]
pub struct Opts {
    /// Channel ID to return data for (must be used with --stat and --statgroup)
    #[arg(short, long, value_name = "CHANNEL")]
    pub channel: Option<String>,

    /// File to append rows to
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_OUTPUT_FILE)]
    pub file: PathBuf,

    /// Stat group to return data for (must be used with --channel and --stat)
    #[arg(short = 'g', long, value_enum, value_name = "STATGROUP")]
    pub statgroup: Option<StatGroup>,

    /// Address of the SuperHub
    #[arg(short, long, value_name = "IPADDRESS", default_value = DEFAULT_DEVICE)]
    pub ip: String,

    /// Statistic to return data for, e.g. "RxMER (dB)" (must be used with --channel and --statgroup)
    #[arg(short, long, value_name = "STAT")]
    pub stat: Option<String>,

    /// Write the row to stdout instead of the file
    #[arg(short = 't', long)]
    pub stdout: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
pub enum StatGroup {
    #[value(name = "us")]
    Upstream,
    #[value(name = "ds")]
    Downstream,
}

#[derive(Debug, TypedBuilder)]
pub struct Config {
    #[builder(default = DEFAULT_DEVICE.to_owned(), setter(into))]
    pub device: String,
    pub mode: Mode,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Mode {
    FullRow(Output),
    SingleStat(StatSelection),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct StatSelection {
    pub channel: String,
    pub stat: String,
    pub group: StatGroup,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("The -c, -g and -s flags must either be all set, or all not set")]
    PartialStatSelection,
}

impl Opts {
    pub fn into_config(self) -> Result<Config, ConfigError> {
        let mode = match (self.channel, self.stat, self.statgroup) {
            (None, None, None) => Mode::FullRow(if self.stdout {
                Output::Stdout
            } else {
                Output::File(self.file)
            }),
            (Some(channel), Some(stat), Some(group)) => Mode::SingleStat(StatSelection {
                channel,
                stat,
                group,
            }),
            _ => return Err(ConfigError::PartialStatSelection),
        };
        Ok(Config::builder().device(self.ip).mode(mode).build())
    }
}
