use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::Context;
use log::info;

use crate::stats_row::StatsRow;

/// Where full rows go.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Output {
    /// Appended to this file, which is created if missing.
    File(PathBuf),
    Stdout,
}

impl Output {
    pub fn write_row(&self, row: &StatsRow, stdout: impl Write) -> anyhow::Result<()> {
        match self {
            Output::File(path) => {
                let file = fs_err::OpenOptions::new()
                    .append(true)
                    .create(true)
                    .open(path)?;
                write_row(file, row)
                    .with_context(|| format!("While appending a row to {path:?}"))?;
                info!("Appended a row to {path:?}");
            }
            Output::Stdout => write_row(stdout, row)?,
        }
        Ok(())
    }
}

/// Writes `row` as a single CRLF-terminated CSV line with no header.
pub fn write_row<W: Write>(writer: W, row: &StatsRow) -> csv::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(row.to_record())?;
    writer.flush()?;
    Ok(())
}

/// Prints a single looked-up value. A miss prints an empty line.
pub fn print_stat<W: Write>(mut writer: W, value: Option<&str>) -> io::Result<()> {
    writeln!(writer, "{}", value.unwrap_or_default())
}
