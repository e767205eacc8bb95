use std::collections::BTreeMap;

use derive_more::{Display, From};
use indexmap::IndexMap;
use itertools::Itertools;
use log::debug;
use scraper::{ElementRef, Html, Selector};

/// Positional, 1-based index of a channel column in a status page table.
/// Not to be confused with the device-assigned `Channel ID`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, From, Display)]
pub struct ChannelIdx(usize);
impl ChannelIdx {
    pub fn get(self) -> usize {
        self.0
    }
}

/// Row labels of the status pages that are looked up by name.
#[derive(Clone, Copy, PartialEq, Eq, Debug, strum::Display, strum::IntoStaticStr)]
pub enum Metric {
    #[strum(serialize = "Power Level (dBmV)")]
    PowerLevel,
    #[strum(serialize = "RxMER (dB)")]
    RxMer,
    #[strum(serialize = "Pre RS Errors")]
    PreRsErrors,
    #[strum(serialize = "Post RS Errors")]
    PostRsErrors,
    #[strum(serialize = "Channel ID")]
    ChannelId,
}
impl Metric {
    pub fn label(self) -> &'static str {
        self.into()
    }
}

/// Metric label to the raw cell text, in the order the rows appear on the page.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct ChannelRecord(IndexMap<String, String>);
impl ChannelRecord {
    pub fn get(&self, metric: &str) -> Option<&str> {
        self.0.get(metric).map(String::as_str)
    }

    pub fn channel_id(&self) -> Option<&str> {
        self.get(Metric::ChannelId.label())
    }

    pub fn metrics(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct ChannelTable(BTreeMap<ChannelIdx, ChannelRecord>);
impl ChannelTable {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, idx: ChannelIdx) -> Option<&ChannelRecord> {
        self.0.get(&idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChannelIdx, &ChannelRecord)> {
        self.0.iter().map(|(&idx, record)| (idx, record))
    }

    pub fn stat(&self, idx: ChannelIdx, metric: &str) -> Result<&str, LookupError> {
        self.get(idx)
            .ok_or(LookupError::MissingChannel(idx))?
            .get(metric)
            .ok_or_else(|| LookupError::MissingMetric {
                channel: idx,
                metric: metric.to_owned(),
            })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Expected at least 2 table rows, but found {0}")]
    NotEnoughRows(usize),
    #[error("Row {row} has no cell at column {column}")]
    MissingCell { row: usize, column: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Channel {0} is not present in the table")]
    MissingChannel(ChannelIdx),
    #[error("Metric {metric:?} is not present for channel {channel}")]
    MissingMetric { channel: ChannelIdx, metric: String },
}

/// Trims every line and glues them back together without separators.
pub fn collapse_whitespace(html: &str) -> String {
    html.lines().map(str::trim).collect()
}

/// Detaches every element matching `selector` from the document.
/// Returns the number of detached elements.
pub fn strip_elements(html: &mut Html, selector: &Selector) -> usize {
    let ids = html.select(selector).map(|e| e.id()).collect_vec();
    for &id in &ids {
        if let Some(mut node) = html.tree.get_mut(id) {
            node.detach();
        }
    }
    ids.len()
}

/// Reads the channel grid of a status page.
///
/// The first `tr` only labels the channels ("DS-1", "DS-2", ...) and is dropped.
/// The next one decides how many channels there are but is not read as a metric.
/// Every row after that contributes one metric: the first cell is its label and
/// the `c`-th cell is the value for channel `c`.
pub fn extract_channel_table(html: &Html) -> Result<ChannelTable, ExtractError> {
    let rows = html.select(selector!("tr")).collect_vec();
    if rows.len() < 2 {
        return Err(ExtractError::NotEnoughRows(rows.len()));
    }
    let channel_count = rows[1]
        .children()
        .filter_map(ElementRef::wrap)
        .count()
        .saturating_sub(1);

    let grid = rows[2..]
        .iter()
        .map(|row| row.select(selector!("td")).map(cell_text).collect_vec())
        .collect_vec();

    let mut table = BTreeMap::new();
    for c in 1..=channel_count {
        let mut record = IndexMap::new();
        for (r, cells) in grid.iter().enumerate() {
            let missing = |column| ExtractError::MissingCell { row: r + 2, column };
            let name = cells.first().ok_or_else(|| missing(0))?;
            let value = cells.get(c).ok_or_else(|| missing(c))?;
            record.insert(name.clone(), value.clone());
        }
        table.insert(ChannelIdx(c), ChannelRecord(record));
    }
    debug!(
        "Extracted {channel_count} channels with {} metric rows",
        grid.len()
    );
    Ok(ChannelTable(table))
}

fn cell_text(td: ElementRef) -> String {
    td.text().collect()
}

/// Parses a raw status page into its channel table.
pub fn parse_channel_table(raw_html: &str) -> Result<ChannelTable, ExtractError> {
    let mut html = Html::parse_document(&collapse_whitespace(raw_html));
    // Form controls sit between the cells of the downstream page.
    let stripped = strip_elements(&mut html, selector!("input"));
    if stripped > 0 {
        debug!("Stripped {stripped} input elements");
    }
    extract_channel_table(&html)
}
