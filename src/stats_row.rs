use chrono::{Local, NaiveDateTime};
use getset::{CopyGetters, Getters};

use crate::channel_table::{ChannelIdx, ChannelTable, LookupError, Metric};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const UPSTREAM_CHANNELS: usize = 4;
pub const DOWNSTREAM_CHANNELS: usize = 8;

/// One poll of the device, in the column order of the CSV log.
#[derive(Clone, PartialEq, Eq, Debug, Getters, CopyGetters)]
pub struct StatsRow {
    #[getset(get_copy = "pub")]
    timestamp: NaiveDateTime,
    #[getset(get = "pub")]
    upstream_power: [String; UPSTREAM_CHANNELS],
    #[getset(get = "pub")]
    downstream_power: [String; DOWNSTREAM_CHANNELS],
    #[getset(get = "pub")]
    downstream_snr: [String; DOWNSTREAM_CHANNELS],
    #[getset(get = "pub")]
    downstream_pre_rs_errors: [String; DOWNSTREAM_CHANNELS],
    #[getset(get = "pub")]
    downstream_post_rs_errors: [String; DOWNSTREAM_CHANNELS],
}

impl StatsRow {
    pub const FIELD_COUNT: usize = 1 + UPSTREAM_CHANNELS + 4 * DOWNSTREAM_CHANNELS;

    pub fn now(upstream: &ChannelTable, downstream: &ChannelTable) -> Result<Self, LookupError> {
        Self::assemble(upstream, downstream, Local::now().naive_local())
    }

    /// Channels are addressed by position here, not by `Channel ID`.
    pub fn assemble(
        upstream: &ChannelTable,
        downstream: &ChannelTable,
        timestamp: NaiveDateTime,
    ) -> Result<Self, LookupError> {
        Ok(Self {
            timestamp,
            upstream_power: positional_stats(upstream, Metric::PowerLevel)?,
            downstream_power: positional_stats(downstream, Metric::PowerLevel)?,
            downstream_snr: positional_stats(downstream, Metric::RxMer)?,
            downstream_pre_rs_errors: positional_stats(downstream, Metric::PreRsErrors)?,
            downstream_post_rs_errors: positional_stats(downstream, Metric::PostRsErrors)?,
        })
    }

    pub fn to_record(&self) -> Vec<String> {
        let mut record = Vec::with_capacity(Self::FIELD_COUNT);
        record.push(self.timestamp.format(TIMESTAMP_FORMAT).to_string());
        record.extend(
            self.upstream_power
                .iter()
                .chain(&self.downstream_power)
                .chain(&self.downstream_snr)
                .chain(&self.downstream_pre_rs_errors)
                .chain(&self.downstream_post_rs_errors)
                .cloned(),
        );
        record
    }
}

fn positional_stats<const N: usize>(
    table: &ChannelTable,
    metric: Metric,
) -> Result<[String; N], LookupError> {
    let mut stats: [String; N] = std::array::from_fn(|_| String::new());
    for (i, stat) in stats.iter_mut().enumerate() {
        *stat = table.stat(ChannelIdx::from(i + 1), metric.label())?.to_owned();
    }
    Ok(stats)
}

/// Looks up `stat` on the channel whose `Channel ID` cell reads `channel_id`.
///
/// Unlike [`StatsRow::assemble`], this matches on the value the device reports
/// rather than on column position. Channels are scanned in column order, and one
/// without a `Channel ID` before the match is a [`LookupError::MissingMetric`].
/// Returns `Ok(None)` if no channel matches.
pub fn find_channel_stat<'a>(
    table: &'a ChannelTable,
    channel_id: &str,
    stat: &str,
) -> Result<Option<&'a str>, LookupError> {
    for (idx, _) in table.iter() {
        if table.stat(idx, Metric::ChannelId.label())? == channel_id {
            return table.stat(idx, stat).map(Some);
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::{find_channel_stat, StatsRow, TIMESTAMP_FORMAT};
    use crate::channel_table::{parse_channel_table, ChannelTable, LookupError};

    const UPSTREAM_HTML: &str = include_str!("../fixtures/upstream.html");
    const DOWNSTREAM_HTML: &str = include_str!("../fixtures/downstream.html");

    fn tables() -> (ChannelTable, ChannelTable) {
        (
            parse_channel_table(UPSTREAM_HTML).unwrap(),
            parse_channel_table(DOWNSTREAM_HTML).unwrap(),
        )
    }

    #[test]
    fn assemble_row() {
        let (upstream, downstream) = tables();
        let timestamp = NaiveDateTime::parse_from_str("2026-10-16 08:30:05", TIMESTAMP_FORMAT)
            .unwrap();
        let row = StatsRow::assemble(&upstream, &downstream, timestamp).unwrap();
        assert_eq!(row.timestamp(), timestamp);
        assert_eq!(row.downstream_snr()[4], "38.0");
        let record = row.to_record();
        assert_eq!(record.len(), StatsRow::FIELD_COUNT);
        assert_eq!(record.len(), 37);
        assert_eq!(record[0], "2026-10-16 08:30:05");
        assert_eq!(record[1..5], ["45.25", "44.75", "44.50", "45.00"]);
        assert_eq!(
            record[5..13],
            ["4.2", "3.9", "3.5", "3.6", "4.0", "3.8", "3.4", "3.1"]
        );
        assert_eq!(
            record[13..21],
            ["38.6", "38.9", "38.2", "37.6", "38.0", "38.4", "37.9", "38.1"]
        );
        assert_eq!(
            record[21..29],
            ["12", "0", "7", "3", "150", "0", "1", "44"]
        );
        assert_eq!(record[29..], ["0", "0", "0", "0", "2", "0", "0", "1"]);
    }

    #[test]
    fn now_is_formatted() {
        let (upstream, downstream) = tables();
        let record = StatsRow::now(&upstream, &downstream).unwrap().to_record();
        assert_eq!(record[0].len(), "YYYY-MM-DD HH:MM:SS".len());
        assert!(NaiveDateTime::parse_from_str(&record[0], TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn too_few_downstream_channels() {
        let (upstream, _) = tables();
        // The upstream page only has 4 channels.
        assert!(matches!(
            StatsRow::now(&upstream, &upstream),
            Err(LookupError::MissingChannel(idx)) if idx.get() == 5
        ));
    }

    #[test]
    fn channel_stat_by_channel_id() {
        let (upstream, downstream) = tables();
        // Channel ID 3 is the fifth column, while the third column is Channel ID 27.
        assert_eq!(
            find_channel_stat(&downstream, "3", "RxMER (dB)").unwrap(),
            Some("38.0")
        );
        assert_eq!(
            find_channel_stat(&downstream, "27", "RxMER (dB)").unwrap(),
            Some("38.2")
        );
        assert_eq!(
            find_channel_stat(&upstream, "3", "Power Level (dBmV)").unwrap(),
            Some("44.50")
        );
        assert_eq!(
            find_channel_stat(&downstream, "99", "RxMER (dB)").unwrap(),
            None
        );
        assert!(matches!(
            find_channel_stat(&downstream, "3", "No Such Stat"),
            Err(LookupError::MissingMetric { .. })
        ));
    }

    #[test]
    fn channel_stat_without_channel_ids() {
        let html = UPSTREAM_HTML.replace("<td>Channel ID</td>", "<td>Channel Number</td>");
        let upstream = parse_channel_table(&html).unwrap();
        assert!(matches!(
            find_channel_stat(&upstream, "3", "Power Level (dBmV)"),
            Err(LookupError::MissingMetric { channel, metric })
                if channel.get() == 1 && metric == "Channel ID"
        ));
    }
}
