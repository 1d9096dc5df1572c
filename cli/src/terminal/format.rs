use std::net::IpAddr;

use colored::*;
use snmpr_common::network::host::LiveHost;
use snmpr_common::record::{HostRecord, RecordValue};

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

/// Columns longer than this are cut in the terminal; the file has them all.
const MAX_COLUMN_ITEMS: usize = 4;
const MAX_VALUE_CHARS: usize = 60;

pub fn record_to_details(record: &HostRecord) -> Vec<Detail> {
    record
        .values
        .iter()
        .map(|(name, value)| (name.to_string(), record_value(value)))
        .collect()
}

fn record_value(value: &RecordValue) -> ColoredString {
    match value {
        RecordValue::Scalar(text) => shorten(first_line(text)).normal(),
        RecordValue::Column(items) => {
            let shown: Vec<&str> = items
                .iter()
                .take(MAX_COLUMN_ITEMS)
                .map(|item| first_line(item))
                .collect();
            let mut joined = shown.join(", ");
            if items.len() > MAX_COLUMN_ITEMS {
                joined.push_str(&format!(" (+{} more)", items.len() - MAX_COLUMN_ITEMS));
            }
            format!("[{}]", shorten(&joined)).color(colors::SECONDARY)
        }
    }
}

pub fn rtt_detail(host: &LiveHost) -> Detail {
    let millis = format!("{:.2} ms", host.rtt.as_secs_f64() * 1000.0);
    ("RTT".to_string(), millis.color(colors::RTT))
}

pub fn ip_colored(ip: &IpAddr) -> ColoredString {
    match ip {
        IpAddr::V4(v4) => v4.to_string().color(colors::IPV4_ADDR),
        IpAddr::V6(v6) => v6.to_string().color(colors::IPV6_ADDR),
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("").trim_end()
}

fn shorten(text: &str) -> String {
    if text.chars().count() <= MAX_VALUE_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(MAX_VALUE_CHARS - 3).collect();
    format!("{cut}...")
}
