use colored::*;
use indicatif::ProgressStyle;
use tracing::{Span, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::terminal::colors;

const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICKS)
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} [{bar:30.green/white}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .tick_strings(TICKS)
        .progress_chars("█▓░")
}

pub fn sweep_span() -> Span {
    with_spinner(info_span!("sweep", indicatif.pb_show = true), "Sending echo requests...")
}

pub fn scan_span() -> Span {
    with_spinner(info_span!("scan", indicatif.pb_show = true), "Sweeping the targets...")
}

fn with_spinner(span: Span, message: &str) -> Span {
    span.pb_set_style(&spinner_style());
    span.pb_set_message(message);
    span
}

pub fn report_sweep_progress(span: &Span, count: usize) {
    let hosts = format!("{count} hosts").green().bold();
    let msg = format!("Identified {hosts} so far...").color(colors::TEXT_DEFAULT);
    span.pb_set_message(&msg.to_string());
}

/// Turns the spinner into a bar counting polled hosts.
pub fn start_polling(span: &Span, hosts: usize) {
    span.pb_set_style(&bar_style());
    span.pb_set_length(hosts as u64);
    span.pb_set_message("polling SNMP agents");
}

pub fn report_host_polled(span: &Span, ip: &str, values: usize) {
    span.pb_inc(1);
    span.pb_set_message(&format!("{ip}: {values} values"));
}
