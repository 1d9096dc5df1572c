use std::sync::Arc;

use colored::*;
use tracing::{Instrument, Span};

use crate::sprint;
use crate::terminal::{colors, format, print, spinner};
use snmpr_common::network::target::{self, Target};
use snmpr_common::oid::{FULL_CATALOGUE, QUICK_CATALOGUE};
use snmpr_common::snmp::SnmpSettings;
use snmpr_common::{config::Config, success};
use snmpr_core::discovery::IcmpSweeper;
use snmpr_core::scanner::{ScanEvent, ScanObserver, ScanReport, ScanService};
use snmpr_core::snmp::SessionConnector;
use snmpr_core::store::JsonFileStore;

pub async fn scan(target: Target, quick: bool, settings: SnmpSettings, cfg: &Config) -> anyhow::Result<()> {
    let collection = target::to_collection(target)?;
    let connector = SessionConnector::new(settings)?;
    let catalogue = if quick { QUICK_CATALOGUE } else { FULL_CATALOGUE };

    let span = spinner::scan_span();
    let service = ScanService::new(
        Box::new(sweeper(cfg, span.clone())),
        Arc::new(connector),
        Arc::new(JsonFileStore::new(&cfg.database_dir)),
    )
    .with_catalogue(catalogue)
    .with_concurrency(cfg.concurrency)
    .with_observer(observer(span.clone()));

    let report = service.perform_scan(collection).instrument(span).await?;
    drop(service);

    scan_ends(&report, cfg);
    Ok(())
}

fn sweeper(cfg: &Config, span: Span) -> IcmpSweeper {
    IcmpSweeper::new(cfg.ping_timeout)
        .with_progress(Arc::new(move |count: usize| spinner::report_sweep_progress(&span, count)))
}

fn observer(span: Span) -> ScanObserver {
    Arc::new(move |event: ScanEvent| match event {
        ScanEvent::SweepFinished { live } => spinner::start_polling(&span, live),
        ScanEvent::HostPolled { ip, values } => {
            spinner::report_host_polled(&span, &ip.to_string(), values)
        }
    })
}

fn scan_ends(report: &ScanReport, cfg: &Config) {
    if report.live_hosts.is_empty() {
        print::header("zero hosts answered", cfg.quiet);
        print::no_results();
        return;
    }

    if report.records.is_empty() {
        print::header("no SNMP agents", cfg.quiet);
    } else {
        print::header("SNMP scan", cfg.quiet);
        print_records(report, cfg);
    }

    if !report.silent.is_empty() && cfg.quiet == 0 {
        sprint!();
        let silent: Vec<String> = report.silent.iter().map(ToString::to_string).collect();
        print::aligned_line("No SNMP answer", silent.join(", "));
    }

    print_summary(report, cfg);
}

fn print_records(report: &ScanReport, cfg: &Config) {
    for (idx, record) in report.records.iter().enumerate() {
        if cfg.quiet < 2 {
            print::tree_head(idx, &format::ip_colored(&record.ip).to_string());
            print::as_tree_one_level(format::record_to_details(record));
        }
        if idx + 1 != report.records.len() && cfg.quiet == 0 {
            sprint!();
        }
    }
}

fn print_summary(report: &ScanReport, cfg: &Config) {
    let agents: ColoredString = format!("{} SNMP agents", report.records.len()).bold().green();
    let live: ColoredString = format!("{} live hosts", report.live_hosts.len()).bold();
    let time: ColoredString = format!("{:.2}s", report.duration.as_secs_f64()).bold().yellow();
    let output = format!("Scan Complete: {agents} among {live} in {time}").color(colors::TEXT_DEFAULT);

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output.to_string());
            if !report.records.is_empty() {
                print::aligned_line("Records", cfg.database_dir.display().to_string());
            }
        }
        _ => {
            sprint!();
            success!("{}", output)
        }
    }
}
