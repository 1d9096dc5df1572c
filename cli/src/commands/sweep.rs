use std::sync::Arc;
use std::time::{Duration, Instant};

use colored::*;
use tracing::Instrument;

use crate::sprint;
use crate::terminal::{colors, format, print, spinner};
use snmpr_common::network::host::LiveHost;
use snmpr_common::network::target::{self, Target};
use snmpr_common::{config::Config, success};
use snmpr_core::discovery::{HostProber, IcmpSweeper};

pub async fn sweep(target: Target, cfg: &Config) -> anyhow::Result<()> {
    let collection = target::to_collection(target)?;

    let span = spinner::sweep_span();
    let progress_span = span.clone();
    let sweeper = IcmpSweeper::new(cfg.ping_timeout).with_progress(Arc::new(move |count: usize| {
        spinner::report_sweep_progress(&progress_span, count)
    }));

    let start_time = Instant::now();
    let hosts: Vec<LiveHost> = sweeper.sweep(collection).instrument(span).await?;
    drop(sweeper);

    sweep_ends(&hosts, start_time.elapsed(), cfg);
    Ok(())
}

fn sweep_ends(hosts: &[LiveHost], total_time: Duration, cfg: &Config) {
    if hosts.is_empty() {
        print::header("zero hosts answered", cfg.quiet);
        print::no_results();
        return;
    }

    print::header("ping sweep", cfg.quiet);
    if cfg.quiet < 2 {
        for (idx, host) in hosts.iter().enumerate() {
            print::tree_head(idx, &format::ip_colored(&host.ip).to_string());
            print::as_tree_one_level(vec![format::rtt_detail(host)]);
        }
    }

    let live: ColoredString = format!("{} live hosts", hosts.len()).bold().green();
    let time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output = format!("Sweep Complete: {live} found in {time}").color(colors::TEXT_DEFAULT);

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output.to_string());
        }
        _ => {
            sprint!();
            success!("{}", output)
        }
    }
}
