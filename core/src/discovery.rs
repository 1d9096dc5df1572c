//! # Host Discovery
//!
//! Finds which addresses of a collection are alive by sending one ICMP
//! echo request to each and listening for replies until a deadline.
//!
//! The sweep runs over a layer-4 raw socket (see
//! [`transport`](crate::network::transport)) and therefore needs root or
//! `CAP_NET_RAW`.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pnet::packet::icmp::IcmpPacket;
use tracing::{debug, warn};

use snmpr_common::network::{host::LiveHost, range::IpCollection};
use snmpr_protocols::icmp::{self, ECHO_PAYLOAD, EchoId};

use crate::network::transport::{self, IcmpHandle};

/// Called with the running count of live hosts.
pub type ProgressFn = Arc<dyn Fn(usize) + Send + Sync>;

/// Anything able to tell which hosts of a collection are alive.
#[async_trait]
pub trait HostProber: Send + Sync {
    async fn sweep(&self, targets: IpCollection) -> anyhow::Result<Vec<LiveHost>>;
}

pub struct IcmpSweeper {
    timeout: Duration,
    on_host_found: Option<ProgressFn>,
}

impl IcmpSweeper {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout, on_host_found: None }
    }

    pub fn with_progress(mut self, on_host_found: ProgressFn) -> Self {
        self.on_host_found = Some(on_host_found);
        self
    }
}

#[async_trait]
impl HostProber for IcmpSweeper {
    async fn sweep(&self, targets: IpCollection) -> anyhow::Result<Vec<LiveHost>> {
        let targets: Vec<Ipv4Addr> = ipv4_targets(targets);
        if targets.is_empty() {
            return Ok(Vec::new());
        }

        if !is_root::is_root() {
            warn!("Not running as root, the raw ICMP socket will probably be refused");
        }

        let handle: IcmpHandle = transport::start_icmp_capture()?;
        let mut sweep = Sweep::new(targets, rand::random::<u16>());
        run_sweep(&mut sweep, handle, self.timeout, self.on_host_found.as_ref()).await?;

        Ok(sweep.into_hosts())
    }
}

/// Bookkeeping of one sweep: which probe went where, and who answered.
struct Sweep {
    identifier: u16,
    targets: Vec<Ipv4Addr>,
    sent_at: HashMap<Ipv4Addr, Instant>,
    alive: HashMap<Ipv4Addr, Duration>,
}

impl Sweep {
    fn new(targets: Vec<Ipv4Addr>, identifier: u16) -> Self {
        Self {
            identifier,
            targets,
            sent_at: HashMap::new(),
            alive: HashMap::new(),
        }
    }

    fn probe_for(&self, idx: usize) -> EchoId {
        // wraps past 65535 targets; replies are matched on identifier and source
        let sequence = (idx % (usize::from(u16::MAX) + 1)) as u16;
        EchoId { identifier: self.identifier, sequence }
    }

    /// Records a reply; returns `true` the first time a target answers.
    fn record_reply(&mut self, source: IpAddr, reply: EchoId, at: Instant) -> bool {
        let IpAddr::V4(source) = source else {
            return false;
        };
        if reply.identifier != self.identifier || self.alive.contains_key(&source) {
            return false;
        }
        let Some(sent) = self.sent_at.get(&source) else {
            return false;
        };

        self.alive.insert(source, at.saturating_duration_since(*sent));
        true
    }

    fn is_complete(&self) -> bool {
        self.alive.len() == self.targets.len()
    }

    fn into_hosts(self) -> Vec<LiveHost> {
        let mut hosts: Vec<LiveHost> = self
            .alive
            .into_iter()
            .map(|(ip, rtt)| LiveHost::new(IpAddr::V4(ip), rtt))
            .collect();
        hosts.sort_by_key(|host| host.ip);
        hosts
    }
}

async fn run_sweep(
    sweep: &mut Sweep,
    mut handle: IcmpHandle,
    timeout: Duration,
    on_host_found: Option<&ProgressFn>,
) -> anyhow::Result<()> {
    for idx in 0..sweep.targets.len() {
        let target = sweep.targets[idx];
        let bytes = icmp::create_echo_request(sweep.probe_for(idx), ECHO_PAYLOAD)?;
        let Some(packet) = IcmpPacket::new(&bytes) else {
            continue;
        };

        sweep.sent_at.insert(target, Instant::now());
        if let Err(e) = handle.tx.send_to(packet, IpAddr::V4(target)) {
            debug!("Echo request to {target} failed: {e}");
        }

        drain_replies(sweep, &mut handle, on_host_found);
    }

    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);

    while !sweep.is_complete() {
        tokio::select! {
            pkt = handle.rx.recv() => {
                match pkt {
                    Some((bytes, source)) => handle_packet(sweep, &bytes, source, on_host_found),
                    None => break,
                }
            }
            _ = &mut deadline => break,
        }
    }

    Ok(())
}

/// Consumes replies that already arrived while requests are still going out.
fn drain_replies(sweep: &mut Sweep, handle: &mut IcmpHandle, on_host_found: Option<&ProgressFn>) {
    while let Ok((bytes, source)) = handle.rx.try_recv() {
        handle_packet(sweep, &bytes, source, on_host_found);
    }
}

fn handle_packet(sweep: &mut Sweep, bytes: &[u8], source: IpAddr, on_host_found: Option<&ProgressFn>) {
    let Some(reply) = icmp::parse_echo_reply(bytes) else {
        return;
    };
    if sweep.record_reply(source, reply, Instant::now()) {
        debug!("{source} answered the sweep");
        if let Some(callback) = on_host_found {
            callback(sweep.alive.len());
        }
    }
}

fn ipv4_targets(targets: IpCollection) -> Vec<Ipv4Addr> {
    targets
        .into_iter()
        .filter_map(|ip| match ip {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(v6) => {
                warn!("Skipping {v6}: the sweep only speaks ICMPv4");
                None
            }
        })
        .collect()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
