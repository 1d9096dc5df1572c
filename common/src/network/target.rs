//! # Sweep Target Model
//!
//! Parses what the user wants swept into a [`Target`], then flattens it
//! into an [`IpCollection`].
//!
//! Accepted forms:
//! * `lan`: the private IPv4 network of the best local interface.
//! * A single IP address (`192.168.1.5`, `::1`).
//! * An IPv4 range (`192.168.1.1-100`, `192.168.1.1-192.168.2.10`).
//! * A CIDR block (`192.168.1.0/24`).
//! * A comma-separated list of any of the above.

use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use thiserror::Error;

use crate::network::interface;
use crate::network::range::{self, IpCollection, Ipv4Range};
use crate::{info, success, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Lan,
    Host { target_addr: IpAddr },
    Range { ipv4_range: Ipv4Range },
    Multi { targets: Vec<Target> },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TargetError {
    #[error("invalid target: {0}")]
    Unrecognized(String),
    #[error("invalid start IP in range '{0}'")]
    RangeStart(String),
    #[error("invalid end of range '{0}'")]
    RangeEnd(String),
    #[error("invalid CIDR block '{0}'")]
    Cidr(String),
    #[error("empty target list")]
    Empty,
}

impl FromStr for Target {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.contains(',') {
            return parse_list(s);
        }

        if s.eq_ignore_ascii_case("lan") {
            return Ok(Target::Lan);
        }

        if let Ok(target_addr) = s.parse::<IpAddr>() {
            return Ok(Target::Host { target_addr });
        }

        if let Some((start, end)) = s.split_once('-') {
            return parse_ip_range(start, end);
        }

        if let Some((ip, prefix)) = s.split_once('/') {
            return parse_cidr(ip, prefix);
        }

        Err(TargetError::Unrecognized(s.to_string()))
    }
}

/// Flattens a target into the addresses to sweep.
pub fn to_collection(target: Target) -> anyhow::Result<IpCollection> {
    let mut collection = IpCollection::new();
    resolve_target(target, &mut collection)?;

    let len: usize = collection.len();
    let unit: &str = if len == 1 { "IP address has been" } else { "IP addresses have been" };
    success!("{len} {unit} parsed successfully");

    Ok(collection)
}

fn resolve_target(target: Target, collection: &mut IpCollection) -> anyhow::Result<()> {
    match target {
        Target::Lan => {
            let Some(net) = interface::lan_network()? else {
                anyhow::bail!("no private IPv4 network found on the LAN interface");
            };
            let network: u32 = net.network().into();
            let broadcast: u32 = net.broadcast().into();

            if network.saturating_add(1) < broadcast {
                let start = Ipv4Addr::from(network + 1);
                let end = Ipv4Addr::from(broadcast - 1);
                info!("Sweeping the LAN from {start} to {end}");
                collection.add_range(Ipv4Range::new(start, end));
            } else {
                warn!("Network too small to strip broadcast, sweeping the full range");
                collection.add_range(Ipv4Range::new(net.network(), net.broadcast()));
            }
        }
        Target::Host { target_addr } => collection.add_single(target_addr),
        Target::Range { ipv4_range } => collection.add_range(ipv4_range),
        Target::Multi { targets } => {
            for target in targets {
                resolve_target(target, collection)?;
            }
        }
    }
    Ok(())
}

fn parse_list(s: &str) -> Result<Target, TargetError> {
    let targets = s
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(Target::from_str)
        .collect::<Result<Vec<Target>, _>>()?;

    if targets.is_empty() {
        return Err(TargetError::Empty);
    }
    Ok(Target::Multi { targets })
}

fn parse_ip_range(start: &str, end: &str) -> Result<Target, TargetError> {
    let start_addr = start
        .trim()
        .parse::<Ipv4Addr>()
        .map_err(|_| TargetError::RangeStart(start.to_string()))?;
    let end_addr = parse_range_end(end.trim(), start_addr)?;

    Ok(Target::Range { ipv4_range: Ipv4Range::new(start_addr, end_addr) })
}

/// `50` after `192.168.1.1` means `192.168.1.50`; `2.10` means `192.168.2.10`.
fn parse_range_end(end: &str, start_addr: Ipv4Addr) -> Result<Ipv4Addr, TargetError> {
    if let Ok(full_addr) = end.parse::<Ipv4Addr>() {
        return Ok(full_addr);
    }

    let partial: Vec<u8> = end
        .split('.')
        .map(str::parse::<u8>)
        .collect::<Result<_, _>>()
        .map_err(|_| TargetError::RangeEnd(end.to_string()))?;

    if partial.is_empty() || partial.len() > 4 {
        return Err(TargetError::RangeEnd(end.to_string()));
    }

    let mut octets = start_addr.octets();
    octets[4 - partial.len()..].copy_from_slice(&partial);
    Ok(Ipv4Addr::from(octets))
}

fn parse_cidr(ip: &str, prefix: &str) -> Result<Target, TargetError> {
    let invalid = || TargetError::Cidr(format!("{ip}/{prefix}"));

    let ipv4_addr = ip.parse::<Ipv4Addr>().map_err(|_| invalid())?;
    let prefix = prefix.parse::<u8>().map_err(|_| invalid())?;
    let ipv4_range = range::cidr_range(ipv4_addr, prefix).map_err(|_| invalid())?;

    Ok(Target::Range { ipv4_range })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
