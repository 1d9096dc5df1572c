//! Picks the local interface whose network the `lan` target sweeps.

use pnet::datalink::NetworkInterface;
use pnet::ipnetwork::{IpNetwork, Ipv4Network};

#[cfg(target_os = "linux")]
use linux_impl::{is_physical, is_wireless};
#[cfg(not(target_os = "linux"))]
use fallback_impl::{is_physical, is_wireless};

/// Why an interface cannot be used to sweep the LAN.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Unsuitable {
    IsDown,
    IsLoopback,
    NotPhysical,
    NotBroadcast,
    IsPointToPoint,
    /// No private IPv4 address, so there is no LAN range to derive.
    NoPrivateIpv4,
}

/// Private IPv4 network of the best LAN interface, if any.
pub fn lan_network() -> anyhow::Result<Option<Ipv4Network>> {
    let candidates: Vec<NetworkInterface> = pnet::datalink::interfaces()
        .into_iter()
        .filter(|intf| check_lan_interface(intf, is_physical).is_ok())
        .collect();

    let Some(interface) = select_lan_interface(candidates, is_wired) else {
        anyhow::bail!("No interfaces available for LAN discovery");
    };

    Ok(private_ipv4(&interface))
}

fn private_ipv4(interface: &NetworkInterface) -> Option<Ipv4Network> {
    interface.ips.iter().find_map(|net| match net {
        IpNetwork::V4(v4) if v4.ip().is_private() => Some(*v4),
        _ => None,
    })
}

fn check_lan_interface(
    interface: &NetworkInterface,
    is_physical: impl Fn(&NetworkInterface) -> bool,
) -> Result<(), Unsuitable> {
    if !interface.is_up() {
        return Err(Unsuitable::IsDown);
    }
    if interface.is_loopback() {
        return Err(Unsuitable::IsLoopback);
    }
    if !is_physical(interface) {
        return Err(Unsuitable::NotPhysical);
    }
    if !interface.is_broadcast() {
        return Err(Unsuitable::NotBroadcast);
    }
    if interface.is_point_to_point() {
        return Err(Unsuitable::IsPointToPoint);
    }
    if private_ipv4(interface).is_none() {
        return Err(Unsuitable::NoPrivateIpv4);
    }
    Ok(())
}

/// Wired wins over wireless; otherwise the first candidate.
fn select_lan_interface(
    candidates: Vec<NetworkInterface>,
    is_wired: impl Fn(&NetworkInterface) -> bool,
) -> Option<NetworkInterface> {
    let wired = candidates.iter().position(|intf| is_wired(intf));
    let idx = wired.unwrap_or(0);
    candidates.into_iter().nth(idx)
}

fn is_wired(interface: &NetworkInterface) -> bool {
    is_physical(interface) && !is_wireless(interface)
}

#[cfg(target_os = "linux")]
mod linux_impl {
    use super::*;
    use std::path::Path;

    pub fn is_physical(interface: &NetworkInterface) -> bool {
        Path::new(&format!("/sys/class/net/{}/device", interface.name)).exists()
    }

    pub fn is_wireless(interface: &NetworkInterface) -> bool {
        Path::new(&format!("/sys/class/net/{}/wireless", interface.name)).exists()
    }
}

// Without sysfs, trust the kernel flags and guess wireless from the name.
#[cfg(not(target_os = "linux"))]
mod fallback_impl {
    use super::*;

    pub fn is_physical(interface: &NetworkInterface) -> bool {
        interface.mac.is_some()
    }

    pub fn is_wireless(interface: &NetworkInterface) -> bool {
        interface.name.starts_with("wl")
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
