use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    /// Yields every address from start to end inclusive. A reversed range is empty.
    pub fn to_iter(&self) -> impl Iterator<Item = IpAddr> {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        (start..=end).map(|ip| IpAddr::V4(Ipv4Addr::from(ip)))
    }

    pub fn len(&self) -> usize {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        if end < start { 0 } else { (end - start) as usize + 1 }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn cidr_range(ip: Ipv4Addr, prefix: u8) -> anyhow::Result<Ipv4Range> {
    let network = pnet::ipnetwork::Ipv4Network::new(ip, prefix)?;
    let start = network.network();
    let end = network.broadcast();

    Ok(Ipv4Range::new(start, end))
}

/// Addresses to sweep: explicit hosts plus IPv4 ranges kept unexpanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpCollection {
    pub singles: BTreeSet<IpAddr>,
    pub ranges: Vec<Ipv4Range>,
}

impl IpCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_single(&mut self, ip: IpAddr) {
        self.singles.insert(ip);
    }

    pub fn add_range(&mut self, range: Ipv4Range) {
        self.ranges.push(range);
    }

    /// Every distinct address, in ascending order.
    pub fn addresses(&self) -> BTreeSet<IpAddr> {
        let mut all = self.singles.clone();
        for range in &self.ranges {
            all.extend(range.to_iter());
        }
        all
    }

    /// Number of distinct addresses, counted without expanding the ranges.
    pub fn len(&self) -> usize {
        let merged = self.merged_ranges();
        let in_ranges: usize = merged
            .iter()
            .map(|&(start, end)| (end - start) as usize + 1)
            .sum();
        let outside = self
            .singles
            .iter()
            .filter(|ip| match ip {
                IpAddr::V4(v4) => {
                    let n = u32::from(*v4);
                    !merged.iter().any(|&(start, end)| start <= n && n <= end)
                }
                IpAddr::V6(_) => true,
            })
            .count();
        in_ranges + outside
    }

    pub fn is_empty(&self) -> bool {
        self.singles.is_empty() && self.ranges.iter().all(Ipv4Range::is_empty)
    }

    /// Non-empty ranges as sorted, disjoint `(start, end)` pairs.
    fn merged_ranges(&self) -> Vec<(u32, u32)> {
        let mut spans: Vec<(u32, u32)> = self
            .ranges
            .iter()
            .filter(|range| !range.is_empty())
            .map(|range| (range.start_addr.into(), range.end_addr.into()))
            .collect();
        spans.sort_unstable();

        let mut merged: Vec<(u32, u32)> = Vec::with_capacity(spans.len());
        for (start, end) in spans {
            match merged.last_mut() {
                Some((_, last_end)) if start <= last_end.saturating_add(1) => {
                    *last_end = (*last_end).max(end);
                }
                _ => merged.push((start, end)),
            }
        }
        merged
    }
}

impl IntoIterator for IpCollection {
    type Item = IpAddr;
    type IntoIter = std::collections::btree_set::IntoIter<IpAddr>;

    fn into_iter(self) -> Self::IntoIter {
        self.addresses().into_iter()
    }
}
