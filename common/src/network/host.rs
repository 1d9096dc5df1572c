use std::net::IpAddr;
use std::time::Duration;

/// A host that answered the ping sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveHost {
    pub ip: IpAddr,
    /// Time between our echo request and its reply.
    pub rtt: Duration,
}

impl LiveHost {
    pub fn new(ip: IpAddr, rtt: Duration) -> Self {
        Self { ip, rtt }
    }
}
