use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use snmpr_common::error::{SnmpError, SnmpResult};
use snmpr_common::network::host::LiveHost;
use snmpr_common::network::range::IpCollection;
use snmpr_common::snmp::VarBind;
use snmpr_core::discovery::HostProber;
use snmpr_core::snmp::{AgentConnector, SnmpAgent};

/// Answers the sweep with the targets listed in `alive`.
pub struct FakeProber {
    pub alive: Vec<IpAddr>,
}

#[async_trait]
impl HostProber for FakeProber {
    async fn sweep(&self, targets: IpCollection) -> anyhow::Result<Vec<LiveHost>> {
        Ok(targets
            .addresses()
            .into_iter()
            .filter(|ip| self.alive.contains(ip))
            .map(|ip| LiveHost::new(ip, Duration::from_millis(1)))
            .collect())
    }
}

pub struct BrokenProber;

#[async_trait]
impl HostProber for BrokenProber {
    async fn sweep(&self, _targets: IpCollection) -> anyhow::Result<Vec<LiveHost>> {
        anyhow::bail!("opening raw ICMP socket (requires root or CAP_NET_RAW)")
    }
}

#[derive(Clone, Copy)]
pub enum Behaviour {
    /// Answers the system group and the interfaces table.
    Agent { descr: &'static str },
    /// Session opens, every request times out.
    Silent,
    /// The session cannot be opened.
    Refused,
}

/// Hands out scripted agents and remembers every OID asked per host.
#[derive(Default)]
pub struct FakeConnector {
    pub hosts: HashMap<IpAddr, Behaviour>,
    pub asked: Arc<Mutex<HashMap<IpAddr, Vec<String>>>>,
}

impl FakeConnector {
    pub fn with(mut self, ip: &str, behaviour: Behaviour) -> Self {
        self.hosts.insert(ip.parse().unwrap(), behaviour);
        self
    }

    pub fn asked(&self, ip: &str) -> Vec<String> {
        let ip: IpAddr = ip.parse().unwrap();
        self.asked.lock().unwrap().get(&ip).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl AgentConnector for FakeConnector {
    async fn connect(&self, ip: IpAddr) -> SnmpResult<Box<dyn SnmpAgent>> {
        match self.hosts.get(&ip).copied().unwrap_or(Behaviour::Silent) {
            Behaviour::Refused => Err(SnmpError::Transport {
                target: format!("{ip}:161"),
                source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
            }),
            behaviour => Ok(Box::new(FakeAgent { ip, behaviour, asked: Arc::clone(&self.asked) })),
        }
    }
}

struct FakeAgent {
    ip: IpAddr,
    behaviour: Behaviour,
    asked: Arc<Mutex<HashMap<IpAddr, Vec<String>>>>,
}

impl FakeAgent {
    fn note(&self, oid: &str) {
        self.asked.lock().unwrap().entry(self.ip).or_default().push(oid.to_string());
    }

    fn timeout(&self, oid: &str) -> SnmpError {
        SnmpError::Timeout { target: format!("{}:161", self.ip), oid: oid.to_string() }
    }
}

#[async_trait]
impl SnmpAgent for FakeAgent {
    async fn get(&mut self, oid: &str) -> SnmpResult<String> {
        self.note(oid);
        let Behaviour::Agent { descr } = self.behaviour else {
            return Err(self.timeout(oid));
        };
        match oid {
            "1.3.6.1.2.1.1.1.0" => Ok(descr.to_string()),
            "1.3.6.1.2.1.1.5.0" => Ok(format!("host-{}", self.ip)),
            "1.3.6.1.2.1.2.1.0" => Ok("2".to_string()),
            _ => Err(SnmpError::NoValue { oid: oid.to_string(), reason: "noSuchObject" }),
        }
    }

    async fn walk(&mut self, oid: &str) -> SnmpResult<Vec<VarBind>> {
        self.note(oid);
        let Behaviour::Agent { .. } = self.behaviour else {
            return Err(self.timeout(oid));
        };
        let values: &[&str] = match oid {
            "1.3.6.1.2.1.2.2.1.1" => &["1", "2"],
            "1.3.6.1.2.1.2.2.1.2" => &["lo", "eth0"],
            _ => &[],
        };
        Ok(values
            .iter()
            .enumerate()
            .map(|(idx, value)| VarBind { oid: format!("{oid}.{}", idx + 1), value: value.to_string() })
            .collect())
    }
}
