//! # Scan Workflow
//!
//! Ties the pieces together: sweep the targets, poll every live host over
//! SNMP, persist the hosts that answered.
//!
//! Each live host gets its own task and its own session; a semaphore bounds
//! how many hosts are polled at once. Within a host the catalogue is polled
//! in order on the one session, and the first timeout or transport failure
//! ends polling of that host.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use snmpr_common::config::DEFAULT_CONCURRENCY;
use snmpr_common::error::SnmpError;
use snmpr_common::network::{host::LiveHost, range::IpCollection};
use snmpr_common::oid::{FULL_CATALOGUE, NamedOid, OidKind};
use snmpr_common::record::{HostRecord, RecordValue};

use crate::discovery::HostProber;
use crate::snmp::{AgentConnector, SnmpAgent};
use crate::store::RecordStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    SweepFinished { live: usize },
    HostPolled { ip: IpAddr, values: usize },
}

pub type ScanObserver = Arc<dyn Fn(ScanEvent) + Send + Sync>;

#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Every host that answered the sweep, by address.
    pub live_hosts: Vec<LiveHost>,
    /// Persisted records of the SNMP-enabled hosts, by address.
    pub records: Vec<HostRecord>,
    /// Live hosts that gave no SNMP value at all.
    pub silent: Vec<IpAddr>,
    pub duration: Duration,
}

pub struct ScanService {
    prober: Box<dyn HostProber>,
    connector: Arc<dyn AgentConnector>,
    store: Arc<dyn RecordStore>,
    catalogue: &'static [NamedOid],
    concurrency: usize,
    observer: Option<ScanObserver>,
}

impl ScanService {
    pub fn new(
        prober: Box<dyn HostProber>,
        connector: Arc<dyn AgentConnector>,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            prober,
            connector,
            store,
            catalogue: FULL_CATALOGUE,
            concurrency: DEFAULT_CONCURRENCY,
            observer: None,
        }
    }

    pub fn with_catalogue(mut self, catalogue: &'static [NamedOid]) -> Self {
        self.catalogue = catalogue;
        self
    }

    /// `0` is treated as `1`.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_observer(mut self, observer: ScanObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub async fn perform_scan(&self, targets: IpCollection) -> anyhow::Result<ScanReport> {
        let started = Instant::now();

        let live_hosts = self.prober.sweep(targets).await.context("ping sweep failed")?;
        self.notify(ScanEvent::SweepFinished { live: live_hosts.len() });

        let polled = self.poll_all(&live_hosts).await?;

        let mut report = ScanReport { live_hosts, ..ScanReport::default() };
        for record in polled {
            if record.is_empty() {
                report.silent.push(record.ip);
                continue;
            }
            let path = self.store.save(&record)?;
            debug!("Stored {} values of {} in {}", record.len(), record.ip, path.display());
            report.records.push(record);
        }

        report.records.sort_by_key(|record| record.ip);
        report.silent.sort();
        report.duration = started.elapsed();
        Ok(report)
    }

    async fn poll_all(&self, hosts: &[LiveHost]) -> anyhow::Result<Vec<HostRecord>> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks: JoinSet<anyhow::Result<HostRecord>> = JoinSet::new();

        for host in hosts {
            let ip = host.ip;
            let semaphore = Arc::clone(&semaphore);
            let connector = Arc::clone(&self.connector);
            let observer = self.observer.clone();
            let catalogue = self.catalogue;

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await?;
                let record = poll_host(connector.as_ref(), ip, catalogue).await;
                if let Some(observer) = observer {
                    observer(ScanEvent::HostPolled { ip, values: record.len() });
                }
                Ok(record)
            });
        }

        let mut records = Vec::with_capacity(hosts.len());
        while let Some(joined) = tasks.join_next().await {
            records.push(joined.context("polling task panicked")??);
        }
        Ok(records)
    }

    fn notify(&self, event: ScanEvent) {
        if let Some(observer) = &self.observer {
            observer(event);
        }
    }
}

/// Polls the catalogue on one host. Only values that came back are kept.
pub async fn poll_host(
    connector: &dyn AgentConnector,
    ip: IpAddr,
    catalogue: &[NamedOid],
) -> HostRecord {
    let mut record = HostRecord::new(ip);

    let mut agent = match connector.connect(ip).await {
        Ok(agent) => agent,
        Err(e) => {
            debug!("{ip}: no SNMP session: {e}");
            return record;
        }
    };

    for named in catalogue {
        match poll_oid(agent.as_mut(), named).await {
            Ok(Some(value)) => record.insert(named.name, value),
            Ok(None) => debug!("{ip}: {} has no rows", named.name),
            Err(e) if e.is_unreachable() => {
                debug!("{ip}: {e}, skipping the remaining OIDs");
                break;
            }
            Err(e @ SnmpError::NoValue { .. }) => debug!("{ip}: {}: {e}", named.name),
            Err(e) => warn!("{ip}: {} failed: {e}", named.name),
        }
    }

    record
}

async fn poll_oid(
    agent: &mut dyn SnmpAgent,
    named: &NamedOid,
) -> Result<Option<RecordValue>, SnmpError> {
    match named.kind {
        OidKind::Scalar => agent.get(named.oid).await.map(|v| Some(RecordValue::Scalar(v))),
        OidKind::Column => {
            let rows = agent.walk(named.oid).await?;
            if rows.is_empty() {
                return Ok(None);
            }
            Ok(Some(RecordValue::Column(rows.into_iter().map(|row| row.value).collect())))
        }
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
