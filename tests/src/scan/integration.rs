#![cfg(test)]
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use snmpr_common::network::range::{IpCollection, Ipv4Range};
use snmpr_common::network::target::{self, Target};
use snmpr_common::oid::QUICK_CATALOGUE;
use snmpr_common::record::{HostRecord, RecordValue};
use snmpr_common::snmp::SnmpSettings;
use snmpr_core::discovery::IcmpSweeper;
use snmpr_core::scanner::{ScanEvent, ScanService};
use snmpr_core::snmp::SessionConnector;
use snmpr_core::store::{JsonFileStore, RecordStore};

use crate::support::{Behaviour, BrokenProber, FakeConnector, FakeProber};

fn subnet() -> IpCollection {
    let mut targets = IpCollection::new();
    targets.add_range(Ipv4Range::new(
        Ipv4Addr::new(192, 168, 10, 1),
        Ipv4Addr::new(192, 168, 10, 20),
    ));
    targets
}

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

fn network() -> FakeConnector {
    FakeConnector::default()
        .with("192.168.10.1", Behaviour::Agent { descr: "RouterOS 7.14" })
        .with("192.168.10.5", Behaviour::Silent)
        .with("192.168.10.9", Behaviour::Refused)
        .with("192.168.10.12", Behaviour::Agent { descr: "Linux nas 6.1.0" })
}

fn prober() -> Box<FakeProber> {
    Box::new(FakeProber {
        alive: vec![ip("192.168.10.1"), ip("192.168.10.5"), ip("192.168.10.9"), ip("192.168.10.12")],
    })
}

#[tokio::test]
async fn only_snmp_enabled_hosts_get_a_file() {
    let db = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileStore::new(db.path()));
    let service = ScanService::new(prober(), Arc::new(network()), store.clone());

    let report = service.perform_scan(subnet()).await.unwrap();

    assert_eq!(report.live_hosts.len(), 4);
    assert_eq!(report.silent, vec![ip("192.168.10.5"), ip("192.168.10.9")]);
    let polled: Vec<IpAddr> = report.records.iter().map(|r| r.ip).collect();
    assert_eq!(polled, vec![ip("192.168.10.1"), ip("192.168.10.12")]);

    let mut files: Vec<String> = std::fs::read_dir(db.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    assert_eq!(files, vec!["192.168.10.1.json", "192.168.10.12.json"]);
}

#[tokio::test]
async fn stored_files_are_keyed_by_ip_with_columns_as_lists() {
    let db = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileStore::new(db.path()));
    let service = ScanService::new(prober(), Arc::new(network()), store.clone());

    service.perform_scan(subnet()).await.unwrap();

    let raw = std::fs::read_to_string(db.path().join("192.168.10.1.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let host = &json["192.168.10.1"];

    assert_eq!(host["sysDescr"], "RouterOS 7.14");
    assert_eq!(host["sysName"], "host-192.168.10.1");
    assert_eq!(host["ifNumber"], "2");
    assert_eq!(host["ifDescr"], serde_json::json!(["lo", "eth0"]));
    // failed OIDs never show up as values
    assert!(host.get("sysContact").is_none());
    assert!(host.get("hrSWInstalledName").is_none());

    let record: HostRecord = store.load(ip("192.168.10.1")).unwrap().unwrap();
    assert_eq!(record.values.get("ifIndex"), Some(&RecordValue::Column(vec!["1".into(), "2".into()])));
}

#[tokio::test]
async fn silent_agents_are_abandoned_after_the_first_timeout() {
    let db = tempfile::tempdir().unwrap();
    let connector = Arc::new(network());
    let service = ScanService::new(prober(), connector.clone(), Arc::new(JsonFileStore::new(db.path())));

    service.perform_scan(subnet()).await.unwrap();

    assert_eq!(connector.asked("192.168.10.5"), vec!["1.3.6.1.2.1.1.1.0".to_string()]);
    assert!(connector.asked("192.168.10.9").is_empty());
    assert_eq!(connector.asked("192.168.10.12").len(), 25);
}

#[tokio::test]
async fn quick_scan_polls_only_sys_descr() {
    let db = tempfile::tempdir().unwrap();
    let connector = Arc::new(network());
    let store = Arc::new(JsonFileStore::new(db.path()));
    let service = ScanService::new(prober(), connector.clone(), store.clone())
        .with_catalogue(QUICK_CATALOGUE);

    let report = service.perform_scan(subnet()).await.unwrap();

    assert_eq!(report.records.len(), 2);
    assert_eq!(connector.asked("192.168.10.1"), vec!["1.3.6.1.2.1.1.1.0".to_string()]);
    let record = store.load(ip("192.168.10.12")).unwrap().unwrap();
    assert_eq!(record.len(), 1);
    assert_eq!(record.scalar("sysDescr"), Some("Linux nas 6.1.0"));
}

#[tokio::test]
async fn rescans_overwrite_previous_records() {
    let db = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileStore::new(db.path()));

    ScanService::new(prober(), Arc::new(network()), store.clone())
        .perform_scan(subnet())
        .await
        .unwrap();

    let upgraded = FakeConnector::default()
        .with("192.168.10.1", Behaviour::Agent { descr: "RouterOS 7.15" });
    ScanService::new(prober(), Arc::new(upgraded), store.clone())
        .with_catalogue(QUICK_CATALOGUE)
        .perform_scan(subnet())
        .await
        .unwrap();

    let record = store.load(ip("192.168.10.1")).unwrap().unwrap();
    assert_eq!(record.scalar("sysDescr"), Some("RouterOS 7.15"));
    assert_eq!(record.len(), 1);
}

#[tokio::test]
async fn sequential_and_concurrent_polling_agree() {
    let db_seq = tempfile::tempdir().unwrap();
    let db_par = tempfile::tempdir().unwrap();

    let sequential = ScanService::new(prober(), Arc::new(network()), Arc::new(JsonFileStore::new(db_seq.path())))
        .with_concurrency(1)
        .perform_scan(subnet())
        .await
        .unwrap();
    let concurrent = ScanService::new(prober(), Arc::new(network()), Arc::new(JsonFileStore::new(db_par.path())))
        .with_concurrency(8)
        .perform_scan(subnet())
        .await
        .unwrap();

    assert_eq!(sequential.records, concurrent.records);
    assert_eq!(sequential.silent, concurrent.silent);
}

#[tokio::test]
async fn observer_sees_the_sweep_and_every_polled_host() {
    let db = tempfile::tempdir().unwrap();
    let polled = Arc::new(AtomicUsize::new(0));
    let live = Arc::new(AtomicUsize::new(0));

    let (polled_ref, live_ref) = (Arc::clone(&polled), Arc::clone(&live));
    let service = ScanService::new(prober(), Arc::new(network()), Arc::new(JsonFileStore::new(db.path())))
        .with_observer(Arc::new(move |event: ScanEvent| match event {
            ScanEvent::SweepFinished { live } => live_ref.store(live, Ordering::SeqCst),
            ScanEvent::HostPolled { .. } => {
                polled_ref.fetch_add(1, Ordering::SeqCst);
            }
        }));

    service.perform_scan(subnet()).await.unwrap();

    assert_eq!(live.load(Ordering::SeqCst), 4);
    assert_eq!(polled.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn no_live_hosts_means_an_empty_report_and_no_directory() {
    let db = tempfile::tempdir().unwrap();
    let dir = db.path().join("database");
    let service = ScanService::new(
        Box::new(FakeProber { alive: Vec::new() }),
        Arc::new(network()),
        Arc::new(JsonFileStore::new(&dir)),
    );

    let report = service.perform_scan(subnet()).await.unwrap();

    assert!(report.live_hosts.is_empty());
    assert!(report.records.is_empty());
    assert!(!dir.exists());
}

#[tokio::test]
async fn sweep_failures_abort_the_scan() {
    let db = tempfile::tempdir().unwrap();
    let service = ScanService::new(
        Box::new(BrokenProber),
        Arc::new(network()),
        Arc::new(JsonFileStore::new(db.path())),
    );

    let err = service.perform_scan(subnet()).await.unwrap_err();
    assert!(format!("{err:#}").contains("CAP_NET_RAW"));
}

/// Needs root and an SNMP agent listening on 127.0.0.1:161.
#[tokio::test]
#[ignore]
async fn scan_loopback_agent() {
    let db = tempfile::tempdir().unwrap();
    let collection = target::to_collection("127.0.0.1".parse::<Target>().unwrap()).unwrap();

    let service = ScanService::new(
        Box::new(IcmpSweeper::new(Duration::from_secs(1))),
        Arc::new(SessionConnector::new(SnmpSettings::default()).unwrap()),
        Arc::new(JsonFileStore::new(db.path())),
    )
    .with_catalogue(QUICK_CATALOGUE);

    let report = service.perform_scan(collection).await.unwrap();

    assert_eq!(report.live_hosts.len(), 1);
    assert_eq!(report.records.len(), 1);
    assert!(db.path().join("127.0.0.1.json").exists());
}
