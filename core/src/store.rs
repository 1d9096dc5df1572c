//! # Record Store
//!
//! Persists one [`HostRecord`] per host. [`JsonFileStore`] keeps them as
//! `<ip>.json` files in a single directory; a rescan overwrites the file.

use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;

use snmpr_common::record::HostRecord;

pub trait RecordStore: Send + Sync {
    /// Writes `record`, replacing any previous record of the same host.
    fn save(&self, record: &HostRecord) -> anyhow::Result<PathBuf>;

    /// `Ok(None)` when the host was never stored.
    fn load(&self, ip: IpAddr) -> anyhow::Result<Option<HostRecord>>;
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, ip: IpAddr) -> PathBuf {
        self.dir.join(file_name(ip))
    }
}

impl RecordStore for JsonFileStore {
    fn save(&self, record: &HostRecord) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating database directory {}", self.dir.display()))?;

        let path = self.path_for(record.ip);
        let tmp = path.with_extension("json.tmp");
        let json = record.to_json()?;

        // Readers never see a half-written record.
        fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &path).with_context(|| format!("replacing {}", path.display()))?;

        Ok(path)
    }

    fn load(&self, ip: IpAddr) -> anyhow::Result<Option<HostRecord>> {
        let path = self.path_for(ip);
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let record = HostRecord::from_json(&json).with_context(|| format!("in {}", path.display()))?;
        Ok(Some(record))
    }
}

/// IPv6 colons are not valid in file names everywhere.
fn file_name(ip: IpAddr) -> String {
    format!("{}.json", ip.to_string().replace(':', "-"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use snmpr_common::record::RecordValue;
    use std::net::Ipv4Addr;

    fn record(ip: IpAddr, descr: &str) -> HostRecord {
        let mut record = HostRecord::new(ip);
        record.insert("sysDescr", RecordValue::Scalar(descr.into()));
        record
    }

    #[test]
    fn save_creates_the_directory_and_names_the_file_after_the_ip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(tmp.path().join("database"));
        let ip = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20));

        let path = store.save(&record(ip, "Linux gw")).unwrap();

        assert_eq!(path, tmp.path().join("database").join("192.168.1.20.json"));
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn rescans_overwrite_the_previous_record() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(tmp.path());
        let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));

        store.save(&record(ip, "old firmware")).unwrap();
        store.save(&record(ip, "new firmware")).unwrap();

        let loaded = store.load(ip).unwrap().unwrap();
        assert_eq!(loaded.scalar("sysDescr"), Some("new firmware"));
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn load_of_unknown_host_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(tmp.path());
        assert!(store.load(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 9))).unwrap().is_none());
    }

    #[test]
    fn ipv6_file_names_have_no_colons() {
        let store = JsonFileStore::new("db");
        let path = store.path_for("fe80::1".parse().unwrap());
        assert_eq!(path, Path::new("db").join("fe80--1.json"));
    }

    #[test]
    fn corrupt_files_are_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(tmp.path());
        let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 3));
        fs::write(store.path_for(ip), "not json").unwrap();

        assert!(store.load(ip).is_err());
    }
}
