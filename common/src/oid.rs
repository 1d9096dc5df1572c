//! Named OIDs polled on every SNMP-enabled host.

/// How an OID is queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OidKind {
    /// A single instance (`.0`), fetched with GET.
    Scalar,
    /// A table column, fetched by walking every row.
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedOid {
    pub name: &'static str,
    pub oid: &'static str,
    pub kind: OidKind,
}

impl NamedOid {
    pub const fn scalar(name: &'static str, oid: &'static str) -> Self {
        Self { name, oid, kind: OidKind::Scalar }
    }

    pub const fn column(name: &'static str, oid: &'static str) -> Self {
        Self { name, oid, kind: OidKind::Column }
    }
}

pub const SYS_DESCR: NamedOid = NamedOid::scalar("sysDescr", "1.3.6.1.2.1.1.1.0");

/// System group, interfaces table and host resources, in polling order.
pub const FULL_CATALOGUE: &[NamedOid] = &[
    SYS_DESCR,
    NamedOid::scalar("sysObjectID", "1.3.6.1.2.1.1.2.0"),
    NamedOid::scalar("sysUpTime", "1.3.6.1.2.1.1.3.0"),
    NamedOid::scalar("sysContact", "1.3.6.1.2.1.1.4.0"),
    NamedOid::scalar("sysName", "1.3.6.1.2.1.1.5.0"),
    NamedOid::scalar("sysLocation", "1.3.6.1.2.1.1.6.0"),
    NamedOid::scalar("sysServices", "1.3.6.1.2.1.1.7.0"),
    // interfaces
    NamedOid::scalar("ifNumber", "1.3.6.1.2.1.2.1.0"),
    NamedOid::column("ifIndex", "1.3.6.1.2.1.2.2.1.1"),
    NamedOid::column("ifDescr", "1.3.6.1.2.1.2.2.1.2"),
    NamedOid::column("ifType", "1.3.6.1.2.1.2.2.1.3"),
    NamedOid::column("ifMtu", "1.3.6.1.2.1.2.2.1.4"),
    NamedOid::column("ifSpeed", "1.3.6.1.2.1.2.2.1.5"),
    NamedOid::column("ifPhysAddress", "1.3.6.1.2.1.2.2.1.6"),
    NamedOid::column("ifAdminStatus", "1.3.6.1.2.1.2.2.1.7"),
    NamedOid::column("ifOperStatus", "1.3.6.1.2.1.2.2.1.8"),
    NamedOid::column("ifLastChange", "1.3.6.1.2.1.2.2.1.9"),
    NamedOid::column("ifInOctets", "1.3.6.1.2.1.2.2.1.10"),
    NamedOid::column("ifOutOctets", "1.3.6.1.2.1.2.2.1.16"),
    // host resources
    NamedOid::scalar("hrSystemUptime", "1.3.6.1.2.1.25.1.1.0"),
    NamedOid::scalar("hrMemorySize", "1.3.6.1.2.1.25.2.2.0"),
    NamedOid::column("hrStorageTypes", "1.3.6.1.2.1.25.2.3.1.2"),
    NamedOid::column("hrProcessorLoad", "1.3.6.1.2.1.25.3.3.1.2"),
    NamedOid::scalar("hrSystemProcesses", "1.3.6.1.2.1.25.1.6.0"),
    NamedOid::column("hrSWInstalledName", "1.3.6.1.2.1.25.6.3.1.2"),
];

/// Only checks whether a host answers SNMP at all.
pub const QUICK_CATALOGUE: &[NamedOid] = &[SYS_DESCR];

/// Looks up a catalogue entry by its name (`sysName`) for CLI shorthands.
pub fn by_name(name: &str) -> Option<&'static NamedOid> {
    FULL_CATALOGUE.iter().find(|entry| entry.name.eq_ignore_ascii_case(name))
}
