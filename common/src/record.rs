//! # Host Record
//!
//! The persisted result of polling one host: named OIDs mapped to their
//! values. On disk a record is a JSON object with a single key, the host IP,
//! whose value is the OID map. Names keep the order they were polled in.

use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

use anyhow::{Context, ensure};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    Scalar(String),
    Column(Vec<String>),
}

/// Name to value map in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordValues(Vec<(String, RecordValue)>);

impl RecordValues {
    /// Replaces the value in place when `name` is already present.
    pub fn insert(&mut self, name: String, value: RecordValue) {
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&RecordValue> {
        self.0.iter().find(|(existing, _)| existing == name).map(|(_, value)| value)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RecordValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for RecordValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(name, value)| (name, value)))
    }
}

impl<'de> Deserialize<'de> for RecordValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = RecordValues;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of OID names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut values = RecordValues::default();
                while let Some((name, value)) = access.next_entry::<String, RecordValue>()? {
                    values.insert(name, value);
                }
                Ok(values)
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    pub ip: IpAddr,
    pub values: RecordValues,
}

impl HostRecord {
    pub fn new(ip: IpAddr) -> Self {
        Self { ip, values: RecordValues::default() }
    }

    pub fn insert(&mut self, name: &str, value: RecordValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn scalar(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(RecordValue::Scalar(value)) => Some(value),
            _ => None,
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        let keyed = BTreeMap::from([(self.ip.to_string(), &self.values)]);
        serde_json::to_string_pretty(&keyed).context("serializing host record")
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let keyed: BTreeMap<String, RecordValues> =
            serde_json::from_str(json).context("parsing host record")?;
        ensure!(keyed.len() == 1, "a host record holds exactly one host, found {}", keyed.len());

        let (ip, values) = keyed
            .into_iter()
            .next()
            .context("host record is empty")?;
        let ip: IpAddr = ip.parse().with_context(|| format!("invalid host key '{ip}'"))?;

        Ok(Self { ip, values })
    }
}
