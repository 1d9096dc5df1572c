//! # SNMP Agents
//!
//! [`SnmpAgent`] is one open session to one agent; [`AgentConnector`] opens
//! sessions for hosts found by the sweep. The real implementation lives in
//! [`client`], the scan service only ever sees the traits.

pub mod client;
pub mod controller;

use std::net::IpAddr;

use async_trait::async_trait;

use snmpr_common::error::SnmpResult;
use snmpr_common::snmp::VarBind;

pub use client::{SessionConnector, SnmpClient};
pub use controller::{Operation, SnmpResponse, execute};

#[async_trait]
pub trait SnmpAgent: Send {
    /// Rendered value of a single object instance.
    async fn get(&mut self, oid: &str) -> SnmpResult<String>;

    /// Every `(oid, value)` below `oid`, in agent order.
    async fn walk(&mut self, oid: &str) -> SnmpResult<Vec<VarBind>>;
}

#[async_trait]
pub trait AgentConnector: Send + Sync {
    async fn connect(&self, ip: IpAddr) -> SnmpResult<Box<dyn SnmpAgent>>;
}
