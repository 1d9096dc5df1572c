//! Dispatches a named operation against an agent.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use snmpr_common::error::{SnmpError, SnmpResult};
use snmpr_common::snmp::VarBind;

use super::SnmpAgent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get,
    Walk,
}

impl FromStr for Operation {
    type Err = SnmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "walk" => Ok(Self::Walk),
            _ => Err(SnmpError::UnknownOperation(s.to_string())),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "get",
            Self::Walk => "walk",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SnmpResponse {
    Value(String),
    Rows(Vec<VarBind>),
}

pub async fn execute(
    agent: &mut dyn SnmpAgent,
    operation: Operation,
    oid: &str,
) -> SnmpResult<SnmpResponse> {
    match operation {
        Operation::Get => agent.get(oid).await.map(SnmpResponse::Value),
        Operation::Walk => agent.walk(oid).await.map(SnmpResponse::Rows),
    }
}
