//! Error taxonomy of the SNMP layer.

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnmpError {
    #[error("invalid OID '{0}'")]
    InvalidOid(String),

    #[error("unsupported SNMP version '{0}', expected v1, v2c or v3")]
    UnsupportedVersion(String),

    #[error("unknown operation '{0}', use 'get' or 'walk'")]
    UnknownOperation(String),

    #[error("invalid credentials: {0}")]
    Credentials(String),

    #[error("SNMP transport to {target} failed: {source}")]
    Transport {
        target: String,
        #[source]
        source: io::Error,
    },

    #[error("request to {target} for {oid} timed out")]
    Timeout { target: String, oid: String },

    /// Failure reported by the protocol engine before any PDU was decoded.
    #[error("{0}")]
    Indication(String),

    /// Non-zero error-status in the response PDU.
    #[error("{status} at {oid}")]
    Agent { status: String, oid: String },

    #[error("{oid}: {reason}")]
    NoValue { oid: String, reason: &'static str },

    #[error("empty response for {0}")]
    EmptyResponse(String),
}

impl SnmpError {
    /// Whether the agent itself could not be reached, as opposed to a
    /// single OID being unavailable.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, SnmpError::Timeout { .. } | SnmpError::Transport { .. })
    }
}

pub type SnmpResult<T> = Result<T, SnmpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_error_reads_like_status_at_oid() {
        let err = SnmpError::Agent {
            status: "noSuchName".into(),
            oid: "1.3.6.1.2.1.1.9.0".into(),
        };
        assert_eq!(err.to_string(), "noSuchName at 1.3.6.1.2.1.1.9.0");
    }

    #[test]
    fn only_timeouts_and_transport_failures_are_unreachable() {
        let timeout = SnmpError::Timeout { target: "10.0.0.1:161".into(), oid: "1.3".into() };
        let transport = SnmpError::Transport {
            target: "10.0.0.1:161".into(),
            source: io::Error::new(io::ErrorKind::AddrNotAvailable, "nope"),
        };
        let no_value = SnmpError::NoValue { oid: "1.3".into(), reason: "noSuchObject" };

        assert!(timeout.is_unreachable());
        assert!(transport.is_unreachable());
        assert!(!no_value.is_unreachable());
        assert!(!SnmpError::EmptyResponse("1.3".into()).is_unreachable());
    }
}
