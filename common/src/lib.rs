//! Shared models and helpers for the `snmpr` workspace.
//!
//! Nothing here opens a socket: scan targets, SNMP settings, the
//! named OID catalogue, host records and the error taxonomy used by the
//! other crates.

pub mod config;
pub mod error;
pub mod network;
pub mod oid;
pub mod record;
pub mod snmp;

#[doc(hidden)]
pub use tracing;

/// Informational message routed through `tracing`.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: "snmpr::info", $($arg)*)
    };
}

/// Positive outcome, rendered with a success marker by the CLI formatter.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: "snmpr::success", $($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::tracing::warn!(target: "snmpr::warn", $($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::tracing::error!(target: "snmpr::error", $($arg)*)
    };
}
