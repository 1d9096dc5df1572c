pub mod discovery;
pub mod network;
pub mod scanner;
pub mod snmp;
pub mod store;
