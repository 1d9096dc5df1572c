//! Packet and value helpers shared by the sweep and the SNMP client.
//!
//! Nothing in here touches a socket: [`icmp`] builds and recognises echo
//! packets, [`snmp`] turns textual OIDs into `snmp2` OIDs and decoded
//! values into the strings stored in host records.

pub mod icmp;
pub mod snmp;
