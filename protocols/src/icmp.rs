use anyhow::Context;
use pnet::packet::Packet;
use pnet::packet::icmp::echo_reply::EchoReplyPacket;
use pnet::packet::icmp::echo_request::MutableEchoRequestPacket;
use pnet::packet::icmp::{self, IcmpCode, IcmpPacket, IcmpTypes};

pub const ICMP_ECHO_HDR_LEN: usize = 8;
pub const ECHO_PAYLOAD: &[u8] = b"snmpr-sweep-probe-00000000000000";

/// Identifies which of our probes an echo reply answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoId {
    pub identifier: u16,
    pub sequence: u16,
}

pub fn create_echo_request(id: EchoId, payload: &[u8]) -> anyhow::Result<Vec<u8>> {
    let mut buffer: Vec<u8> = vec![0u8; ICMP_ECHO_HDR_LEN + payload.len()];
    {
        let mut echo = MutableEchoRequestPacket::new(&mut buffer)
            .context("creating echo request packet")?;
        echo.set_icmp_type(IcmpTypes::EchoRequest);
        echo.set_icmp_code(IcmpCode::new(0));
        echo.set_identifier(id.identifier);
        echo.set_sequence_number(id.sequence);
        echo.set_payload(payload);
        echo.set_checksum(0);
    }

    let csum: u16 = {
        let packet = IcmpPacket::new(&buffer).context("reading back echo request")?;
        icmp::checksum(&packet)
    };
    buffer[2..4].copy_from_slice(&csum.to_be_bytes());

    Ok(buffer)
}

/// Returns the echo id if `bytes` is an ICMP echo reply, `None` for any
/// other ICMP message (our own requests included, on loopback).
pub fn parse_echo_reply(bytes: &[u8]) -> Option<EchoId> {
    let packet = IcmpPacket::new(bytes)?;
    if packet.get_icmp_type() != IcmpTypes::EchoReply {
        return None;
    }

    let reply = EchoReplyPacket::new(packet.packet())?;
    Some(EchoId {
        identifier: reply.get_identifier(),
        sequence: reply.get_sequence_number(),
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
