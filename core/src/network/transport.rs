use std::io::ErrorKind;
use std::net::IpAddr;
use std::time::Duration;

use anyhow::Context;
use pnet::{
    packet::{Packet, ip::IpNextHeaderProtocols},
    transport::{
        self, TransportChannelType, TransportProtocol, TransportReceiver, TransportSender,
    },
};
use tokio::sync::mpsc;

const TRANSPORT_BUFFER_SIZE: usize = 4096;
const CHANNEL_TYPE_ICMP: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv4(IpNextHeaderProtocols::Icmp));
/// How often the listener thread checks whether anyone still wants packets.
const LISTENER_POLL: Duration = Duration::from_millis(100);

/// Raw ICMP socket: `tx` sends, `rx` yields `(icmp bytes, source)`.
pub struct IcmpHandle {
    pub tx: TransportSender,
    pub rx: mpsc::UnboundedReceiver<(Vec<u8>, IpAddr)>,
}

/// Opens the raw channel and starts the listener thread.
///
/// The thread exits once the returned receiver is dropped.
pub fn start_icmp_capture() -> anyhow::Result<IcmpHandle> {
    let (tx, rx_socket) = open_channel()?;
    let (queue_tx, queue_rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || listen(rx_socket, queue_tx));

    Ok(IcmpHandle { tx, rx: queue_rx })
}

fn listen(mut rx_socket: TransportReceiver, queue_tx: mpsc::UnboundedSender<(Vec<u8>, IpAddr)>) {
    let mut iter = transport::icmp_packet_iter(&mut rx_socket);
    while !queue_tx.is_closed() {
        match iter.next_with_timeout(LISTENER_POLL) {
            Ok(Some((packet, source_ip))) => {
                if queue_tx.send((packet.packet().to_vec(), source_ip)).is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) if matches!(e.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock) => {}
            Err(e) => {
                tracing::debug!("ICMP listener stopped: {e}");
                break;
            }
        }
    }
}

fn open_channel() -> anyhow::Result<(TransportSender, TransportReceiver)> {
    transport::transport_channel(TRANSPORT_BUFFER_SIZE, CHANNEL_TYPE_ICMP)
        .context("opening raw ICMP socket (requires root or CAP_NET_RAW)")
}
