//! UDP relay harness.
//!
//! Two sockets: one facing the client, one connected to the upstream
//! server. Datagrams starting with the 0xFE game marker run through the
//! session; everything else (RakNet handshake, pings, acks) is forwarded
//! byte for byte. Datagrams of each direction are processed strictly in
//! arrival order. A batch the session cannot parse is forwarded
//! untouched so a protocol surprise degrades to a plain passthrough.

use std::net::SocketAddr;

use bytes::{BufMut, Bytes, BytesMut};
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use specter_proto::batch::GAME_PACKET_MARKER;
use specter_proto::packets::Direction;

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::presentation;
use crate::session::RelaySession;

const MAX_DATAGRAM: usize = 65_535;

pub async fn run(config: RelayConfig, mut shutdown: watch::Receiver<bool>) -> Result<(), RelayError> {
    let listen = UdpSocket::bind(&config.relay.listen_address).await?;
    let upstream = UdpSocket::bind("0.0.0.0:0").await?;
    upstream.connect(&config.relay.upstream_address).await?;
    info!(
        listen = %config.relay.listen_address,
        upstream = %config.relay.upstream_address,
        "relay listening"
    );

    // No overlay consumer is wired up in the standalone binary; posts
    // into a closed channel are dropped by the sender.
    let (presentation, presentation_rx) = presentation::channel();
    drop(presentation_rx);

    let mut session = RelaySession::new(config, presentation);
    let mut client_addr: Option<SocketAddr> = None;
    let mut client_buf = vec![0u8; MAX_DATAGRAM];
    let mut server_buf = vec![0u8; MAX_DATAGRAM];

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
            received = listen.recv_from(&mut client_buf) => {
                let (len, addr) = received?;
                bind_client(&mut session, &mut client_addr, addr);
                let datagram = Bytes::copy_from_slice(&client_buf[..len]);
                if let Some(out) = relay_datagram(&mut session, Direction::Serverbound, &datagram) {
                    upstream.send(&out).await?;
                }
                if let Some(injected) = pending(&mut session, Direction::Clientbound) {
                    listen.send_to(&injected, addr).await?;
                }
            }
            received = upstream.recv(&mut server_buf) => {
                let len = received?;
                let Some(addr) = client_addr else {
                    debug!("dropping upstream datagram, no client yet");
                    continue;
                };
                let datagram = Bytes::copy_from_slice(&server_buf[..len]);
                if let Some(out) = relay_datagram(&mut session, Direction::Clientbound, &datagram) {
                    listen.send_to(&out, addr).await?;
                }
                if let Some(injected) = pending(&mut session, Direction::Serverbound) {
                    upstream.send(&injected).await?;
                }
            }
        }
    }

    session.on_disconnect("relay shutting down");
    Ok(())
}

/// Track the datagram source. Only one client is bound at a time; a
/// datagram from a new address ends the previous client's session before
/// any of the new client's traffic is processed, so no learned identity,
/// mirrored state, or engaged spoofer leaks across connections.
pub fn bind_client(
    session: &mut RelaySession,
    current: &mut Option<SocketAddr>,
    addr: SocketAddr,
) {
    if *current == Some(addr) {
        return;
    }
    if current.is_some() {
        info!(%addr, "new client, ending previous session");
        session.on_disconnect("client changed");
    } else {
        info!(%addr, "client connected");
    }
    *current = Some(addr);
}

/// Pass one datagram through the session. Returns what to put on the
/// wire, or `None` when the whole batch was dropped.
fn relay_datagram(
    session: &mut RelaySession,
    direction: Direction,
    datagram: &Bytes,
) -> Option<Bytes> {
    if datagram.first() != Some(&GAME_PACKET_MARKER) {
        return Some(datagram.clone());
    }
    match session.process_batch(direction, datagram.slice(1..)) {
        Ok(Some(payload)) => Some(with_marker(&payload)),
        Ok(None) => None,
        Err(err) => {
            warn!(%err, ?direction, "batch processing failed, forwarding raw");
            Some(datagram.clone())
        }
    }
}

fn pending(session: &mut RelaySession, direction: Direction) -> Option<Bytes> {
    match session.pending_batch(direction) {
        Ok(Some(payload)) => Some(with_marker(&payload)),
        Ok(None) => None,
        Err(err) => {
            warn!(%err, ?direction, "failed to encode injected batch");
            None
        }
    }
}

fn with_marker(payload: &Bytes) -> Bytes {
    let mut out = BytesMut::with_capacity(1 + payload.len());
    out.put_u8(GAME_PACKET_MARKER);
    out.put_slice(payload);
    out.freeze()
}
