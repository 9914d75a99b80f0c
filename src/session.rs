use std::net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::net::{lookup_host, UdpSocket};
use tokio::time::{timeout_at, Instant};

use crate::codec::{self, QueryResult};
use crate::config::QueryConfig;
use crate::error::SampQueryError;
use crate::opcode::Opcode;
use crate::packet::{RawPacket, RequestPacket, ResponsePacket, Signature, MAX_PACKET_SIZE};

/// A UDP socket connected to one server, usable once the server has answered a ping.
///
/// Requests go out one at a time. The socket is closed when the session is dropped.
#[derive(Debug)]
pub struct Session {
    sock: UdpSocket,
    peer: SocketAddrV4,
    signature: Signature,
    timeout: Duration,
    strict_header: bool,
}

impl Session {
    /// Validate, resolve and connect to `config.host:config.port`, then ping it.
    ///
    /// Fails with [SampQueryError::Unreachable] if the ping is not echoed within `config.timeout`.
    ///
    /// Example usage:
    /// ```no_run
    /// # async fn run() -> Result<(), rsampquery::error::SampQueryError> {
    /// use rsampquery::{Opcode, QueryConfig, Session};
    ///
    /// let session = Session::connect(&QueryConfig::new("127.0.0.1", 7777)).await?;
    /// let info = session.query(Opcode::Info).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(config: &QueryConfig) -> Result<Session, SampQueryError> {
        config.validate()?;
        let port: u16 = u16::try_from(config.port).map_err(|_| SampQueryError::InvalidPort(config.port))?;
        let peer: SocketAddrV4 = resolve(&config.host, port).await?;

        // just arbitrarily bind any port, doesn't matter really
        let sock: UdpSocket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
            .await
            .map_err(SampQueryError::FailedPortBind)?;

        sock.connect(SocketAddr::V4(peer))
            .await
            .map_err(SampQueryError::FailedConnect)?;

        let session = Session {
            sock,
            peer,
            signature: Signature::new(*peer.ip(), peer.port()),
            timeout: config.timeout,
            strict_header: config.strict_header,
        };

        if !session.ping().await {
            return Err(SampQueryError::Unreachable {
                host: config.host.clone(),
                port,
            });
        }

        info!("connected to {} ({})", config.host, peer);
        Ok(session)
    }

    /// Send one request and wait for its reply, returning the reply body.
    ///
    /// Datagrams echoing another opcode (late replies to earlier requests) are
    /// skipped until the session timeout runs out. In strict-header mode so are
    /// datagrams whose header differs in any byte.
    ///
    /// `Ok(None)` means nothing usable came back in time.
    /// Only fails in strict-header mode, when every reply seen echoed the wrong header.
    pub async fn send_request(&self, opcode: Opcode, payload: Option<&[u8]>) -> Result<Option<Vec<u8>>, SampQueryError> {
        let request: RequestPacket = RequestPacket::new(self.signature, opcode, payload);

        if let Err(e) = self.sock.send(&request.pack()).await {
            debug!("{}: sending {opcode} failed: {e}", self.peer);
            return Ok(None);
        }

        let deadline: Instant = Instant::now() + self.timeout;
        let mut mismatched: bool = false;
        let mut resp_buf: RawPacket = [0u8; MAX_PACKET_SIZE];

        loop {
            let len: usize = match timeout_at(deadline, self.sock.recv(&mut resp_buf)).await {
                Ok(Ok(len)) => len,
                Ok(Err(e)) => {
                    debug!("{}: receiving {opcode} failed: {e}", self.peer);
                    return Ok(None);
                }
                Err(_) if mismatched => return Err(SampQueryError::HeaderMismatch(opcode)),
                Err(_) => {
                    debug!("{}: no {opcode} reply within {:?}", self.peer, self.timeout);
                    return Ok(None);
                }
            };

            let Some(response) = ResponsePacket::unpack(&resp_buf[..len]) else {
                debug!("{}: skipping {len} byte datagram without header", self.peer);
                continue;
            };

            if response.opcode_byte() != opcode.to_byte() {
                debug!(
                    "{}: skipping stale {:?} reply while waiting for {opcode}",
                    self.peer,
                    char::from(response.opcode_byte())
                );
                continue;
            }

            if self.strict_header && !response.answers(&request) {
                debug!("{}: skipping {opcode} reply with foreign signature", self.peer);
                mismatched = true;
                continue;
            }

            debug!("{}: {opcode} reply, {} byte body", self.peer, response.body().len());
            return Ok(Some(response.into_body()));
        }
    }

    /// Send `opcode` and decode the reply.
    ///
    /// Pings carry 4 fresh random bytes and always decode to [QueryResult::Online].
    pub async fn query(&self, opcode: Opcode) -> Result<Option<QueryResult>, SampQueryError> {
        let nonce: [u8; 4] = rand::random();
        let sent: &[u8] = if opcode == Opcode::Ping { &nonce } else { &[] };

        let payload: Option<&[u8]> = (opcode == Opcode::Ping).then_some(sent);
        let body: Option<Vec<u8>> = self.send_request(opcode, payload).await?;
        codec::decode(opcode, body.as_deref(), sent)
    }

    /// Liveness check: whether the server echoes a ping payload.
    pub async fn ping(&self) -> bool {
        match self.query(Opcode::Ping).await {
            Ok(Some(QueryResult::Online(online))) => online,
            Ok(_) => false,
            Err(e) => {
                warn!("{}: ping failed: {e}", self.peer);
                false
            }
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn peer(&self) -> SocketAddrV4 {
        self.peer
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Resolve `host` to its first IPv4 address.
async fn resolve(host: &str, port: u16) -> Result<SocketAddrV4, SampQueryError> {
    match host.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => return Ok(SocketAddrV4::new(ip, port)),
        Ok(IpAddr::V6(_)) => return Err(SampQueryError::Resolution(host.to_owned())),
        Err(_) => {}
    }

    let addrs = lookup_host((host, port)).await.map_err(|e| {
        debug!("lookup of {host} failed: {e}");
        SampQueryError::Resolution(host.to_owned())
    })?;

    addrs
        .filter_map(|addr| match addr {
            SocketAddr::V4(v4) => Some(v4),
            SocketAddr::V6(_) => None,
        })
        .next()
        .ok_or_else(|| SampQueryError::Resolution(host.to_owned()))
}
