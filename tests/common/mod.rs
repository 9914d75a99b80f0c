//! Fake SA-MP server for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

use rsampquery::QueryConfig;

/// Reply bodies per opcode. `None` means the opcode is never answered.
#[derive(Debug, Clone, Default)]
pub struct Replies {
    pub info: Option<Vec<u8>>,
    pub rules: Option<Vec<u8>>,
    pub players: Option<Vec<u8>>,
    pub detailed: Option<Vec<u8>>,
    /// Echo ping payloads
    pub ping: bool,
    /// Echo a wrong address octet on every reply except pings
    pub corrupt_header: bool,
    /// Hold the reply to this opcode, stalling every request queued behind it
    pub slow: Option<(u8, Duration)>,
}

impl Replies {
    pub fn online() -> Self {
        Replies {
            ping: true,
            ..Default::default()
        }
    }
}

pub struct FakeServer {
    pub addr: SocketAddr,
    seen: Arc<Mutex<Vec<u8>>>,
    handle: JoinHandle<()>,
}

impl FakeServer {
    pub async fn spawn(replies: Replies) -> Self {
        let sock = UdpSocket::bind("127.0.0.1:0").await.expect("bind fake server");
        let addr = sock.local_addr().expect("fake server address");
        let seen = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&seen);
        let handle = tokio::spawn(async move {
            let mut buf = [0u8; 2048];
            loop {
                let Ok((len, from)) = sock.recv_from(&mut buf).await else {
                    continue;
                };
                if len < 11 || &buf[..4] != b"SAMP" {
                    continue;
                }
                let opcode = buf[10];
                log.lock().unwrap().push(opcode);

                let body = match opcode {
                    b'i' => replies.info.clone(),
                    b'r' => replies.rules.clone(),
                    b'c' => replies.players.clone(),
                    b'd' => replies.detailed.clone(),
                    b'p' if replies.ping => Some(buf[11..len].to_vec()),
                    _ => None,
                };

                if let Some(body) = body {
                    if let Some((slow_opcode, delay)) = replies.slow {
                        if slow_opcode == opcode {
                            tokio::time::sleep(delay).await;
                        }
                    }
                    let mut out = buf[..11].to_vec();
                    if replies.corrupt_header && opcode != b'p' {
                        out[4] ^= 0xff;
                    }
                    out.extend_from_slice(&body);
                    let _ = sock.send_to(&out, from).await;
                }
            }
        });

        FakeServer { addr, seen, handle }
    }

    pub fn config(&self) -> QueryConfig {
        QueryConfig::new("127.0.0.1", u32::from(self.addr.port())).with_timeout(Duration::from_millis(200))
    }

    /// Opcode bytes received so far, in order.
    pub fn seen(&self) -> Vec<u8> {
        self.seen.lock().unwrap().clone()
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn long_string(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
}

pub fn info_payload(passworded: bool, players: u16, max_players: u16, hostname: &str, gamemode: &str, language: &str) -> Vec<u8> {
    let mut buf = vec![passworded as u8];
    buf.extend_from_slice(&players.to_le_bytes());
    buf.extend_from_slice(&max_players.to_le_bytes());
    long_string(&mut buf, hostname);
    long_string(&mut buf, gamemode);
    long_string(&mut buf, language);
    buf
}

pub fn rules_payload(rules: &[(&str, &str)]) -> Vec<u8> {
    let mut buf = (rules.len() as u16).to_le_bytes().to_vec();
    for (name, value) in rules {
        buf.push(name.len() as u8);
        buf.extend_from_slice(name.as_bytes());
        buf.push(value.len() as u8);
        buf.extend_from_slice(value.as_bytes());
    }
    buf
}

pub fn players_payload(players: &[(&str, i32)]) -> Vec<u8> {
    let mut buf = (players.len() as u16).to_le_bytes().to_vec();
    for (name, score) in players {
        buf.push(name.len() as u8);
        buf.extend_from_slice(name.as_bytes());
        buf.extend_from_slice(&score.to_le_bytes());
    }
    buf
}

pub fn detailed_payload(players: &[(u8, &str, i32, u32)]) -> Vec<u8> {
    let mut buf = (players.len() as u16).to_le_bytes().to_vec();
    for (id, name, score, ping) in players {
        buf.push(*id);
        buf.push(name.len() as u8);
        buf.extend_from_slice(name.as_bytes());
        buf.extend_from_slice(&score.to_le_bytes());
        buf.extend_from_slice(&ping.to_le_bytes());
    }
    buf
}
