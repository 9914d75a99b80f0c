use std::net::Ipv4Addr;

use crate::opcode::Opcode;

/// Magic prefix of every SA-MP query packet.
pub const MAGIC: &[u8; 4] = b"SAMP";

/// Signature (10 bytes) plus opcode (1 byte), echoed at the start of every reply.
pub const HEADER_LEN: usize = 11;

/// Largest reply datagram we accept.
pub const MAX_PACKET_SIZE: usize = 2048;

pub type RawPacket = [u8; MAX_PACKET_SIZE];

/// `"SAMP"` followed by the server's IPv4 octets and little-endian port.
///
/// Built once per session, prefixed to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; 10]);

impl Signature {
    pub fn new(addr: Ipv4Addr, port: u16) -> Self {
        let mut bytes = [0u8; 10];
        bytes[..4].copy_from_slice(MAGIC);
        bytes[4..8].copy_from_slice(&addr.octets());
        bytes[8..].copy_from_slice(&port.to_le_bytes());
        Signature(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 10] {
        &self.0
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct RequestPacket<'a> {
    signature: Signature,
    opcode: Opcode,
    payload: Option<&'a [u8]>,
}

impl<'a> RequestPacket<'a> {
    pub fn new(signature: Signature, opcode: Opcode, payload: Option<&'a [u8]>) -> Self {
        RequestPacket { signature, opcode, payload }
    }

    /// The 11 bytes a well-behaved server echoes back.
    pub fn header(&self) -> [u8; HEADER_LEN] {
        let mut header = [0u8; HEADER_LEN];
        header[..10].copy_from_slice(self.signature.as_bytes());
        header[10] = self.opcode.to_byte();
        header
    }

    /// Serializes a request packet into an array of bytes.
    pub fn pack(&self) -> Vec<u8> {
        // packet structure: signature, opcode (and payload)
        let payload: &[u8] = self.payload.unwrap_or_default();
        let mut packet: Vec<u8> = Vec::with_capacity(HEADER_LEN + payload.len());
        packet.extend_from_slice(&self.header());
        packet.extend_from_slice(payload);
        packet
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn payload(&self) -> Option<&'a [u8]> {
        self.payload
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ResponsePacket {
    header: [u8; HEADER_LEN],
    body: Vec<u8>,
}

impl ResponsePacket {
    /// Splits an incoming datagram into the echoed header and body.
    ///
    /// Returns `None` if the datagram is too short to carry a header.
    pub fn unpack(incoming: &[u8]) -> Option<Self> {
        if incoming.len() < HEADER_LEN {
            return None;
        }
        let (raw_header, body) = incoming.split_at(HEADER_LEN);
        let mut header = [0u8; HEADER_LEN];
        header.copy_from_slice(raw_header);

        Some(ResponsePacket {
            header,
            body: body.to_vec(),
        })
    }

    /// Whether the echoed header is exactly the one `request` was sent with.
    pub fn answers(&self, request: &RequestPacket<'_>) -> bool {
        self.header == request.header()
    }

    pub fn header(&self) -> &[u8; HEADER_LEN] {
        &self.header
    }

    /// The opcode byte echoed in the header.
    pub fn opcode_byte(&self) -> u8 {
        self.header[HEADER_LEN - 1]
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}
