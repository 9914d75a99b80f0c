//! I/O-free request encoding and per-opcode reply decoding.

use serde::Serialize;

use crate::error::SampQueryError;
use crate::info::ServerInfo;
use crate::opcode::Opcode;
use crate::packet::{RequestPacket, Signature};
use crate::players::Player;
use crate::rules::ServerRules;

/// A decoded reply to one opcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryResult {
    Info(ServerInfo),
    Rules(ServerRules),
    Players(Vec<Player>),
    /// Ping echo matched
    Online(bool),
}

impl QueryResult {
    /// Empty rule and player lists and a failed ping count as empty.
    pub fn is_empty(&self) -> bool {
        match self {
            QueryResult::Info(_) => false,
            QueryResult::Rules(rules) => rules.is_empty(),
            QueryResult::Players(players) => players.is_empty(),
            QueryResult::Online(online) => !online,
        }
    }

    pub fn as_rules(&self) -> Option<&ServerRules> {
        match self {
            QueryResult::Rules(rules) => Some(rules),
            _ => None,
        }
    }
}

pub fn encode(signature: Signature, opcode: Opcode, payload: Option<&[u8]>) -> Vec<u8> {
    RequestPacket::new(signature, opcode, payload).pack()
}

/// Decode a reply body for `opcode`.
///
/// `sent` is the payload the request carried, only looked at for [Opcode::Ping].
/// No reply, or an empty one, is `Ok(None)` (`Online(false)` for a ping) rather than an error.
pub fn decode(opcode: Opcode, body: Option<&[u8]>, sent: &[u8]) -> Result<Option<QueryResult>, SampQueryError> {
    let body: &[u8] = match body {
        Some(body) if !body.is_empty() => body,
        _ if opcode == Opcode::Ping => return Ok(Some(QueryResult::Online(false))),
        _ => return Ok(None),
    };

    let result = match opcode {
        Opcode::Info => QueryResult::Info(ServerInfo::parse(body)?),
        Opcode::Rules => QueryResult::Rules(ServerRules::parse(body)?),
        Opcode::Players => QueryResult::Players(Player::parse_list(body, false)?),
        Opcode::DetailedPlayers => QueryResult::Players(Player::parse_list(body, true)?),
        Opcode::Ping => QueryResult::Online(body == sent),
    };
    Ok(Some(result))
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    #[test]
    fn encode_is_signature_opcode_payload() {
        let signature = Signature::new(Ipv4Addr::new(10, 0, 0, 1), 7777);
        let bytes = encode(signature, Opcode::Ping, Some(&[9, 8, 7, 6][..]));
        assert_eq!(&bytes[..10], signature.as_bytes());
        assert_eq!(&bytes[10..], &[b'p', 9, 8, 7, 6]);
    }

    #[test]
    fn missing_reply_is_empty_not_error() {
        for opcode in [Opcode::Info, Opcode::Rules, Opcode::Players, Opcode::DetailedPlayers] {
            assert_eq!(decode(opcode, None, &[]).unwrap(), None);
            assert_eq!(decode(opcode, Some(&[][..]), &[]).unwrap(), None);
        }
    }

    #[test]
    fn ping_compares_echo() {
        let sent = [1, 2, 3, 4];
        assert_eq!(
            decode(Opcode::Ping, Some(&sent[..]), &sent).unwrap(),
            Some(QueryResult::Online(true))
        );
        assert_eq!(
            decode(Opcode::Ping, Some(&[1, 2, 3, 5][..]), &sent).unwrap(),
            Some(QueryResult::Online(false))
        );
        assert_eq!(
            decode(Opcode::Ping, None, &sent).unwrap(),
            Some(QueryResult::Online(false))
        );
    }

    #[test]
    fn dispatches_player_layouts() {
        let mut basic = 1u16.to_le_bytes().to_vec();
        basic.extend_from_slice(&[1, b'a']);
        basic.extend_from_slice(&5i32.to_le_bytes());

        match decode(Opcode::Players, Some(basic.as_slice()), &[]).unwrap() {
            Some(QueryResult::Players(players)) => assert_eq!(players[0].id, None),
            other => panic!("unexpected {other:?}"),
        }
        assert!(decode(Opcode::DetailedPlayers, Some(basic.as_slice()), &[]).is_err());
    }

    #[test]
    fn emptiness() {
        assert!(QueryResult::Rules(ServerRules::new()).is_empty());
        assert!(QueryResult::Players(Vec::new()).is_empty());
        assert!(QueryResult::Online(false).is_empty());
        assert!(!QueryResult::Online(true).is_empty());
    }
}
