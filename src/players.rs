use serde::Serialize;

use crate::error::SampQueryError;
use crate::parse::{get_i32, get_short_string, get_u16, get_u32, get_u8};

/// One entry of a [Players](crate::opcode::Opcode::Players) or
/// [DetailedPlayers](crate::opcode::Opcode::DetailedPlayers) reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Player {
    /// Player id, detailed list only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u8>,
    pub name: String,
    pub score: i32,
    /// Ping in milliseconds, detailed list only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ping: Option<u32>,
}

impl Player {
    /// Parse a player list reply body. `detailed` selects the `d` layout
    /// (id, name, score, ping) over the `c` layout (name, score).
    pub fn parse_list(data: &[u8], detailed: bool) -> Result<Vec<Player>, SampQueryError> {
        let mut offset: usize = 0;
        let count = get_u16(data, &mut offset)?;

        let mut players: Vec<Player> = Vec::new();
        for _ in 0..count {
            let id = if detailed { Some(get_u8(data, &mut offset)?) } else { None };
            let name = get_short_string(data, &mut offset)?;
            let score = get_i32(data, &mut offset)?;
            let ping = if detailed { Some(get_u32(data, &mut offset)?) } else { None };

            players.push(Player { id, name, score, ping });
        }
        Ok(players)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_list() {
        let mut data = 2u16.to_le_bytes().to_vec();
        data.push(4);
        data.extend_from_slice(b"Kane");
        data.extend_from_slice(&150i32.to_le_bytes());
        data.push(5);
        data.extend_from_slice(b"Ren\xe9e");
        data.extend_from_slice(&(-3i32).to_le_bytes());

        let players = Player::parse_list(&data, false).unwrap();
        assert_eq!(
            players,
            vec![
                Player { id: None, name: "Kane".to_owned(), score: 150, ping: None },
                Player { id: None, name: "Renée".to_owned(), score: -3, ping: None },
            ]
        );
    }

    #[test]
    fn parses_detailed_list() {
        let mut data = 1u16.to_le_bytes().to_vec();
        data.push(7);
        data.push(3);
        data.extend_from_slice(b"Bob");
        data.extend_from_slice(&42i32.to_le_bytes());
        data.extend_from_slice(&87u32.to_le_bytes());

        let players = Player::parse_list(&data, true).unwrap();
        assert_eq!(
            players,
            vec![Player { id: Some(7), name: "Bob".to_owned(), score: 42, ping: Some(87) }]
        );
    }

    #[test]
    fn name_longer_than_payload_fails() {
        let mut data = 1u16.to_le_bytes().to_vec();
        data.push(200);
        data.extend_from_slice(b"short");
        assert!(matches!(
            Player::parse_list(&data, false),
            Err(SampQueryError::Truncated { needed: 200, available: 5 })
        ));
    }

    #[test]
    fn missing_ping_fails() {
        let mut data = 1u16.to_le_bytes().to_vec();
        data.push(1);
        data.push(1);
        data.push(b'x');
        data.extend_from_slice(&0i32.to_le_bytes());
        assert!(Player::parse_list(&data, true).is_err());
    }

    #[test]
    fn optional_fields_are_not_serialized() {
        let player = Player { id: None, name: "Kane".to_owned(), score: 1, ping: None };
        assert_eq!(
            serde_json::to_string(&player).unwrap(),
            r#"{"name":"Kane","score":1}"#
        );
    }
}
