use serde::Serialize;

use crate::error::SampQueryError;
use crate::parse::{get_long_string, get_u16, get_u8};

/// Server information as obtained by the [Info](crate::opcode::Opcode::Info) opcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerInfo {
    /// Is the server password protected?
    #[serde(rename = "password")]
    pub passworded: bool,
    /// Current players
    pub players: u16,
    /// Max players
    #[serde(rename = "maxplayers")]
    pub max_players: u16,
    /// Server hostname
    pub hostname: String,
    /// Current gamemode
    pub gamemode: String,
    /// Server language, as set by the `language` rule
    pub language: String,
}

impl ServerInfo {
    /// Parse an info reply body (header already stripped) into its [ServerInfo].
    pub fn parse(data: &[u8]) -> Result<ServerInfo, SampQueryError> {
        let mut offset: usize = 0;

        let passworded = get_u8(data, &mut offset)? != 0;
        let players = get_u16(data, &mut offset)?;
        let max_players = get_u16(data, &mut offset)?;

        // string order is fixed by the protocol
        let hostname = get_long_string(data, &mut offset)?;
        let gamemode = get_long_string(data, &mut offset)?;
        let language = get_long_string(data, &mut offset)?;

        Ok(ServerInfo {
            passworded,
            players,
            max_players,
            hostname,
            gamemode,
            language,
        })
    }
}
