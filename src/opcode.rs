use std::fmt;

use crate::error::SampQueryError;

/// Query opcodes understood by SA-MP and open.mp servers.
/// See https://sampwiki.blast.hk/wiki/Query_Mechanism
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// `i` -- password flag, player counts, hostname, gamemode and language.
    Info,
    /// `r` -- server rules (`version`, `weather`, `lagcomp`, ...).
    Rules,
    /// `c` -- player names and scores.
    Players,
    /// `d` -- player ids, names, scores and pings.
    /// open.mp servers never answer this one.
    DetailedPlayers,
    /// `p` -- echoes back 4 bytes of payload.
    Ping,
}

impl Opcode {
    pub const ALL: [Opcode; 5] = [
        Opcode::Info,
        Opcode::Rules,
        Opcode::Players,
        Opcode::DetailedPlayers,
        Opcode::Ping,
    ];

    /// For packing an [Opcode] into a packet in [RequestPacket::pack](crate::packet::RequestPacket::pack).
    pub fn to_byte(self) -> u8 {
        match self {
            Opcode::Info => b'i',
            Opcode::Rules => b'r',
            Opcode::Players => b'c',
            Opcode::DetailedPlayers => b'd',
            Opcode::Ping => b'p',
        }
    }

    pub fn is_player_list(self) -> bool {
        matches!(self, Opcode::Players | Opcode::DetailedPlayers)
    }

    /// Parse a string of opcode characters such as `"icr"`.
    ///
    /// Unknown characters are skipped and repeated opcodes keep their first position.
    pub fn parse_list(codes: &str) -> Vec<Opcode> {
        let mut opcodes: Vec<Opcode> = Vec::new();
        for c in codes.chars() {
            if let Ok(opcode) = Opcode::try_from(c) {
                if !opcodes.contains(&opcode) {
                    opcodes.push(opcode);
                }
            }
        }
        opcodes
    }
}

/// Convert a u8 into an [Opcode].
impl TryFrom<u8> for Opcode {
    type Error = SampQueryError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            b'i' => Ok(Opcode::Info),
            b'r' => Ok(Opcode::Rules),
            b'c' => Ok(Opcode::Players),
            b'd' => Ok(Opcode::DetailedPlayers),
            b'p' => Ok(Opcode::Ping),
            n => Err(SampQueryError::UnknownOpcode(n)),
        }
    }
}

impl TryFrom<char> for Opcode {
    type Error = SampQueryError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        u8::try_from(c)
            .map_err(|_| SampQueryError::UnknownOpcode(0xff))
            .and_then(Opcode::try_from)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Opcode::Info => "info",
            Opcode::Rules => "rules",
            Opcode::Players => "players",
            Opcode::DetailedPlayers => "detailed players",
            Opcode::Ping => "ping",
        };
        write!(f, "{name} ({})", char::from(self.to_byte()))
    }
}
