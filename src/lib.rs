//! Pure Rust async implementation of the [SA-MP Query Mechanism](https://sampwiki.blast.hk/wiki/Query_Mechanism),
//! also spoken by open.mp servers.
pub mod codec;
pub mod config;
pub mod error;
pub mod info;
pub mod opcode;
pub mod packet;
mod parse;
pub mod players;
pub mod query;
pub mod rules;
pub mod session;

pub use codec::QueryResult;
pub use config::QueryConfig;
pub use error::{Result, SampQueryError};
pub use opcode::Opcode;
pub use query::{query, Mode, QueryOutcome, QueryReport};
pub use session::Session;
