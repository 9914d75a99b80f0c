use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::SampQueryError;
use crate::parse::{get_short_string, get_u16};

/// Server rules as obtained by the [Rules](crate::opcode::Opcode::Rules) opcode.
///
/// Keeps the order the server sent them in. A repeated name replaces the
/// earlier value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerRules {
    entries: Vec<(String, String)>,
}

impl ServerRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(data: &[u8]) -> Result<ServerRules, SampQueryError> {
        let mut offset: usize = 0;
        let count = get_u16(data, &mut offset)?;

        let mut rules = ServerRules::new();
        for _ in 0..count {
            let name = get_short_string(data, &mut offset)?;
            let value = get_short_string(data, &mut offset)?;
            rules.insert(name, value);
        }
        Ok(rules)
    }

    /// Set `name` to `value`, returning the previous value if any.
    pub fn insert(&mut self, name: String, value: String) -> Option<String> {
        match self.entries.iter().position(|(n, _)| *n == name) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// The `version` rule, e.g. `0.3.7-R2` on SA-MP or `omp 1.2.0.2670` on open.mp.
    pub fn version(&self) -> Option<&str> {
        self.get("version")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ServerRules {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
