use log::{debug, warn};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::codec::QueryResult;
use crate::config::QueryConfig;
use crate::error::SampQueryError;
use crate::opcode::Opcode;
use crate::session::Session;

/// Key a result is reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Info,
    Rules,
    Players,
    Online,
}

impl Label {
    pub fn as_str(self) -> &'static str {
        match self {
            Label::Info => "info",
            Label::Rules => "rules",
            Label::Players => "players",
            Label::Online => "online",
        }
    }
}

impl From<Opcode> for Label {
    fn from(opcode: Opcode) -> Self {
        match opcode {
            Opcode::Info => Label::Info,
            Opcode::Rules => Label::Rules,
            Opcode::Players | Opcode::DetailedPlayers => Label::Players,
            Opcode::Ping => Label::Online,
        }
    }
}

/// Labeled results in the order they were recorded. A label is set at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryReport {
    entries: Vec<(Label, QueryResult)>,
}

impl QueryReport {
    /// Record `result` under `label` unless the label is already populated.
    /// Returns whether it was recorded.
    pub fn insert(&mut self, label: Label, result: QueryResult) -> bool {
        if self.contains(label) {
            return false;
        }
        self.entries.push((label, result));
        true
    }

    pub fn contains(&self, label: Label) -> bool {
        self.entries.iter().any(|(l, _)| *l == label)
    }

    pub fn get(&self, label: Label) -> Option<&QueryResult> {
        self.entries.iter().find(|(l, _)| *l == label).map(|(_, r)| r)
    }

    pub fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.entries.iter().map(|(l, _)| *l)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for QueryReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, result) in &self.entries {
            map.serialize_entry(label.as_str(), result)?;
        }
        map.end()
    }
}

/// What a query run hands back: one bare result, or several labeled ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryOutcome {
    Single(QueryResult),
    Report(QueryReport),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Only non-empty results; a lone result is returned bare.
    #[default]
    Focused,
    /// Labeled report with open.mp detection for detailed player lists.
    Status,
}

/// Drop repeats, then drop whichever of [Opcode::Players] / [Opcode::DetailedPlayers] comes second.
pub fn resolve_conflicts(opcodes: &[Opcode]) -> Vec<Opcode> {
    let mut resolved: Vec<Opcode> = Vec::with_capacity(opcodes.len());
    for &opcode in opcodes {
        if resolved.contains(&opcode) {
            continue;
        }
        if opcode.is_player_list() && resolved.iter().any(|o| o.is_player_list()) {
            continue;
        }
        resolved.push(opcode);
    }
    resolved
}

/// The opcodes a run will actually consider: `default` if none were requested, conflicts resolved.
pub fn plan(opcodes: &[Opcode], default: Opcode) -> Vec<Opcode> {
    if opcodes.is_empty() {
        vec![default]
    } else {
        resolve_conflicts(opcodes)
    }
}

/// Query one opcode, treating decode failures as no answer.
async fn fetch(session: &Session, opcode: Opcode) -> Option<QueryResult> {
    match session.query(opcode).await {
        Ok(result) => result,
        Err(e) => {
            warn!("{}: dropping {opcode}: {e}", session.peer());
            None
        }
    }
}

/// Query each planned opcode in turn and keep the non-empty results.
///
/// If exactly one label ends up populated its result is returned on its own.
pub async fn query_focused(session: &Session, opcodes: &[Opcode], default: Opcode) -> QueryOutcome {
    let mut report = QueryReport::default();

    for opcode in plan(opcodes, default) {
        match fetch(session, opcode).await {
            Some(result) if !result.is_empty() => {
                report.insert(opcode.into(), result);
            }
            _ => debug!("{}: {opcode} left out", session.peer()),
        }
    }

    if report.len() == 1 {
        if let Some((_, result)) = report.entries.pop() {
            return QueryOutcome::Single(result);
        }
    }
    QueryOutcome::Report(report)
}

/// Labeled status report.
///
/// When a detailed player list is requested, rules are fetched first. If their
/// `version` contains `marker` the server cannot answer `d`, so `c` is sent instead.
pub async fn query_status(session: &Session, opcodes: &[Opcode], default: Opcode, marker: &str) -> QueryReport {
    let planned: Vec<Opcode> = plan(opcodes, default);
    let mut report = QueryReport::default();
    let mut substituted = false;

    if planned.contains(&Opcode::DetailedPlayers) {
        let rules: QueryResult = match fetch(session, Opcode::Rules).await {
            Some(rules @ QueryResult::Rules(_)) => rules,
            _ => QueryResult::Rules(Default::default()),
        };

        let version: Option<&str> = rules.as_rules().and_then(|r| r.version());
        substituted = version.is_some_and(|v| v.contains(marker));
        debug!(
            "{}: version {version:?}, detailed players {}",
            session.peer(),
            if substituted { "unsupported" } else { "supported" }
        );
        report.insert(Label::Rules, rules);

        if substituted {
            if let Some(players) = fetch(session, Opcode::Players).await {
                if !players.is_empty() {
                    report.insert(Label::Players, players);
                }
            }
        }
    }

    for opcode in planned {
        let label = Label::from(opcode);
        if report.contains(label) || (substituted && opcode == Opcode::DetailedPlayers) {
            continue;
        }
        match fetch(session, opcode).await {
            Some(result) if opcode == Opcode::Ping || !result.is_empty() => {
                report.insert(label, result);
            }
            _ => debug!("{}: {opcode} left out", session.peer()),
        }
    }

    report
}

/// Connect to the configured server, run one query in `mode` and close the socket.
///
/// Example usage:
/// ```no_run
/// # async fn run() -> Result<(), rsampquery::error::SampQueryError> {
/// use rsampquery::{query, Mode, Opcode, QueryConfig};
///
/// let config = QueryConfig::new("127.0.0.1", 7777);
/// let outcome = query(&config, &Opcode::parse_list("ir"), Mode::Focused).await?;
/// # Ok(())
/// # }
/// ```
pub async fn query(config: &QueryConfig, opcodes: &[Opcode], mode: Mode) -> Result<QueryOutcome, SampQueryError> {
    let session: Session = Session::connect(config).await?;

    let outcome = match mode {
        Mode::Focused => query_focused(&session, opcodes, config.default_opcode).await,
        Mode::Status => QueryOutcome::Report(
            query_status(&session, opcodes, config.default_opcode, &config.flavor_marker).await,
        ),
    };
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::ServerRules;

    #[test]
    fn earlier_player_list_wins() {
        assert_eq!(
            resolve_conflicts(&[Opcode::Players, Opcode::DetailedPlayers]),
            vec![Opcode::Players]
        );
        assert_eq!(
            resolve_conflicts(&[Opcode::DetailedPlayers, Opcode::Players]),
            vec![Opcode::DetailedPlayers]
        );
        assert_eq!(
            resolve_conflicts(&[Opcode::Info, Opcode::DetailedPlayers, Opcode::Rules, Opcode::Players]),
            vec![Opcode::Info, Opcode::DetailedPlayers, Opcode::Rules]
        );
    }

    #[test]
    fn plan_substitutes_default() {
        assert_eq!(plan(&[], Opcode::Info), vec![Opcode::Info]);
        assert_eq!(plan(&[Opcode::Rules], Opcode::Info), vec![Opcode::Rules]);
    }

    #[test]
    fn report_never_overwrites() {
        let mut report = QueryReport::default();
        assert!(report.insert(Label::Online, QueryResult::Online(true)));
        assert!(!report.insert(Label::Online, QueryResult::Online(false)));
        assert_eq!(report.get(Label::Online), Some(&QueryResult::Online(true)));
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn labels_follow_opcodes() {
        assert_eq!(Label::from(Opcode::DetailedPlayers), Label::Players);
        assert_eq!(Label::from(Opcode::Players), Label::Players);
        assert_eq!(Label::from(Opcode::Ping).as_str(), "online");
    }

    #[test]
    fn report_serializes_by_label() {
        let mut rules = ServerRules::new();
        rules.insert("version".to_owned(), "0.3.7-R2".to_owned());

        let mut report = QueryReport::default();
        report.insert(Label::Rules, QueryResult::Rules(rules));
        report.insert(Label::Online, QueryResult::Online(true));

        assert_eq!(
            serde_json::to_string(&QueryOutcome::Report(report)).unwrap(),
            r#"{"rules":{"version":"0.3.7-R2"},"online":true}"#
        );
    }
}
