//! Replays recorded interactions from a cassette.

use std::collections::{HashMap, VecDeque};

use super::format::{Cassette, Interaction};
use crate::error::CassetteError;

/// Key for indexing interactions by port, method and input.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct CallKey {
    port: String,
    method: String,
    input: String,
}

impl CallKey {
    fn new(port: &str, method: &str, input: &serde_json::Value) -> Self {
        Self { port: port.to_string(), method: method.to_string(), input: input.to_string() }
    }
}

/// Replays interactions from a loaded cassette.
///
/// Interactions are served per `(port, method, input)` in recorded order, so
/// calls that were issued concurrently replay correctly no matter which
/// completes first.
#[derive(Debug, Default)]
pub struct CassetteReplayer {
    queues: HashMap<CallKey, VecDeque<Interaction>>,
}

impl CassetteReplayer {
    /// Create a new replayer from a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<CallKey, VecDeque<Interaction>> = HashMap::new();
        for interaction in &cassette.interactions {
            let key = CallKey::new(&interaction.port, &interaction.method, &interaction.input);
            queues.entry(key).or_default().push_back(interaction.clone());
        }
        Self { queues }
    }

    /// Takes the next interaction recorded for this call.
    ///
    /// # Errors
    ///
    /// Returns [`CassetteError::Unrecorded`] if the cassette has no (more)
    /// interactions for the call.
    pub fn next_interaction(
        &mut self,
        port: &str,
        method: &str,
        input: &serde_json::Value,
    ) -> Result<Interaction, CassetteError> {
        let key = CallKey::new(port, method, input);
        self.queues.get_mut(&key).and_then(VecDeque::pop_front).ok_or_else(|| {
            CassetteError::Unrecorded {
                port: port.to_string(),
                method: method.to_string(),
                input: key.input.clone(),
            }
        })
    }

    /// Number of interactions not yet served.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn interaction(seq: u64, path: &str, output: serde_json::Value) -> Interaction {
        Interaction {
            seq,
            port: "source".into(),
            method: "read_file".into(),
            input: json!({ "path": path }),
            output,
        }
    }

    fn make_cassette(interactions: Vec<Interaction>) -> Cassette {
        Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            root: String::new(),
            config: None,
            interactions,
        }
    }

    #[test]
    fn serves_by_input_regardless_of_request_order() {
        let cassette = make_cassette(vec![
            interaction(0, "b.ts", json!({ "ok": "B" })),
            interaction(1, "a.ts", json!({ "ok": "A" })),
        ]);
        let mut replayer = CassetteReplayer::new(&cassette);

        let a = replayer.next_interaction("source", "read_file", &json!({ "path": "a.ts" })).unwrap();
        assert_eq!(a.output, json!({ "ok": "A" }));
        let b = replayer.next_interaction("source", "read_file", &json!({ "path": "b.ts" })).unwrap();
        assert_eq!(b.seq, 0);
        assert_eq!(replayer.remaining(), 0);
    }

    #[test]
    fn repeated_calls_replay_in_recorded_order() {
        let cassette = make_cassette(vec![
            interaction(0, "a.ts", json!({ "ok": "first" })),
            interaction(1, "a.ts", json!({ "ok": "second" })),
        ]);
        let mut replayer = CassetteReplayer::new(&cassette);
        let input = json!({ "path": "a.ts" });
        assert_eq!(replayer.next_interaction("source", "read_file", &input).unwrap().seq, 0);
        assert_eq!(replayer.next_interaction("source", "read_file", &input).unwrap().seq, 1);
    }

    #[test]
    fn exhausted_or_unknown_calls_are_errors() {
        let cassette = make_cassette(vec![interaction(0, "a.ts", json!({ "ok": "A" }))]);
        let mut replayer = CassetteReplayer::new(&cassette);
        let input = json!({ "path": "a.ts" });
        replayer.next_interaction("source", "read_file", &input).unwrap();

        let err = replayer.next_interaction("source", "read_file", &input).unwrap_err();
        assert!(err.to_string().contains("source::read_file"));
        assert!(matches!(
            replayer.next_interaction("clock", "now", &json!(null)),
            Err(CassetteError::Unrecorded { .. })
        ));
    }
}
