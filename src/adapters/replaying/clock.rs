//! Replaying adapter for the `Clock` port.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::cassette::CassetteReplayer;
use crate::ports::Clock;

/// Replays recorded clock values from a cassette.
///
/// Once the recorded values run out, `fallback` (normally the cassette's
/// recording time) is returned.
pub struct ReplayingClock {
    replayer: Mutex<CassetteReplayer>,
    fallback: DateTime<Utc>,
}

impl ReplayingClock {
    /// Creates a new replaying clock from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer, fallback: DateTime<Utc>) -> Self {
        Self { replayer: Mutex::new(replayer), fallback }
    }
}

impl Clock for ReplayingClock {
    fn now(&self) -> DateTime<Utc> {
        let Ok(mut replayer) = self.replayer.lock() else {
            return self.fallback;
        };
        let replayed = replayer
            .next_interaction("clock", "now", &serde_json::Value::Null)
            .map_err(|e| e.to_string())
            .and_then(|i| serde_json::from_value(i.output).map_err(|e| e.to_string()));
        replayed.unwrap_or_else(|reason| {
            warn!(%reason, "no replayable clock value; using cassette time");
            self.fallback
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::{Cassette, Interaction};
    use chrono::TimeZone;
    use serde_json::json;

    fn make_replayer(outputs: &[&str]) -> CassetteReplayer {
        let interactions = outputs
            .iter()
            .zip(0..)
            .map(|(ts, seq)| Interaction {
                seq,
                port: "clock".into(),
                method: "now".into(),
                input: json!(null),
                output: json!(ts),
            })
            .collect();
        CassetteReplayer::new(&Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            root: String::new(),
            config: None,
            interactions,
        })
    }

    #[test]
    fn serves_recorded_times_then_falls_back() {
        let fallback = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let clock = ReplayingClock::new(
            make_replayer(&["2024-01-01T00:00:00Z", "2024-01-01T00:01:00Z"]),
            fallback,
        );
        let t1 = clock.now();
        let t2 = clock.now();
        assert_eq!(t1.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert!(t2 > t1);
        assert_eq!(clock.now(), fallback);
    }
}
