//! Cassette data structures for recording and replaying interactions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ContextConfig;

/// A single recorded interaction with a port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    /// Sequence number (assigned automatically by the recorder).
    pub seq: u64,
    /// Port name (`source` or `clock`).
    pub port: String,
    /// Method name invoked on the port.
    pub method: String,
    /// Input data sent to the port.
    pub input: serde_json::Value,
    /// Output data returned from the port.
    pub output: serde_json::Value,
}

/// A cassette containing a sequence of recorded interactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cassette {
    /// Human-readable name for this cassette.
    pub name: String,
    /// When this cassette was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Root directory the session read from, for reference only.
    #[serde(default)]
    pub root: String,
    /// File-level configuration the session ran with, before environment
    /// and flag overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ContextConfig>,
    /// Interactions in the order they completed.
    pub interactions: Vec<Interaction>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn yaml_round_trip() {
        let cassette = Cassette {
            name: "generate".into(),
            recorded_at: Utc::now(),
            root: "/work/app".into(),
            config: Some(ContextConfig { format: "markdown".into(), ..ContextConfig::default() }),
            interactions: vec![
                Interaction {
                    seq: 0,
                    port: "source".into(),
                    method: "list_children".into(),
                    input: json!({ "path": "" }),
                    output: json!({ "ok": [{ "name": "a.ts", "kind": "file" }] }),
                },
                Interaction {
                    seq: 1,
                    port: "clock".into(),
                    method: "now".into(),
                    input: json!(null),
                    output: json!("2024-06-15T10:30:00Z"),
                },
            ],
        };
        let yaml = serde_yaml::to_string(&cassette).expect("serialize");
        let deserialized: Cassette = serde_yaml::from_str(&yaml).expect("deserialize");
        assert_eq!(cassette, deserialized);
    }

    #[test]
    fn cassettes_without_config_still_load() {
        let yaml = "name: old\nrecorded_at: 2024-06-15T10:30:00Z\nroot: /work/app\ninteractions: []\n";
        let cassette: Cassette = serde_yaml::from_str(yaml).expect("deserialize");
        assert_eq!(cassette.config, None);
        assert!(!serde_yaml::to_string(&cassette).expect("serialize").contains("config"));
    }
}
