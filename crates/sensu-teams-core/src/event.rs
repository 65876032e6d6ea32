//! Data structures for the Sensu events handed to the handler on stdin.
//!
//! The structures follow the Sensu Go wire format (snake_case JSON, names and
//! labels nested under `metadata`). Only the fields a handler can reasonably
//! render are modelled; unknown fields are ignored during deserialization.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::error::EventError;

/// Sensu Go encodes nil slices and maps as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Name, namespace, labels and annotations shared by entities and checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ObjectMeta {
    pub name: String,
    pub namespace: String,
    #[serde(deserialize_with = "null_as_default")]
    pub labels: BTreeMap<String, String>,
    #[serde(deserialize_with = "null_as_default")]
    pub annotations: BTreeMap<String, String>,
}

/// The monitored entity an event is about.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Entity {
    pub metadata: ObjectMeta,
    /// Usually `agent` or `proxy`.
    pub entity_class: String,
    #[serde(deserialize_with = "null_as_default")]
    pub subscriptions: Vec<String>,
    pub last_seen: i64,
}

/// The check result carried by an event.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Check {
    pub metadata: ObjectMeta,
    pub command: String,
    pub interval: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub handlers: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub subscriptions: Vec<String>,
    /// Exit status of the check: 0 is OK, 2 is critical, everything else a warning.
    pub status: i64,
    pub state: String,
    pub output: String,
    /// Number of consecutive results with the same status.
    pub occurrences: i64,
    pub occurrences_watermark: i64,
    pub issued: i64,
    pub executed: i64,
    pub last_ok: i64,
    pub total_state_change: u32,
    pub duration: f64,
}

/// A single check result for a single entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub entity: Entity,
    pub check: Check,
}

impl Event {
    /// Builds a minimal, passing event for the given entity and check names.
    #[must_use]
    pub fn fixture(entity_name: &str, check_name: &str) -> Self {
        Self {
            timestamp: 1_700_000_000,
            id: None,
            entity: Entity {
                metadata: ObjectMeta {
                    name: entity_name.to_string(),
                    namespace: "default".to_string(),
                    ..ObjectMeta::default()
                },
                entity_class: "host".to_string(),
                ..Entity::default()
            },
            check: Check {
                metadata: ObjectMeta {
                    name: check_name.to_string(),
                    namespace: "default".to_string(),
                    ..ObjectMeta::default()
                },
                interval: 60,
                state: "passing".to_string(),
                ..Check::default()
            },
        }
    }

    /// Rejects events that do not identify both an entity and a check.
    pub fn validate(&self) -> Result<(), EventError> {
        if self.entity.metadata.name.is_empty() {
            return Err(EventError::MissingEntityName);
        }
        if self.check.metadata.name.is_empty() {
            return Err(EventError::MissingCheckName);
        }
        Ok(())
    }

    /// Returns the value templates are evaluated against.
    ///
    /// Field names are PascalCase so that templates written for other Sensu
    /// handlers (`{{.Entity.Name}}`, `{{.Check.Output}}`) work unchanged.
    #[must_use]
    pub fn template_context(&self) -> Value {
        json!({
            "Timestamp": self.timestamp,
            "ID": self.id.clone().unwrap_or_default(),
            "Entity": {
                "Name": self.entity.metadata.name,
                "Namespace": self.entity.metadata.namespace,
                "Labels": self.entity.metadata.labels,
                "Annotations": self.entity.metadata.annotations,
                "EntityClass": self.entity.entity_class,
                "Subscriptions": self.entity.subscriptions,
                "LastSeen": self.entity.last_seen,
            },
            "Check": {
                "Name": self.check.metadata.name,
                "Namespace": self.check.metadata.namespace,
                "Labels": self.check.metadata.labels,
                "Annotations": self.check.metadata.annotations,
                "Command": self.check.command,
                "Interval": self.check.interval,
                "Handlers": self.check.handlers,
                "Subscriptions": self.check.subscriptions,
                "Status": self.check.status,
                "State": self.check.state,
                "Output": self.check.output,
                "Occurrences": self.check.occurrences,
                "OccurrencesWatermark": self.check.occurrences_watermark,
                "Issued": self.check.issued,
                "Executed": self.check.executed,
                "LastOK": self.check.last_ok,
                "TotalStateChange": self.check.total_state_change,
                "Duration": self.check.duration,
            },
        })
    }
}
