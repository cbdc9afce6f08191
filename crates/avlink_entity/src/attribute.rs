//! Attribute values and per-entity update bundles.

use crate::id::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single attribute value as the hub consumes it.
///
/// The hub speaks JSON; the variants cover every attribute the driver
/// reports (states, volume levels, option names, option lists).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Boolean attribute (e.g. `muted`).
    Bool(bool),
    /// Integer attribute (e.g. `volume`).
    Integer(i64),
    /// Text attribute (e.g. `state`, `source`).
    Text(String),
    /// List-of-text attribute (e.g. `source_list`).
    TextList(Vec<String>),
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.into())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(value: Vec<String>) -> Self {
        AttributeValue::TextList(value)
    }
}

/// A full attribute update for one entity.
///
/// Attribute maps are ordered so serialized payloads are stable, which
/// keeps update comparison and test assertions deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityUpdate {
    /// The entity this update targets.
    pub entity_id: EntityId,
    /// Attribute name to value.
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl EntityUpdate {
    /// Creates an empty update for an entity.
    pub fn new(entity_id: EntityId) -> Self {
        Self {
            entity_id,
            attributes: BTreeMap::new(),
        }
    }

    /// Adds an attribute, builder-style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Returns an attribute value by name.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::EntityKind;

    #[test]
    fn value_conversions() {
        assert_eq!(AttributeValue::from(true), AttributeValue::Bool(true));
        assert_eq!(AttributeValue::from(42i64), AttributeValue::Integer(42));
        assert_eq!(
            AttributeValue::from("HDMI 1"),
            AttributeValue::Text("HDMI 1".into())
        );
    }

    #[test]
    fn update_builder() {
        let update = EntityUpdate::new(EntityId::new(EntityKind::MediaPlayer, "den"))
            .with("state", "ON")
            .with("volume", 35i64)
            .with("muted", false);

        assert_eq!(update.get("state"), Some(&AttributeValue::Text("ON".into())));
        assert_eq!(update.get("volume"), Some(&AttributeValue::Integer(35)));
        assert_eq!(update.get("muted"), Some(&AttributeValue::Bool(false)));
        assert_eq!(update.get("source"), None);
    }

    #[test]
    fn serializes_to_hub_json() {
        let update = EntityUpdate::new(EntityId::new(EntityKind::Remote, "den")).with("state", "OFF");

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["entity_id"], "remote.den");
        assert_eq!(json["attributes"]["state"], "OFF");
    }

    #[test]
    fn list_attribute_serializes_as_array() {
        let update = EntityUpdate::new(EntityId::with_facet(
            EntityKind::Select,
            "den",
            "input_source",
        ))
        .with(
            "options",
            vec!["TV ARC".to_string(), "HDMI 1".to_string()],
        );

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["attributes"]["options"][1], "HDMI 1");
    }
}
