//! Entity kinds and identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The kind of a hub entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    /// Media player entity (power, volume, source, sound mode).
    MediaPlayer,
    /// Read-only sensor entity.
    Sensor,
    /// Option-list select entity.
    Select,
    /// Remote entity (activity integration).
    Remote,
}

impl EntityKind {
    /// Returns the identifier prefix used by the hub.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::MediaPlayer => "media_player",
            EntityKind::Sensor => "sensor",
            EntityKind::Select => "select",
            EntityKind::Remote => "remote",
        }
    }

    /// Parses a kind from its identifier prefix.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "media_player" => Some(EntityKind::MediaPlayer),
            "sensor" => Some(EntityKind::Sensor),
            "select" => Some(EntityKind::Select),
            "remote" => Some(EntityKind::Remote),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an entity identifier cannot be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntityIdError {
    /// The identifier had no kind prefix or no device part.
    #[error("malformed entity id: {0:?}")]
    Malformed(String),
    /// The kind prefix is not one of the known entity kinds.
    #[error("unknown entity kind: {0:?}")]
    UnknownKind(String),
}

/// A named, independently addressable hub entity.
///
/// Identifiers follow the hub's dotted scheme: `<kind>.<device>` for the
/// primary entity of a kind, `<kind>.<device>.<facet>` for additional
/// entities of the same kind (e.g. `sensor.living-room.volume`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId {
    kind: EntityKind,
    device: String,
    facet: Option<String>,
}

impl EntityId {
    /// Creates an identifier for the primary entity of a kind.
    pub fn new(kind: EntityKind, device: impl Into<String>) -> Self {
        Self {
            kind,
            device: device.into(),
            facet: None,
        }
    }

    /// Creates an identifier with a facet suffix.
    pub fn with_facet(kind: EntityKind, device: impl Into<String>, facet: impl Into<String>) -> Self {
        Self {
            kind,
            device: device.into(),
            facet: Some(facet.into()),
        }
    }

    /// Returns the entity kind.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Returns the device identifier this entity belongs to.
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Returns the facet suffix, if any.
    pub fn facet(&self) -> Option<&str> {
        self.facet.as_deref()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.facet {
            Some(facet) => write!(f, "{}.{}.{}", self.kind, self.device, facet),
            None => write!(f, "{}.{}", self.kind, self.device),
        }
    }
}

impl FromStr for EntityId {
    type Err = EntityIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '.');
        let prefix = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| EntityIdError::Malformed(s.into()))?;
        let device = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| EntityIdError::Malformed(s.into()))?;
        let kind = EntityKind::from_prefix(prefix)
            .ok_or_else(|| EntityIdError::UnknownKind(prefix.into()))?;

        match parts.next() {
            Some(facet) if !facet.is_empty() => Ok(EntityId::with_facet(kind, device, facet)),
            Some(_) => Err(EntityIdError::Malformed(s.into())),
            None => Ok(EntityId::new(kind, device)),
        }
    }
}

impl Serialize for EntityId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
