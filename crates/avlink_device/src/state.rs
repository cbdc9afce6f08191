//! Receiver state mirror and entity snapshot rendering.

use avlink_entity::{EntityId, EntityKind, EntityUpdate, StateSnapshot};
use std::fmt;

/// Input sources common to all supported receiver models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputSource {
    /// TV over HDMI ARC.
    #[default]
    TvArc,
    /// HDMI input 1.
    Hdmi1,
    /// HDMI input 2.
    Hdmi2,
    /// HDMI input 3.
    Hdmi3,
    /// HDMI input 4.
    Hdmi4,
    /// Coaxial digital input.
    Coax,
    /// Optical digital input.
    Optical,
    /// Analog input 1.
    Analog1,
    /// Analog input 2.
    Analog2,
    /// Bluetooth audio.
    Bluetooth,
    /// Network streaming.
    Network,
}

impl InputSource {
    /// All sources, in the order the hub shows them.
    pub const ALL: [InputSource; 11] = [
        InputSource::TvArc,
        InputSource::Hdmi1,
        InputSource::Hdmi2,
        InputSource::Hdmi3,
        InputSource::Hdmi4,
        InputSource::Coax,
        InputSource::Optical,
        InputSource::Analog1,
        InputSource::Analog2,
        InputSource::Bluetooth,
        InputSource::Network,
    ];

    /// The display name the hub shows for this source.
    pub fn name(&self) -> &'static str {
        match self {
            InputSource::TvArc => "TV ARC",
            InputSource::Hdmi1 => "HDMI 1",
            InputSource::Hdmi2 => "HDMI 2",
            InputSource::Hdmi3 => "HDMI 3",
            InputSource::Hdmi4 => "HDMI 4",
            InputSource::Coax => "Coax",
            InputSource::Optical => "Optical",
            InputSource::Analog1 => "Analog 1",
            InputSource::Analog2 => "Analog 2",
            InputSource::Bluetooth => "Bluetooth",
            InputSource::Network => "Network",
        }
    }

    /// The full source list as shown in option attributes.
    pub fn names() -> Vec<String> {
        Self::ALL.iter().map(|s| s.name().to_string()).collect()
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Surround modes common to all supported receiver models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurroundMode {
    /// Plain two-channel stereo.
    Stereo20,
    /// Stereo with subwoofer.
    Stereo21,
    /// Stereo on all speakers.
    AllStereo,
    /// Pass the source format through untouched.
    #[default]
    Native,
}

impl SurroundMode {
    /// All modes, in the order the hub shows them.
    pub const ALL: [SurroundMode; 4] = [
        SurroundMode::Stereo20,
        SurroundMode::Stereo21,
        SurroundMode::AllStereo,
        SurroundMode::Native,
    ];

    /// The display name the hub shows for this mode.
    pub fn name(&self) -> &'static str {
        match self {
            SurroundMode::Stereo20 => "Stereo 2.0",
            SurroundMode::Stereo21 => "Stereo 2.1",
            SurroundMode::AllStereo => "All Stereo",
            SurroundMode::Native => "Native",
        }
    }

    /// The full mode list as shown in option attributes.
    pub fn names() -> Vec<String> {
        Self::ALL.iter().map(|m| m.name().to_string()).collect()
    }
}

impl fmt::Display for SurroundMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A state change reported by the appliance client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateEvent {
    /// Power state changed.
    Power(bool),
    /// Volume changed (0-99).
    Volume(u8),
    /// Mute state changed.
    Muted(bool),
    /// Input source changed.
    Source(InputSource),
    /// Surround mode changed.
    Surround(SurroundMode),
    /// The receiver identified its model.
    ModelIdentified(String),
}

/// The ids of every entity a device session owns.
pub fn owned_entity_ids(identifier: &str) -> Vec<EntityId> {
    vec![
        EntityId::new(EntityKind::MediaPlayer, identifier),
        EntityId::with_facet(EntityKind::Sensor, identifier, "model"),
        EntityId::with_facet(EntityKind::Sensor, identifier, "volume"),
        EntityId::with_facet(EntityKind::Sensor, identifier, "input"),
        EntityId::with_facet(EntityKind::Sensor, identifier, "surround_mode"),
        EntityId::with_facet(EntityKind::Sensor, identifier, "muted"),
        EntityId::with_facet(EntityKind::Sensor, identifier, "connection"),
        EntityId::with_facet(EntityKind::Select, identifier, "input_source"),
        EntityId::with_facet(EntityKind::Select, identifier, "surround_mode"),
        EntityId::new(EntityKind::Remote, identifier),
    ]
}

/// Driver-side mirror of the receiver's state.
///
/// `apply` folds in appliance events and reports whether anything actually
/// changed; the session only notifies the sync core on change. `snapshot`
/// always renders the full entity bundle, so the hub never sees a partial
/// update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverState {
    identifier: String,
    power: bool,
    volume: u8,
    muted: bool,
    source: InputSource,
    surround: SurroundMode,
    model_name: Option<String>,
    connected: bool,
}

impl ReceiverState {
    /// Creates the initial state for a device.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            power: false,
            volume: 0,
            muted: false,
            source: InputSource::default(),
            surround: SurroundMode::default(),
            model_name: None,
            connected: false,
        }
    }

    /// Returns the device identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the current power state.
    pub fn power(&self) -> bool {
        self.power
    }

    /// Returns the current volume (0-99).
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Returns the model name, if identified.
    pub fn model_name(&self) -> Option<&str> {
        self.model_name.as_deref()
    }

    /// Returns whether the session currently has a live connection.
    pub fn connected(&self) -> bool {
        self.connected
    }

    /// Folds an appliance event into the mirror.
    ///
    /// Returns true if the event changed anything.
    pub fn apply(&mut self, event: StateEvent) -> bool {
        match event {
            StateEvent::Power(power) => {
                let changed = self.power != power;
                self.power = power;
                changed
            }
            StateEvent::Volume(volume) => {
                let volume = volume.min(99);
                let changed = self.volume != volume;
                self.volume = volume;
                changed
            }
            StateEvent::Muted(muted) => {
                let changed = self.muted != muted;
                self.muted = muted;
                changed
            }
            StateEvent::Source(source) => {
                let changed = self.source != source;
                self.source = source;
                changed
            }
            StateEvent::Surround(surround) => {
                let changed = self.surround != surround;
                self.surround = surround;
                changed
            }
            StateEvent::ModelIdentified(model) => {
                let changed = self.model_name.as_deref() != Some(model.as_str());
                self.model_name = Some(model);
                changed
            }
        }
    }

    /// Records a connection state change. Returns true if it changed.
    pub fn set_connected(&mut self, connected: bool) -> bool {
        let changed = self.connected != connected;
        self.connected = connected;
        changed
    }

    /// Renders the full entity update bundle for the current state.
    pub fn snapshot(&self) -> StateSnapshot {
        let id = self.identifier.as_str();
        let model = self.model_name.clone().unwrap_or_else(|| "Unknown".into());
        let model_known = self.model_name.is_some();

        let media_player = EntityUpdate::new(EntityId::new(EntityKind::MediaPlayer, id))
            .with("state", if self.power { "ON" } else { "STANDBY" })
            .with("volume", i64::from(self.volume))
            .with("muted", self.muted)
            .with("source", self.source.name())
            .with("source_list", InputSource::names())
            .with("sound_mode", self.surround.name())
            .with("sound_mode_list", SurroundMode::names());

        let model_sensor = EntityUpdate::new(EntityId::with_facet(EntityKind::Sensor, id, "model"))
            .with("state", if model_known { "ON" } else { "UNAVAILABLE" })
            .with("value", model);

        let volume_sensor =
            EntityUpdate::new(EntityId::with_facet(EntityKind::Sensor, id, "volume"))
                .with("state", "ON")
                .with("value", i64::from(self.volume))
                .with("unit", "%");

        let input_sensor = EntityUpdate::new(EntityId::with_facet(EntityKind::Sensor, id, "input"))
            .with("state", "ON")
            .with("value", self.source.name());

        let surround_sensor =
            EntityUpdate::new(EntityId::with_facet(EntityKind::Sensor, id, "surround_mode"))
                .with("state", "ON")
                .with("value", self.surround.name());

        let muted_sensor = EntityUpdate::new(EntityId::with_facet(EntityKind::Sensor, id, "muted"))
            .with("state", "ON")
            .with("value", if self.muted { "Muted" } else { "Unmuted" });

        let connection_sensor =
            EntityUpdate::new(EntityId::with_facet(EntityKind::Sensor, id, "connection"))
                .with("state", if self.connected { "ON" } else { "UNAVAILABLE" })
                .with(
                    "value",
                    if self.connected { "connected" } else { "disconnected" },
                );

        let select_state = if self.power { "ON" } else { "UNAVAILABLE" };
        let input_select =
            EntityUpdate::new(EntityId::with_facet(EntityKind::Select, id, "input_source"))
                .with("state", select_state)
                .with("current_option", self.source.name())
                .with("options", InputSource::names());

        let surround_select =
            EntityUpdate::new(EntityId::with_facet(EntityKind::Select, id, "surround_mode"))
                .with("state", select_state)
                .with("current_option", self.surround.name())
                .with("options", SurroundMode::names());

        let remote = EntityUpdate::new(EntityId::new(EntityKind::Remote, id))
            .with("state", if self.power { "ON" } else { "OFF" });

        StateSnapshot::new(vec![
            media_player,
            model_sensor,
            volume_sensor,
            input_sensor,
            surround_sensor,
            muted_sensor,
            connection_sensor,
            input_select,
            surround_select,
            remote,
        ])
    }
}
