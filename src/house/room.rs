//! Hotel room documents and the short status messages around them.

use chrono::Local;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;
use crate::error::{ProviderError, Result};

// ============================================================================
// Placeholders
// ============================================================================

/// Values used for fields a model left out. They are recognisably generic so
/// the front end can tell a gap from a reading.
pub mod placeholder {
    pub const SLEEP: &str = "7.0h";
    pub const SKIN_TEMP: &str = "36.0°C";
    pub const HEART_RATE: &str = "72 bpm";
    pub const LIGHTS: &str = "ambient";
    pub const ROOM_TEMP: &str = "22.0°C";
    pub const WIFI: &str = "2 devices";
    pub const TRAFFIC: &str = "100MB (idle)";
    pub const LOCATION: &str = "Unknown City, Cyberspace";
    pub const CONSCIOUSNESS: &str = "Neural pathways establishing connection...";
}

/// Key some models wrap the room document in.
pub const ROOM_WRAPPER_KEY: &str = "room";

// ============================================================================
// Room
// ============================================================================

/// One generated hotel room: an inhabitant's location, biometrics,
/// environment, consciousness stream, devices and floor plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Room {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub location: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub time: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub sleep: String,
    #[serde(rename = "skinTemp", default, deserialize_with = "lenient::string")]
    pub skin_temp: String,
    #[serde(rename = "heartRate", default, deserialize_with = "lenient::string")]
    pub heart_rate: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub lights: String,
    #[serde(rename = "roomTemp", default, deserialize_with = "lenient::string")]
    pub room_temp: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub wifi: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub traffic: String,
    #[serde(
        default,
        alias = "consciousness_stream",
        deserialize_with = "lenient::string"
    )]
    pub consciousness: String,
    #[serde(default, deserialize_with = "lenient::list")]
    pub devices: Vec<Device>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub floorplan: Floorplan,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Device {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub location: String,
}

impl Device {
    pub fn new(name: &str, status: &str, location: &str) -> Self {
        Self {
            name: name.to_string(),
            status: status.to_string(),
            location: location.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Floorplan {
    #[serde(default, deserialize_with = "lenient::list")]
    pub sensors: Vec<Sensor>,
}

/// A sensor on the floor plan. Positions are percentages such as `"40%"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub x: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub y: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub room: String,
}

impl Sensor {
    pub fn new(name: &str, x: &str, y: &str, room: &str) -> Self {
        Self {
            name: name.to_string(),
            x: x.to_string(),
            y: y.to_string(),
            room: room.to_string(),
        }
    }
}

/// Bare numbers (`40`, `"40"`) become percentages (`"40%"`).
fn as_percentage(position: &mut String) {
    let trimmed = position.trim();
    if !trimmed.is_empty() && trimmed.parse::<f64>().is_ok() {
        *position = format!("{}%", trimmed);
    }
}

/// `ROOM_` followed by three digits.
pub fn random_room_id() -> String {
    format!("ROOM_{}", rand::rng().random_range(100..=999))
}

/// Wall-clock time as `HH:MM`.
pub fn current_time() -> String {
    Local::now().format("%H:%M").to_string()
}

fn fill(field: &mut String, value: impl FnOnce() -> String) {
    if field.trim().is_empty() {
        *field = value();
    }
}

impl Room {
    /// Build a room from a parsed model document.
    ///
    /// A `{"room": {...}}` wrapper is removed, then missing fields are
    /// backfilled (see [`Room::backfill`]).
    pub fn from_value(value: Value) -> Result<Self> {
        let value = match value {
            Value::Object(mut map) => match map.remove(ROOM_WRAPPER_KEY) {
                Some(inner @ Value::Object(_)) => inner,
                Some(other) => {
                    map.insert(ROOM_WRAPPER_KEY.to_string(), other);
                    Value::Object(map)
                }
                None => Value::Object(map),
            },
            _ => {
                return Err(ProviderError::MalformedResponse(
                    "room document is not a JSON object".to_string(),
                ))
            }
        };

        let mut room: Room = serde_json::from_value(value)
            .map_err(|e| ProviderError::MalformedResponse(format!("room shape: {}", e)))?;
        room.backfill();
        Ok(room)
    }

    /// Fill every missing field: identity fields get fresh values, readings
    /// get the generic placeholders, bare sensor coordinates become
    /// percentages.
    pub fn backfill(&mut self) {
        fill(&mut self.id, random_room_id);
        fill(&mut self.time, current_time);
        fill(&mut self.location, || placeholder::LOCATION.to_string());
        fill(&mut self.consciousness, || {
            placeholder::CONSCIOUSNESS.to_string()
        });
        self.fill_placeholders();
        for sensor in &mut self.floorplan.sensors {
            as_percentage(&mut sensor.x);
            as_percentage(&mut sensor.y);
        }
    }

    /// Fill only the biometric and environmental readings.
    pub fn fill_placeholders(&mut self) {
        fill(&mut self.sleep, || placeholder::SLEEP.to_string());
        fill(&mut self.skin_temp, || placeholder::SKIN_TEMP.to_string());
        fill(&mut self.heart_rate, || placeholder::HEART_RATE.to_string());
        fill(&mut self.lights, || placeholder::LIGHTS.to_string());
        fill(&mut self.room_temp, || placeholder::ROOM_TEMP.to_string());
        fill(&mut self.wifi, || placeholder::WIFI.to_string());
        fill(&mut self.traffic, || placeholder::TRAFFIC.to_string());
    }

    /// Give a cached room a new identity and the current time.
    pub fn refresh_identity(&mut self) {
        self.id = random_room_id();
        self.time = current_time();
    }
}

// ============================================================================
// Status messages
// ============================================================================

/// A consciousness stream passage. `consciousness_update` is false when the
/// text is a canned line standing in for a failed generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamMessage {
    pub message: String,
    pub consciousness_update: bool,
}

impl StreamMessage {
    pub fn fresh(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            consciousness_update: true,
        }
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            consciousness_update: false,
        }
    }
}

/// A hotel-network refresh notice. `refresh_complete` is false for canned
/// stand-ins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshMessage {
    pub message: String,
    pub refresh_complete: bool,
}

impl RefreshMessage {
    pub fn fresh(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            refresh_complete: true,
        }
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            refresh_complete: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn is_room_id(id: &str) -> bool {
        id.len() == 8 && id.starts_with("ROOM_") && id[5..].chars().all(|c| c.is_ascii_digit())
    }

    fn is_hh_mm(time: &str) -> bool {
        let bytes = time.as_bytes();
        time.len() == 5
            && bytes[2] == b':'
            && time[..2].chars().all(|c| c.is_ascii_digit())
            && time[3..].chars().all(|c| c.is_ascii_digit())
    }

    #[test]
    fn test_room_from_complete_document() {
        let room = Room::from_value(json!({
            "id": "ROOM_A123",
            "location": "Tokyo, Japan",
            "time": "23:14",
            "sleep": "5.5h",
            "skinTemp": "36.4°C",
            "heartRate": "81 bpm",
            "lights": "neon",
            "roomTemp": "21.0°C",
            "wifi": "4 devices",
            "traffic": "320MB (streaming)",
            "consciousness": "Rain on the glass.",
            "devices": [{"name": "Neural Link", "status": "active", "location": "desk"}],
            "floorplan": {"sensors": [{"name": "AI_NODE", "x": "50%", "y": "50%", "room": "living"}]}
        }))
        .unwrap();

        assert_eq!(room.id, "ROOM_A123");
        assert_eq!(room.skin_temp, "36.4°C");
        assert_eq!(room.devices[0].name, "Neural Link");
        assert_eq!(room.floorplan.sensors[0].x, "50%");
    }

    #[test]
    fn test_room_backfills_missing_fields() {
        let room = Room::from_value(json!({"lights": "desk"})).unwrap();
        assert!(is_room_id(&room.id), "bad id {}", room.id);
        assert!(is_hh_mm(&room.time), "bad time {}", room.time);
        assert_eq!(room.location, placeholder::LOCATION);
        assert_eq!(room.consciousness, placeholder::CONSCIOUSNESS);
        assert_eq!(room.lights, "desk");
        assert_eq!(room.sleep, "7.0h");
        assert_eq!(room.skin_temp, "36.0°C");
        assert_eq!(room.heart_rate, "72 bpm");
        assert_eq!(room.room_temp, "22.0°C");
        assert_eq!(room.wifi, "2 devices");
        assert_eq!(room.traffic, "100MB (idle)");
    }

    #[test]
    fn test_room_unwraps_wrapper_key() {
        let room = Room::from_value(json!({"room": {"id": "ROOM_777", "location": "Oslo"}})).unwrap();
        assert_eq!(room.id, "ROOM_777");
        assert_eq!(room.location, "Oslo");
    }

    #[test]
    fn test_room_accepts_numeric_fields() {
        let room = Room::from_value(json!({
            "id": 42,
            "wifi": 3,
            "floorplan": {"sensors": [{"name": "T", "x": 40, "y": "60", "room": "kitchen"}]}
        }))
        .unwrap();
        assert_eq!(room.id, "42");
        assert_eq!(room.wifi, "3");
        assert_eq!(room.floorplan.sensors[0].x, "40%");
        assert_eq!(room.floorplan.sensors[0].y, "60%");
    }

    #[test]
    fn test_room_stream_alias() {
        let room = Room::from_value(json!({"consciousness_stream": "Static hum."})).unwrap();
        assert_eq!(room.consciousness, "Static hum.");
    }

    #[test]
    fn test_room_rejects_non_objects() {
        assert!(Room::from_value(json!("room")).is_err());
        assert!(Room::from_value(json!(["ROOM_1"])).is_err());
    }

    #[test]
    fn test_room_skips_malformed_devices_and_sensors() {
        let room = Room::from_value(json!({
            "id": "ROOM_210",
            "devices": ["Smart Lamp", {"name": "Kettle", "status": "boiling", "location": "kitchen"}, null],
            "floorplan": {"sensors": [{"name": "S1", "x": 10, "y": 20, "room": "hall"}, "S2", 4]}
        }))
        .unwrap();
        assert_eq!(room.devices, vec![Device::new("Kettle", "boiling", "kitchen")]);
        assert_eq!(room.floorplan.sensors, vec![Sensor::new("S1", "10%", "20%", "hall")]);

        let room = Room::from_value(json!({"devices": "many", "floorplan": ["S1"]})).unwrap();
        assert!(room.devices.is_empty());
        assert!(room.floorplan.sensors.is_empty());
    }

    #[test]
    fn test_room_serializes_front_end_names() {
        let mut room = Room::default();
        room.backfill();
        let value = serde_json::to_value(&room).unwrap();
        assert!(value.get("skinTemp").is_some());
        assert!(value.get("heartRate").is_some());
        assert!(value.get("roomTemp").is_some());
        assert!(value["floorplan"]["sensors"].is_array());
    }

    #[test]
    fn test_refresh_identity() {
        let mut room = Room {
            id: "OLD".to_string(),
            time: "00:00".to_string(),
            ..Default::default()
        };
        room.refresh_identity();
        assert!(is_room_id(&room.id));
        assert!(is_hh_mm(&room.time));
    }

    #[test]
    fn test_status_message_flags() {
        assert!(StreamMessage::fresh("a").consciousness_update);
        assert!(!StreamMessage::degraded("a").consciousness_update);
        assert!(RefreshMessage::fresh("a").refresh_complete);
        assert!(!RefreshMessage::degraded("a").refresh_complete);
    }
}
