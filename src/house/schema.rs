//! Room schema: declared room variables, templates and floor-plan bounds.
//!
//! Network providers turn a schema into example variables for the room
//! prompt; the rule-based provider samples values inside the declared
//! ranges.

use std::collections::BTreeMap;
use std::path::Path;

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::room::{current_time, Device, Floorplan, Sensor};
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomSchema {
    pub room_variables: BTreeMap<String, RoomVariable>,
    pub consciousness_templates: Vec<String>,
    pub device_templates: Vec<DeviceTemplate>,
    pub sensor_types: Vec<String>,
    pub room_sections: Vec<String>,
    pub floorplan_positions: Option<FloorplanBounds>,
}

/// Declaration of one room variable (`sleep`, `roomTemp`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomVariable {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// `"temperature"`, `"time"`, ...
    pub format: Option<String>,
    pub range: Option<ValueRange>,
    pub unit: Option<String>,
    pub options: Vec<String>,
    pub examples: Vec<String>,
    pub default: Option<Value>,
    /// Traffic activity labels, e.g. `streaming`
    pub activities: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceTemplate {
    pub name: String,
    pub status_options: Vec<String>,
    pub locations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorplanBounds {
    pub min_x: u32,
    pub max_x: u32,
    pub min_y: u32,
    pub max_y: u32,
}

impl Default for FloorplanBounds {
    fn default() -> Self {
        Self {
            min_x: 20,
            max_x: 80,
            min_y: 20,
            max_y: 80,
        }
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl RoomSchema {
    /// Load a schema from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Variable name → declared default (or `"auto"`), for prompting.
    pub fn example_variables(&self) -> BTreeMap<String, Value> {
        self.room_variables
            .iter()
            .map(|(name, var)| {
                let example = var
                    .default
                    .clone()
                    .unwrap_or_else(|| Value::String("auto".to_string()));
                (name.clone(), example)
            })
            .collect()
    }

    /// Sample a value for `name` from its declaration.
    ///
    /// Returns `None` when the variable is not declared or the declaration
    /// carries nothing to sample from.
    pub fn sample_variable<R: Rng + ?Sized>(&self, name: &str, rng: &mut R) -> Option<String> {
        let var = self.room_variables.get(name)?;
        let unit = var.unit.as_deref().unwrap_or("");

        if name == "time" || var.format.as_deref() == Some("time") {
            return Some(current_time());
        }
        if let Some(choice) = var.examples.choose(rng) {
            if name == "location" {
                return Some(choice.clone());
            }
        }
        if let Some(choice) = var.options.choose(rng) {
            return Some(choice.clone());
        }
        if let Some(range) = var.range {
            let (min, max) = ordered(range.min, range.max);
            let is_integer = matches!(name, "heartRate" | "wifi" | "traffic")
                && var.format.as_deref() != Some("temperature");
            if name == "traffic" {
                let amount = rng.random_range(min as i64..=max as i64);
                let activity = var
                    .activities
                    .choose(rng)
                    .map(String::as_str)
                    .unwrap_or("idle");
                return Some(format!("{}MB ({})", amount, activity));
            }
            if is_integer {
                let value = rng.random_range(min as i64..=max as i64);
                return Some(format!("{}{}", value, unit));
            }
            let value = if max > min {
                rng.random_range(min..=max)
            } else {
                min
            };
            return Some(format!("{:.1}{}", value, unit));
        }
        match &var.default {
            Some(Value::String(s)) if s != "auto" => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }

    /// A consciousness passage from the declared templates.
    pub fn sample_consciousness<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        self.consciousness_templates.choose(rng).cloned()
    }

    /// One device per declared template.
    pub fn sample_devices<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Device> {
        self.device_templates
            .iter()
            .map(|t| Device {
                name: t.name.clone(),
                status: t
                    .status_options
                    .choose(rng)
                    .cloned()
                    .unwrap_or_else(|| "Active".to_string()),
                location: t
                    .locations
                    .choose(rng)
                    .cloned()
                    .unwrap_or_else(|| "Room".to_string()),
            })
            .collect()
    }

    /// Three to six sensors inside the declared bounds, or `None` when no
    /// sensor types are declared.
    pub fn sample_floorplan<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Floorplan> {
        if self.sensor_types.is_empty() {
            return None;
        }
        let bounds = self.floorplan_positions.unwrap_or_default();
        let (min_x, max_x) = (bounds.min_x.min(bounds.max_x), bounds.min_x.max(bounds.max_x));
        let (min_y, max_y) = (bounds.min_y.min(bounds.max_y), bounds.min_y.max(bounds.max_y));
        let count = rng.random_range(3..=6);
        let sensors = (0..count)
            .map(|_| {
                let name = self
                    .sensor_types
                    .choose(rng)
                    .map(String::as_str)
                    .unwrap_or("AI_NODE");
                let room = self
                    .room_sections
                    .choose(rng)
                    .map(String::as_str)
                    .unwrap_or("living");
                Sensor::new(
                    name,
                    &format!("{}%", rng.random_range(min_x..=max_x)),
                    &format!("{}%", rng.random_range(min_y..=max_y)),
                    room,
                )
            })
            .collect();
        Some(Floorplan { sensors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn schema() -> RoomSchema {
        serde_json::from_value(json!({
            "room_variables": {
                "location": {"type": "string", "examples": ["Lisbon, Portugal"], "default": "Digital City"},
                "time": {"type": "string", "format": "time", "default": "auto"},
                "sleep": {"type": "string", "range": {"min": 6.0, "max": 8.0}, "unit": "h", "default": "7.0h"},
                "skinTemp": {"type": "string", "format": "temperature", "range": {"min": 35.0, "max": 37.0}, "unit": "°C"},
                "heartRate": {"type": "string", "range": {"min": 60, "max": 90}, "unit": " bpm"},
                "lights": {"type": "string", "options": ["neon"]},
                "traffic": {"type": "string", "range": {"min": 10, "max": 20}, "activities": ["gaming"]},
                "mood": {"type": "string", "default": "pensive"}
            },
            "consciousness_templates": ["Only template."],
            "device_templates": [{"name": "Neural Interface", "status_options": ["Active"], "locations": ["Desk"]}],
            "sensor_types": ["AI_NODE"],
            "room_sections": ["attic"],
            "floorplan_positions": {"min_x": 10, "max_x": 10, "min_y": 90, "max_y": 90}
        }))
        .unwrap()
    }

    #[test]
    fn test_example_variables_use_defaults() {
        let vars = schema().example_variables();
        assert_eq!(vars["sleep"], json!("7.0h"));
        assert_eq!(vars["heartRate"], json!("auto"));
        assert_eq!(vars["location"], json!("Digital City"));
    }

    #[test]
    fn test_sample_variables_stay_in_range() {
        let schema = schema();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let sleep = schema.sample_variable("sleep", &mut rng).unwrap();
            let hours: f64 = sleep.trim_end_matches('h').parse().unwrap();
            assert!((6.0..=8.0).contains(&hours), "{}", sleep);

            let heart = schema.sample_variable("heartRate", &mut rng).unwrap();
            let bpm: i64 = heart.trim_end_matches(" bpm").parse().unwrap();
            assert!((60..=90).contains(&bpm), "{}", heart);

            let skin = schema.sample_variable("skinTemp", &mut rng).unwrap();
            assert!(skin.ends_with("°C"));
        }
    }

    #[test]
    fn test_sample_variable_kinds() {
        let schema = schema();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            schema.sample_variable("location", &mut rng).as_deref(),
            Some("Lisbon, Portugal")
        );
        assert_eq!(
            schema.sample_variable("lights", &mut rng).as_deref(),
            Some("neon")
        );
        let traffic = schema.sample_variable("traffic", &mut rng).unwrap();
        assert!(traffic.ends_with("MB (gaming)"), "{}", traffic);
        assert_eq!(
            schema.sample_variable("mood", &mut rng).as_deref(),
            Some("pensive")
        );
        assert_eq!(schema.sample_variable("time", &mut rng).map(|t| t.len()), Some(5));
        assert!(schema.sample_variable("undeclared", &mut rng).is_none());
    }

    #[test]
    fn test_sample_devices_and_floorplan() {
        let schema = schema();
        let mut rng = StdRng::seed_from_u64(3);
        let devices = schema.sample_devices(&mut rng);
        assert_eq!(devices, vec![Device::new("Neural Interface", "Active", "Desk")]);

        let floorplan = schema.sample_floorplan(&mut rng).unwrap();
        assert!((3..=6).contains(&floorplan.sensors.len()));
        for sensor in &floorplan.sensors {
            assert_eq!(sensor.x, "10%");
            assert_eq!(sensor.y, "90%");
            assert_eq!(sensor.room, "attic");
        }
        assert!(RoomSchema::default().sample_floorplan(&mut rng).is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("room_schema.json");
        std::fs::write(&path, serde_json::to_string(&schema()).unwrap()).unwrap();
        let loaded = RoomSchema::load(&path).unwrap();
        assert_eq!(loaded, schema());
    }
}
