//! Recovery of JSON documents from model output.
//!
//! Models wrap JSON in chatter, leave trailing commas, forget commas between
//! lines and put raw quotes inside strings. The functions here undo the
//! common cases. Nothing in this module panics or returns an error: a
//! document either comes back or it does not.
//!
//! Valid JSON is never rewritten; every repair step runs only after a plain
//! parse has failed.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::house::room::{current_time, ROOM_WRAPPER_KEY};
use crate::house::{Device, Room, Sensor};

const MAX_SALVAGED_DEVICES: usize = 3;
const MAX_SALVAGED_SENSORS: usize = 4;

const SALVAGE_LOCATION: &str = "Cyber City, Dataspace";
const SALVAGE_CONSCIOUSNESS: &str =
    "Neural patterns partially reconstructed from corrupted data streams...";

/// How hard a provider tries before giving up on a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairLevel {
    /// Parse, then parse the outermost `{...}` span.
    ExtractOnly,
    /// Additionally fix syntax, unwrap a `"room"` wrapper and salvage
    /// individual room fields by pattern.
    Full,
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern)
        .unwrap_or_else(|e| panic!("BUG: invalid built-in regex pattern '{pattern}': {e}"))
}

static TRAILING_COMMA: Lazy<Regex> = Lazy::new(|| compile(r",(\s*[}\]])"));
static KEY_LINE: Lazy<Regex> = Lazy::new(|| compile(r#"^\s*"[^"]*"\s*:"#));
static QUOTED_PAIR: Lazy<Regex> =
    Lazy::new(|| compile(r#"^(\s*"[^"]+"\s*:\s*")(.*)("\s*,?\s*)$"#));
static DEVICE: Lazy<Regex> = Lazy::new(|| {
    compile(
        r#"(?i)\{[^{}]*"name"\s*:\s*"([^"]*)"[^{}]*"status"\s*:\s*"([^"]*)"[^{}]*"location"\s*:\s*"([^"]*)"[^{}]*\}"#,
    )
});
static SENSOR: Lazy<Regex> = Lazy::new(|| {
    compile(
        r#"(?i)\{[^{}]*"name"\s*:\s*"([^"]*)"[^{}]*"x"\s*:\s*"?([^",}]*)"?[^{}]*"y"\s*:\s*"?([^",}]*)"?[^{}]*"room"\s*:\s*"([^"]*)"[^{}]*\}"#,
    )
});

// ============================================================================
// Extraction
// ============================================================================

/// The span from the first `{` to the last `}`, if there is one.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// The balanced object stored under `"key"`, found by scanning braces.
///
/// Braces inside string literals do not count.
pub fn unwrap_wrapped<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    let needle = format!("\"{}\"", key);
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find(&needle) {
        let after_key = search_from + offset + needle.len();
        let rest = text[after_key..].trim_start();
        if let Some(value) = rest.strip_prefix(':') {
            let value = value.trim_start();
            if value.starts_with('{') {
                let start = text.len() - value.len();
                return balanced_object(&text[start..]);
            }
        }
        search_from = after_key;
    }
    None
}

/// `text` starts with `{`; returns the prefix up to its matching `}`.
fn balanced_object(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

// ============================================================================
// Syntactic repair
// ============================================================================

/// Fix trailing commas, missing commas between adjacent key/value lines and
/// unescaped quotes inside single-pair string lines.
pub fn fix_common_issues(text: &str) -> String {
    let without_trailing = TRAILING_COMMA.replace_all(text, "$1");
    let lines: Vec<String> = without_trailing.lines().map(escape_interior_quotes).collect();

    let mut out = String::with_capacity(text.len() + 16);
    for (i, line) in lines.iter().enumerate() {
        out.push_str(line);
        let next = lines[i + 1..].iter().find(|l| !l.trim().is_empty());
        if let Some(next) = next {
            if needs_comma(line, next) {
                out.push(',');
            }
        }
        if i + 1 < lines.len() {
            out.push('\n');
        }
    }
    out
}

fn ends_with_value(line: &str) -> bool {
    let line = line.trim_end();
    line.ends_with('"')
        || line.ends_with('}')
        || line.ends_with(']')
        || line.ends_with("true")
        || line.ends_with("false")
        || line.ends_with("null")
        || line.ends_with(|c: char| c.is_ascii_digit())
}

fn needs_comma(line: &str, next: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() || !ends_with_value(trimmed) {
        return false;
    }
    // A bare opening line such as `"key": {` has already been excluded;
    // `{` or `[` alone never ends with a value.
    let next = next.trim_start();
    KEY_LINE.is_match(next) || (trimmed.ends_with('}') && next.starts_with('{'))
}

/// Escape raw quotes in the value of a `"key": "value",` line that does not
/// parse on its own. Lines opening objects or arrays are left alone.
fn escape_interior_quotes(line: &str) -> String {
    if line.contains('{') || line.contains('[') {
        return line.to_string();
    }
    let Some(caps) = QUOTED_PAIR.captures(line) else {
        return line.to_string();
    };
    let fragment = format!("{{{}}}", line.trim().trim_end_matches(','));
    if serde_json::from_str::<Value>(&fragment).is_ok() {
        return line.to_string();
    }

    let mut value = String::new();
    let mut escaped = false;
    for c in caps[2].chars() {
        match c {
            '"' if !escaped => value.push_str("\\\""),
            '\\' => {
                escaped = !escaped;
                value.push(c);
                continue;
            }
            _ => value.push(c),
        }
        escaped = false;
    }
    format!("{}{}{}", &caps[1], value, &caps[3])
}

// ============================================================================
// Pipeline
// ============================================================================

fn parse_object(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text)
        .ok()
        .filter(Value::is_object)
}

/// Recover a JSON object from a model reply.
///
/// Steps, stopping at the first that parses: the reply as-is, its outermost
/// `{...}` span, and at [`RepairLevel::Full`] the syntactically repaired span
/// and the `"room"` wrapper's contents.
pub fn recover_value(text: &str, level: RepairLevel) -> Option<Value> {
    if let Some(value) = parse_object(text.trim()) {
        return Some(value);
    }
    let extracted = extract_json_object(text)?;
    if let Some(value) = parse_object(extracted) {
        return Some(value);
    }
    if level == RepairLevel::ExtractOnly {
        return None;
    }

    let fixed = fix_common_issues(extracted);
    if let Some(value) = parse_object(&fixed) {
        debug!("Recovered JSON after syntactic repair");
        return Some(value);
    }
    let inner = unwrap_wrapped(&fixed, ROOM_WRAPPER_KEY)?;
    parse_object(inner).or_else(|| parse_object(&fix_common_issues(inner)))
}

// ============================================================================
// Field salvage
// ============================================================================

fn salvage_field(text: &str, keys: &[&str]) -> Option<String> {
    let alternatives = keys
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(
        r#"(?i)"(?:{})"\s*:\s*(?:"((?:[^"\\]|\\.)*)"|(-?[0-9]+(?:\.[0-9]+)?))"#,
        alternatives
    );
    let re = Regex::new(&pattern).ok()?;
    let caps = re.captures(text)?;
    let value = caps.get(1).or_else(|| caps.get(2))?.as_str().trim();
    (!value.is_empty()).then(|| value.replace("\\\"", "\""))
}

/// The text before the first `"devices"` key. Device objects are stripped
/// before this is consulted, so a `location` here belongs to the room.
fn top_level_head(text: &str) -> &str {
    text.find("\"devices\"").map_or(text, |end| &text[..end])
}

/// Pull individual room fields out of a reply that would not parse.
///
/// Returns `None` unless an `id` (or `room_id`) was found. Missing fields
/// are filled so the result is a complete room.
pub fn salvage_room(text: &str) -> Option<Room> {
    let id = salvage_field(text, &["id", "room_id"])?;

    let field = |keys: &[&str]| salvage_field(text, keys).unwrap_or_default();
    let without_devices = DEVICE.replace_all(text, "");
    let location = salvage_field(top_level_head(&without_devices), &["location"])
        .or_else(|| salvage_field(&without_devices, &["location"]))
        .unwrap_or_default();
    let devices: Vec<Device> = DEVICE
        .captures_iter(text)
        .take(MAX_SALVAGED_DEVICES)
        .map(|c| Device::new(&c[1], &c[2], &c[3]))
        .collect();
    let sensors: Vec<Sensor> = SENSOR
        .captures_iter(text)
        .take(MAX_SALVAGED_SENSORS)
        .map(|c| Sensor::new(&c[1], c[2].trim(), c[3].trim(), &c[4]))
        .collect();

    let mut room = Room {
        id,
        location,
        time: field(&["time"]),
        sleep: field(&["sleep"]),
        skin_temp: field(&["skinTemp"]),
        heart_rate: field(&["heartRate"]),
        lights: field(&["lights"]),
        room_temp: field(&["roomTemp"]),
        wifi: field(&["wifi"]),
        traffic: field(&["traffic"]),
        consciousness: field(&["consciousness", "consciousness_stream", "description"]),
        devices,
        ..Room::default()
    };
    room.floorplan.sensors = sensors;

    if room.location.is_empty() {
        room.location = SALVAGE_LOCATION.to_string();
    }
    if room.consciousness.is_empty() {
        room.consciousness = SALVAGE_CONSCIOUSNESS.to_string();
    }
    if room.time.is_empty() {
        room.time = current_time();
    }
    if room.devices.is_empty() {
        room.devices = vec![
            Device::new("Recovery Node", "active", "system"),
            Device::new("Data Scanner", "reconstructing", "core"),
        ];
    }
    if room.floorplan.sensors.is_empty() {
        room.floorplan.sensors = vec![
            Sensor::new("RECOV_01", "40%", "40%", "living"),
            Sensor::new("SALV_01", "60%", "60%", "bedroom"),
        ];
    }
    room.backfill();
    debug!(room_id = %room.id, "Salvaged room fields from malformed JSON");
    Some(room)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_json_object() {
        assert_eq!(
            extract_json_object("Sure! {\"a\": 1} Hope that helps!"),
            Some("{\"a\": 1}")
        );
        assert_eq!(extract_json_object("no braces"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[test]
    fn test_valid_json_passes_through_unchanged() {
        let docs = [
            json!({"id": "ROOM_1", "note": "a,}b"}),
            json!({"message": "He said \"hi\"", "list": [1, 2, {"x": "}"}]}),
        ];
        for doc in docs {
            let text = doc.to_string();
            for level in [RepairLevel::ExtractOnly, RepairLevel::Full] {
                assert_eq!(recover_value(&text, level), Some(doc.clone()));
            }
        }
    }

    #[test]
    fn test_trailing_commas_fixed() {
        let text = "{\"a\": 1, \"b\": [1, 2,], }";
        assert_eq!(recover_value(text, RepairLevel::ExtractOnly), None);
        assert_eq!(
            recover_value(text, RepairLevel::Full),
            Some(json!({"a": 1, "b": [1, 2]}))
        );
    }

    #[test]
    fn test_missing_commas_between_lines() {
        let text = "{\n  \"id\": \"ROOM_7\"\n  \"wifi\": 4\n  \"devices\": [\n    {\"name\": \"a\"}\n    {\"name\": \"b\"}\n  ]\n}";
        let value = recover_value(text, RepairLevel::Full).unwrap();
        assert_eq!(value["id"], "ROOM_7");
        assert_eq!(value["wifi"], 4);
        assert_eq!(value["devices"][1]["name"], "b");
    }

    #[test]
    fn test_interior_quotes_escaped() {
        let text = "{\n  \"id\": \"ROOM_3\",\n  \"consciousness\": \"She whispered \"wake up\" to the walls\"\n}";
        let value = recover_value(text, RepairLevel::Full).unwrap();
        assert_eq!(value["consciousness"], "She whispered \"wake up\" to the walls");
    }

    #[test]
    fn test_unwrap_wrapped_is_string_aware() {
        let text = r#"{"note": "ignore { this", "room": {"id": "ROOM_9", "consciousness": "a } b"}, "x": 1"#;
        assert_eq!(
            unwrap_wrapped(text, "room"),
            Some(r#"{"id": "ROOM_9", "consciousness": "a } b"}"#)
        );
        assert_eq!(unwrap_wrapped(r#"{"room": "plain"}"#, "room"), None);
    }

    #[test]
    fn test_wrapped_room_recovered_from_broken_outer_document() {
        let text = r#"Here: {"room": {"id": "ROOM_4", "wifi": "3 devices"} "trailing": oops}"#;
        let value = recover_value(text, RepairLevel::Full).unwrap();
        assert_eq!(value, json!({"id": "ROOM_4", "wifi": "3 devices"}));
    }

    #[test]
    fn test_salvage_room_requires_id() {
        assert!(salvage_room(r#"{"location": "Lisbon" garbage"#).is_none());
        assert!(salvage_room("").is_none());
    }

    #[test]
    fn test_salvage_room_fills_gaps() {
        let text = r#"{"ID": "ROOM_512" "location": "Neo Kyoto", "heartRate": 77,
            "devices": [{"name": "Lamp", "status": "on", "location": "desk"}]
            "floorplan": {"sensors": [{"name": "S1", "x": 30, "y": "45%", "room": "kitchen"}]}"#;
        let room = salvage_room(text).unwrap();
        assert_eq!(room.id, "ROOM_512");
        assert_eq!(room.location, "Neo Kyoto");
        assert_eq!(room.heart_rate, "77");
        assert_eq!(room.devices, vec![Device::new("Lamp", "on", "desk")]);
        assert_eq!(
            room.floorplan.sensors,
            vec![Sensor::new("S1", "30%", "45%", "kitchen")]
        );
        assert_eq!(room.consciousness, SALVAGE_CONSCIOUSNESS);
        assert_eq!(room.sleep, crate::house::room::placeholder::SLEEP);
        assert_eq!(room.time.len(), 5);
    }

    #[test]
    fn test_salvage_room_recovery_defaults() {
        let room = salvage_room(r#"{"room_id": "ROOM_100", broken"#).unwrap();
        assert_eq!(room.location, SALVAGE_LOCATION);
        assert_eq!(room.devices.len(), 2);
        assert_eq!(room.floorplan.sensors[0].name, "RECOV_01");
    }

    #[test]
    fn test_salvage_from_bare_id_fragment() {
        let room = salvage_room(r#""id": "ROOM_X1""#).unwrap();
        assert_eq!(room.id, "ROOM_X1");
        assert_eq!(room.location, SALVAGE_LOCATION);
        assert_eq!(room.consciousness, SALVAGE_CONSCIOUSNESS);
        assert_eq!(room.devices.len(), 2);
        assert_eq!(room.floorplan.sensors.len(), 2);
        assert_eq!(room.sleep, crate::house::room::placeholder::SLEEP);
        assert_eq!(room.time.len(), 5);
    }

    #[test]
    fn test_salvage_location_ignores_device_locations() {
        let text = r#""id": "ROOM_61", "devices": [{"name": "Fan", "status": "on", "location": "ceiling"}] "location": "Quito, Ecuador""#;
        let room = salvage_room(text).unwrap();
        assert_eq!(room.location, "Quito, Ecuador");
        assert_eq!(room.devices, vec![Device::new("Fan", "on", "ceiling")]);

        let text = r#""id": "ROOM_62", "devices": [{"name": "Fan", "status": "on", "location": "ceiling"}] broken"#;
        assert_eq!(salvage_room(text).unwrap().location, SALVAGE_LOCATION);

        let text = r#"{"id": "ROOM_63", "location": "Oslo, Norway", "devices": [{"name": "Fan", "status": "on", "location": "ceiling"}"#;
        assert_eq!(salvage_room(text).unwrap().location, "Oslo, Norway");
    }

    #[test]
    fn test_salvage_caps_devices_and_sensors() {
        let device = r#"{"name": "D", "status": "s", "location": "l"}"#;
        let text = format!(
            r#"{{"id": "ROOM_1", "devices": [{}]"#,
            vec![device; 6].join(", ")
        );
        let room = salvage_room(&text).unwrap();
        assert_eq!(room.devices.len(), MAX_SALVAGED_DEVICES);

        let sensor = r#"{"name": "S", "x": 1, "y": 2, "room": "hall"}"#;
        let text = format!(
            r#""id": "ROOM_2", "sensors": [{}]"#,
            vec![sensor; 7].join(", ")
        );
        let room = salvage_room(&text).unwrap();
        assert_eq!(room.floorplan.sensors.len(), MAX_SALVAGED_SENSORS);
    }

    #[test]
    fn test_garbage_never_panics() {
        for text in ["{", "}{", "{\"room\": {", "\"\"\"", "{\"a\": \"\\", "{{{{}}"] {
            let _ = recover_value(text, RepairLevel::Full);
            let _ = salvage_room(text);
        }
    }
}
