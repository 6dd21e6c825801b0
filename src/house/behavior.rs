//! Behavior analysis request and response types.
//!
//! A [`BehaviorRequest`] carries one user action plus everything the
//! simulation knows about the user; a [`BehaviorResponse`] is the structured
//! reaction the house folds back into its state. Field names on the wire
//! follow what the front end and the models already use (`currentRoom`,
//! `unconscious_insights`, `points_awarded`).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient;
use crate::error::{ProviderError, Result};

// ============================================================================
// Request
// ============================================================================

/// One user action to analyse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehaviorRequest {
    /// Action identifier, e.g. `explore_room`, `meditate`
    pub action: String,
    /// Where the action happened
    #[serde(default)]
    pub context: ActionContext,
    /// Aggregated history of the user
    #[serde(default)]
    pub user_patterns: UserPatterns,
    /// Current house state
    #[serde(default)]
    pub house_state: HouseSnapshot,
}

impl BehaviorRequest {
    /// Request with an action and empty context/history.
    pub fn new(action: &str) -> Self {
        Self {
            action: action.to_string(),
            ..Default::default()
        }
    }

    /// Set the current room.
    pub fn in_room(mut self, room: &str) -> Self {
        self.context.current_room = Some(room.to_string());
        self
    }

    /// Set the user history.
    pub fn with_patterns(mut self, patterns: UserPatterns) -> Self {
        self.user_patterns = patterns;
        self
    }

    /// Set the house snapshot.
    pub fn with_house_state(mut self, state: HouseSnapshot) -> Self {
        self.house_state = state;
        self
    }
}

/// Location of an action. Unknown keys are kept verbatim so they reach the
/// prompt unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionContext {
    #[serde(
        rename = "currentRoom",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub current_room: Option<String>,
    #[serde(
        rename = "playerPosition",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub player_position: Option<Position>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ActionContext {
    /// Current room, or `"unknown"`.
    pub fn room_or_unknown(&self) -> &str {
        self.current_room.as_deref().unwrap_or("unknown")
    }
}

/// Player position on the 2D house map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// Aggregated user history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatterns {
    #[serde(default)]
    pub action_patterns: BTreeMap<String, ActionPattern>,
    #[serde(default)]
    pub room_preferences: BTreeMap<String, RoomPreference>,
    /// Hour of day → events recorded in that hour
    #[serde(default)]
    pub temporal_patterns: BTreeMap<String, Vec<Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionPattern {
    #[serde(default)]
    pub frequency: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomPreference {
    #[serde(default)]
    pub visits: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// First key with the strictly highest score, so ties resolve to the
/// earliest entry.
fn first_max<'a, V>(
    map: &'a BTreeMap<String, V>,
    score: impl Fn(&V) -> u64,
) -> Option<&'a str> {
    let mut best: Option<(&str, u64)> = None;
    for (key, value) in map {
        let s = score(value);
        if best.map_or(true, |(_, top)| s > top) {
            best = Some((key.as_str(), s));
        }
    }
    best.map(|(key, _)| key)
}

impl UserPatterns {
    pub fn is_empty(&self) -> bool {
        self.action_patterns.is_empty()
            && self.room_preferences.is_empty()
            && self.temporal_patterns.is_empty()
    }

    /// Action with the highest frequency.
    pub fn most_common_action(&self) -> Option<&str> {
        first_max(&self.action_patterns, |p| p.frequency)
    }

    /// Room with the most visits.
    pub fn most_visited_room(&self) -> Option<&str> {
        first_max(&self.room_preferences, |p| p.visits)
    }

    /// Hour with the most recorded events.
    pub fn peak_hour(&self) -> Option<&str> {
        first_max(&self.temporal_patterns, |events| events.len() as u64)
    }

    /// Sum of all action frequencies.
    pub fn total_actions(&self) -> u64 {
        self.action_patterns.values().map(|p| p.frequency).sum()
    }

    /// Human-readable one-line summary used in prompts.
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "No patterns established yet - new user".to_string();
        }
        let mut parts = Vec::new();
        if let Some(room) = self.most_visited_room() {
            parts.push(format!("Most visited room: {}", room));
        }
        if let Some(action) = self.most_common_action() {
            parts.push(format!("Most common action: {}", action));
        }
        if let Some(hour) = self.peak_hour() {
            parts.push(format!("Most active hour: {}", hour));
        }
        if parts.is_empty() {
            "Establishing patterns...".to_string()
        } else {
            parts.join(" | ")
        }
    }
}

/// Snapshot of the house the user is in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseSnapshot {
    #[serde(default = "default_consciousness")]
    pub global_consciousness: u32,
    #[serde(default)]
    pub rooms: BTreeMap<String, RoomState>,
    #[serde(default)]
    pub objects: Vec<Value>,
}

fn default_consciousness() -> u32 {
    1
}

impl Default for HouseSnapshot {
    fn default() -> Self {
        Self {
            global_consciousness: default_consciousness(),
            rooms: BTreeMap::new(),
            objects: Vec::new(),
        }
    }
}

impl HouseSnapshot {
    /// Number of rooms the user has visited.
    pub fn visited_rooms(&self) -> usize {
        self.rooms.values().filter(|r| r.visited).count()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomState {
    #[serde(default)]
    pub visited: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================================================
// Closed vocabularies
// ============================================================================

/// Fold model output into the closed vocabulary form: lowercase, with
/// spaces and dashes as underscores.
fn normalize(label: &str) -> String {
    label
        .trim()
        .to_ascii_lowercase()
        .replace([' ', '-'], "_")
}

/// Dominant behavioral pattern. Unrecognised labels map to `Exploration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum DominantPattern {
    #[default]
    Exploration,
    Introspection,
    Creativity,
    Social,
    KnowledgeSeeking,
}

impl DominantPattern {
    pub const ALL: [DominantPattern; 5] = [
        DominantPattern::Exploration,
        DominantPattern::Introspection,
        DominantPattern::Creativity,
        DominantPattern::Social,
        DominantPattern::KnowledgeSeeking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DominantPattern::Exploration => "exploration",
            DominantPattern::Introspection => "introspection",
            DominantPattern::Creativity => "creativity",
            DominantPattern::Social => "social",
            DominantPattern::KnowledgeSeeking => "knowledge_seeking",
        }
    }

    /// Title-cased label, e.g. `Knowledge Seeking`.
    pub fn title(&self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Pattern implied by an action identifier, if the action is known.
    pub fn for_action(action: &str) -> Option<Self> {
        match action {
            "explore_room" | "enter_room" => Some(DominantPattern::Exploration),
            "meditate" => Some(DominantPattern::Introspection),
            "interact_object" => Some(DominantPattern::Creativity),
            "talk" | "socialize" => Some(DominantPattern::Social),
            "read" | "study" | "research" => Some(DominantPattern::KnowledgeSeeking),
            _ => None,
        }
    }
}

impl From<String> for DominantPattern {
    fn from(label: String) -> Self {
        match normalize(&label).as_str() {
            "introspection" => DominantPattern::Introspection,
            "creativity" => DominantPattern::Creativity,
            "social" => DominantPattern::Social,
            "knowledge_seeking" => DominantPattern::KnowledgeSeeking,
            _ => DominantPattern::Exploration,
        }
    }
}

impl fmt::Display for DominantPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inferred emotional state. Unrecognised labels map to `Neutral`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum EmotionalState {
    Curious,
    Calm,
    Excited,
    Creative,
    Introspective,
    #[default]
    Neutral,
}

impl EmotionalState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionalState::Curious => "curious",
            EmotionalState::Calm => "calm",
            EmotionalState::Excited => "excited",
            EmotionalState::Creative => "creative",
            EmotionalState::Introspective => "introspective",
            EmotionalState::Neutral => "neutral",
        }
    }

    /// Emotion implied by the action currently being performed.
    pub fn for_action(action: &str) -> Self {
        match action {
            "explore_room" | "enter_room" => EmotionalState::Curious,
            "meditate" => EmotionalState::Calm,
            "interact_object" => EmotionalState::Creative,
            _ => EmotionalState::Neutral,
        }
    }
}

impl From<String> for EmotionalState {
    fn from(label: String) -> Self {
        match normalize(&label).as_str() {
            "curious" => EmotionalState::Curious,
            "calm" => EmotionalState::Calm,
            "excited" => EmotionalState::Excited,
            "creative" => EmotionalState::Creative,
            "introspective" => EmotionalState::Introspective,
            _ => EmotionalState::Neutral,
        }
    }
}

impl fmt::Display for EmotionalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Response
// ============================================================================

/// The house's reaction to one action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BehaviorResponse {
    #[serde(default, deserialize_with = "lenient::string")]
    pub message: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub analysis: Analysis,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub house_modifications: HouseModifications,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub gamification: Gamification,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub dominant_pattern: DominantPattern,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub emotional_state: EmotionalState,
    #[serde(
        rename = "unconscious_insights",
        alias = "insights",
        default,
        deserialize_with = "lenient::string_list"
    )]
    pub insights: Vec<String>,
    #[serde(
        rename = "personality_traits",
        alias = "traits",
        default,
        deserialize_with = "lenient::string_list"
    )]
    pub traits: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HouseModifications {
    /// Room id → change description (consciousness level, colour shift, ...)
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub room_changes: BTreeMap<String, Value>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub new_objects: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gamification {
    #[serde(
        rename = "points_awarded",
        alias = "points",
        default,
        deserialize_with = "lenient::integer"
    )]
    pub points: i64,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub achievements: Vec<String>,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub consciousness_boost: bool,
}

impl BehaviorResponse {
    /// Validate a parsed model document into a response.
    ///
    /// Only `message` is required (non-empty); everything else defaults.
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(ProviderError::MalformedResponse(
                "behavior response is not a JSON object".to_string(),
            ));
        }
        let response: BehaviorResponse = serde_json::from_value(value).map_err(|e| {
            ProviderError::MalformedResponse(format!("behavior response shape: {}", e))
        })?;
        if response.message.trim().is_empty() {
            return Err(ProviderError::MalformedResponse(
                "behavior response has no message".to_string(),
            ));
        }
        Ok(response)
    }
}
