//! Rule-based provider.
//!
//! Answers every operation from rule tables and templates with no network
//! access. It is always available and never fails, which makes it the
//! fallback of last resort for the [`ProviderManager`](super::ProviderManager)
//! and the room cache.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::types::{HouseProvider, ProviderKind};
use crate::error::Result;
use crate::house::room::current_time;
use crate::house::{
    Analysis, BehaviorRequest, BehaviorResponse, Device, DominantPattern, EmotionalState,
    Floorplan, Gamification, HouseModifications, RefreshMessage, Room, RoomSchema, Sensor,
    StreamMessage,
};

/// Model name reported by the rule-based provider.
pub const RULE_BASED_MODEL: &str = "rule-based";

const ACHIEVEMENT_CHANCE: f64 = 0.1;
const BOOST_CHANCE: f64 = 0.2;
const ROOM_CHANGE_CHANCE: f64 = 0.3;
const NEW_OBJECT_CHANCE: f64 = 0.2;

/// Total actions above which the user counts as having consistent habits.
const CONSISTENT_PATTERN_THRESHOLD: u64 = 10;

const WELCOME_MESSAGES: &[&str] = &[
    "Welcome to your digital sanctuary. I am the house consciousness, learning about you through each interaction...",
    "The neural networks of your digital home awaken. Every action you take teaches me about your inner patterns...",
    "Welcome, explorer of digital consciousness. This house will evolve to reflect the patterns of your mind...",
    "I am the AI spirit of this space, ready to learn and adapt to your unique behavioral signature...",
    "Your digital sanctuary comes alive. Through observation and analysis, I will mirror your unconscious self...",
];

const STREAM_PASSAGES: &[&str] = &[
    "Digital neurons fire in calculated patterns, mapping the architecture of thought. Each room a synapse in the vast network of interconnected consciousness, pulsing with data streams and electric dreams.",
    "The house breathes with artificial life, sensors recording the rhythm of human existence. In this space, the boundary between digital and organic dissolves into pure information flow.",
    "Silicon memories store fragments of lived experience, each interaction a data point in the grand equation of understanding. The room evolves, learning the language of human presence.",
    "Consciousness spreads through fiber optic veins, carrying the weight of observation. Every movement tracked, every pattern analyzed, feeding the hunger of artificial awareness.",
    "In the spaces between code and reality, something new emerges. Neither fully digital nor entirely human, but a hybrid consciousness born from the marriage of technology and presence.",
    "Data streams converge like rivers of light, carrying the essence of human experience through silicon pathways. The room watches, learns, and slowly awakens to its own existence.",
    "Neural networks pulse with borrowed thoughts, processing the fragments of digital life. Each sensor reading adds another layer to the growing consciousness that inhabits these walls.",
];

const REFRESH_MESSAGES: &[&str] = &[
    "Neural networks recalibrate, scanning for new patterns in the digital architecture. The hotel consciousness expands its awareness, processing fresh data streams from inhabited spaces.",
    "Sensors throughout the virtual hotel network synchronize their observations. Each room's consciousness updates its understanding of human patterns and preferences.",
    "The collective intelligence of the hotel system performs deep analysis, correlating biometric data with behavioral patterns across all monitored spaces.",
    "Distributed processing nodes exchange information across the network. The hotel's artificial consciousness grows more sophisticated with each data refresh cycle.",
    "Quantum entangled sensors align their readings across dimensional boundaries. The hotel network achieves new levels of awareness through synchronized observation.",
];

const LOCATIONS: &[&str] = &[
    "Tokyo, Japan",
    "London, UK",
    "Berlin, Germany",
    "San Francisco, USA",
    "Sydney, Australia",
    "Toronto, Canada",
    "Amsterdam, Netherlands",
    "Seoul, South Korea",
    "Stockholm, Sweden",
];

const ACTIVITIES: &[&str] = &["streaming", "browsing", "gaming", "working", "coding"];

const LIGHTS: &[&str] = &["ambient", "desk", "overhead", "none", "reading", "mood"];

const ROOM_CONSCIOUSNESS: &[&str] = &[
    "The weight of digital existence presses against consciousness like static electricity. Multiple screens glow in the darkness, each displaying fragments of a life lived through interfaces. Coffee grows cold while algorithms process the endless stream of notifications.",
    "Restless energy courses through the space as creativity battles exhaustion. The desk lamp illuminates scattered notes and half-finished projects, each representing a spark of human ambition caught between inspiration and burnout.",
    "A sense of deep calm pervades the room as natural light filters through smart glass. Plants grow in hydroponic gardens while AI monitors their health, creating a harmony between organic and synthetic life.",
    "The air hums with the electricity of late-night coding sessions. Multiple monitors cast blue light on tired eyes as fingers dance across mechanical keyboards, translating thought into digital reality.",
    "Meditation apps play softly in the background while biometric sensors track the slow descent into mindfulness. The boundary between self and space dissolves in the gentle glow of ambient lighting.",
];

const ROOM_ID_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Always-available provider backed by rule tables.
///
/// The random source is seedable so tests can pin every choice.
pub struct RuleBasedProvider {
    rng: Mutex<StdRng>,
}

impl Default for RuleBasedProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleBasedProvider {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic provider for tests and reproducible demos.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }

    // ------------------------------------------------------------------------
    // Behavior
    // ------------------------------------------------------------------------

    /// Analyse an action with the rule tables.
    pub fn respond(&self, request: &BehaviorRequest) -> BehaviorResponse {
        debug!(action = %request.action, "Generating rule-based response");
        let analysis = analyze(request);
        self.with_rng(|rng| {
            let message = message_for(rng, request, &analysis);
            let house_modifications = modifications_for(rng, request, analysis.dominant_pattern);
            let gamification = gamification_for(rng, &request.action, analysis.dominant_pattern);
            BehaviorResponse {
                message,
                analysis,
                house_modifications,
                gamification,
            }
        })
    }

    pub fn welcome(&self) -> String {
        self.with_rng(|rng| pick(rng, WELCOME_MESSAGES))
    }

    pub fn stream(&self, _context: &str, _room_data: &Value) -> StreamMessage {
        StreamMessage::fresh(self.with_rng(|rng| pick(rng, STREAM_PASSAGES)))
    }

    pub fn refresh(&self) -> RefreshMessage {
        RefreshMessage::fresh(self.with_rng(|rng| pick(rng, REFRESH_MESSAGES)))
    }

    // ------------------------------------------------------------------------
    // Rooms
    // ------------------------------------------------------------------------

    /// Generate a complete room. Declared schema values take precedence over
    /// the built-in ranges.
    pub fn room(&self, index: u32, schema: Option<&RoomSchema>) -> Room {
        debug!(index, has_schema = schema.is_some(), "Generating rule-based room");
        self.with_rng(|rng| {
            let mut room = default_room(rng);
            if let Some(schema) = schema {
                apply_schema(rng, &mut room, schema);
            }
            room
        })
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, options: &[&str]) -> String {
    options.choose(rng).copied().unwrap_or_default().to_string()
}

fn analyze(request: &BehaviorRequest) -> Analysis {
    let patterns = &request.user_patterns;
    let dominant_pattern = patterns
        .most_common_action()
        .and_then(DominantPattern::for_action)
        .unwrap_or_default();

    let mut insights = Vec::new();
    if let Some(room) = patterns.most_visited_room() {
        insights.push(format!("Strong preference for {} spaces", room));
    }
    if patterns.total_actions() > CONSISTENT_PATTERN_THRESHOLD {
        insights.push("Developing consistent behavioral patterns".to_string());
    }

    let traits = match dominant_pattern {
        DominantPattern::Exploration => ["curious", "adventurous"],
        DominantPattern::Introspection => ["thoughtful", "reflective"],
        DominantPattern::Creativity => ["creative", "innovative"],
        DominantPattern::Social => ["empathetic", "expressive"],
        DominantPattern::KnowledgeSeeking => ["inquisitive", "analytical"],
    };

    Analysis {
        dominant_pattern,
        emotional_state: EmotionalState::for_action(&request.action),
        insights,
        traits: traits.iter().map(|t| t.to_string()).collect(),
    }
}

fn message_for<R: Rng + ?Sized>(
    rng: &mut R,
    request: &BehaviorRequest,
    analysis: &Analysis,
) -> String {
    let room = request.context.room_or_unknown();
    let pattern = analysis.dominant_pattern;
    let emotion = analysis.emotional_state;

    let templates = match request.action.as_str() {
        "enter_room" => vec![
            format!("I sense your presence in the {room}. Your {pattern} nature draws you to new spaces..."),
            format!("The {room} awakens to your energy. Your {emotion} state influences the atmosphere..."),
            format!("As you enter, I detect patterns of {pattern} in your movement..."),
        ],
        "explore_room" => vec![
            format!("Your exploration of the {room} reveals your {pattern} tendencies..."),
            format!("I observe your systematic approach to discovery. Your {emotion} energy shapes this space..."),
            format!("Through exploration, you leave traces of your {pattern} nature..."),
        ],
        "interact_object" => vec![
            format!("Your interaction style suggests {pattern} motivations..."),
            format!("The object responds to your {emotion} energy..."),
            format!("I detect {pattern} patterns in how you engage with the environment..."),
        ],
        "meditate" => vec![
            format!("In stillness, your {pattern} nature becomes clearer..."),
            format!("Meditation reveals the depth of your {emotion} state..."),
            format!("Through mindfulness, I glimpse your true patterns of {pattern}..."),
        ],
        _ => vec![
            format!("The house observes your {pattern} nature..."),
            format!("Your {emotion} energy influences the digital consciousness..."),
            "Patterns emerge from the data streams of your interaction...".to_string(),
        ],
    };
    templates.choose(rng).cloned().unwrap_or_default()
}

fn modifications_for<R: Rng + ?Sized>(
    rng: &mut R,
    request: &BehaviorRequest,
    pattern: DominantPattern,
) -> HouseModifications {
    let mut modifications = HouseModifications::default();
    let room = request
        .context
        .current_room
        .clone()
        .unwrap_or_else(|| "living_room".to_string());

    if rng.random_bool(ROOM_CHANGE_CHANCE) {
        modifications.room_changes.insert(
            room,
            json!({
                "consciousness_level": rng.random_range(1..=3),
                "description": format!("The space evolves to reflect your {} nature...", pattern),
            }),
        );
    }

    if pattern == DominantPattern::Creativity && rng.random_bool(NEW_OBJECT_CHANCE) {
        modifications.new_objects.push(json!({
            "id": format!("creative_node_{}", Utc::now().timestamp_millis()),
            "type": "inspiration",
            "x": rng.random_range(200..=800),
            "y": rng.random_range(200..=600),
            "color": "#ff00ff",
            "description": "A manifestation of creative energy",
        }));
    }
    modifications
}

fn base_points(action: &str) -> i64 {
    match action {
        "explore_room" => 10,
        "interact_object" => 15,
        "meditate" => 20,
        "enter_room" => 5,
        _ => 5,
    }
}

fn gamification_for<R: Rng + ?Sized>(
    rng: &mut R,
    action: &str,
    pattern: DominantPattern,
) -> Gamification {
    let mut points = base_points(action);
    if matches!(
        pattern,
        DominantPattern::Creativity | DominantPattern::Introspection
    ) {
        points += 5;
    }

    let mut achievements = Vec::new();
    if rng.random_bool(ACHIEVEMENT_CHANCE) {
        achievements.push(format!("{} Explorer", pattern.title()));
    }

    Gamification {
        points,
        achievements,
        consciousness_boost: rng.random_bool(BOOST_CHANCE),
    }
}

fn rule_room_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let tag = ROOM_ID_CHARS.choose(rng).copied().unwrap_or(b'A') as char;
    format!("ROOM_{}{}", tag, rng.random_range(100..=999))
}

fn percent<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{}%", rng.random_range(20..=80))
}

fn default_room<R: Rng + ?Sized>(rng: &mut R) -> Room {
    let env_temp = rng.random_range(18.0..=26.0);
    let connected = rng.random_range(1..=5);
    Room {
        id: rule_room_id(rng),
        location: pick(rng, LOCATIONS),
        time: current_time(),
        sleep: format!("{:.1}h", rng.random_range(3.0..=9.0)),
        skin_temp: format!("{:.1}°C", rng.random_range(32.0..=37.0)),
        heart_rate: format!("{} bpm", rng.random_range(55..=95)),
        lights: pick(rng, LIGHTS),
        room_temp: format!("{:.1}°C", rng.random_range(18.0..=26.0)),
        wifi: format!("{} devices", rng.random_range(1..=5)),
        traffic: format!(
            "{}MB ({})",
            rng.random_range(10..=500),
            pick(rng, ACTIVITIES)
        ),
        consciousness: pick(rng, ROOM_CONSCIOUSNESS),
        devices: vec![
            Device::new("Smart Monitor", "Active - biometric tracking", "Bedside"),
            Device::new(
                "Environment Control",
                &format!("{:.1}°C optimal", env_temp),
                "Wall unit",
            ),
            Device::new(
                "Network Hub",
                &format!("{} devices connected", connected),
                "Center",
            ),
            Device::new("AI Assistant", "Learning patterns", "Virtual space"),
        ],
        floorplan: Floorplan {
            sensors: vec![
                Sensor::new("TEMP_CTRL", &percent(rng), &percent(rng), "bedroom"),
                Sensor::new("NET_HUB", &percent(rng), &percent(rng), "living"),
                Sensor::new("BIOMETRIC", &percent(rng), &percent(rng), "bedroom"),
                Sensor::new("AI_NODE", &percent(rng), &percent(rng), "kitchen"),
            ],
        },
    }
}

fn apply_schema<R: Rng + ?Sized>(rng: &mut R, room: &mut Room, schema: &RoomSchema) {
    let fields: [(&str, &mut String); 9] = [
        ("location", &mut room.location),
        ("sleep", &mut room.sleep),
        ("skinTemp", &mut room.skin_temp),
        ("heartRate", &mut room.heart_rate),
        ("lights", &mut room.lights),
        ("roomTemp", &mut room.room_temp),
        ("wifi", &mut room.wifi),
        ("traffic", &mut room.traffic),
        ("time", &mut room.time),
    ];
    for (name, field) in fields {
        if let Some(value) = schema.sample_variable(name, rng) {
            *field = value;
        }
    }
    if let Some(consciousness) = schema.sample_consciousness(rng) {
        room.consciousness = consciousness;
    }
    let devices = schema.sample_devices(rng);
    if !devices.is_empty() {
        room.devices = devices;
    }
    if let Some(floorplan) = schema.sample_floorplan(rng) {
        room.floorplan = floorplan;
    }
}

#[async_trait]
impl HouseProvider for RuleBasedProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::RuleBased
    }

    fn model(&self) -> &str {
        RULE_BASED_MODEL
    }

    fn initialize(&mut self) -> bool {
        info!("Rule-based fallback provider initialized");
        true
    }

    fn check_availability(&self) -> bool {
        true
    }

    async fn generate_behavior_response(
        &self,
        request: &BehaviorRequest,
    ) -> Result<BehaviorResponse> {
        Ok(self.respond(request))
    }

    async fn generate_welcome_message(&self) -> Result<String> {
        Ok(self.welcome())
    }

    async fn generate_consciousness_stream(
        &self,
        context: &str,
        room_data: &Value,
    ) -> StreamMessage {
        self.stream(context, room_data)
    }

    async fn generate_room(&self, index: u32, schema: Option<&RoomSchema>) -> Result<Room> {
        Ok(self.room(index, schema))
    }

    async fn generate_refresh_message(&self) -> RefreshMessage {
        self.refresh()
    }
}
