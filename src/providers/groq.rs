//! Groq provider profile.
//!
//! Groq serves small, fast open models behind the chat-completions wire
//! format. Those models are the most likely to emit broken JSON, so this
//! profile runs the full repair pipeline and uses the compact prompts.

use super::network::{
    CannedLines, FallbackRoom, PromptSet, ProviderProfile, RoomFailurePolicy, WireFormat,
};
use super::prompts;
use super::repair::RepairLevel;
use super::types::{ChatOptions, ProviderKind};

/// Groq's OpenAI-compatible endpoint.
pub const GROQ_API_URL: &str = "https://api.groq.com/openai/v1";

pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

pub static GROQ_PROFILE: ProviderProfile = ProviderProfile {
    kind: ProviderKind::Groq,
    env_key: "GROQ_API_KEY",
    default_model: DEFAULT_MODEL,
    default_base_url: GROQ_API_URL,
    wire: WireFormat::OpenAIChat,
    repair: RepairLevel::Full,
    strict_welcome: false,
    room_failure: RoomFailurePolicy::FallbackRoom,
    // Cooler and shorter than the others: long outputs are where these
    // models lose the JSON structure.
    room_options: ChatOptions::sampled(400, 0.6),
    attribution_headers: false,
    prompts: PromptSet {
        persona: prompts::compact_persona,
        behavior: prompts::compact_behavior_prompt,
        welcome: prompts::SHORT_WELCOME_REQUEST,
        stream_system: "You are a consciousness stream generator for a cyberpunk interface.",
        stream: prompts::compact_stream_prompt,
        room_system: prompts::COMPACT_ROOM_SYSTEM,
        room: prompts::compact_room_prompt,
        refresh_system: prompts::COMPACT_REFRESH_SYSTEM,
        refresh: prompts::COMPACT_REFRESH_REQUEST,
    },
    canned: CannedLines {
        welcome: "Welcome, consciousness explorer. The house awakens to learn your patterns...",
        stream: "The consciousness stream flickers across neural networks...",
        refresh: "Neural networks synchronizing across distributed systems...",
    },
    fallback_room: FallbackRoom {
        cities: &[
            "Neo Shanghai",
            "Cyber Mumbai",
            "Digital Seoul",
            "Tech São Paulo",
            "Virtual Lagos",
        ],
        consciousness: "Groq connection error. Backup consciousness online. Lightning-fast processors spinning in empty cycles, waiting for the data streams to return...",
        devices: &[
            ("Rapid Terminal", "idle", "desk"),
            ("Speed Controller", "waiting", "wall"),
            ("Fast Scanner", "standby", "door"),
        ],
        sensors: &[
            ("FAST_01", "20%", "25%", "living"),
            ("QUICK_01", "80%", "70%", "bedroom"),
        ],
    },
};
