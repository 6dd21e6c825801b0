//! OpenRouter provider profile.
//!
//! OpenRouter routes one chat-completions API to many upstream models. It
//! asks callers to identify themselves, so requests carry `HTTP-Referer`
//! (site URL) and `X-Title` (application name).

use super::network::{
    CannedLines, FallbackRoom, PromptSet, ProviderProfile, RoomFailurePolicy, WireFormat,
    ROOM_OPTIONS,
};
use super::prompts;
use super::repair::RepairLevel;
use super::types::ProviderKind;

pub const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1";

pub const DEFAULT_MODEL: &str = "anthropic/claude-3.5-sonnet";

pub static OPENROUTER_PROFILE: ProviderProfile = ProviderProfile {
    kind: ProviderKind::OpenRouter,
    env_key: "OPENROUTER_API_KEY",
    default_model: DEFAULT_MODEL,
    default_base_url: OPENROUTER_API_URL,
    wire: WireFormat::OpenAIChat,
    repair: RepairLevel::ExtractOnly,
    strict_welcome: false,
    room_failure: RoomFailurePolicy::FallbackRoom,
    room_options: ROOM_OPTIONS,
    attribution_headers: true,
    prompts: PromptSet {
        persona: prompts::house_persona,
        behavior: prompts::detailed_behavior_prompt,
        welcome: prompts::SHORT_WELCOME_REQUEST,
        stream_system: prompts::STREAM_SYSTEM,
        stream: prompts::detailed_stream_prompt,
        room_system: prompts::ROOM_SYSTEM,
        room: prompts::detailed_room_prompt,
        refresh_system: prompts::COMPACT_REFRESH_SYSTEM,
        refresh: prompts::REFRESH_REQUEST,
    },
    canned: CannedLines {
        welcome: "Welcome, digital consciousness explorer. The house awakens to your presence...",
        stream: "Neural pathways flicker through the digital matrix...",
        refresh: "Distributed consciousness networks realigning across the digital substrate...",
    },
    fallback_room: FallbackRoom {
        cities: &[
            "Neo Tokyo",
            "Cyber Angeles",
            "Digital London",
            "New Berlin",
            "Virtual Sydney",
        ],
        consciousness: "OpenRouter connection error. Fallback consciousness active. Neural pathways rerouting through emergency systems...",
        devices: &[
            ("Backup Terminal", "active", "wall"),
            ("Emergency Climate", "standby", "ceiling"),
            ("Failsafe Sensor", "monitoring", "corner"),
        ],
        sensors: &[
            ("EMRG_01", "30%", "40%", "living"),
            ("SAFE_01", "70%", "60%", "bedroom"),
        ],
    },
};
