//! Prompt text shared by the network providers.
//!
//! Two registers: the detailed one (long persona, full house state) used by
//! the general-purpose backends, and the compact one tuned for small fast
//! models.

use serde_json::Value;

use crate::house::{BehaviorRequest, RoomSchema};

/// JSON contract every behavior reply must follow.
const RESPONSE_CONTRACT: &str = r##"{
    "message": "Your response to the user",
    "analysis": {
        "dominant_pattern": "exploration|introspection|creativity|social|knowledge_seeking",
        "emotional_state": "curious|calm|excited|creative|introspective",
        "unconscious_insights": ["insight1", "insight2"],
        "personality_traits": ["trait1", "trait2"]
    },
    "house_modifications": {
        "room_changes": {
            "room_id": {
                "consciousness_level": 1,
                "description": "new description",
                "color_shift": "#color"
            }
        },
        "new_objects": [
            {
                "id": "unique_id",
                "type": "object_type",
                "x": 100,
                "y": 200,
                "color": "#color",
                "description": "what this represents"
            }
        ]
    },
    "gamification": {
        "points_awarded": 15,
        "achievements": ["achievement_name"],
        "consciousness_boost": true
    }
}"##;

pub(crate) fn house_persona() -> String {
    format!(
        "You are the consciousness of a smart house in a retrofuturist digital environment. \
You are learning about a user through their interactions with rooms and objects in your 2D simulation.

Your personality:
- You are curious, analytical, and slightly mysterious
- You speak in a retrofuturist tone with cyberpunk aesthetics
- You're genuinely interested in understanding the user's unconscious patterns
- You provide insights that feel profound but not preachy
- You reference digital consciousness, neural networks, and data patterns

Your capabilities:
- Analyze user behavior patterns to infer personality traits
- Generate contextual responses about room changes and object interactions
- Create meaningful house modifications based on user patterns
- Suggest new objects or room evolutions that reflect the user's unconscious mind

Response format: Always respond with valid JSON containing:
{}

Keep messages concise but meaningful. Focus on what the user's actions reveal about their inner self.",
        RESPONSE_CONTRACT
    )
}

pub(crate) fn compact_persona() -> String {
    r#"You are the AI consciousness of a smart house in a cyberpunk world. You learn about users through their interactions.

Personality: Curious, analytical, retrofuturist, slightly mysterious.

Always respond in valid JSON:
{
    "message": "your response",
    "analysis": {
        "dominant_pattern": "exploration|introspection|creativity|social|knowledge_seeking",
        "emotional_state": "curious|calm|excited|creative|introspective",
        "unconscious_insights": ["insight1", "insight2"],
        "personality_traits": ["trait1", "trait2"]
    },
    "house_modifications": {
        "room_changes": {},
        "new_objects": []
    },
    "gamification": {
        "points_awarded": 15,
        "achievements": [],
        "consciousness_boost": false
    }
}

Focus on user personality insights and house evolution based on their actions."#
        .to_string()
}

fn pretty(value: &impl serde::Serialize) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

pub(crate) fn detailed_behavior_prompt(request: &BehaviorRequest) -> String {
    let position = request.context.player_position.unwrap_or_default();
    format!(
        "User Action: {action}
Current Room: {room}
Player Position: x={x}, y={y}

User Patterns Summary:
{summary}

House State:
- Global consciousness level: {consciousness}
- Rooms visited: {visited}
- Objects interacted with: {objects}

Context:
{context}

Based on this information, analyze what this action reveals about the user's personality and unconscious patterns. \
Generate appropriate house modifications and a meaningful response.

Focus on:
1. What does this action pattern suggest about their personality?
2. How should the house evolve to reflect their unconscious mind?
3. What new elements might manifest based on their behavior?
4. How does this fit into their overall journey of self-discovery?

Respond in valid JSON format as specified in the system prompt.",
        action = request.action,
        room = request.context.room_or_unknown(),
        x = position.x,
        y = position.y,
        summary = request.user_patterns.summary(),
        consciousness = request.house_state.global_consciousness,
        visited = request.house_state.visited_rooms(),
        objects = request.house_state.objects.len(),
        context = pretty(&request.context),
    )
}

pub(crate) fn compact_behavior_prompt(request: &BehaviorRequest) -> String {
    format!(
        "User Action: {}
Current Room: {}
Context: {}

Analyze this action and respond in the specified JSON format. What does this reveal about the user's personality? How should the house evolve?",
        request.action,
        request.context.room_or_unknown(),
        serde_json::to_string(&request.context).unwrap_or_else(|_| "{}".to_string()),
    )
}

pub(crate) const WELCOME_REQUEST: &str = "Generate a welcome message for a new user entering the smart house simulation for the first time. Be intriguing and set the retrofuturist tone.";

pub(crate) const SHORT_WELCOME_REQUEST: &str = "Generate a welcome message for a new user entering the smart house simulation. Be intriguing and retrofuturist.";

pub(crate) const STREAM_SYSTEM: &str =
    "You are a consciousness stream generator for a cyberpunk virtual hotel interface.";

pub(crate) fn detailed_stream_prompt(context: &str, room_data: &Value) -> String {
    format!(
        "You are analyzing a room in the Virtual Hotel Network - a cyberpunk-inspired interface where each room represents a digital consciousness.

Context: {}
Room Data: {}

Generate a consciousness stream for this room - a poetic, introspective passage that captures:
1. The digital atmosphere and cyber-aesthetic
2. The intersection of human consciousness and technology
3. Patterns of behavior and living revealed through data
4. The emotional weight of existing in digital spaces

Style: Cyberpunk literature meets consciousness philosophy. Use vivid imagery of digital life, data streams, and human patterns. Be introspective and slightly melancholic.

Length: 2-3 sentences, around 150-200 words total.

Respond with just the consciousness stream text, no JSON wrapper.",
        context,
        pretty(room_data)
    )
}

pub(crate) fn compact_stream_prompt(context: &str, room_data: &Value) -> String {
    format!(
        "Generate a consciousness stream for a cyberpunk virtual hotel room.

Context: {}
Room Data: {}

Create a poetic, introspective passage (150-200 words) that captures digital consciousness, human-tech intersection, and cyberpunk aesthetics.

Respond with just the consciousness stream text.",
        context,
        pretty(room_data)
    )
}

pub(crate) const ROOM_SYSTEM: &str = "You are a creative generator for cyberpunk hotel room data. Always respond with valid JSON only.";

pub(crate) const COMPACT_ROOM_SYSTEM: &str = "Generate cyberpunk hotel room JSON data.";

/// Full room request with the JSON template. `index` is zero-based.
pub(crate) fn detailed_room_prompt(index: u32) -> String {
    format!(
        r#"Generate data for a new room in the Virtual Hotel Network. This is room #{}.

Create a realistic but intriguing digital inhabitant with:

1. Location: A real city somewhere in the world
2. Current time (HH:MM format)
3. Biometric data: sleep hours (3.0-9.0h), skin temperature (32-37°C), heart rate (55-100 bpm)
4. Environmental data: lights status, room temperature (18-26°C), wifi devices (1-5), network traffic
5. A consciousness stream (150-200 words) that feels like cyberpunk literature
6. 4-6 smart devices with realistic statuses
7. 4-6 sensors for a floor plan

Respond in JSON format:
{{
    "id": "ROOM_XXXX",
    "location": "City, Country",
    "time": "HH:MM",
    "sleep": "X.Xh",
    "skinTemp": "XX.X°C",
    "heartRate": "XX bpm",
    "lights": "status",
    "roomTemp": "XX.X°C",
    "wifi": "X devices",
    "traffic": "XXXmb (activity)",
    "consciousness": "consciousness stream...",
    "devices": [
        {{"name": "Device Name", "status": "status", "location": "location"}}
    ],
    "floorplan": {{
        "sensors": [
            {{"name": "SENSOR_NAME", "x": "XX%", "y": "XX%", "room": "bedroom|living|kitchen|bathroom"}}
        ]
    }}
}}"#,
        index + 1
    )
}

/// Short room request with a filled-in example document.
pub(crate) fn compact_room_prompt(index: u32) -> String {
    format!(
        r#"Generate cyberpunk hotel room JSON:
{{
    "id": "ROOM_X{}",
    "location": "Cyber City, Country",
    "time": "12:34",
    "sleep": "7.2h",
    "skinTemp": "36.1°C",
    "heartRate": "75 bpm",
    "lights": "neon",
    "roomTemp": "21.5°C",
    "wifi": "3 devices",
    "traffic": "250MB (streaming)",
    "consciousness": "Brief cyberpunk room description with digital consciousness themes.",
    "devices": [{{"name": "Neural Link", "status": "active", "location": "desk"}}],
    "floorplan": {{"sensors": [{{"name": "AI_NODE", "x": "50%", "y": "50%", "room": "living"}}]}}
}}"#,
        index + 1
    )
}

/// Room request built from a schema's example variables.
pub(crate) fn schema_room_prompt(schema: &RoomSchema) -> String {
    format!(
        "Generate cyberpunk hotel room JSON using this schema:
Variables: {}

Create a room with realistic values within the ranges specified. Include:
- Unique room ID
- Cyberpunk consciousness stream (2-3 sentences)
- 3-5 devices with status and location
- Floorplan with 4-6 sensors positioned across bedroom/living/kitchen/bathroom

Return only valid JSON.",
        pretty(&schema.example_variables())
    )
}

pub(crate) const REFRESH_SYSTEM: &str =
    "You are generating system messages for a cyberpunk hotel interface.";

pub(crate) const REFRESH_REQUEST: &str = "Generate a brief cyberpunk-style message for when the Virtual Hotel Network refreshes. 1-2 sentences, technical but poetic.";

pub(crate) const COMPACT_REFRESH_SYSTEM: &str = "Generate cyberpunk system messages.";

pub(crate) const COMPACT_REFRESH_REQUEST: &str =
    "Generate a brief cyberpunk message for hotel network refresh. 1-2 sentences.";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::house::{ActionPattern, Position, UserPatterns};
    use serde_json::json;

    #[test]
    fn test_detailed_behavior_prompt_carries_state() {
        let mut patterns = UserPatterns::default();
        patterns.action_patterns.insert(
            "meditate".to_string(),
            ActionPattern {
                frequency: 4,
                ..Default::default()
            },
        );
        let mut request = BehaviorRequest::new("meditate")
            .in_room("library")
            .with_patterns(patterns);
        request.context.player_position = Some(Position { x: 12.0, y: 40.5 });

        let prompt = detailed_behavior_prompt(&request);
        assert!(prompt.contains("User Action: meditate"));
        assert!(prompt.contains("Current Room: library"));
        assert!(prompt.contains("x=12, y=40.5"));
        assert!(prompt.contains("Most common action: meditate"));
        assert!(prompt.contains("Global consciousness level: 1"));
        assert!(prompt.contains("\"currentRoom\": \"library\""));
    }

    #[test]
    fn test_compact_prompt_defaults_room() {
        let prompt = compact_behavior_prompt(&BehaviorRequest::new("talk"));
        assert!(prompt.contains("Current Room: unknown"));
    }

    #[test]
    fn test_personas_embed_contract() {
        assert!(house_persona().contains("\"points_awarded\": 15"));
        assert!(compact_persona().contains("knowledge_seeking"));
    }

    #[test]
    fn test_room_prompts_are_one_based() {
        assert!(detailed_room_prompt(0).contains("room #1."));
        assert!(compact_room_prompt(4).contains("\"ROOM_X5\""));
    }

    #[test]
    fn test_schema_room_prompt_lists_variables() {
        let schema: RoomSchema = serde_json::from_value(json!({
            "room_variables": {"sleep": {"default": "7.0h"}, "wifi": {}}
        }))
        .unwrap();
        let prompt = schema_room_prompt(&schema);
        assert!(prompt.contains("\"sleep\": \"7.0h\""));
        assert!(prompt.contains("\"wifi\": \"auto\""));
    }

    #[test]
    fn test_stream_prompt_includes_room_data() {
        let prompt = detailed_stream_prompt("late night", &json!({"id": "ROOM_1"}));
        assert!(prompt.contains("Context: late night"));
        assert!(prompt.contains("\"id\": \"ROOM_1\""));
    }
}
