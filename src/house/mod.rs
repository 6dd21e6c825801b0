//! House domain types shared by every provider.
//!
//! These are the shapes the simulation consumes. However a result was
//! produced (direct parse, repaired parse, salvage, or rule-based), it
//! arrives as one of these types.

pub mod behavior;
pub mod cache;
mod lenient;
pub mod room;
pub mod schema;

pub use behavior::{
    ActionContext, ActionPattern, Analysis, BehaviorRequest, BehaviorResponse, DominantPattern,
    EmotionalState, Gamification, HouseModifications, HouseSnapshot, Position, RoomPreference,
    RoomState, UserPatterns,
};
pub use cache::RoomCache;
pub use room::{Device, Floorplan, RefreshMessage, Room, Sensor, StreamMessage};
pub use schema::{DeviceTemplate, FloorplanBounds, RoomSchema, RoomVariable, ValueRange};
