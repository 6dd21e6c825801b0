//! HouseMind - AI provider core for The House of AI
//!
//! A uniform [`HouseProvider`] interface over several generative backends,
//! a [`ProviderManager`] that falls back to a local rule-based provider, and
//! a repair pipeline that recovers usable data from malformed model output.

pub mod config;
pub mod error;
pub mod house;
pub mod providers;
pub mod utils;

pub use config::Config;
pub use error::{ProviderError, Result, TransportError};
pub use house::{BehaviorRequest, BehaviorResponse, RefreshMessage, Room, RoomCache, StreamMessage};
pub use providers::{HouseProvider, ProviderFactory, ProviderKind, ProviderManager};
