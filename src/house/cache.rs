//! Background room pre-generation.
//!
//! The cache calls the primary provider directly (not through the manager),
//! so a failing backend never demotes the manager; a failed generation is
//! replaced by a rule-based room instead. Refill tasks run on the ambient
//! tokio runtime and are never cancelled.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::join_all;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::room::Room;
use super::schema::RoomSchema;
use crate::providers::{HouseProvider, RuleBasedProvider};

pub struct RoomCache {
    rooms: Mutex<VecDeque<Room>>,
    capacity: usize,
    primary: Arc<dyn HouseProvider>,
    fallback: RuleBasedProvider,
    schema: Option<Arc<RoomSchema>>,
    next_index: AtomicU32,
}

impl RoomCache {
    /// Create an empty cache holding at most `capacity` rooms.
    pub fn new(
        primary: Arc<dyn HouseProvider>,
        capacity: usize,
        schema: Option<Arc<RoomSchema>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            rooms: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            primary,
            fallback: RuleBasedProvider::new(),
            schema,
            next_index: AtomicU32::new(0),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Room>> {
        self.rooms.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Generate one room from the primary, or locally when the primary is
    /// unavailable or fails. Never errors.
    pub async fn generate(&self, index: u32) -> Room {
        let schema = self.schema.as_deref();
        if self.primary.check_availability() {
            match self.primary.generate_room(index, schema).await {
                Ok(room) => return room,
                Err(e) => warn!(
                    provider = %self.primary.kind(),
                    index,
                    error = %e,
                    "Room generation failed, using rule-based room"
                ),
            }
        }
        self.fallback.room(index, schema)
    }

    /// Generate one room and append it if the cache is still below
    /// capacity. Returns whether a room was added.
    pub async fn refill_once(&self) -> bool {
        if self.len() >= self.capacity {
            return false;
        }
        let index = self.next_index.fetch_add(1, Ordering::Relaxed);
        let room = self.generate(index).await;

        let mut rooms = self.lock();
        if rooms.len() >= self.capacity {
            debug!(index, "Cache filled meanwhile, dropping generated room");
            return false;
        }
        rooms.push_back(room);
        debug!(cached = rooms.len(), capacity = self.capacity, "Room cache refilled");
        true
    }

    /// Schedule one refill on the current runtime. `None` outside a runtime.
    pub fn spawn_refill(self: &Arc<Self>) -> Option<JoinHandle<bool>> {
        let handle = Handle::try_current().ok()?;
        let cache = Arc::clone(self);
        Some(handle.spawn(async move { cache.refill_once().await }))
    }

    /// Schedule `count` refills in the background.
    pub fn prefill(self: &Arc<Self>, count: usize) -> Vec<JoinHandle<bool>> {
        info!(count, capacity = self.capacity, "Pre-generating rooms");
        (0..count).filter_map(|_| self.spawn_refill()).collect()
    }

    /// Run `count` refills concurrently and wait for them. Returns how many
    /// rooms were added.
    pub async fn prefill_and_wait(&self, count: usize) -> usize {
        let added = join_all((0..count).map(|_| self.refill_once()))
            .await
            .into_iter()
            .filter(|added| *added)
            .count();
        info!(added, cached = self.len(), "Room cache ready");
        added
    }

    /// Pop the oldest cached room with a fresh id and time and schedule a
    /// refill. `None` when the cache is empty.
    pub fn take_room(self: &Arc<Self>) -> Option<Room> {
        let mut room = self.lock().pop_front()?;
        room.refresh_identity();
        self.spawn_refill();
        Some(room)
    }

    /// A cached room if one is ready, otherwise a freshly generated one.
    /// Either way a refill is scheduled.
    pub async fn next_room(self: &Arc<Self>) -> Room {
        if let Some(room) = self.take_room() {
            return room;
        }
        let index = self.next_index.fetch_add(1, Ordering::Relaxed);
        let room = self.generate(index).await;
        self.spawn_refill();
        room
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ProviderError, Result};
    use crate::house::{BehaviorRequest, BehaviorResponse, RefreshMessage, StreamMessage};
    use crate::providers::ProviderKind;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::AtomicUsize;

    struct CountingRooms {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl HouseProvider for CountingRooms {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Groq
        }
        fn model(&self) -> &str {
            "counting"
        }
        fn initialize(&mut self) -> bool {
            true
        }
        fn check_availability(&self) -> bool {
            true
        }
        async fn generate_behavior_response(
            &self,
            _request: &BehaviorRequest,
        ) -> Result<BehaviorResponse> {
            Err(ProviderError::Unavailable(ProviderKind::Groq))
        }
        async fn generate_welcome_message(&self) -> Result<String> {
            Ok("hi".to_string())
        }
        async fn generate_consciousness_stream(&self, _c: &str, _r: &Value) -> StreamMessage {
            StreamMessage::fresh("s")
        }
        async fn generate_room(&self, index: u32, _s: Option<&RoomSchema>) -> Result<Room> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ProviderError::MalformedResponse("garbage".to_string()));
            }
            let mut room = Room {
                location: format!("Counted City {}", index),
                ..Default::default()
            };
            room.backfill();
            Ok(room)
        }
        async fn generate_refresh_message(&self) -> RefreshMessage {
            RefreshMessage::fresh("r")
        }
    }

    fn counting(fail: bool) -> Arc<CountingRooms> {
        Arc::new(CountingRooms {
            fail,
            calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_prefill_respects_capacity() {
        let primary = counting(false);
        let cache = RoomCache::new(primary.clone(), 2, None);
        assert_eq!(cache.prefill_and_wait(2).await, 2);
        assert_eq!(cache.len(), 2);

        assert!(!cache.refill_once().await);
        assert_eq!(cache.len(), 2);
        assert_eq!(primary.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_primary_uses_rule_based_room() {
        let cache = RoomCache::new(counting(true), 1, None);
        assert!(cache.refill_once().await);
        let room = cache.take_room().unwrap();
        assert!(room.id.starts_with("ROOM_"));
        assert!(!room.consciousness.is_empty());
    }

    #[tokio::test]
    async fn test_take_room_pops_front_and_refreshes() {
        let cache = RoomCache::new(counting(false), 3, None);
        cache.prefill_and_wait(1).await;

        let room = cache.take_room().unwrap();
        assert_eq!(room.location, "Counted City 0");
        assert_eq!(room.time.len(), 5);

        // The scheduled refill lands in the background.
        for _ in 0..50 {
            if !cache.is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_next_room_generates_when_empty() {
        let primary = counting(false);
        let cache = RoomCache::new(primary.clone(), 0, None);
        let room = cache.next_room().await;
        assert_eq!(room.location, "Counted City 0");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_take_room_outside_runtime() {
        let cache = RoomCache::new(counting(false), 1, None);
        assert!(cache.take_room().is_none());
        assert!(cache.spawn_refill().is_none());
    }
}
