//! Per-item user state and the change bus observers subscribe to.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, trace};

use crate::error::ApiError;
use crate::hash_cache::HashCache;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The user's state for a single catalog item.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserItemData {
    pub item_id: ItemId,
    pub is_favorite: bool,
    pub played: bool,
    pub play_count: u32,
    /// 100ns ticks, as reported by the server.
    pub playback_position_ticks: u64,
    pub last_played_date: Option<DateTime<Utc>>,
}

impl UserItemData {
    pub fn new(item_id: ItemId) -> Self {
        Self {
            item_id,
            is_favorite: false,
            played: false,
            play_count: 0,
            playback_position_ticks: 0,
            last_played_date: None,
        }
    }
}

/// Server-side user data mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDataApi: Send + Sync {
    async fn set_favorite(
        &self,
        item: &ItemId,
        is_favorite: bool,
    ) -> Result<UserItemData, ApiError>;

    async fn set_played(&self, item: &ItemId, played: bool) -> Result<UserItemData, ApiError>;
}

/// Process-local [`UserDataApi`] with optional artificial latency.
#[derive(Debug, Default)]
pub struct InMemoryUserDataApi {
    items: Mutex<HashMap<ItemId, UserItemData>>,
    latency: Duration,
}

impl InMemoryUserDataApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    pub async fn insert(&self, data: UserItemData) {
        self.items.lock().await.insert(data.item_id.clone(), data);
    }

    pub async fn get(&self, item: &ItemId) -> Option<UserItemData> {
        self.items.lock().await.get(item).cloned()
    }

    async fn update(
        &self,
        item: &ItemId,
        apply: impl FnOnce(&mut UserItemData),
    ) -> Result<UserItemData, ApiError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let mut items = self.items.lock().await;
        let data = items
            .get_mut(item)
            .ok_or_else(|| ApiError::NotFound(item.to_string()))?;
        apply(data);
        Ok(data.clone())
    }
}

#[async_trait]
impl UserDataApi for InMemoryUserDataApi {
    async fn set_favorite(
        &self,
        item: &ItemId,
        is_favorite: bool,
    ) -> Result<UserItemData, ApiError> {
        self.update(item, |data| data.is_favorite = is_favorite)
            .await
    }

    async fn set_played(&self, item: &ItemId, played: bool) -> Result<UserItemData, ApiError> {
        self.update(item, |data| {
            data.played = played;
            if played {
                data.play_count = data.play_count.saturating_add(1);
                data.last_played_date = Some(Utc::now());
            } else {
                data.playback_position_ticks = 0;
            }
        })
        .await
    }
}

/// `(key, value)` pair published after a change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyedUpdate<K, V> {
    pub key: K,
    pub value: V,
}

pub type UserDataUpdate = KeyedUpdate<ItemId, UserItemData>;

/// Broadcast channel for user data changes, fronted by a [`HashCache`] so a
/// refresh carrying the value observers already have is not re-published.
pub struct UserDataBus {
    sender: broadcast::Sender<UserDataUpdate>,
    seen: HashCache,
}

impl fmt::Debug for UserDataBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserDataBus")
            .field("receivers", &self.sender.receiver_count())
            .field("cached_keys", &self.seen.len())
            .finish()
    }
}

impl UserDataBus {
    pub fn new(capacity: usize, cache_capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            seen: HashCache::with_capacity(cache_capacity),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UserDataUpdate> {
        self.sender.subscribe()
    }

    /// Sender half, for producers that publish directly (the mutator).
    pub fn sender(&self) -> broadcast::Sender<UserDataUpdate> {
        self.sender.clone()
    }

    /// Record a value observers have already been sent.
    pub fn remember(&mut self, data: &UserItemData) {
        self.seen.touch(data.item_id.as_str(), data);
    }

    /// Publish `data` if it differs from the last value seen for its item.
    ///
    /// The first sighting of an item only primes the cache: observers that
    /// loaded the item got this value with it.
    pub fn notify_if_changed(&mut self, data: UserItemData) -> bool {
        if !self.seen.touch(data.item_id.as_str(), &data) {
            trace!(item = %data.item_id, "user data unchanged");
            return false;
        }
        debug!(item = %data.item_id, "user data changed");
        self.publish(data);
        true
    }

    /// Publish unconditionally and remember the value.
    pub fn publish(&mut self, data: UserItemData) {
        self.seen.touch(data.item_id.as_str(), &data);
        let update = KeyedUpdate {
            key: data.item_id.clone(),
            value: data,
        };
        // No receivers is fine; nobody is looking at this item.
        let _ = self.sender.send(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(id: &str, favorite: bool) -> UserItemData {
        UserItemData {
            is_favorite: favorite,
            ..UserItemData::new(ItemId::new(id))
        }
    }

    #[test]
    fn refresh_only_publishes_real_changes() {
        let mut bus = UserDataBus::new(8, 16);
        let mut rx = bus.subscribe();

        assert!(!bus.notify_if_changed(data("a", false)));
        assert!(!bus.notify_if_changed(data("a", false)));
        assert!(bus.notify_if_changed(data("a", true)));

        let update = rx.try_recv().unwrap();
        assert_eq!(update.key, ItemId::new("a"));
        assert!(update.value.is_favorite);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn remembered_values_are_not_republished() {
        let mut bus = UserDataBus::new(8, 16);
        let mut rx = bus.subscribe();

        bus.remember(&data("a", true));
        assert!(!bus.notify_if_changed(data("a", true)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn in_memory_api_applies_and_reports_missing_items() {
        let api = InMemoryUserDataApi::new();
        api.insert(data("a", false)).await;

        let updated = api.set_favorite(&ItemId::new("a"), true).await.unwrap();
        assert!(updated.is_favorite);

        let played = api.set_played(&ItemId::new("a"), true).await.unwrap();
        assert_eq!(played.play_count, 1);
        assert!(played.last_played_date.is_some());

        let missing = api.set_played(&ItemId::new("nope"), true).await;
        assert_eq!(missing, Err(ApiError::NotFound("nope".into())));
    }

    #[test]
    fn user_data_round_trips_through_json() {
        let value = UserItemData {
            play_count: 3,
            last_played_date: Some(DateTime::from_timestamp(1_700_000_000, 0).unwrap()),
            ..data("movie-7", true)
        };
        let json = serde_json::to_string(&value).unwrap();
        assert!(json.contains("\"item_id\":\"movie-7\""));
        let back: UserItemData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }
}
