//! In-process [`RoomStore`] backed by a mutex-guarded map.

use super::error::{StoreError, SyncError};
use super::store::{RoomEvent, RoomRecord, RoomStatus, RoomStore, RoomSubscription, RoomUpdate};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

const CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Default)]
struct Rooms {
    records: HashMap<String, RoomRecord>,
    channels: HashMap<String, broadcast::Sender<RoomEvent>>,
}

impl Rooms {
    fn notify(&mut self, room_id: &str, event: RoomEvent) {
        if let Some(tx) = self.channels.get(room_id) {
            // No receivers is fine; nobody is watching.
            let _ = tx.send(event);
        }
    }
}

/// Room store living in memory, shared by cloning.
#[derive(Debug, Clone, Default)]
pub struct MemoryRoomStore {
    rooms: Arc<Mutex<Rooms>>,
    offline: Arc<AtomicBool>,
}

impl MemoryRoomStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating in-memory room store");
        Self::default()
    }

    /// Makes every operation fail until switched back, to exercise
    /// connection loss.
    pub fn set_offline(&self, offline: bool) {
        warn!(offline, "Room store connectivity changed");
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of stored rooms.
    pub fn room_count(&self) -> Result<usize, SyncError> {
        Ok(self.lock()?.records.len())
    }

    #[track_caller]
    fn lock(&self) -> Result<MutexGuard<'_, Rooms>, SyncError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::new("Store unreachable").into());
        }
        self.rooms
            .lock()
            .map_err(|e| StoreError::new(format!("Room table lock poisoned: {}", e)).into())
    }
}

#[async_trait::async_trait]
impl RoomStore for MemoryRoomStore {
    #[instrument(skip(self))]
    async fn get_room(&self, room_id: &str) -> Result<Option<RoomRecord>, SyncError> {
        Ok(self.lock()?.records.get(room_id).cloned())
    }

    #[instrument(skip(self, record), fields(host = %record.host_name))]
    async fn create_room(&self, room_id: &str, record: RoomRecord) -> Result<(), SyncError> {
        let mut rooms = self.lock()?;
        if let Some(existing) = rooms.records.get(room_id) {
            if existing.status != RoomStatus::Finished {
                debug!(status = %existing.status, "Room id in use");
                return Err(SyncError::RoomExists(room_id.to_string()));
            }
        }
        rooms.records.insert(room_id.to_string(), record.clone());
        rooms.notify(room_id, RoomEvent::Updated(record));
        info!("Room created");
        Ok(())
    }

    #[instrument(skip(self, update))]
    async fn update_room(
        &self,
        room_id: &str,
        update: RoomUpdate,
    ) -> Result<RoomRecord, SyncError> {
        let mut rooms = self.lock()?;
        let record = rooms
            .records
            .get_mut(room_id)
            .ok_or_else(|| SyncError::RoomNotFound(room_id.to_string()))?;
        update.apply_to(record);
        let record = record.clone();
        rooms.notify(room_id, RoomEvent::Updated(record.clone()));
        debug!(status = %record.status, "Room updated");
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn delete_room(&self, room_id: &str) -> Result<(), SyncError> {
        let mut rooms = self.lock()?;
        if rooms.records.remove(room_id).is_some() {
            rooms.notify(room_id, RoomEvent::Deleted);
            info!("Room deleted");
        } else {
            debug!("Room already gone");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn subscribe_room(&self, room_id: &str) -> Result<RoomSubscription, SyncError> {
        let mut rooms = self.lock()?;
        let rx = rooms
            .channels
            .entry(room_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe();
        debug!("Subscribed to room");
        Ok(RoomSubscription::new(room_id, rx))
    }
}
