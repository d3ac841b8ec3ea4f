//! Abstract room document store.
//!
//! A room is one versionless document. Writers replace fields wholesale and
//! subscribers receive the full document after every write, their own
//! included.

use super::error::SyncError;
use super::snapshot::Snapshot;
use crate::games::cardtoe::Color;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{trace, warn};

/// Room lifecycle status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    /// Host is waiting for a guest.
    #[display("waiting")]
    Waiting,
    /// Both seats taken.
    #[display("active")]
    Active,
    /// Play is over; the id may be reused.
    #[display("finished")]
    Finished,
}

/// Stored room document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRecord {
    /// Host color, always green.
    #[serde(rename = "player1")]
    pub host_color: Color,
    /// Host display name.
    #[serde(rename = "player1Name")]
    pub host_name: String,
    /// Guest color once joined.
    #[serde(rename = "player2")]
    pub guest_color: Option<Color>,
    /// Guest display name once joined.
    #[serde(rename = "player2Name")]
    pub guest_name: Option<String>,
    /// Latest published session snapshot.
    pub game_state: Option<Snapshot>,
    /// Lifecycle status.
    pub status: RoomStatus,
}

impl RoomRecord {
    /// New waiting room hosted by green.
    pub fn waiting(host_name: impl Into<String>, game_state: Snapshot) -> Self {
        Self {
            host_color: Color::Green,
            host_name: host_name.into(),
            guest_color: None,
            guest_name: None,
            game_state: Some(game_state),
            status: RoomStatus::Waiting,
        }
    }
}

/// Partial write. `None` fields are left as stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomUpdate {
    /// New guest color.
    pub guest_color: Option<Color>,
    /// New guest name.
    pub guest_name: Option<String>,
    /// Replacement snapshot.
    pub game_state: Option<Snapshot>,
    /// New status.
    pub status: Option<RoomStatus>,
}

impl RoomUpdate {
    /// Replaces the snapshot only.
    pub fn game_state(snapshot: Snapshot) -> Self {
        Self {
            game_state: Some(snapshot),
            ..Self::default()
        }
    }

    /// Takes the guest seat and activates the room.
    pub fn join(color: Color, name: impl Into<String>) -> Self {
        Self {
            guest_color: Some(color),
            guest_name: Some(name.into()),
            status: Some(RoomStatus::Active),
            ..Self::default()
        }
    }

    /// Writes the set fields into `record`.
    pub fn apply_to(self, record: &mut RoomRecord) {
        if let Some(color) = self.guest_color {
            record.guest_color = Some(color);
        }
        if let Some(name) = self.guest_name {
            record.guest_name = Some(name);
        }
        if let Some(snapshot) = self.game_state {
            record.game_state = Some(snapshot);
        }
        if let Some(status) = self.status {
            record.status = status;
        }
    }
}

/// Change notification for a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    /// The document after a write.
    Updated(RoomRecord),
    /// The document was deleted.
    Deleted,
}

/// Live feed of one room. Dropping it unsubscribes.
#[derive(Debug)]
pub struct RoomSubscription {
    room_id: String,
    rx: broadcast::Receiver<RoomEvent>,
}

impl RoomSubscription {
    /// Wraps a broadcast receiver.
    pub fn new(room_id: impl Into<String>, rx: broadcast::Receiver<RoomEvent>) -> Self {
        Self {
            room_id: room_id.into(),
            rx,
        }
    }

    /// Room being watched.
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Waits for the next event. `None` once the feed is closed.
    ///
    /// Lagging skips ahead; every event carries the whole document, so the
    /// skipped ones are superseded.
    pub async fn next(&mut self) -> Option<RoomEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(room_id = %self.room_id, skipped, "Subscription lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next already-delivered event, without waiting.
    pub fn try_next(&mut self) -> Option<RoomEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(room_id = %self.room_id, skipped, "Subscription lagged");
                }
                Err(e) => {
                    trace!(room_id = %self.room_id, error = %e, "No pending event");
                    return None;
                }
            }
        }
    }
}

/// Shared document store holding rooms.
#[async_trait::async_trait]
pub trait RoomStore: Send + Sync {
    /// Reads a room.
    async fn get_room(&self, room_id: &str) -> Result<Option<RoomRecord>, SyncError>;

    /// Creates a room. Fails with [`SyncError::RoomExists`] when a room with
    /// this id is still in use; a finished room is replaced.
    async fn create_room(&self, room_id: &str, record: RoomRecord) -> Result<(), SyncError>;

    /// Applies a partial write and returns the stored document.
    async fn update_room(&self, room_id: &str, update: RoomUpdate) -> Result<RoomRecord, SyncError>;

    /// Deletes a room. Deleting a missing room succeeds.
    async fn delete_room(&self, room_id: &str) -> Result<(), SyncError>;

    /// Subscribes to every later write of the room.
    async fn subscribe_room(&self, room_id: &str) -> Result<RoomSubscription, SyncError>;
}
