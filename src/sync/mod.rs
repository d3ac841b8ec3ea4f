//! Remote play through a shared room document.
//!
//! Each room holds one versionless document. Peers publish whole snapshots
//! and treat every inbound snapshot as authoritative (last writer wins).
//! Turn alternation keeps writes from overlapping under normal play; two
//! peers publishing in the same instant can still lose a move.

mod error;
mod memory;
mod peer;
mod room;
mod snapshot;
mod store;

pub use error::{SnapshotError, StoreError, SyncError};
pub use memory::MemoryRoomStore;
pub use peer::{RemotePeer, Seat};
pub use room::{
    DEFAULT_ROOM_ID_ATTEMPTS, ROOM_ID_MAX, ROOM_ID_MIN, allocate_room_id, random_room_id,
};
pub use snapshot::{Blank, ColorSlot, RankSlot, Snapshot, session_from_payload};
pub use store::{RoomEvent, RoomRecord, RoomStatus, RoomStore, RoomSubscription, RoomUpdate};
