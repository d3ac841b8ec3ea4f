//! Room id allocation.

use super::error::SyncError;
use super::store::{RoomStatus, RoomStore};
use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, instrument, warn};

/// Smallest six-digit room id.
pub const ROOM_ID_MIN: u32 = 100_000;

/// Largest six-digit room id.
pub const ROOM_ID_MAX: u32 = 999_999;

/// Default number of random ids tried before falling back to a timestamp.
pub const DEFAULT_ROOM_ID_ATTEMPTS: u32 = 10;

/// A random six-digit id.
pub fn random_room_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.gen_range(ROOM_ID_MIN..=ROOM_ID_MAX).to_string()
}

/// Picks an id that is free or held only by a finished room.
///
/// Tries `attempts` random six-digit ids, then falls back to the current
/// time in milliseconds.
#[instrument(skip(store, rng))]
pub async fn allocate_room_id<S, R>(
    store: &S,
    rng: &mut R,
    attempts: u32,
) -> Result<String, SyncError>
where
    S: RoomStore + ?Sized,
    R: Rng + ?Sized,
{
    for attempt in 1..=attempts {
        let candidate = random_room_id(rng);
        match store.get_room(&candidate).await? {
            Some(room) if room.status != RoomStatus::Finished => {
                debug!(attempt, room_id = %candidate, status = %room.status, "Room id taken");
            }
            _ => return Ok(candidate),
        }
    }

    let fallback = timestamp_id();
    warn!(attempts, room_id = %fallback, "Random room ids exhausted, using timestamp");
    Ok(fallback)
}

fn timestamp_id() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
        .to_string()
}
