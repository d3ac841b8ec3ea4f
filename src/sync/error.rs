//! Sync error types.

use crate::games::cardtoe::MoveError;
use crate::session::SessionError;
use derive_more::{Display, Error, From};
use tracing::instrument;

/// Store I/O failure with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Store error: {} at {}:{}", message, file, line)]
pub struct StoreError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl StoreError {
    /// Creates a new store error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Malformed snapshot or legacy payload, with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Snapshot error: {} at {}:{}", message, file, line)]
pub struct SnapshotError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SnapshotError {
    /// Creates a new snapshot error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("JSON error: {}", err))
    }
}

impl From<base64::DecodeError> for SnapshotError {
    #[track_caller]
    fn from(err: base64::DecodeError) -> Self {
        Self::new(format!("Base64 error: {}", err))
    }
}

/// Errors from room lifecycle and remote play.
#[derive(Debug, Clone, Display, Error, From)]
pub enum SyncError {
    /// No room with this id.
    #[display("Room {} not found", _0)]
    #[from(ignore)]
    RoomNotFound(#[error(not(source))] String),

    /// The room already has a guest.
    #[display("Room {} is full", _0)]
    #[from(ignore)]
    RoomFull(#[error(not(source))] String),

    /// The room is no longer waiting for a guest.
    #[display("Room {} is not accepting players", _0)]
    #[from(ignore)]
    RoomNotJoinable(#[error(not(source))] String),

    /// A room with this id already exists.
    #[display("Room {} already exists", _0)]
    #[from(ignore)]
    RoomExists(#[error(not(source))] String),

    /// Store I/O failed.
    #[display("{}", _0)]
    Store(StoreError),

    /// Snapshot could not be decoded.
    #[display("{}", _0)]
    Snapshot(SnapshotError),

    /// The local move was rejected.
    #[display("{}", _0)]
    Move(MoveError),

    /// Phase or mode forbids the operation.
    #[display("{}", _0)]
    Session(SessionError),

    /// The peer is not in a room.
    #[display("Not connected to a room")]
    #[from(ignore)]
    NotRemote,

    /// The room subscription ended.
    #[display("Room subscription closed")]
    #[from(ignore)]
    Closed,
}
