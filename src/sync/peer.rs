//! One side of a remote game.
//!
//! A [`RemotePeer`] owns the local [`Session`] and mirrors it through a
//! [`RoomStore`]. Local actions run against the session and publish the
//! whole snapshot; if publishing fails the session is rolled back. Inbound
//! documents pass the change gate and replace the session wholesale.
//!
//! `apply` and `publish` both borrow the peer mutably, so applying an
//! inbound document can never re-enter `publish`.

use super::error::SyncError;
use super::room::allocate_room_id;
use super::snapshot::Snapshot;
use super::store::{RoomEvent, RoomRecord, RoomStatus, RoomStore, RoomSubscription, RoomUpdate};
use crate::games::cardtoe::Color;
use crate::session::{Mode, MoveOutcome, RematchOutcome, Session};
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Seat a peer holds in its room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Seat {
    /// Created the room, plays green.
    #[display("host")]
    Host,
    /// Joined the room, plays red.
    #[display("guest")]
    Guest,
}

impl Seat {
    /// Color this seat plays.
    pub fn color(self) -> Color {
        match self {
            Seat::Host => Color::Green,
            Seat::Guest => Color::Red,
        }
    }
}

/// A player connected to a room.
pub struct RemotePeer<S: RoomStore + ?Sized> {
    store: Arc<S>,
    name: String,
    session: Session,
    room_id: Option<String>,
    seat: Option<Seat>,
    subscription: Option<RoomSubscription>,
}

impl<S: RoomStore + ?Sized> RemotePeer<S> {
    /// Disconnected peer with an idle local session.
    #[instrument(skip(store))]
    pub fn new(store: Arc<S>, name: String) -> Self {
        Self {
            store,
            name,
            session: Session::new(Mode::Local),
            room_id: None,
            seat: None,
            subscription: None,
        }
    }

    /// The mirrored session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Local display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Room this peer is in.
    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    /// Seat held in the room.
    pub fn seat(&self) -> Option<Seat> {
        self.seat
    }

    /// Creates a room, starts a game with a random first color and waits
    /// in it as green.
    #[instrument(skip(self, rng), fields(name = %self.name))]
    pub async fn host<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        attempts: u32,
    ) -> Result<String, SyncError> {
        let room_id = allocate_room_id(self.store.as_ref(), rng, attempts).await?;

        let mut session = Session::new(Mode::Remote {
            local_color: Color::Green,
        });
        let first = if rng.gen_bool(0.5) { Color::Green } else { Color::Red };
        session.start(first);

        let subscription = self.store.subscribe_room(&room_id).await?;
        self.store
            .create_room(&room_id, RoomRecord::waiting(&self.name, Snapshot::capture(&session)))
            .await?;

        self.session = session;
        self.room_id = Some(room_id.clone());
        self.seat = Some(Seat::Host);
        self.subscription = Some(subscription);
        info!(%room_id, %first, "Hosting room");
        Ok(room_id)
    }

    /// Joins a waiting room as red.
    ///
    /// Refuses unknown rooms, rooms that already have a guest and rooms
    /// that are no longer waiting.
    #[instrument(skip(self), fields(name = %self.name))]
    pub async fn join(&mut self, room_id: &str) -> Result<(), SyncError> {
        let record = self
            .store
            .get_room(room_id)
            .await?
            .ok_or_else(|| SyncError::RoomNotFound(room_id.to_string()))?;
        if record.guest_color.is_some() {
            warn!("Room already has a guest");
            return Err(SyncError::RoomFull(room_id.to_string()));
        }
        if record.status != RoomStatus::Waiting {
            warn!(status = %record.status, "Room is not waiting for players");
            return Err(SyncError::RoomNotJoinable(room_id.to_string()));
        }

        let mode = Mode::Remote {
            local_color: Color::Red,
        };
        let session = match &record.game_state {
            Some(snapshot) => snapshot.restore(mode, Some(record.host_name.clone()))?,
            None => {
                let mut session = Session::new(mode);
                session.set_remote_name(record.host_name.clone());
                session
            }
        };

        let subscription = self.store.subscribe_room(room_id).await?;
        self.store
            .update_room(room_id, RoomUpdate::join(Color::Red, &self.name))
            .await?;

        self.session = session;
        self.room_id = Some(room_id.to_string());
        self.seat = Some(Seat::Guest);
        self.subscription = Some(subscription);
        info!(host = %record.host_name, "Joined room");
        Ok(())
    }

    /// Waits until a guest takes the second seat and returns their name.
    #[instrument(skip(self), fields(room_id = ?self.room_id))]
    pub async fn wait_for_guest(&mut self) -> Result<String, SyncError> {
        let room_id = self.room_id.clone().ok_or(SyncError::NotRemote)?;
        if let Some(record) = self.store.get_room(&room_id).await? {
            if let Some(name) = self.accept_guest(&record)? {
                return Ok(name);
            }
        }

        loop {
            let event = self
                .subscription
                .as_mut()
                .ok_or(SyncError::NotRemote)?
                .next()
                .await;
            match event {
                Some(RoomEvent::Updated(record)) => {
                    if let Some(name) = self.accept_guest(&record)? {
                        return Ok(name);
                    }
                }
                Some(RoomEvent::Deleted) => return Err(SyncError::RoomNotFound(room_id)),
                None => return Err(SyncError::Closed),
            }
        }
    }

    fn accept_guest(&mut self, record: &RoomRecord) -> Result<Option<String>, SyncError> {
        if record.guest_color.is_none() || record.status != RoomStatus::Active {
            return Ok(None);
        }
        let name = record.guest_name.clone().unwrap_or_else(|| "Player 2".to_string());
        self.apply(record)?;
        self.session.set_remote_name(name.clone());
        info!(guest = %name, "Guest joined");
        Ok(Some(name))
    }

    /// Writes the current snapshot to the room.
    #[instrument(skip(self), fields(room_id = ?self.room_id))]
    pub async fn publish(&mut self) -> Result<(), SyncError> {
        let room_id = self.room_id.as_deref().ok_or(SyncError::NotRemote)?;
        let snapshot = Snapshot::capture(&self.session);
        self.store
            .update_room(room_id, RoomUpdate::game_state(snapshot))
            .await?;
        debug!(turn = %self.session.current_turn(), "Snapshot published");
        Ok(())
    }

    /// Applies a room document if its snapshot differs from local state.
    ///
    /// Returns whether the session changed. The session is replaced only
    /// after the snapshot decodes completely.
    #[instrument(skip_all, fields(status = %record.status))]
    pub fn apply(&mut self, record: &RoomRecord) -> Result<bool, SyncError> {
        let Some(snapshot) = &record.game_state else {
            return Ok(false);
        };
        if !Snapshot::capture(&self.session).differs_from(snapshot) {
            debug!("Snapshot unchanged");
            return Ok(false);
        }

        let remote_name = self.session.remote_name().map(str::to_string);
        self.session = snapshot.restore(self.session.mode(), remote_name)?;
        debug!(
            phase = %self.session.phase(),
            turn = %self.session.current_turn(),
            "Remote snapshot applied"
        );
        Ok(true)
    }

    /// Applies the newest event already delivered, without waiting.
    ///
    /// Each event carries the whole document, so older queued ones are
    /// skipped. Returns whether the session changed.
    pub fn drain(&mut self) -> Result<bool, SyncError> {
        let mut latest = None;
        while let Some(event) = self.subscription.as_mut().and_then(RoomSubscription::try_next) {
            match event {
                RoomEvent::Updated(record) => latest = Some(record),
                RoomEvent::Deleted => {
                    warn!("Room deleted by peer");
                    self.subscription = None;
                    return Err(SyncError::RoomNotFound(self.room_id.clone().unwrap_or_default()));
                }
            }
        }
        match latest {
            Some(record) => self.apply(&record),
            None => Ok(false),
        }
    }

    /// Waits for the next room event and applies it.
    pub async fn sync_next(&mut self) -> Result<bool, SyncError> {
        let event = self
            .subscription
            .as_mut()
            .ok_or(SyncError::NotRemote)?
            .next()
            .await;
        match event {
            Some(RoomEvent::Updated(record)) => self.apply(&record),
            Some(RoomEvent::Deleted) => {
                self.subscription = None;
                Err(SyncError::RoomNotFound(self.room_id.clone().unwrap_or_default()))
            }
            None => Err(SyncError::Closed),
        }
    }

    /// Plays a card for the local color and publishes.
    #[instrument(skip(self))]
    pub async fn submit_move(
        &mut self,
        index: usize,
        card_id: &str,
    ) -> Result<MoveOutcome, SyncError> {
        self.require_room()?;
        let before = self.session.clone();
        let outcome = self.session.submit_move(index, card_id)?;
        self.commit(before).await?;
        Ok(outcome)
    }

    /// Passes when the local color is stuck, and publishes.
    #[instrument(skip(self))]
    pub async fn pass_turn(&mut self) -> Result<MoveOutcome, SyncError> {
        self.require_room()?;
        let before = self.session.clone();
        let outcome = self.session.pass_turn()?;
        self.commit(before).await?;
        Ok(outcome)
    }

    /// Signals rematch readiness and publishes.
    #[instrument(skip(self, rng))]
    pub async fn rematch<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<RematchOutcome, SyncError> {
        self.require_room()?;
        let before = self.session.clone();
        let outcome = self.session.rematch(rng)?;
        self.commit(before).await?;
        Ok(outcome)
    }

    /// Sends an emote and publishes.
    #[instrument(skip(self))]
    pub async fn send_emote(&mut self, text: &str) -> Result<(), SyncError> {
        self.require_room()?;
        let before = self.session.clone();
        self.session.send_emote(text)?;
        self.commit(before).await
    }

    /// Leaves the room.
    ///
    /// Drops the subscription and, for the host, deletes the room. Delete
    /// failures are logged and ignored since the other peer may have
    /// removed it first.
    #[instrument(skip(self), fields(room_id = ?self.room_id))]
    pub async fn cancel(&mut self) {
        self.subscription = None;
        let room_id = self.room_id.take();
        let seat = self.seat.take();
        if let (Some(room_id), Some(Seat::Host)) = (room_id, seat) {
            if let Err(e) = self.store.delete_room(&room_id).await {
                warn!(error = %e, "Could not delete room");
            }
        }
        info!("Left room");
    }

    fn require_room(&self) -> Result<(), SyncError> {
        self.room_id.as_ref().map(|_| ()).ok_or(SyncError::NotRemote)
    }

    async fn commit(&mut self, before: Session) -> Result<(), SyncError> {
        if let Err(e) = self.publish().await {
            warn!(error = %e, "Publish failed, rolling back");
            self.session = before;
            return Err(e);
        }
        Ok(())
    }
}
