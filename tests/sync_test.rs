//! Two peers sharing a game through the in-memory room store.

use cardtoe::{
    Color, MemoryRoomStore, Mode, MoveOutcome, Phase, RematchOutcome, RemotePeer, RoomRecord,
    RoomStatus, RoomStore, Seat, Session, Snapshot, SyncError, choose_move, has_any_legal_move,
    rematch_starter, session_from_payload,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;

type Peer = RemotePeer<MemoryRoomStore>;

async fn connected(seed: u64) -> (Arc<MemoryRoomStore>, Peer, Peer, String) {
    let store = Arc::new(MemoryRoomStore::new());
    let mut host = RemotePeer::new(store.clone(), "Ada".to_string());
    let mut guest = RemotePeer::new(store.clone(), "Grace".to_string());
    let room_id = host.host(&mut StdRng::seed_from_u64(seed), 10).await.unwrap();
    guest.join(&room_id).await.unwrap();
    assert_eq!(host.wait_for_guest().await.unwrap(), "Grace");
    (store, host, guest, room_id)
}

fn on_move<'a>(host: &'a mut Peer, guest: &'a mut Peer) -> &'a mut Peer {
    match host.session().current_turn() {
        Color::Green => host,
        Color::Red => guest,
    }
}

/// One heuristic move, or a pass when stuck.
async fn step(peer: &mut Peer) -> MoveOutcome {
    let session = peer.session().clone();
    let turn = session.current_turn();
    let decks = session.decks();
    if !has_any_legal_move(session.board(), decks.get(turn)) {
        return peer.pass_turn().await.unwrap();
    }
    let choice = choose_move(
        session.board(),
        decks.get(turn).cards(),
        decks.get(turn.opponent()).cards(),
    )
    .unwrap();
    peer.submit_move(choice.index, &choice.card_id).await.unwrap()
}

fn in_sync(a: &Peer, b: &Peer) -> bool {
    Snapshot::capture(a.session()) == Snapshot::capture(b.session())
}

#[tokio::test]
async fn test_host_and_guest_share_initial_state() {
    let (store, host, guest, room_id) = connected(1).await;
    assert_eq!(host.seat(), Some(Seat::Host));
    assert_eq!(guest.seat(), Some(Seat::Guest));
    assert_eq!(host.session().remote_name(), Some("Grace"));
    assert_eq!(guest.session().remote_name(), Some("Ada"));
    assert_eq!(guest.session().mode(), Mode::Remote { local_color: Color::Red });
    assert!(in_sync(&host, &guest));

    let record = store.get_room(&room_id).await.unwrap().unwrap();
    assert_eq!(record.status, RoomStatus::Active);
    assert_eq!(record.guest_name.as_deref(), Some("Grace"));
}

#[tokio::test]
async fn test_move_reaches_other_peer_and_echo_is_ignored() {
    let (_store, mut host, mut guest, _) = connected(2).await;
    host.drain().unwrap();
    guest.drain().unwrap();

    let mover_is_host = host.session().current_turn() == Color::Green;
    step(on_move(&mut host, &mut guest)).await;

    let (mover, watcher) = if mover_is_host {
        (&mut host, &mut guest)
    } else {
        (&mut guest, &mut host)
    };
    assert!(!mover.drain().unwrap(), "own echo must not change state");
    assert!(watcher.drain().unwrap());
    assert!(!watcher.drain().unwrap());
    assert!(in_sync(&host, &guest));
}

#[tokio::test]
async fn test_apply_is_idempotent() {
    let (store, mut host, mut guest, room_id) = connected(3).await;
    let mover_is_host = host.session().current_turn() == Color::Green;
    step(on_move(&mut host, &mut guest)).await;
    let record = store.get_room(&room_id).await.unwrap().unwrap();

    let watcher = if mover_is_host { &mut guest } else { &mut host };
    assert!(watcher.apply(&record).unwrap());
    let after_first = watcher.session().clone();
    assert!(!watcher.apply(&record).unwrap());
    assert_eq!(watcher.session(), &after_first);
    assert!(!watcher.drain().unwrap());
    assert_eq!(watcher.session(), &after_first);
}

#[tokio::test]
async fn test_wrong_peer_cannot_move() {
    let (_store, mut host, mut guest, _) = connected(4).await;
    let waiting = match host.session().current_turn() {
        Color::Green => &mut guest,
        Color::Red => &mut host,
    };
    let color = waiting.seat().unwrap().color();
    let card = format!("{}-1-1", color);
    let before = waiting.session().clone();
    assert!(matches!(waiting.submit_move(0, &card).await, Err(SyncError::Move(_))));
    assert_eq!(waiting.session(), &before);
}

#[tokio::test]
async fn test_failed_publish_rolls_back() {
    let (store, mut host, mut guest, _) = connected(5).await;
    let mover = on_move(&mut host, &mut guest);
    let before = mover.session().clone();

    store.set_offline(true);
    let color = mover.session().current_turn();
    let result = mover.submit_move(0, &format!("{}-3-1", color)).await;
    assert!(matches!(result, Err(SyncError::Store(_))));
    assert_eq!(mover.session(), &before);

    store.set_offline(false);
    assert!(mover.submit_move(0, &format!("{}-3-1", color)).await.is_ok());
}

#[tokio::test]
async fn test_join_refusals() {
    let (store, _host, _guest, room_id) = connected(6).await;

    let mut late = RemotePeer::new(store.clone(), "Late".to_string());
    assert!(matches!(late.join(&room_id).await, Err(SyncError::RoomFull(_))));
    assert!(matches!(late.join("123").await, Err(SyncError::RoomNotFound(_))));

    let mut finished = RoomRecord::waiting("Old", Snapshot::capture(&Session::new(Mode::Local)));
    finished.status = RoomStatus::Finished;
    store.create_room("654321", finished).await.unwrap();
    assert!(matches!(late.join("654321").await, Err(SyncError::RoomNotJoinable(_))));
    assert_eq!(late.room_id(), None);
}

#[tokio::test]
async fn test_host_cancel_deletes_room() {
    let (store, mut host, mut guest, room_id) = connected(7).await;
    guest.drain().unwrap();

    guest.cancel().await;
    assert_eq!(store.room_count().unwrap(), 1);

    host.cancel().await;
    assert_eq!(store.room_count().unwrap(), 0);
    assert!(store.get_room(&room_id).await.unwrap().is_none());
    assert_eq!(host.room_id(), None);
    assert!(matches!(host.publish().await, Err(SyncError::NotRemote)));
}

#[tokio::test]
async fn test_host_cancels_while_waiting_for_guest() {
    let store = Arc::new(MemoryRoomStore::new());
    let mut host = RemotePeer::new(store.clone(), "Ada".to_string());
    let room_id = host.host(&mut StdRng::seed_from_u64(11), 10).await.unwrap();
    let waiting = store.get_room(&room_id).await.unwrap().unwrap();
    assert_eq!(waiting.status, RoomStatus::Waiting);

    let wait = tokio::time::timeout(Duration::from_millis(20), host.wait_for_guest()).await;
    assert!(wait.is_err(), "nobody joined, so waiting should time out");

    host.cancel().await;
    assert!(store.get_room(&room_id).await.unwrap().is_none());
    assert_eq!(host.room_id(), None);

    let mut guest = RemotePeer::new(store, "Grace".to_string());
    assert!(matches!(guest.join(&room_id).await, Err(SyncError::RoomNotFound(_))));
}

#[tokio::test]
async fn test_cancel_tolerates_room_already_gone() {
    let (store, mut host, mut guest, room_id) = connected(8).await;
    store.delete_room(&room_id).await.unwrap();
    host.cancel().await;
    assert!(matches!(guest.drain(), Err(SyncError::RoomNotFound(_))));
}

#[tokio::test]
async fn test_full_game_and_rematch_stay_in_sync() {
    let (_store, mut host, mut guest, _) = connected(9).await;

    for _ in 0..64 {
        host.drain().unwrap();
        guest.drain().unwrap();
        if host.session().phase() == Phase::Ended {
            break;
        }
        step(on_move(&mut host, &mut guest)).await;
    }
    assert_eq!(host.session().phase(), Phase::Ended);
    assert_eq!(guest.session().phase(), Phase::Ended);
    assert!(in_sync(&host, &guest));
    assert_eq!(host.session().scores().total(), 1);

    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(host.rematch(&mut rng).await.unwrap(), RematchOutcome::Waiting);
    guest.drain().unwrap();
    let expected = rematch_starter(1);
    assert_eq!(
        guest.rematch(&mut rng).await.unwrap(),
        RematchOutcome::Started(expected)
    );
    host.drain().unwrap();

    assert_eq!(host.session().phase(), Phase::Active);
    assert_eq!(host.session().current_turn(), expected);
    assert_eq!(host.session().scores().total(), 1);
    assert!(in_sync(&host, &guest));
}

#[tokio::test]
async fn test_emote_reaches_peer() {
    let (_store, mut host, mut guest, _) = connected(10).await;
    guest.send_emote("good luck").await.unwrap();
    host.drain().unwrap();
    assert_eq!(host.session().emotes().get(Color::Red), Some("good luck"));
}

#[test]
fn test_legacy_payload_round_trip() {
    let mut session = Session::new(Mode::Local);
    session.start(Color::Red);
    session.submit_move(6, "red-2-1").unwrap();
    session.submit_move(6, "green-3-2").unwrap();

    let snapshot = Snapshot::capture(&session);
    let payload = snapshot.to_legacy_payload().unwrap();
    let (restored, error) = session_from_payload(&payload, Mode::Local);
    assert!(error.is_none());
    assert_eq!(Snapshot::capture(&restored), snapshot);
    assert!(restored.board().is_locked(6));
    assert_eq!(restored.current_turn(), Color::Red);
}

#[test]
fn test_snapshot_uses_shared_field_names() {
    let mut session = Session::new(Mode::Local);
    session.start(Color::Green);
    session.submit_move(0, "green-4-1").unwrap();
    let json = serde_json::to_value(Snapshot::capture(&session)).unwrap();
    assert_eq!(json["currentPlayer"], "red");
    assert_eq!(json["gameActive"], true);
    assert_eq!(json["board"][0], 4);
    assert_eq!(json["board"][1], "");
    assert_eq!(json["storedCellColors"][0], "green");
    assert_eq!(json["playerDecks"]["green"][6]["used"], true);
}

#[test]
fn test_malformed_payload_starts_fresh() {
    for payload in ["%%%", "bm90IGpzb24=", ""] {
        let (session, error) = session_from_payload(payload, Mode::Local);
        assert!(error.is_some(), "payload {:?} should be rejected", payload);
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.board().occupied_count(), 0);
    }
}
