#![cfg(feature = "std")]

use std::collections::BTreeMap;

use naval_battle::{
    random_board, AiPlayer, Cell, FleetLayout, GameEngine, GameState, GameStatus,
    InMemoryTransport, Message, PersistenceError, PlayerNode, Role, SessionError, Snapshot,
    SnapshotStore, Transport, TransportError,
};
use rand::{rngs::SmallRng, SeedableRng};

fn mid_game_state(seed: u64) -> GameState {
    let mut rng = SmallRng::seed_from_u64(seed);
    let own = random_board(&mut rng).unwrap();
    let theirs = random_board(&mut rng).unwrap();
    let mut engine = GameEngine::new(own);
    engine
        .begin(FleetLayout::from_board(&theirs).unwrap().into_registry(), true)
        .unwrap();
    let hit = theirs.ships()[0].cells()[0];
    engine.apply_local_attack(hit).unwrap();
    let incoming = engine.own_board().ships()[1].cells()[0];
    engine.apply_remote_attack(incoming).unwrap();
    engine.apply_local_attack((9, 9)).ok();
    engine.state().unwrap()
}

#[test]
fn test_save_then_load_restores_state() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = SnapshotStore::new(dir.path().join("game.json"));
    let state = mid_game_state(1);

    store.save(&state)?;
    let loaded = store.load()?.expect("snapshot present");
    assert_eq!(loaded, state);
    assert_eq!(
        GameEngine::from_state(loaded).is_local_turn(),
        state.local_turn
    );
    Ok(())
}

#[test]
fn test_snapshot_field_names() -> anyhow::Result<()> {
    let state = mid_game_state(2);
    let value = serde_json::to_value(Snapshot::from(&state))?;
    for key in [
        "player_board",
        "opponent_board",
        "player_ships",
        "opponent_ships",
        "is_player_turn",
    ] {
        assert!(value.get(key).is_some(), "missing {}", key);
    }
    assert_eq!(value["player_board"].as_array().map(|r| r.len()), Some(10));
    assert_eq!(value["is_player_turn"], serde_json::json!(state.local_turn));
    Ok(())
}

#[test]
fn test_load_missing_file_is_none() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = SnapshotStore::new(dir.path().join("absent.json"));
    assert!(store.load()?.is_none());
    store.delete()?;
    Ok(())
}

#[test]
fn test_load_rejects_garbage() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("bad.json");
    std::fs::write(&path, b"{ not json")?;
    let err = SnapshotStore::new(&path).load().unwrap_err();
    assert!(matches!(err, PersistenceError::Json(_)));
    Ok(())
}

#[test]
fn test_snapshot_without_labels_still_loads() {
    let state = mid_game_state(3);
    let mut snap = Snapshot::from(&state);
    snap.player_ship_labels.clear();
    let restored = GameState::try_from(snap).unwrap();
    assert_eq!(restored.own_board.grid(), state.own_board.grid());
    assert_eq!(restored.own_board.ships().len(), state.own_board.ships().len());
    assert_eq!(restored.own_board.ships()[0].label(), "ship #0");
}

#[test]
fn test_inconsistent_snapshots_are_rejected() {
    let state = mid_game_state(4);

    let mut wrong_size = Snapshot::from(&state);
    wrong_size.player_board.pop();
    assert!(matches!(
        GameState::try_from(wrong_size),
        Err(PersistenceError::Malformed(_))
    ));

    let mut bad_symbol = Snapshot::from(&state);
    bad_symbol.opponent_board[0][0] = '?';
    assert!(GameState::try_from(bad_symbol).is_err());

    let mut revealed = Snapshot::from(&state);
    revealed.opponent_board[5][5] = 'S';
    assert!(GameState::try_from(revealed).is_err());

    let mut lost_ship = Snapshot::from(&state);
    lost_ship.player_ships.pop();
    lost_ship.player_ship_labels.pop();
    assert!(GameState::try_from(lost_ship).is_err());

    let mut off_board = Snapshot::from(&state);
    off_board.opponent_ships = BTreeMap::from([("ghost".to_string(), vec![(12, 0)])]);
    assert!(GameState::try_from(off_board).is_err());

    // a registry cell already marked on the opponent view could never be shot
    let mut already_shot = Snapshot::from(&state);
    already_shot.opponent_board[9][9] = 'O';
    already_shot
        .opponent_ships
        .insert("ghost".to_string(), vec![(9, 9)]);
    assert!(matches!(
        GameState::try_from(already_shot),
        Err(PersistenceError::Malformed(_))
    ));

    let mut shared = Snapshot::from(&state);
    let (_, first_cells) = shared.opponent_ships.iter().next().unwrap();
    let taken = first_cells[0];
    shared.opponent_ships.insert("twin".to_string(), vec![taken]);
    assert!(matches!(
        GameState::try_from(shared),
        Err(PersistenceError::Malformed(_))
    ));
}

/// The peer vanishes right after its first shot lands. The local side is then
/// to move, so its own shot fails to send and must not be recorded.
#[tokio::test]
async fn test_failed_send_saves_state_before_the_shot() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("resume.json");
    let (local, mut peer) = InMemoryTransport::pair();

    let mut rng = SmallRng::seed_from_u64(21);
    let engine = GameEngine::new(random_board(&mut rng)?);
    let remote_layout = FleetLayout::from_board(&random_board(&mut rng)?)?;
    let mut node = PlayerNode::new(Box::new(AiPlayer::new()), engine, Box::new(local))
        .with_store(SnapshotStore::new(&path));

    let peer_side = async move {
        peer.send(Message::FleetLayout(remote_layout)).await?;
        peer.recv().await?;
        peer.send(Message::Shot((0, 0))).await?;
        // dropping `peer` here closes the link
        Ok::<_, TransportError>(())
    };
    let (result, peer_result) = tokio::join!(node.run(&mut rng, Role::Initiator), peer_side);
    peer_result?;
    assert!(matches!(
        result,
        Err(SessionError::Transport(TransportError::Closed))
    ));

    let saved = SnapshotStore::new(&path).load()?.expect("snapshot written");
    assert!(saved.local_turn);
    assert!(saved.own_board.grid().is_attacked((0, 0))?);
    assert_eq!(saved.remote_view.count(Cell::Hit) + saved.remote_view.count(Cell::Miss), 0);

    let resumed = GameEngine::from_state(saved);
    assert!(resumed.is_local_turn());
    assert_eq!(resumed.turns_played(), 1);
    assert_eq!(resumed.status(), GameStatus::InProgress);
    Ok(())
}

/// Only one side resumes. Its shot reaches a peer that expects a fleet layout,
/// so the peer drops out; the resumed side must not record that shot in its save.
#[tokio::test]
async fn test_one_sided_resume_keeps_the_save() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("resume.json");

    let mut rng = SmallRng::seed_from_u64(44);
    let own = random_board(&mut rng)?;
    let theirs = random_board(&mut rng)?;
    let mut engine = GameEngine::new(own);
    engine.begin(FleetLayout::from_board(&theirs)?.into_registry(), true)?;
    engine.apply_local_attack((0, 0))?;
    engine.apply_remote_attack((5, 5))?;
    assert!(engine.is_local_turn());

    let store = SnapshotStore::new(&path);
    store.save(&engine.state().unwrap())?;
    let saved_bytes = std::fs::read(&path)?;
    let resumed = GameEngine::from_state(store.load()?.unwrap());

    let (ta, tb) = InMemoryTransport::pair();
    let mut node_a = PlayerNode::new(Box::new(AiPlayer::new()), resumed, Box::new(ta))
        .with_store(SnapshotStore::new(&path));
    let mut node_b = PlayerNode::new(
        Box::new(AiPlayer::new()),
        GameEngine::new(random_board(&mut rng)?),
        Box::new(tb),
    );
    let mut rng_a = SmallRng::seed_from_u64(1);
    let mut rng_b = SmallRng::seed_from_u64(2);

    let (ra, rb) = tokio::join!(
        node_a.run(&mut rng_a, Role::Listener),
        node_b.run(&mut rng_b, Role::Initiator)
    );
    assert!(matches!(rb, Err(SessionError::ProtocolViolation(_))));
    assert!(matches!(
        ra,
        Err(SessionError::Transport(TransportError::Closed))
    ));

    assert_eq!(std::fs::read(&path)?, saved_bytes);
    let reloaded = SnapshotStore::new(&path).load()?.unwrap();
    assert!(reloaded.local_turn);
    assert_eq!(reloaded.remote_view.count(Cell::Hit) + reloaded.remote_view.count(Cell::Miss), 1);
    Ok(())
}

#[tokio::test]
async fn test_resumed_games_finish_and_clear_the_save() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path_a = dir.path().join("a.json");
    let path_b = dir.path().join("b.json");

    let mut rng = SmallRng::seed_from_u64(33);
    let board_a = random_board(&mut rng)?;
    let board_b = random_board(&mut rng)?;
    let layout_a = FleetLayout::from_board(&board_a)?;
    let layout_b = FleetLayout::from_board(&board_b)?;
    let mut a = GameEngine::new(board_a);
    let mut b = GameEngine::new(board_b);
    a.begin(layout_b.into_registry(), true)?;
    b.begin(layout_a.into_registry(), false)?;
    a.apply_local_attack((2, 2))?;
    b.apply_remote_attack((2, 2))?;

    SnapshotStore::new(&path_a).save(&a.state().unwrap())?;
    SnapshotStore::new(&path_b).save(&b.state().unwrap())?;
    let a = GameEngine::from_state(SnapshotStore::new(&path_a).load()?.unwrap());
    let b = GameEngine::from_state(SnapshotStore::new(&path_b).load()?.unwrap());
    assert!(!a.is_local_turn() && b.is_local_turn());

    let (ta, tb) = InMemoryTransport::pair();
    let mut node_a = PlayerNode::new(Box::new(AiPlayer::new()), a, Box::new(ta))
        .with_store(SnapshotStore::new(&path_a));
    let mut node_b = PlayerNode::new(Box::new(AiPlayer::new()), b, Box::new(tb))
        .with_store(SnapshotStore::new(&path_b));
    let mut rng_a = SmallRng::seed_from_u64(1);
    let mut rng_b = SmallRng::seed_from_u64(2);
    // roles only matter for the fleet exchange, which resumed games skip
    let (sa, sb) = tokio::try_join!(
        node_a.run(&mut rng_a, Role::Listener),
        node_b.run(&mut rng_b, Role::Initiator)
    )?;
    assert_ne!(sa, sb);
    assert!(!path_a.exists() && !path_b.exists());
    Ok(())
}
