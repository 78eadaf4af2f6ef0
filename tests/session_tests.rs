#![cfg(feature = "std")]

use std::collections::VecDeque;

use naval_battle::{
    random_board, AiPlayer, Coord, FleetLayout, GameEngine, GameStatus, Grid, InMemoryTransport,
    Message, Phase, Player, PlayerNode, Role, SessionError, SnapshotStore, Transport,
    TransportError,
};
use rand::{rngs::SmallRng, SeedableRng};

/// Fires the listed shots, then quits.
struct Scripted(VecDeque<Coord>);

impl Player for Scripted {
    fn select_target(&mut self, _rng: &mut SmallRng, _view: &Grid, _remaining: &[usize]) -> Option<Coord> {
        self.0.pop_front()
    }
}

fn quitter() -> Box<dyn Player> {
    Box::new(Scripted(VecDeque::new()))
}

fn fresh_engine(seed: u64) -> GameEngine {
    let mut rng = SmallRng::seed_from_u64(seed);
    GameEngine::new(random_board(&mut rng).unwrap())
}

fn peer_layout(seed: u64) -> FleetLayout {
    let mut rng = SmallRng::seed_from_u64(seed);
    FleetLayout::from_board(&random_board(&mut rng).unwrap()).unwrap()
}

#[tokio::test]
async fn test_ai_vs_ai_in_memory_game() -> anyhow::Result<()> {
    let (t1, t2) = InMemoryTransport::pair();
    let mut node1 = PlayerNode::new(Box::new(AiPlayer::new()), fresh_engine(1), Box::new(t1));
    let mut node2 = PlayerNode::new(Box::new(AiPlayer::new()), fresh_engine(2), Box::new(t2));
    let mut rng1 = SmallRng::seed_from_u64(10);
    let mut rng2 = SmallRng::seed_from_u64(20);

    let (s1, s2) = tokio::try_join!(
        node1.run(&mut rng1, Role::Listener),
        node2.run(&mut rng2, Role::Initiator)
    )?;

    assert!(
        (s1 == GameStatus::Won && s2 == GameStatus::Lost)
            || (s1 == GameStatus::Lost && s2 == GameStatus::Won)
    );
    assert_eq!(node1.engine().turns_played(), node2.engine().turns_played());
    // the listener fires first, so it has fired as many or one more shot
    let shots1 = 100 - node1.engine().remote_view().unattacked().count();
    let shots2 = 100 - node2.engine().remote_view().unattacked().count();
    assert!(shots1 == shots2 || shots1 == shots2 + 1);
    Ok(())
}

#[tokio::test]
async fn test_listener_sends_layout_first_and_moves_first() -> anyhow::Result<()> {
    let (local, mut peer) = InMemoryTransport::pair();
    let engine = fresh_engine(3);
    let own_layout = FleetLayout::from_board(engine.own_board())?;
    let remote_layout = peer_layout(4);

    let mut node = PlayerNode::new(quitter(), engine, Box::new(local));
    let mut rng = SmallRng::seed_from_u64(0);

    let peer_side = async {
        // nothing sent yet, so this only succeeds if the listener went first
        let first = peer.recv().await?;
        peer.send(Message::FleetLayout(remote_layout.clone())).await?;
        Ok::<_, TransportError>(first)
    };
    let (result, first) = tokio::join!(node.run(&mut rng, Role::Listener), peer_side);

    assert_eq!(first?, Message::FleetLayout(own_layout));
    // the quitting player was asked for a target, so the listener had the turn
    assert!(matches!(
        result,
        Err(SessionError::Transport(TransportError::Interrupted))
    ));
    assert_eq!(node.engine().phase(), Phase::ActivePlay { local_turn: true });
    assert_eq!(node.engine().remote_ships(), &remote_layout.into_registry());
    Ok(())
}

#[tokio::test]
async fn test_initiator_waits_for_first_shot() -> anyhow::Result<()> {
    let (local, mut peer) = InMemoryTransport::pair();
    let remote_layout = peer_layout(5);

    let mut node = PlayerNode::new(quitter(), fresh_engine(6), Box::new(local));
    let mut rng = SmallRng::seed_from_u64(0);

    let peer_side = async {
        peer.send(Message::FleetLayout(remote_layout.clone())).await?;
        let theirs = peer.recv().await?;
        peer.send(Message::Shot((4, 4))).await?;
        Ok::<_, TransportError>(theirs)
    };
    let (result, theirs) = tokio::join!(node.run(&mut rng, Role::Initiator), peer_side);

    assert!(matches!(theirs?, Message::FleetLayout(_)));
    assert!(result.is_err());
    let engine = node.engine();
    assert!(engine.own_board().grid().is_attacked((4, 4))?);
    assert_eq!(engine.remote_view().unattacked().count(), 100);
    assert_eq!(engine.remote_ships(), &remote_layout.into_registry());
    Ok(())
}

#[tokio::test]
async fn test_malformed_layout_is_a_protocol_violation() -> anyhow::Result<()> {
    let (local, mut peer) = InMemoryTransport::pair();
    let mut node = PlayerNode::new(quitter(), fresh_engine(7), Box::new(local));
    let mut rng = SmallRng::seed_from_u64(0);

    let mut bad = peer_layout(8);
    bad.0.truncate(3);
    peer.send(Message::FleetLayout(bad)).await?;

    let result = node.run(&mut rng, Role::Initiator).await;
    assert!(matches!(result, Err(SessionError::ProtocolViolation(_))));
    assert_eq!(node.engine().phase(), Phase::AwaitingFleetExchange);
    Ok(())
}

#[tokio::test]
async fn test_garbage_shot_is_a_protocol_violation() -> anyhow::Result<()> {
    let (local, mut peer) = InMemoryTransport::pair();
    let mut node = PlayerNode::new(quitter(), fresh_engine(9), Box::new(local));
    let mut rng = SmallRng::seed_from_u64(0);

    peer.send(Message::FleetLayout(peer_layout(10))).await?;
    peer.send_raw(b"x9".to_vec())?;

    let (result, _) = tokio::join!(node.run(&mut rng, Role::Initiator), peer.recv());
    assert!(matches!(result, Err(SessionError::ProtocolViolation(_))));
    Ok(())
}

#[tokio::test]
async fn test_peer_disconnect_is_reported() -> anyhow::Result<()> {
    let (local, peer) = InMemoryTransport::pair();
    drop(peer);
    let mut node = PlayerNode::new(quitter(), fresh_engine(11), Box::new(local));
    let mut rng = SmallRng::seed_from_u64(0);
    let result = node.run(&mut rng, Role::Listener).await;
    assert!(matches!(
        result,
        Err(SessionError::Transport(TransportError::Closed))
    ));
    Ok(())
}

#[tokio::test]
async fn test_interrupt_before_exchange_saves_nothing() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("save.json");
    let (local, _peer) = InMemoryTransport::pair();
    let mut node = PlayerNode::new(quitter(), fresh_engine(12), Box::new(local))
        .with_store(SnapshotStore::new(&path));
    let mut rng = SmallRng::seed_from_u64(0);

    let result = node
        .run_until(&mut rng, Role::Initiator, std::future::ready(()))
        .await;
    assert!(matches!(
        result,
        Err(SessionError::Transport(TransportError::Interrupted))
    ));
    assert!(!path.exists());
    Ok(())
}
