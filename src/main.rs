#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use std::net::{IpAddr, SocketAddr, UdpSocket};
#[cfg(feature = "std")]
use std::path::PathBuf;

#[cfg(feature = "std")]
use anyhow::Context;
#[cfg(feature = "std")]
use clap::{Args, Parser, ValueEnum};
#[cfg(feature = "std")]
use log::LevelFilter;
#[cfg(feature = "std")]
use naval_battle::{
    init_logging, random_board, AiPlayer, CliPlayer, GameEngine, GameStatus, InMemoryTransport,
    Player, PlayerNode, Role, SessionError, SnapshotStore, TcpTransport, DEFAULT_PORT,
    DEFAULT_SAVE_PATH,
};
#[cfg(feature = "std")]
use rand::rngs::SmallRng;
#[cfg(feature = "std")]
use rand::SeedableRng;
#[cfg(feature = "std")]
use tokio::net::TcpListener;
#[cfg(feature = "std")]
use tokio::sync::watch;
#[cfg(feature = "std")]
use tokio::time::Duration;

#[derive(Parser)]
#[command(author, version, about = "Peer-to-peer naval battle", long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
#[cfg(feature = "std")]
enum PlayerType {
    Human,
    Ai,
}

#[derive(Args, Debug)]
#[cfg(feature = "std")]
struct GameArgs {
    #[arg(long, value_enum, default_value_t = PlayerType::Human)]
    player: PlayerType,
    #[arg(long, help = "Fix RNG seed for reproducible fleets (e.g., --seed 12345)")]
    seed: Option<u64>,
    #[arg(long, help = "Resume the game saved in this file instead of starting fresh")]
    resume: Option<PathBuf>,
    #[arg(long, default_value = DEFAULT_SAVE_PATH, help = "Where to save an interrupted game")]
    save: PathBuf,
    #[arg(long, default_value_t = 600, help = "Seconds to wait for the peer before giving up")]
    timeout_secs: u64,
}

#[derive(Parser)]
#[cfg(feature = "std")]
enum Commands {
    /// Wait for the peer to connect. The listening side shoots first.
    Listen {
        #[arg(long, help = "Address to bind (defaults to the first non-loopback interface)")]
        bind: Option<String>,
        #[command(flatten)]
        game: GameArgs,
    },
    /// Connect to a listening peer.
    Connect {
        #[arg(long)]
        peer: String,
        #[command(flatten)]
        game: GameArgs,
    },
    /// Watch two AI players fight in-process.
    Local {
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
}

#[cfg(feature = "std")]
fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => {
            println!("Using fixed seed: {} (fleet will be reproducible)", s);
            SmallRng::seed_from_u64(s)
        }
        None => {
            let mut seed_rng = rand::rng();
            SmallRng::from_rng(&mut seed_rng)
        }
    }
}

/// First non-loopback IPv4 address, found by asking the OS which interface
/// would route outward. No packet is sent.
#[cfg(feature = "std")]
fn first_interface_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("192.0.2.1:9").ok()?;
    let ip = socket.local_addr().ok()?.ip();
    (!ip.is_loopback() && !ip.is_unspecified()).then_some(ip)
}

/// Append `DEFAULT_PORT` unless `addr` already names one. Bare IPv6 addresses
/// (with or without brackets) get bracketed.
#[cfg(feature = "std")]
fn with_default_port(addr: &str) -> String {
    if addr.parse::<SocketAddr>().is_ok() {
        return addr.to_string();
    }
    let bare = addr.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = bare.parse::<IpAddr>() {
        return SocketAddr::new(ip, DEFAULT_PORT).to_string();
    }
    if addr.contains(':') {
        addr.to_string()
    } else {
        format!("{}:{}", addr, DEFAULT_PORT)
    }
}

/// Independent RNGs for the two in-process players, both derived from one seed.
#[cfg(feature = "std")]
fn local_rngs(seed: Option<u64>) -> (SmallRng, SmallRng) {
    let mut first = make_rng(seed);
    let second = SmallRng::from_rng(&mut first);
    (first, second)
}

/// Load the engine from `--resume` or place a fresh fleet. Returns the store
/// the session should save to.
#[cfg(feature = "std")]
fn prepare_engine(game: &GameArgs, rng: &mut SmallRng) -> anyhow::Result<(GameEngine, SnapshotStore)> {
    if let Some(path) = &game.resume {
        let store = SnapshotStore::new(path);
        match store.load() {
            Ok(Some(state)) => {
                println!("Resuming game saved in {}", path.display());
                return Ok((GameEngine::from_state(state), store));
            }
            Ok(None) => println!("No saved game at {}; starting fresh.", path.display()),
            Err(e) => {
                log::warn!("could not load {}: {}", path.display(), e);
                println!("Saved game is unreadable ({}); starting fresh.", e);
            }
        }
    }
    let board = random_board(rng).map_err(SessionError::Placement)?;
    Ok((GameEngine::new(board), SnapshotStore::new(&game.save)))
}

#[cfg(feature = "std")]
fn make_player(kind: PlayerType, interrupt: watch::Receiver<bool>) -> Box<dyn Player> {
    match kind {
        PlayerType::Human => Box::new(CliPlayer::new().with_interrupt(interrupt)),
        PlayerType::Ai => {
            println!("AI player selected.");
            Box::new(AiPlayer::new())
        }
    }
}

#[cfg(feature = "std")]
async fn play_networked(
    game: GameArgs,
    role: Role,
    stream: tokio::net::TcpStream,
    engine: GameEngine,
    store: SnapshotStore,
    mut rng: SmallRng,
) -> anyhow::Result<()> {
    let (interrupt_tx, interrupt_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = interrupt_tx.send(true);
        }
    });

    let transport = TcpTransport::with_timeout(stream, Duration::from_secs(game.timeout_secs));
    let player = make_player(game.player, interrupt_rx.clone());
    let save_path = store.path().to_path_buf();
    let mut node = PlayerNode::new(player, engine, Box::new(transport)).with_store(store);

    let mut interrupt = interrupt_rx;
    let interrupted = async move {
        let _ = interrupt.wait_for(|v| *v).await;
    };
    match node.run_until(&mut rng, role, interrupted).await {
        Ok(GameStatus::Won) => println!("\nVICTORY! You sank the whole enemy fleet."),
        Ok(GameStatus::Lost) => println!("\nDEFEAT. All your ships have been destroyed."),
        Ok(GameStatus::InProgress) => {}
        Err(e) => {
            println!("Game interrupted: {}", e);
            if node.engine().state().is_some() && save_path.exists() {
                println!(
                    "Game saved to {}. Resume with --resume {}",
                    save_path.display(),
                    save_path.display()
                );
            }
        }
    }
    Ok(())
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(LevelFilter::Warn);
    let cli = Cli::parse();

    match cli.command {
        Commands::Local { seed } => {
            println!("Starting local AI vs AI game...");
            let (mut rng1, mut rng2) = local_rngs(seed);
            let engine1 = GameEngine::new(random_board(&mut rng1).map_err(SessionError::Placement)?);
            let engine2 = GameEngine::new(random_board(&mut rng2).map_err(SessionError::Placement)?);
            let (t1, t2) = InMemoryTransport::pair();

            let first = async move {
                let mut node = PlayerNode::new(Box::new(AiPlayer::new()), engine1, Box::new(t1));
                let status = node.run(&mut rng1, Role::Listener).await?;
                Ok::<_, SessionError>((status, node.engine().turns_played()))
            };
            let second = async move {
                let mut node = PlayerNode::new(Box::new(AiPlayer::new()), engine2, Box::new(t2));
                node.run(&mut rng2, Role::Initiator).await
            };
            let ((status, turns), _) = tokio::try_join!(first, second)?;
            println!("Player 1 {:?} after {} shots.", status, turns);
        }
        Commands::Listen { bind, game } => {
            let mut rng = make_rng(game.seed);
            let (engine, store) = prepare_engine(&game, &mut rng)?;
            let bind = match bind {
                Some(addr) => with_default_port(&addr),
                None => {
                    let ip = first_interface_ip().map_or_else(|| "0.0.0.0".to_string(), |ip| ip.to_string());
                    format!("{}:{}", ip, DEFAULT_PORT)
                }
            };
            let listener = TcpListener::bind(&bind)
                .await
                .with_context(|| format!("could not bind {}", bind))?;
            println!("Waiting for a connection on {}...", listener.local_addr()?);
            let (stream, addr) = listener.accept().await?;
            println!("Connection established with {}", addr);
            play_networked(game, Role::Listener, stream, engine, store, rng).await?;
        }
        Commands::Connect { peer, game } => {
            let mut rng = make_rng(game.seed);
            let (engine, store) = prepare_engine(&game, &mut rng)?;
            let addr = with_default_port(&peer);
            let stream = tokio::net::TcpStream::connect(&addr)
                .await
                .with_context(|| format!("could not connect to {}", addr))?;
            println!("Connected to {}", addr);
            play_networked(game, Role::Initiator, stream, engine, store, rng).await?;
        }
    }
    Ok(())
}
