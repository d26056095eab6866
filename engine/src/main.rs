use bubblepop_engine::autoplayer::AutoPlayer;
use bubblepop_engine::cli::CliArgs;
use bubblepop_engine::game_loop::{spawn_game, GameCommand, GameHandle};
use bubblepop_engine::leaderboard::Leaderboard;
use bubblepop_engine::protocol::{CoreMsg, FrameMsg};
use bubblepop_engine::stdio::run_stdio;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;
use tokio::sync::broadcast;

/// Autoplayer decision step (seconds of wall time)
const AUTOPLAY_STEP: f64 = 0.05;

#[tokio::main]
async fn main() {
    // stdout carries the JSON-lines stream, logs go to stderr
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args: Vec<String> = std::env::args().collect();
    let cli = CliArgs::parse(&args);

    // Validate configuration before starting
    if let Err(e) = cli.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    let mut game = spawn_game(cli.engine.clone());

    if cli.autoplay {
        tracing::info!(
            "Autoplaying as {} ({:?})",
            cli.game.player_name,
            cli.personality
        );
        run_autoplay(&mut game, &cli).await;
    } else {
        tracing::info!("Reading host messages from stdin");
        let frame_rx = game.subscribe();
        run_stdio(
            tokio::io::stdin(),
            tokio::io::stdout(),
            game.cmd_tx.clone(),
            frame_rx,
            &mut game.ended_rx,
        )
        .await;
    }

    let GameHandle { cmd_tx, join, .. } = game;
    drop(cmd_tx);
    let _ = join.await;
}

/// Play the requested rounds with a simulated player, echo every message to
/// stdout and print the leaderboard at the end.
async fn run_autoplay(game: &mut GameHandle, cli: &CliArgs) {
    let mut rng = ChaCha8Rng::seed_from_u64(cli.engine.rng_seed.wrapping_add(1));
    let mut player = AutoPlayer::new(cli.personality, &mut rng);
    let mut frame_rx = game.subscribe();
    let cmd_tx = game.cmd_tx.clone();
    let ended_rx = &mut game.ended_rx;
    let mut board = Leaderboard::new();

    let start = GameCommand::Start {
        config: cli.game.clone(),
        field: cli.field,
    };
    if cmd_tx.send(start).await.is_err() {
        tracing::error!("Game loop is not running");
        return;
    }

    let mut played = 0;
    let mut latest: Option<FrameMsg> = None;
    let mut step = tokio::time::interval(Duration::from_secs_f64(AUTOPLAY_STEP));
    step.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        // Queued frames go out before the round result that follows them
        tokio::select! {
            biased;

            _ = step.tick() => {
                let Some(frame) = &latest else {
                    continue;
                };
                if let Some(point) = player.tick(AUTOPLAY_STEP, frame, &mut rng) {
                    if cmd_tx.send(GameCommand::PopAt { point }).await.is_err() {
                        break;
                    }
                }
            }

            result = frame_rx.recv() => {
                match result {
                    Ok(frame) => {
                        latest = Some(frame.clone());
                        print_msg(&CoreMsg::Frame(frame));
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("Autoplayer lagged by {} frames", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            ended = ended_rx.recv() => {
                let Some(msg) = ended else {
                    break;
                };
                print_msg(&CoreMsg::SessionEnded(msg.clone()));
                if let Some(rank) = board.record(msg) {
                    tracing::info!("Leaderboard rank {}", rank);
                }
                played += 1;
                if played >= cli.rounds || cmd_tx.send(GameCommand::Reset).await.is_err() {
                    break;
                }
            }
        }
    }

    tracing::info!("{} taps", player.taps());
    if board.is_empty() {
        eprintln!("No rounds finished");
        return;
    }
    for (i, entry) in board.entries.iter().enumerate() {
        eprintln!("{:2}. {:<16} {}", i + 1, entry.player_name, entry.score);
    }
}

fn print_msg(msg: &CoreMsg) {
    match serde_json::to_string(msg) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::warn!("Failed to encode output: {}", e),
    }
}
