//! Soak test for the engine.
//!
//! Spawns many independent sessions, each with its own game loop and an
//! autoplayer that:
//! - Starts a round and taps whatever it likes
//! - Counts frames and pops as they are broadcast
//! - Resets after every game over until the time is up
//!
//! Usage: cargo run --bin soak -- [OPTIONS]
//!
//! Options:
//!   --sessions N     Number of concurrent sessions (default: 50)
//!   --duration S     Test duration in seconds (default: 30)
//!   --tick-ms MS     Tick period per session (default: 50)
//!   plus the shared flags (--time, --bubbles, --width, --height, --seed)

use bubblepop_engine::autoplayer::{AutoPlayer, Personality};
use bubblepop_engine::cli::CliArgs;
use bubblepop_engine::config::EngineConfig;
use bubblepop_engine::game_loop::{spawn_game, GameCommand, GameHandle};
use bubblepop_engine::leaderboard::Leaderboard;
use bubblepop_engine::protocol::FrameMsg;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

/// Autoplayer decision step (seconds of wall time)
const STEP_SECS: f64 = 0.02;

// === Metrics ===

struct Metrics {
    active: AtomicU64,
    frames_received: AtomicU64,
    pops_sent: AtomicU64,
    pops_scored: AtomicU64,
    sessions_ended: AtomicU64,
    total_bubbles_seen: AtomicU64,
    lagged: AtomicU64,
    errors: AtomicU64,
}

impl Metrics {
    fn new() -> Self {
        Self {
            active: AtomicU64::new(0),
            frames_received: AtomicU64::new(0),
            pops_sent: AtomicU64::new(0),
            pops_scored: AtomicU64::new(0),
            sessions_ended: AtomicU64::new(0),
            total_bubbles_seen: AtomicU64::new(0),
            lagged: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }
}

// === Session task ===

async fn run_session(
    session_id: u32,
    cli: CliArgs,
    duration: Duration,
    metrics: Arc<Metrics>,
    board: Arc<Mutex<Leaderboard>>,
) {
    let engine = EngineConfig {
        rng_seed: cli.engine.rng_seed.wrapping_add(u64::from(session_id)),
        ..cli.engine.clone()
    };
    let mut rng = ChaCha8Rng::seed_from_u64(engine.rng_seed ^ 0x5eed);
    let personality = Personality::random(&mut rng);
    let mut player = AutoPlayer::new(personality, &mut rng);

    let mut game = spawn_game(engine);
    let mut frame_rx = game.subscribe();

    let mut config = cli.game.clone();
    config.player_name = format!("soak-{}", session_id);
    let start = GameCommand::Start {
        config,
        field: cli.field,
    };
    if game.cmd_tx.send(start).await.is_err() {
        metrics.errors.fetch_add(1, Ordering::Relaxed);
        return;
    }
    metrics.active.fetch_add(1, Ordering::Relaxed);
    if session_id < 3 {
        eprintln!("Session {} started ({:?})", session_id, personality);
    }

    let mut latest: Option<FrameMsg> = None;
    let mut last_score = 0;
    let mut step = tokio::time::interval(Duration::from_secs_f64(STEP_SECS));
    step.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let test_end = Instant::now() + duration;

    loop {
        if Instant::now() >= test_end {
            break;
        }

        tokio::select! {
            _ = step.tick() => {
                let Some(frame) = &latest else {
                    continue;
                };
                if let Some(point) = player.tick(STEP_SECS, frame, &mut rng) {
                    if game.cmd_tx.send(GameCommand::PopAt { point }).await.is_err() {
                        metrics.errors.fetch_add(1, Ordering::Relaxed);
                        break;
                    }
                    metrics.pops_sent.fetch_add(1, Ordering::Relaxed);
                }
            }

            result = frame_rx.recv() => {
                match result {
                    Ok(frame) => {
                        metrics.frames_received.fetch_add(1, Ordering::Relaxed);
                        metrics
                            .total_bubbles_seen
                            .fetch_add(frame.bubbles.len() as u64, Ordering::Relaxed);
                        if frame.score > last_score {
                            metrics.pops_scored.fetch_add(1, Ordering::Relaxed);
                        }
                        last_score = frame.score;
                        latest = Some(frame);
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        if session_id < 3 {
                            eprintln!("Session {} lagged by {} messages", session_id, n);
                        }
                        metrics.lagged.fetch_add(n, Ordering::Relaxed);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        metrics.errors.fetch_add(1, Ordering::Relaxed);
                        break;
                    }
                }
            }

            ended = game.ended_rx.recv() => {
                let Some(msg) = ended else {
                    metrics.errors.fetch_add(1, Ordering::Relaxed);
                    break;
                };
                metrics.sessions_ended.fetch_add(1, Ordering::Relaxed);
                if let Ok(mut board) = board.lock() {
                    board.record(msg);
                }
                if game.cmd_tx.send(GameCommand::Reset).await.is_err() {
                    metrics.errors.fetch_add(1, Ordering::Relaxed);
                    break;
                }
            }
        }
    }

    let GameHandle { cmd_tx, join, .. } = game;
    drop(cmd_tx);
    let _ = join.await;
    metrics.active.fetch_sub(1, Ordering::Relaxed);
}

// === Main ===

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args: Vec<String> = std::env::args().collect();

    let mut num_sessions: u32 = 50;
    let mut duration_secs: u64 = 30;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--sessions" => {
                i += 1;
                num_sessions = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(50);
            }
            "--duration" => {
                i += 1;
                duration_secs = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(30);
            }
            _ => {}
        }
        i += 1;
    }

    let mut cli = CliArgs::parse(&args);
    if !args.iter().any(|a| a == "--tick-ms") {
        cli.engine.tick_period_ms = 50;
    }
    if let Err(e) = cli.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    println!("=== Bubble Pop Soak Test ===");
    println!("Sessions: {}", num_sessions);
    println!("Duration: {}s", duration_secs);
    println!("Tick period: {}ms", cli.engine.tick_period_ms);
    println!(
        "Round: {}s, {} bubbles, {}x{} field",
        cli.game.game_time_secs, cli.game.max_bubbles, cli.field.width, cli.field.height
    );
    println!();

    let metrics = Arc::new(Metrics::new());
    let board = Arc::new(Mutex::new(Leaderboard::new()));
    let duration = Duration::from_secs(duration_secs);

    let mut handles = Vec::with_capacity(num_sessions as usize);
    let spawn_start = Instant::now();

    for session_id in 0..num_sessions {
        let cli = cli.clone();
        let metrics = Arc::clone(&metrics);
        let board = Arc::clone(&board);
        handles.push(tokio::spawn(async move {
            run_session(session_id, cli, duration, metrics, board).await;
        }));
    }

    println!("All sessions spawned in {:?}", spawn_start.elapsed());
    println!();

    // Print stats periodically
    let metrics_clone = Arc::clone(&metrics);
    let stats_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));
        let start = Instant::now();

        loop {
            interval.tick().await;
            let elapsed = start.elapsed().as_secs();
            let active = metrics_clone.active.load(Ordering::Relaxed);
            let frames = metrics_clone.frames_received.load(Ordering::Relaxed);
            let pops = metrics_clone.pops_sent.load(Ordering::Relaxed);
            let scored = metrics_clone.pops_scored.load(Ordering::Relaxed);
            let ended = metrics_clone.sessions_ended.load(Ordering::Relaxed);
            let errors = metrics_clone.errors.load(Ordering::Relaxed);

            println!(
                "[{:3}s] active={}, frames={}, pops={}, scored={}, ended={}, errors={}",
                elapsed, active, frames, pops, scored, ended, errors
            );
        }
    });

    for handle in handles {
        let _ = handle.await;
    }

    stats_handle.abort();

    // Final stats
    println!();
    println!("=== Final Results ===");
    let frames = metrics.frames_received.load(Ordering::Relaxed);
    let pops = metrics.pops_sent.load(Ordering::Relaxed);
    let scored = metrics.pops_scored.load(Ordering::Relaxed);
    let ended = metrics.sessions_ended.load(Ordering::Relaxed);
    let bubbles = metrics.total_bubbles_seen.load(Ordering::Relaxed);
    let lagged = metrics.lagged.load(Ordering::Relaxed);
    let errors = metrics.errors.load(Ordering::Relaxed);

    println!("Total frames received: {}", frames);
    println!("Total pops sent: {}", pops);
    println!("Pops that scored: {}", scored);
    println!("Sessions ended: {}", ended);
    println!("Messages lost to lag: {}", lagged);
    println!("Total errors: {}", errors);
    println!(
        "Average bubbles per frame: {}",
        if frames > 0 { bubbles / frames } else { 0 }
    );
    if pops > 0 {
        println!("Hit rate: {:.1}%", scored as f64 / pops as f64 * 100.0);
    }

    println!();
    for line in leaderboard_report(&board) {
        println!("{}", line);
    }
}

/// Final leaderboard section. The lock is released before returning.
fn leaderboard_report(board: &Mutex<Leaderboard>) -> Vec<String> {
    let board = match board.lock() {
        Ok(board) => board,
        Err(_) => return vec!["Leaderboard unavailable (lock poisoned)".to_string()],
    };
    let mut lines = vec!["=== Leaderboard ===".to_string()];
    match board.top_score() {
        Some(top) => lines.push(format!("Top score: {}", top)),
        None => lines.push("No rounds finished".to_string()),
    }
    for (i, entry) in board.entries.iter().enumerate() {
        lines.push(format!("{:2}. {:<12} {}", i + 1, entry.player_name, entry.score));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use bubblepop_engine::protocol::SessionEndedMsg;

    fn ended(name: &str, score: u64) -> SessionEndedMsg {
        SessionEndedMsg {
            player_name: name.to_string(),
            final_score: score,
        }
    }

    #[test]
    fn report_lists_top_score_and_ranks() {
        let board = Arc::new(Mutex::new(Leaderboard::new()));
        if let Ok(mut b) = board.lock() {
            b.record(ended("soak-1", 12));
            b.record(ended("soak-2", 40));
        }
        let lines = leaderboard_report(&board);
        assert_eq!(lines[0], "=== Leaderboard ===");
        assert_eq!(lines[1], "Top score: 40");
        assert!(lines[2].starts_with(" 1. soak-2"));
        assert!(lines[3].starts_with(" 2. soak-1"));

        // The guard is gone, so the board can be locked again
        assert!(board.lock().is_ok());
    }

    #[test]
    fn empty_report_says_so() {
        let board = Mutex::new(Leaderboard::new());
        assert_eq!(
            leaderboard_report(&board),
            vec!["=== Leaderboard ===".to_string(), "No rounds finished".to_string()]
        );
    }
}
