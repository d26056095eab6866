use crate::bubble::BubbleId;
use crate::config::{EngineConfig, GameConfig};
use crate::protocol::{FrameMsg, HostMsg, SessionEndedMsg};
use crate::scheduler::TickScheduler;
use crate::session::SessionController;
use crate::vec2::{vec2, FieldSize, Vec2};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

/// Commands from the host to the game loop
#[derive(Debug)]
pub enum GameCommand {
    Start { config: GameConfig, field: FieldSize },
    PopAt { point: Vec2 },
    Pop { id: BubbleId },
    Resize { field: FieldSize },
    PauseToggle,
    Pause,
    Resume,
    Background,
    Foreground,
    Reset,
    Quit,
    Snapshot { response: oneshot::Sender<FrameMsg> },
}

impl From<HostMsg> for GameCommand {
    fn from(msg: HostMsg) -> Self {
        match msg {
            HostMsg::Start {
                player_name,
                game_time_secs,
                max_bubbles,
                width,
                height,
            } => GameCommand::Start {
                config: GameConfig::new(player_name, game_time_secs, max_bubbles),
                field: FieldSize::new(width, height),
            },
            HostMsg::PopAt { x, y } => GameCommand::PopAt { point: vec2(x, y) },
            HostMsg::Pop { id } => GameCommand::Pop { id: BubbleId(id) },
            HostMsg::Resize { width, height } => GameCommand::Resize {
                field: FieldSize::new(width, height),
            },
            HostMsg::PauseToggle => GameCommand::PauseToggle,
            HostMsg::Pause => GameCommand::Pause,
            HostMsg::Resume => GameCommand::Resume,
            HostMsg::Background => GameCommand::Background,
            HostMsg::Foreground => GameCommand::Foreground,
            HostMsg::Reset => GameCommand::Reset,
            HostMsg::Quit => GameCommand::Quit,
        }
    }
}

/// Channels for talking to a spawned game loop.
///
/// Frames go out on a lossy broadcast: a slow subscriber skips frames and
/// catches up with the next one. End-of-round results go out on their own
/// unbounded queue, so every round that ends is reported exactly once no
/// matter how far behind the frame subscribers are.
pub struct GameHandle {
    pub cmd_tx: mpsc::Sender<GameCommand>,
    pub broadcast_tx: broadcast::Sender<FrameMsg>,
    pub ended_rx: mpsc::UnboundedReceiver<SessionEndedMsg>,
    pub join: JoinHandle<()>,
}

impl GameHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<FrameMsg> {
        self.broadcast_tx.subscribe()
    }

    /// Current frame, or None once the loop is gone.
    pub async fn snapshot(&self) -> Option<FrameMsg> {
        let (response, rx) = oneshot::channel();
        self.cmd_tx
            .send(GameCommand::Snapshot { response })
            .await
            .ok()?;
        rx.await.ok()
    }
}

/// Spawn a game loop with channels sized from the config.
pub fn spawn_game(config: EngineConfig) -> GameHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(config.command_buffer);
    let (broadcast_tx, _) = broadcast::channel(config.broadcast_capacity);
    let (ended_tx, ended_rx) = mpsc::unbounded_channel();
    let bc_tx = broadcast_tx.clone();
    let join = tokio::spawn(async move {
        run_game_loop(cmd_rx, bc_tx, ended_tx, config).await;
    });
    GameHandle {
        cmd_tx,
        broadcast_tx,
        ended_rx,
        join,
    }
}

/// Run the game loop. Owns the session and its ticker; ends once every
/// command sender is dropped.
pub async fn run_game_loop(
    mut cmd_rx: mpsc::Receiver<GameCommand>,
    broadcast_tx: broadcast::Sender<FrameMsg>,
    ended_tx: mpsc::UnboundedSender<SessionEndedMsg>,
    config: EngineConfig,
) {
    let mut session = SessionController::new(&config);
    let (tick_tx, mut tick_rx) = mpsc::channel::<u64>(8);
    let mut scheduler = TickScheduler::new(tick_tx, config.tick_period());

    loop {
        tokio::select! {
            Some(generation) = tick_rx.recv() => {
                handle_tick(&mut session, generation, &broadcast_tx, &ended_tx);
            }

            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else {
                    break;
                };
                let changed = match cmd {
                    GameCommand::Start { config, field } => session.start(config, field),
                    GameCommand::PopAt { point } => session.pop_at(point).is_some(),
                    GameCommand::Pop { id } => session.pop(id).is_some(),
                    GameCommand::Resize { field } => {
                        let resized = session.field().size() != field;
                        let placed = session.resize(field);
                        resized || placed > 0
                    }
                    GameCommand::PauseToggle => session.pause_toggle(),
                    GameCommand::Pause => session.pause(),
                    GameCommand::Resume => session.resume(),
                    GameCommand::Background => session.background(),
                    GameCommand::Foreground => session.foreground(),
                    GameCommand::Reset => session.reset(),
                    GameCommand::Quit => session.quit(),
                    GameCommand::Snapshot { response } => {
                        let _ = response.send(session.frame());
                        false
                    }
                };
                if changed {
                    let _ = broadcast_tx.send(session.frame());
                }
            }
        }

        scheduler.sync(session.tick_generation());
    }

    scheduler.stop();
    tracing::info!("Game loop ended");
}

fn handle_tick(
    session: &mut SessionController,
    generation: u64,
    broadcast_tx: &broadcast::Sender<FrameMsg>,
    ended_tx: &mpsc::UnboundedSender<SessionEndedMsg>,
) {
    let Some(report) = session.tick(generation) else {
        return;
    };
    let _ = broadcast_tx.send(session.frame());
    if let Some(summary) = report.ended {
        if ended_tx.send(summary.into()).is_err() {
            tracing::warn!("Round ended with nobody listening for results");
        }
    }
}
