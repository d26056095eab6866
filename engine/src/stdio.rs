//! JSON-lines transport: one `HostMsg` per input line, one `CoreMsg` per
//! output line.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{broadcast, mpsc};

use crate::game_loop::GameCommand;
use crate::protocol::{CoreMsg, FrameMsg, HostMsg, SessionEndedMsg};

/// Parse one input line. Blank lines yield None.
pub fn parse_line(line: &str) -> Option<Result<HostMsg, serde_json::Error>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(serde_json::from_str(line))
}

/// Pump host input into the game loop and frames and round results back
/// out until the input closes, the output breaks or the game loop goes away.
pub async fn run_stdio<R, W>(
    input: R,
    mut output: W,
    game_tx: mpsc::Sender<GameCommand>,
    mut frame_rx: broadcast::Receiver<FrameMsg>,
    ended_rx: &mut mpsc::UnboundedReceiver<SessionEndedMsg>,
) where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(input).lines();

    loop {
        // Frames first: the game-over frame is queued before its result
        tokio::select! {
            biased;

            // Core -> Host
            result = frame_rx.recv() => {
                match result {
                    Ok(frame) => {
                        if write_msg(&mut output, &CoreMsg::Frame(frame)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // The next frame is a full snapshot and supersedes the dropped ones
                        tracing::warn!("Output lagged by {} frames", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            Some(ended) = ended_rx.recv() => {
                if write_msg(&mut output, &CoreMsg::SessionEnded(ended)).await.is_err() {
                    break;
                }
            }

            // Host -> Core
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => match parse_line(&line) {
                        Some(Ok(msg)) => {
                            if game_tx.send(msg.into()).await.is_err() {
                                break;
                            }
                        }
                        Some(Err(e)) => {
                            tracing::warn!("Skipping malformed input line: {}", e);
                        }
                        None => {}
                    },
                    Ok(None) => {
                        tracing::info!("Input closed");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("Input read failed: {}", e);
                        break;
                    }
                }
            }
        }
    }
}

/// Encode and write one message. Encoding failures are logged and skipped.
async fn write_msg<W: AsyncWrite + Unpin>(output: &mut W, msg: &CoreMsg) -> std::io::Result<()> {
    match serde_json::to_string(msg) {
        Ok(json) => write_line(output, &json).await,
        Err(e) => {
            tracing::warn!("Failed to encode output: {}", e);
            Ok(())
        }
    }
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, json: &str) -> std::io::Result<()> {
    output.write_all(json.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}
