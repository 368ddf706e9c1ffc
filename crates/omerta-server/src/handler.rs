//! Per-connection handler: identity, framing, and command routing.
//!
//! Each accepted connection gets its own Tokio task running this
//! handler, plus a writer task draining that player's outbound channel
//! into the socket. The handler never touches match state — it decodes
//! frames and routes them: `create`/`join` go to the directory,
//! everything else to the player's current room actor.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use omerta_engine::PlayerId;
use omerta_protocol::{ClientCommand, Codec, ServerMessage};
use omerta_room::{PlayerSender, RoomHandle};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::server::ServerState;
use crate::ws::WsStream;
use crate::ServerError;

/// Counter for minting player ids. Identity is connection-scoped: a
/// new socket is a new player.
static NEXT_PLAYER_ID: AtomicU64 = AtomicU64::new(1);

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    ws: WsStream,
    state: Arc<ServerState>,
) -> Result<(), ServerError> {
    let player_id = PlayerId(NEXT_PLAYER_ID.fetch_add(1, Ordering::Relaxed));
    tracing::info!(%player_id, "connection open");

    let (mut sink, mut stream) = ws.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Writer task: everything the room (or this handler) pushes to the
    // player goes through one channel, so frames never interleave.
    let codec = state.codec;
    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let frame = match codec.encode(&msg) {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode outbound frame");
                    continue;
                }
            };
            if sink.send(Message::text(frame)).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    // Reader loop: the room handle is cached here so routing a command
    // doesn't touch the directory lock.
    let mut room: Option<RoomHandle> = None;
    while let Some(frame) = stream.next().await {
        let frame = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            // Ping/pong and binary frames carry no commands.
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "read error");
                break;
            }
        };

        let cmd: ClientCommand = match codec.decode(frame.as_str()) {
            Ok(cmd) => cmd,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "bad frame");
                let _ = tx.send(ServerMessage::ErrorNotice {
                    message: "unrecognized command".to_string(),
                });
                continue;
            }
        };

        match &mut room {
            None => match route_lobby(&state, player_id, cmd, tx.clone()).await {
                Ok(joined) => room = joined,
                Err(e) => {
                    let _ = tx.send(ServerMessage::ErrorNotice { message: e.to_string() });
                }
            },
            Some(handle) => {
                if handle.command(player_id, cmd).await.is_err() {
                    // The room actor is gone; drop back to the lobby.
                    let _ = tx.send(ServerMessage::ErrorNotice {
                        message: "room closed".to_string(),
                    });
                    detach(&state, player_id, None).await;
                    room = None;
                }
            }
        }
    }

    if let Some(handle) = room {
        detach(&state, player_id, Some(handle)).await;
    }
    writer.abort();
    tracing::info!(%player_id, "connection closed");
    Ok(())
}

/// Routes a command from a player who is not in a room yet. Only
/// `create` and `join` make sense here; anything else gets a notice.
async fn route_lobby(
    state: &ServerState,
    player_id: PlayerId,
    cmd: ClientCommand,
    sender: PlayerSender,
) -> Result<Option<RoomHandle>, ServerError> {
    let (handle, name) = match cmd {
        ClientCommand::Create { name } => {
            let handle = state.directory.lock().await.create_room();
            (handle, name)
        }
        ClientCommand::Join { room, name } => {
            let handle = state.directory.lock().await.find(&room)?;
            (handle, name)
        }
        _ => {
            let _ = sender.send(ServerMessage::ErrorNotice {
                message: "join a room first".to_string(),
            });
            return Ok(None);
        }
    };

    handle.join(player_id, name, sender).await?;
    let mut directory = state.directory.lock().await;
    if let Err(e) = directory.seat_player(player_id, handle.code()) {
        drop(directory);
        let abandoned = handle.leave(player_id).await.unwrap_or(false);
        if abandoned {
            state.directory.lock().await.remove_room(handle.code());
        }
        return Err(e.into());
    }
    Ok(Some(handle))
}

/// Detaches a departing player from their room and forgets abandoned
/// rooms.
async fn detach(state: &ServerState, player_id: PlayerId, handle: Option<RoomHandle>) {
    let handle = match handle {
        Some(handle) => handle,
        None => match state.directory.lock().await.room_of(player_id) {
            Some(handle) => handle,
            None => return,
        },
    };
    let abandoned = handle.leave(player_id).await.unwrap_or(true);
    let mut directory = state.directory.lock().await;
    directory.unseat_player(player_id);
    if abandoned {
        directory.remove_room(handle.code());
    }
}
