//! WebSocket upgrade handler

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::app::AppState;
use crate::game::constants::{OUTBOUND_CAPACITY, SPAWN_X, SPAWN_Y};
use crate::game::ingress;
use crate::game::{PlayerSession, RoomClosed, RoomHandle};
use crate::ws::protocol::{InboundMsg, InboundStatus, OutboundMsg};

/// Reasons a connection's read loop ends early
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("transport error: {0}")]
    Transport(#[from] axum::Error),

    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unknown room: {0}")]
    UnknownRoom(String),

    #[error(transparent)]
    RoomClosed(#[from] RoomClosed),
}

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut ws_sink, mut ws_stream) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<OutboundMsg>(OUTBOUND_CAPACITY);

    let session = state.players.register(outbound_tx);
    let player_id = session.id;
    info!(player_id = %player_id, "New WebSocket connection");

    session.send(OutboundMsg::assign_id(
        &player_id.to_string(),
        SPAWN_X,
        SPAWN_Y,
    ));

    // Spawn writer task: outbound queue -> WebSocket
    let writer_handle = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            if let Err(e) = send_msg(&mut ws_sink, &msg).await {
                debug!(player_id = %player_id, error = %e, "WebSocket send failed");
                break;
            }
        }
        let _ = ws_sink.close().await;
    });

    // Reader loop: WebSocket -> room
    match read_loop(&mut ws_stream, &session, &state).await {
        Ok(()) => {}
        Err(ConnectionError::UnknownRoom(room_id)) => {
            warn!(player_id = %player_id, room_id = %room_id, "Join to unknown room, closing connection");
        }
        Err(e) => {
            warn!(player_id = %player_id, error = %e, "Connection dropped");
        }
    }

    // Cleanup on disconnect
    disconnect(&state, &session).await;
    writer_handle.abort();

    info!(player_id = %player_id, "WebSocket connection closed");
}

/// Decode frames and forward admitted intents until the client goes away
async fn read_loop(
    ws_stream: &mut futures::stream::SplitStream<WebSocket>,
    session: &Arc<PlayerSession>,
    state: &AppState,
) -> Result<(), ConnectionError> {
    while let Some(result) = ws_stream.next().await {
        let mut msg: InboundMsg = match result? {
            Message::Text(text) => serde_json::from_str(&text)?,
            Message::Binary(bytes) => serde_json::from_slice(&bytes)?,
            Message::Ping(_) | Message::Pong(_) => continue,
            Message::Close(_) => {
                info!(player_id = %session.id, "Client initiated close");
                return Ok(());
            }
        };
        msg.id = session.id.to_string();

        let Some(room) = resolve_room(state, session, &msg)? else {
            debug!(player_id = %session.id, status = ?msg.status, "Intent before joining a room, skipped");
            continue;
        };

        if !ingress::admit(&msg, session.is_alive()) {
            debug!(player_id = %session.id, x_s = ?msg.x_s, y_s = ?msg.y_s, "Intent rejected by ingress filter");
            continue;
        }

        room.submit(msg, session.clone()).await?;
    }

    Ok(())
}

/// Find the room an intent goes to. The first `connected` attaches the
/// session; later frames always go to the attached room.
fn resolve_room(
    state: &AppState,
    session: &PlayerSession,
    msg: &InboundMsg,
) -> Result<Option<RoomHandle>, ConnectionError> {
    if let Some(room_id) = session.room() {
        return state
            .rooms
            .get(room_id)
            .map(Some)
            .ok_or_else(|| RoomClosed(room_id.to_string()).into());
    }

    if msg.status != InboundStatus::Connected {
        return Ok(None);
    }

    let room_id = msg.room.clone().unwrap_or_default();
    let room = state
        .rooms
        .get(&room_id)
        .ok_or_else(|| ConnectionError::UnknownRoom(room_id.clone()))?;
    session.attach(&room_id);
    Ok(Some(room))
}

/// Detach the player from its room and forget it
async fn disconnect(state: &AppState, session: &PlayerSession) {
    if let Some(room) = session.room().and_then(|room_id| state.rooms.get(room_id)) {
        if let Err(e) = room.leave(session.id).await {
            debug!(player_id = %session.id, error = %e, "Room gone before leave");
        }
    }
    state.players.remove(&session.id);
}

/// Send a message over WebSocket
async fn send_msg(
    sink: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &OutboundMsg,
) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn state() -> AppState {
        AppState::new(Config::for_rooms(&["main"]))
    }

    #[tokio::test]
    async fn first_connected_attaches_session() {
        let state = state();
        let (tx, _rx) = mpsc::channel(4);
        let session = state.players.register(tx);

        let room = resolve_room(&state, &session, &InboundMsg::connected("main", "alice"));

        assert_eq!(room.ok().flatten().map(|r| r.id().to_string()), Some("main".into()));
        assert_eq!(session.room(), Some("main"));
        state.shutdown();
    }

    #[tokio::test]
    async fn unknown_room_rejects_without_attaching() {
        let state = state();
        let (tx, _rx) = mpsc::channel(4);
        let session = state.players.register(tx);

        let result = resolve_room(&state, &session, &InboundMsg::connected("nope", "alice"));

        assert!(matches!(result, Err(ConnectionError::UnknownRoom(id)) if id == "nope"));
        assert_eq!(session.room(), None);
        state.shutdown();
    }

    #[tokio::test]
    async fn move_before_join_has_no_room() {
        let state = state();
        let (tx, _rx) = mpsc::channel(4);
        let session = state.players.register(tx);

        let result = resolve_room(&state, &session, &InboundMsg::movement(0.1, 0.1));

        assert!(matches!(result, Ok(None)));
        state.shutdown();
    }

    #[tokio::test]
    async fn later_connected_keeps_original_room() {
        let state = AppState::new(Config::for_rooms(&["main", "side"]));
        let (tx, _rx) = mpsc::channel(4);
        let session = state.players.register(tx);

        let _ = resolve_room(&state, &session, &InboundMsg::connected("main", "alice"));
        let room = resolve_room(&state, &session, &InboundMsg::connected("side", "alice"));

        assert_eq!(room.ok().flatten().map(|r| r.id().to_string()), Some("main".into()));
        state.shutdown();
    }

    #[tokio::test]
    async fn disconnect_removes_player_everywhere() {
        let state = state();
        let (tx, _rx) = mpsc::channel(4);
        let session = state.players.register(tx);
        let room = resolve_room(&state, &session, &InboundMsg::connected("main", "alice"))
            .ok()
            .flatten()
            .expect("room resolved");
        tokio_test::assert_ok!(room.submit(InboundMsg::connected("main", "alice"), session.clone()).await);

        disconnect(&state, &session).await;

        assert!(state.players.get(&session.id).is_none());
        for _ in 0..50 {
            if room.player_count() == 0 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(room.player_count(), 0);
        state.shutdown();
    }
}
