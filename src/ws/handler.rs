//! WebSocket upgrade handlers

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::game::{HostCommand, HostHandle};
use crate::util::rate_limit::ConnectionRateLimiter;
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// Relay listener upgrade (`/` and `/ws`): receives every jump signal as text
pub async fn relay_ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_relay_socket(socket, state))
}

async fn handle_relay_socket(socket: WebSocket, state: AppState) {
    let listener_id = Uuid::new_v4();
    state.relay.register_listener(listener_id);

    let (mut ws_sink, mut ws_stream) = socket.split();
    let mut signal_rx = state.relay.subscribe();

    // Spawn writer task: relay signals -> WebSocket
    let writer_handle = tokio::spawn(async move {
        loop {
            match signal_rx.recv().await {
                Ok(signal) => {
                    if let Err(e) = ws_sink.send(Message::Text(signal.wire().to_string())).await {
                        debug!(listener_id = %listener_id, error = %e, "Relay send failed");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(listener_id = %listener_id, lagged_count = n, "Relay listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!(listener_id = %listener_id, "Relay channel closed");
                    break;
                }
            }
        }
    });

    // Reader loop: listeners are receivers only, inbound text is dropped
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                debug!(
                    listener_id = %listener_id,
                    len = text.len(),
                    "Ignoring inbound relay text"
                );
            }
            Ok(Message::Close(_)) => {
                debug!(listener_id = %listener_id, "Relay listener initiated close");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                debug!(listener_id = %listener_id, error = %e, "Relay socket error");
                break;
            }
        }
    }

    writer_handle.abort();
    state.relay.unregister_listener(listener_id);
}

/// Viewer upgrade (`/ws/frames`): streams frames from the session host
pub async fn frames_ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_viewer_socket(socket, state))
}

async fn handle_viewer_socket(socket: WebSocket, state: AppState) {
    let viewer_id = Uuid::new_v4();
    let (mut ws_sink, ws_stream) = socket.split();

    let Some(host) = state.host.clone() else {
        let msg = ServerMsg::Error {
            code: "no_session".to_string(),
            message: "This server does not host a game session".to_string(),
        };
        let _ = send_msg(&mut ws_sink, &msg).await;
        let _ = ws_sink.close().await;
        return;
    };

    info!(viewer_id = %viewer_id, "Viewer connected");

    if let Err(e) = send_msg(&mut ws_sink, &host.welcome()).await {
        error!(viewer_id = %viewer_id, error = %e, "Failed to send welcome");
        return;
    }

    run_viewer(viewer_id, ws_sink, ws_stream, host).await;

    info!(viewer_id = %viewer_id, "Viewer disconnected");
}

/// Run the viewer session with read/write split
async fn run_viewer(
    viewer_id: Uuid,
    ws_sink: SplitSink<WebSocket, Message>,
    mut ws_stream: SplitStream<WebSocket>,
    host: HostHandle,
) {
    let rate_limiter = ConnectionRateLimiter::new();
    let mut frame_rx = host.subscribe();

    // Pongs go through the same writer as frames
    let (reply_tx, mut reply_rx) = tokio::sync::mpsc::channel::<ServerMsg>(8);

    // Spawn writer task: frames -> WebSocket
    let writer_handle = tokio::spawn(async move {
        let mut ws_sink = ws_sink;
        loop {
            let msg = tokio::select! {
                frame = frame_rx.recv() => match frame {
                    Ok(msg) => msg,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(viewer_id = %viewer_id, lagged_count = n, "Viewer lagged, skipping frames");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!(viewer_id = %viewer_id, "Frame channel closed");
                        break;
                    }
                },
                Some(reply) = reply_rx.recv() => reply,
            };

            if let Err(e) = send_msg(&mut ws_sink, &msg).await {
                debug!(viewer_id = %viewer_id, error = %e, "WebSocket send failed");
                break;
            }
        }
    });

    // Reader loop: WebSocket -> host commands
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if !rate_limiter.check_input() {
                    warn!(viewer_id = %viewer_id, "Rate limited viewer message");
                    continue;
                }

                let command = match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(ClientMsg::KeyUp) => HostCommand::KeyUp,
                    Ok(ClientMsg::Jump { player }) => HostCommand::Jump(player),
                    Ok(ClientMsg::Resize { scale_ratio }) => HostCommand::Resize(scale_ratio),
                    Ok(ClientMsg::Ping { t }) => {
                        let _ = reply_tx.try_send(ServerMsg::Pong { t });
                        continue;
                    }
                    Err(e) => {
                        warn!(viewer_id = %viewer_id, error = %e, "Failed to parse viewer message");
                        continue;
                    }
                };

                if host.command_tx.send(command).await.is_err() {
                    debug!(viewer_id = %viewer_id, "Host command channel closed");
                    break;
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(viewer_id = %viewer_id, "Received binary message, ignoring");
            }
            Ok(Message::Close(_)) => {
                debug!(viewer_id = %viewer_id, "Viewer initiated close");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                error!(viewer_id = %viewer_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    writer_handle.abort();
}

/// Send a message over WebSocket
async fn send_msg(sink: &mut SplitSink<WebSocket, Message>, msg: &ServerMsg) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}

