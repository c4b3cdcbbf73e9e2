/**
 * Real-time WebSocket Handler
 *
 * This module implements the `/ws` endpoint. After the upgrade the server
 * pushes every broadcast change event to the client as a text frame.
 * Clients have nothing meaningful to send: incoming frames are read only to
 * notice a close.
 *
 * # Connection Management
 *
 * - The client is subscribed to the broadcaster as soon as the upgrade completes
 * - Lagged events are logged and skipped, the connection stays open
 * - Either side ending (close frame, socket error, failed send) ends both tasks
 */

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{Sink, SinkExt, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::backend::realtime::broadcast::ChangeBroadcaster;

/// Handle real-time subscription (GET /ws)
pub async fn handle_realtime_socket(
    ws: WebSocketUpgrade,
    State(broadcaster): State<ChangeBroadcaster>,
) -> Response {
    tracing::info!("[Realtime] WebSocket upgrade requested");
    ws.on_upgrade(move |socket| serve_socket(socket, broadcaster))
}

async fn serve_socket(socket: WebSocket, broadcaster: ChangeBroadcaster) {
    let receiver = broadcaster.subscribe();
    tracing::info!(
        "[Realtime] Client connected, {} connected",
        broadcaster.connection_count()
    );

    let (sink, mut stream) = socket.split();

    let mut send_task = tokio::spawn(forward_events(receiver, sink));
    let mut recv_task = tokio::spawn(async move {
        while let Some(message) = stream.next().await {
            match message {
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!("[Realtime] WebSocket read error: {}", e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    tracing::info!("[Realtime] Client disconnected");
}

/// Forward broadcast messages into a socket sink until either side closes
///
/// Returns the number of messages delivered.
pub async fn forward_events<S>(mut receiver: broadcast::Receiver<String>, mut sink: S) -> usize
where
    S: Sink<Message> + Unpin,
{
    let mut delivered = 0;
    loop {
        match receiver.recv().await {
            Ok(text) => {
                if sink.send(Message::Text(text.into())).await.is_err() {
                    tracing::debug!("[Realtime] Socket no longer open, dropping client");
                    break;
                }
                delivered += 1;
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!("[Realtime] Client lagged, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
    delivered
}
