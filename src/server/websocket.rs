//! Push channel.
//!
//! Every connection gets its own broadcast receiver, so a slow client only
//! lags itself. Nothing sent before a client connected is replayed.

use crate::models::Event;
use crate::status::Aggregator;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::{Sink, SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

/// Handle WebSocket upgrade request
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(aggregator): State<Arc<Aggregator>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, aggregator))
}

/// Handle an individual WebSocket connection
async fn handle_socket(socket: WebSocket, aggregator: Arc<Aggregator>) {
    // Subscribe before the welcome so nothing notified in between is lost.
    let mut events = aggregator.subscribe();
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let welcome = Event::welcome(&aggregator.config().server.service_name);
    if send_event(&mut ws_sender, &welcome).await.is_err() {
        return;
    }
    debug!("Push client connected ({} listening)", aggregator.listener_count());

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    if send_event(&mut ws_sender, &event).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Push client lagging, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            incoming = ws_receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    debug!("WebSocket error: {}", e);
                    break;
                }
                // Client messages carry no meaning on this channel.
                Some(Ok(_)) => {}
            },
        }
    }

    debug!("Push client disconnected");
}

async fn send_event<S>(sender: &mut S, event: &Event) -> Result<(), S::Error>
where
    S: Sink<Message> + Unpin,
{
    let text = match serde_json::to_string(event) {
        Ok(text) => text,
        Err(e) => {
            warn!("Cannot serialize event: {}", e);
            return Ok(());
        }
    };
    sender.send(Message::Text(text.into())).await
}
