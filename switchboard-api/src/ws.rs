//! WebSocket Event Broadcasting
//!
//! Dashboard clients connect to `/ws/dashboard` and receive assignment
//! events as they are committed. A tokio broadcast channel distributes
//! events; readers that fall behind miss frames and reconcile by polling
//! the REST API.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::events::WsEvent;

/// WebSocket state shared across the application.
#[derive(Clone)]
pub struct WsState {
    /// Broadcast channel feeding all connected dashboard clients.
    tx: broadcast::Sender<WsEvent>,
}

impl WsState {
    /// Create a new WebSocket state with the specified channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Broadcast an event to all connected clients.
    ///
    /// Non-blocking; if no clients are connected the event is dropped.
    pub fn broadcast(&self, event: WsEvent) {
        let event_type = event.event_type();
        match self.tx.send(event) {
            Ok(receiver_count) => {
                debug!(event_type, receivers = receiver_count, "Broadcast event");
            }
            Err(_) => {
                debug!(event_type, "No receivers for event");
            }
        }
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<WsEvent> {
        self.tx.subscribe()
    }
}

/// GET /ws/dashboard - upgrade to a WebSocket event stream.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<WsState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Pump broadcast events to one client until it disconnects.
async fn handle_socket(socket: WebSocket, state: Arc<WsState>) {
    info!("Dashboard WebSocket connected");

    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.subscribe();

    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Ok(event) => {
                        let frame = match serde_json::to_string(&event) {
                            Ok(frame) => frame,
                            Err(e) => {
                                warn!(error = %e, "Failed to serialize event");
                                continue;
                            }
                        };
                        if sender.send(Message::Text(frame.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        // Slow consumer: skip ahead, readers reconcile by
                        // polling the REST API.
                        warn!(missed, "Dashboard client lagged, dropping events");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {
                        // No inbound protocol; ignore pings and stray text.
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket receive error");
                        break;
                    }
                }
            }
        }
    }

    info!("Dashboard WebSocket disconnected");
}
