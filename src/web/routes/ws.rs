use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::services::connection_registry::{ConnectionRegistry, WsMsg};
use crate::state::AppState;
use crate::web::response;

#[derive(Deserialize)]
pub struct WsParams {
    client_id: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<AppState>,
) -> Response {
    let client_id = params
        .client_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    ws.on_upgrade(move |socket| handle_socket(socket, client_id, state.connections))
}

async fn handle_socket(
    mut socket: WebSocket,
    client_id: String,
    registry: Arc<ConnectionRegistry>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let ticket = registry.add(&client_id, tx);
    info!(
        "🔌 ws client {} connected ({} online)",
        client_id,
        registry.len()
    );

    loop {
        tokio::select! {
            outbound = rx.recv() => match outbound {
                Some(text) => {
                    if socket.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                // Replaced by a newer connection with the same id.
                None => break,
            },
            inbound = socket.recv() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    let reply = reply_for(&text);
                    match serde_json::to_string(&reply) {
                        Ok(payload) => {
                            if socket.send(Message::Text(payload)).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("ws reply serialization failed: {}", e),
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    debug!("ws client {} read error: {}", client_id, e);
                    break;
                }
                Some(Ok(_)) => {}
            },
        }
    }

    registry.release(&client_id, ticket);
    info!("🔌 ws client {} disconnected", client_id);
}

/// Answer for one inbound text frame.
fn reply_for(text: &str) -> WsMsg {
    let operation = serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| v.get("operation")?.as_str().map(str::to_string));

    match operation.as_deref() {
        None => WsMsg {
            code: response::PARAM_ERROR,
            data: None,
            msg: "invalid message format".to_string(),
            operation: "result".to_string(),
        },
        Some("ping") => WsMsg {
            code: response::SUCCESS,
            data: None,
            msg: "pong".to_string(),
            operation: "ping".to_string(),
        },
        Some(_) => WsMsg {
            code: response::PARAM_ERROR,
            data: None,
            msg: "undefined operation".to_string(),
            operation: "result".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_gets_pong() {
        let reply = reply_for(r#"{"operation":"ping"}"#);
        assert_eq!(reply.code, response::SUCCESS);
        assert_eq!(reply.msg, "pong");
        assert_eq!(reply.operation, "ping");
    }

    #[test]
    fn unknown_operations_are_reported() {
        let reply = reply_for(r#"{"operation":"subscribe"}"#);
        assert_eq!(reply.code, response::PARAM_ERROR);
        assert_eq!(reply.msg, "undefined operation");
        assert_eq!(reply.operation, "result");
    }

    #[test]
    fn malformed_frames_are_rejected() {
        for text in ["not json", "{}", r#"{"operation":7}"#] {
            let reply = reply_for(text);
            assert_eq!(reply.code, response::PARAM_ERROR);
            assert_eq!(reply.msg, "invalid message format");
            assert_eq!(reply.operation, "result");
        }
    }
}
