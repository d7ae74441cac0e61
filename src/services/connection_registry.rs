use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

/// Frame pushed to WebSocket clients.
#[derive(Debug, Clone, Serialize)]
pub struct WsMsg {
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    pub msg: String,
    #[serde(rename = "op")]
    pub operation: String,
}

struct Client {
    ticket: u64,
    sender: UnboundedSender<String>,
}

/// Live WebSocket connections keyed by client id.
///
/// Each connection task owns the socket and drains its own channel; the
/// registry only keeps the sending half.
#[derive(Default)]
pub struct ConnectionRegistry {
    clients: Mutex<HashMap<String, Client>>,
    next_ticket: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `id`. A previous connection under the same id is dropped,
    /// which closes its channel. The returned ticket identifies this
    /// registration for [`ConnectionRegistry::release`].
    pub fn add(&self, id: &str, sender: UnboundedSender<String>) -> u64 {
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let replaced = self
            .clients
            .lock()
            .insert(id.to_string(), Client { ticket, sender });
        if replaced.is_some() {
            debug!("ws client {} reconnected, replacing old connection", id);
        }
        ticket
    }

    pub fn remove(&self, id: &str) {
        self.clients.lock().remove(id);
    }

    /// Removes `id` only if it still belongs to the registration behind `ticket`.
    pub fn release(&self, id: &str, ticket: u64) {
        let mut clients = self.clients.lock();
        if clients.get(id).map(|c| c.ticket) == Some(ticket) {
            clients.remove(id);
        }
    }

    pub fn len(&self) -> usize {
        self.clients.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sends `msg` to every client and returns how many received it.
    pub fn broadcast(&self, msg: &WsMsg) -> usize {
        let payload = match serde_json::to_string(msg) {
            Ok(p) => p,
            Err(e) => {
                warn!("ws broadcast serialization failed: {}", e);
                return 0;
            }
        };

        let mut clients = self.clients.lock();
        clients.retain(|id, client| {
            let alive = client.sender.send(payload.clone()).is_ok();
            if !alive {
                debug!("dropping closed ws client {}", id);
            }
            alive
        });
        clients.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn event(op: &str) -> WsMsg {
        WsMsg {
            code: 2000,
            data: Some(serde_json::json!({ "id": 1 })),
            msg: "ok".to_string(),
            operation: op.to_string(),
        }
    }

    #[test]
    fn broadcast_reaches_every_client() {
        let registry = ConnectionRegistry::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        registry.add("a", tx_a);
        registry.add("b", tx_b);

        assert_eq!(registry.broadcast(&event("trashcan_created")), 2);

        let frame: Value = serde_json::from_str(&rx_a.try_recv().unwrap()).unwrap();
        assert_eq!(frame["op"], "trashcan_created");
        assert_eq!(frame["data"]["id"], 1);
        assert!(rx_b.try_recv().is_ok());
    }

    #[test]
    fn remove_stops_delivery() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.add("a", tx);
        registry.remove("a");

        assert!(registry.is_empty());
        assert_eq!(registry.broadcast(&event("x")), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn closed_receivers_are_pruned() {
        let registry = ConnectionRegistry::new();
        let (tx_a, rx_a) = mpsc::unbounded_channel();
        let (tx_b, _rx_b) = mpsc::unbounded_channel();
        registry.add("a", tx_a);
        registry.add("b", tx_b);
        drop(rx_a);

        assert_eq!(registry.broadcast(&event("x")), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn re_adding_an_id_replaces_the_connection() {
        let registry = ConnectionRegistry::new();
        let (old_tx, mut old_rx) = mpsc::unbounded_channel();
        let (new_tx, mut new_rx) = mpsc::unbounded_channel();
        registry.add("a", old_tx);
        registry.add("a", new_tx);

        assert_eq!(registry.len(), 1);
        registry.broadcast(&event("x"));
        assert!(old_rx.try_recv().is_err());
        assert!(new_rx.try_recv().is_ok());
    }

    #[test]
    fn stale_release_keeps_the_newer_connection() {
        let registry = ConnectionRegistry::new();
        let (old_tx, _old_rx) = mpsc::unbounded_channel();
        let (new_tx, _new_rx) = mpsc::unbounded_channel();
        let old_ticket = registry.add("a", old_tx);
        let new_ticket = registry.add("a", new_tx);

        registry.release("a", old_ticket);
        assert_eq!(registry.len(), 1);

        registry.release("a", new_ticket);
        assert!(registry.is_empty());
    }

    #[test]
    fn empty_data_is_omitted() {
        let msg = WsMsg {
            code: 4000,
            data: None,
            msg: "invalid message format".to_string(),
            operation: "result".to_string(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("data").is_none());
        assert_eq!(json["op"], "result");
    }
}
