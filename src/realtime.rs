//! Change notifications pushed to websocket subscribers, one channel per
//! table.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub table: String,
    pub record_id: String,
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind, table: &str, record_id: &str) -> Self {
        ChangeEvent {
            kind,
            table: table.to_string(),
            record_id: record_id.to_string(),
        }
    }
}

type Subscribers = HashMap<String, Vec<mpsc::UnboundedSender<String>>>;

/// Registry of open subscriber channels keyed by table name.
#[derive(Debug, Clone, Default)]
pub struct ChangeHub {
    subscribers: Arc<RwLock<Subscribers>>,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, table: &str) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        match self.subscribers.write() {
            Ok(mut map) => map.entry(table.to_string()).or_default().push(tx),
            Err(_) => log::error!("Realtime registry lock poisoned; {table} subscriber dropped"),
        }
        rx
    }

    /// Send to every subscriber of the event's table. Channels whose receiver
    /// is gone are dropped. Returns how many subscribers got the event.
    pub fn publish(&self, event: &ChangeEvent) -> usize {
        let msg = match serde_json::to_string(event) {
            Ok(msg) => msg,
            Err(e) => {
                log::error!("Could not encode change event: {e}");
                return 0;
            }
        };
        let Ok(mut map) = self.subscribers.write() else {
            return 0;
        };
        let Some(senders) = map.get_mut(&event.table) else {
            return 0;
        };
        senders.retain(|s| s.send(msg.clone()).is_ok());
        let delivered = senders.len();
        if senders.is_empty() {
            map.remove(&event.table);
        }
        log::debug!(
            "{:?} {}/{} delivered to {delivered} subscriber(s)",
            event.kind,
            event.table,
            event.record_id
        );
        delivered
    }

    /// Drop closed channels of `table` (called when a socket disconnects).
    pub fn prune(&self, table: &str) {
        if let Ok(mut map) = self.subscribers.write() {
            if let Some(senders) = map.get_mut(table) {
                senders.retain(|s| !s.is_closed());
                if senders.is_empty() {
                    map.remove(table);
                }
            }
        }
    }

    pub fn subscriber_count(&self, table: &str) -> usize {
        self.subscribers
            .read()
            .map(|map| map.get(table).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_wire_format() {
        let event = ChangeEvent::new(ChangeKind::Insert, "meetings", "7");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "INSERT", "table": "meetings", "record_id": "7"})
        );
    }

    #[test]
    fn publish_reaches_only_the_table() {
        let hub = ChangeHub::new();
        let mut meetings = hub.subscribe("meetings");
        let mut tasks = hub.subscribe("tasks");

        let sent = hub.publish(&ChangeEvent::new(ChangeKind::Update, "meetings", "1"));
        assert_eq!(sent, 1);
        let msg = meetings.try_recv().unwrap();
        assert!(msg.contains("\"UPDATE\""));
        assert!(tasks.try_recv().is_err());
    }

    #[test]
    fn closed_subscribers_are_dropped() {
        let hub = ChangeHub::new();
        let rx = hub.subscribe("tasks");
        let keep = hub.subscribe("tasks");
        drop(rx);
        assert_eq!(hub.publish(&ChangeEvent::new(ChangeKind::Delete, "tasks", "3")), 1);
        assert_eq!(hub.subscriber_count("tasks"), 1);

        drop(keep);
        hub.prune("tasks");
        assert_eq!(hub.subscriber_count("tasks"), 0);
    }
}
