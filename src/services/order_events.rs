use crate::models::OrderStatus;
use serde::Serialize;
use tokio::sync::broadcast;

/// Snapshot pushed to tracking streams whenever an order is created or its
/// status changes.
#[derive(Debug, Clone, Serialize)]
pub struct OrderEvent {
    pub order_id: String,
    pub user_id: String,
    pub auth_uid: String,
    pub status: OrderStatus,
    pub order: serde_json::Value,
}

/// In-process broadcast hub. Slow subscribers lag and skip missed events;
/// dropping the receiver is the unsubscribe.
#[derive(Clone)]
pub struct OrderEvents {
    tx: broadcast::Sender<OrderEvent>,
}

impl OrderEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        OrderEvents { tx }
    }

    pub fn publish(&self, event: OrderEvent) {
        // No receivers is fine — nobody is watching this order right now
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.tx.subscribe()
    }
}

impl Default for OrderEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let hub = OrderEvents::new();
        let mut rx = hub.subscribe();

        hub.publish(OrderEvent {
            order_id: "abc".to_string(),
            user_id: "u-1".to_string(),
            auth_uid: "u-1".to_string(),
            status: OrderStatus::Confirmed,
            order: serde_json::json!({}),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.order_id, "abc");
        assert_eq!(event.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn publish_without_subscribers_does_not_panic() {
        let hub = OrderEvents::new();
        hub.publish(OrderEvent {
            order_id: "abc".to_string(),
            user_id: "u-1".to_string(),
            auth_uid: "u-1".to_string(),
            status: OrderStatus::Pending,
            order: serde_json::json!({}),
        });
    }
}
