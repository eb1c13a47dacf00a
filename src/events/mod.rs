use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, waiting for channel capacity.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Best-effort send used on request paths: a full or closed channel is
    /// logged and otherwise ignored.
    pub fn send_or_log(&self, event: Event) {
        if let Err(err) = self.sender.try_send(event) {
            let (reason, event) = match err {
                mpsc::error::TrySendError::Full(event) => ("channel full", event),
                mpsc::error::TrySendError::Closed(event) => ("channel closed", event),
            };
            warn!(reason, event = ?event, "dropping domain event");
        }
    }
}

/// Domain events published after a successful commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    UserRegistered(Uuid),
    EmployeeCreated {
        user_id: Uuid,
        is_admin: bool,
    },
    CartItemAdded {
        customer_id: Uuid,
        cart_item_id: Uuid,
    },
    CartCleared {
        customer_id: Uuid,
        removed: u64,
    },
    OrderPlaced {
        order_id: Uuid,
        customer_id: Uuid,
        total_price: Decimal,
    },
    OrderCancelled(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },
    OrderAssigned {
        order_id: Uuid,
        assignee_id: Uuid,
    },
    CouponRedeemed {
        coupon_id: Uuid,
        order_id: Uuid,
    },
    ModelSubmitted(Uuid),
    ModelReviewed {
        model_id: Uuid,
        new_status: String,
    },
}

/// Drains the event channel, logging each event until every sender is gone.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::OrderPlaced {
                order_id,
                total_price,
                ..
            } => info!(%order_id, %total_price, "order placed"),
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => info!(%order_id, %old_status, %new_status, "order status changed"),
            other => info!(event = ?other, "domain event"),
        }
    }

    info!("Event channel closed; event processing loop finished");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_or_log_delivers_when_capacity_available() {
        let (tx, mut rx) = mpsc::channel(1);
        let sender = EventSender::new(tx);
        let id = Uuid::new_v4();

        sender.send_or_log(Event::OrderCancelled(id));

        assert_eq!(rx.recv().await, Some(Event::OrderCancelled(id)));
    }

    #[tokio::test]
    async fn send_or_log_drops_when_full_or_closed() {
        let (tx, rx) = mpsc::channel(1);
        let sender = EventSender::new(tx);

        sender.send_or_log(Event::ModelSubmitted(Uuid::new_v4()));
        // Channel is full now; this must not block or panic.
        sender.send_or_log(Event::ModelSubmitted(Uuid::new_v4()));

        drop(rx);
        sender.send_or_log(Event::ModelSubmitted(Uuid::new_v4()));
        assert!(sender
            .send(Event::ModelSubmitted(Uuid::new_v4()))
            .await
            .is_err());
    }
}
