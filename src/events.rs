use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

// Define the various events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Customer order events
    OrderCreated(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },
    OrderCancelled(Uuid),

    // Production order events
    ProductionOrderCreated {
        production_order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        customer_order_id: Option<Uuid>,
    },
    ProductionOrderStatusChanged {
        production_order_id: Uuid,
        old_status: String,
        new_status: String,
    },
    ProductionOrderCompleted {
        production_order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    },

    // Inventory events
    StockAdjusted {
        product_id: Uuid,
        old_on_hand: i32,
        new_on_hand: i32,
        minimum_stock_level: i32,
        reason: String,
    },

    // Work center events
    WorkCenterStatusChanged {
        work_center_id: Uuid,
        old_status: String,
        new_status: String,
    },

    // Directory events
    ProductCreated(Uuid),
    CustomerCreated(Uuid),

    // Generic event for custom messages
    Generic {
        message: String,
        timestamp: DateTime<Utc>,
        metadata: serde_json::Value,
    },
}

impl Event {
    /// Create a generic event with string data
    pub fn with_data(data: String) -> Self {
        Event::Generic {
            message: data,
            timestamp: Utc::now(),
            metadata: serde_json::Value::Null,
        }
    }
}

// Function to process incoming events. Dashboard consumers subscribe here;
// handlers must stay non-blocking.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match event {
            Event::OrderCreated(order_id) => {
                info!(order_id = %order_id, "Order created; order dashboard refresh queued");
            }
            Event::ProductionOrderCreated {
                production_order_id,
                product_id,
                quantity,
                customer_order_id,
            } => {
                info!(
                    production_order_id = %production_order_id,
                    product_id = %product_id,
                    quantity = quantity,
                    customer_order_id = ?customer_order_id,
                    "Production order created; production dashboard refresh queued"
                );
            }
            Event::ProductionOrderCompleted {
                production_order_id,
                product_id,
                quantity,
            } => {
                info!(
                    production_order_id = %production_order_id,
                    product_id = %product_id,
                    quantity = quantity,
                    "Production order completed and receipted into stock"
                );
            }
            Event::StockAdjusted {
                product_id,
                old_on_hand,
                new_on_hand,
                minimum_stock_level,
                ref reason,
            } => {
                info!(
                    product_id = %product_id,
                    old_on_hand = old_on_hand,
                    new_on_hand = new_on_hand,
                    reason = %reason,
                    "Stock adjusted"
                );
                if new_on_hand < minimum_stock_level {
                    warn!(
                        product_id = %product_id,
                        on_hand = new_on_hand,
                        minimum_stock_level = minimum_stock_level,
                        "Low stock alert: product is under its minimum stock level"
                    );
                }
            }
            Event::OrderStatusChanged {
                order_id,
                ref old_status,
                ref new_status,
            } => {
                info!(order_id = %order_id, old_status = %old_status, new_status = %new_status, "Order status changed");
            }
            other => {
                info!(event = ?other, "No specific handler for event");
            }
        }
    }

    warn!("Event processing loop has ended");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_sender_delivers_to_channel() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        let order_id = Uuid::new_v4();

        sender.send(Event::OrderCreated(order_id)).await.unwrap();

        match rx.recv().await {
            Some(Event::OrderCreated(received)) => assert_eq!(received, order_id),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn event_sender_reports_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        let result = sender.send(Event::with_data("orphaned".into())).await;
        assert!(result.is_err());
    }
}
