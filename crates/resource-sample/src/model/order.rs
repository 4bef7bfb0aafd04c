use resource_framework::{Entity, EntityId};
use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Placed,
    Cancelled,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Placed => write!(f, "placed"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A placed order for one product line.
///
/// Referenced externally by its order `number` (`ORD-000042`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: EntityId,
    pub number: String,
    pub user_id: EntityId,
    pub product_id: EntityId,
    pub quantity: u32,
    pub total_cents: u64,
    pub status: OrderStatus,
}

impl Order {
    pub fn number_for(id: EntityId) -> String {
        format!("ORD-{id:06}")
    }
}

impl Entity for Order {
    const TYPE_NAME: &'static str = "Order";

    fn id(&self) -> EntityId {
        self.id
    }

    fn ide(&self) -> &str {
        &self.number
    }
}
