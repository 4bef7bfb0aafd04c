use resource_framework::{Entity, EntityId};
use serde::Serialize;

/// A catalog item. Prices are in cents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: EntityId,
    pub sku: String,
    pub name: String,
    pub price_cents: u64,
    pub stock: u32,
}

impl Product {
    pub fn new(
        sku: impl Into<String>,
        name: impl Into<String>,
        price_cents: u64,
        stock: u32,
    ) -> Self {
        Self {
            id: 0,
            sku: sku.into(),
            name: name.into(),
            price_cents,
            stock,
        }
    }
}

impl Entity for Product {
    const TYPE_NAME: &'static str = "Product";

    fn id(&self) -> EntityId {
        self.id
    }

    fn ide(&self) -> &str {
        &self.sku
    }
}
