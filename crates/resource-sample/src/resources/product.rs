//! # Product Resource
//!
//! Catalog reads are open to any signed-in caller; creating products and
//! restocking them needs the admin role.

use super::{caller, Request};
use crate::model::Product;
use crate::store::Store;
use http::StatusCode;
use resource_framework::{
    ActionDescriptor, ActionRegistry, ErrorRegistry, Reference, Resource, ResourceContext,
    ResourceResult,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::{Arc, OnceLock};
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductInput {
    /// The product acted on: an ID or a SKU.
    pub product: Option<Value>,
    pub sku: Option<String>,
    pub name: Option<String>,
    pub price_cents: Option<u64>,
    pub quantity: Option<u32>,
}

pub struct ProductResource {
    context: ResourceContext,
    store: Arc<Store>,
    input: ProductInput,
    product: Option<Product>,
    is_admin: bool,
}

impl Resource for ProductResource {
    const NAME: &'static str = "Product";
    type Params = Request<ProductInput>;

    fn possible_errors() -> &'static ErrorRegistry {
        static ERRORS: OnceLock<ErrorRegistry> = OnceLock::new();
        ERRORS.get_or_init(|| {
            ErrorRegistry::new(
                Self::NAME,
                json!({
                    "invalid_product": {
                        "message": "Product does not exist",
                        "fields": ["product"],
                    },
                    "sku_required": {
                        "message": "SKU is required",
                        "fields": ["sku"],
                        "type": "required",
                    },
                    "sku_taken": {
                        "message": "SKU is already in use",
                        "fields": ["sku"],
                        "type": "conflict",
                    },
                    "name_required": {
                        "message": "Name is required",
                        "fields": ["name"],
                        "type": "required",
                    },
                    "price_required": {
                        "message": "Price is required",
                        "fields": ["price_cents"],
                        "type": "required",
                    },
                    "bad_price": {
                        "message": "Price must be positive",
                        "fields": ["price_cents"],
                        "type": "range",
                        "min": 1,
                    },
                    "quantity_required": {
                        "message": "Quantity is required",
                        "fields": ["quantity"],
                        "type": "required",
                    },
                    "bad_quantity": {
                        "message": "Quantity must be positive",
                        "fields": ["quantity"],
                        "type": "range",
                        "min": 1,
                    },
                }),
            )
        })
    }

    fn actions() -> &'static ActionRegistry {
        static ACTIONS: OnceLock<ActionRegistry> = OnceLock::new();
        ACTIONS.get_or_init(|| {
            ActionRegistry::new(Self::NAME)
                .action("get", ActionDescriptor::new().wrapper("product"))
                .action(
                    "list",
                    ActionDescriptor::new()
                        .method("listProducts")
                        .wrapper("products"),
                )
                .action(
                    "create",
                    ActionDescriptor::new()
                        .status(StatusCode::CREATED)
                        .wrapper("product"),
                )
                .action("restock", ActionDescriptor::new().wrapper("product"))
        })
    }

    fn new(params: Request<ProductInput>, mut context: ResourceContext) -> ResourceResult<Self> {
        let (_, is_admin) = caller(&context)?;
        let Request { store, input } = params;

        let product = match &input.product {
            Some(value) => {
                let Some(reference) = Reference::<Product>::from_json(value) else {
                    return context.error("invalid_product", json!({ "value": value }));
                };
                Some(context.convert_to_object(reference, "invalid_product")?)
            }
            None => None,
        };

        if let Some(sku) = &input.sku {
            if sku.trim().is_empty() {
                context.add_error("sku_required", Value::Null)?;
            } else if store.products.find_where(|p| &p.sku == sku).is_some() {
                context.add_error("sku_taken", json!({ "value": sku }))?;
            }
        }
        if input.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            context.add_error("name_required", Value::Null)?;
        }
        if input.price_cents == Some(0) {
            context.add_error("bad_price", Value::Null)?;
        }
        if input.quantity == Some(0) {
            context.add_error("bad_quantity", Value::Null)?;
        }
        context.check_errors()?;

        Ok(Self {
            context,
            store,
            input,
            product,
            is_admin,
        })
    }

    fn invoke(&mut self, method: &str) -> ResourceResult<()> {
        match method {
            "get" => self.get(),
            "listProducts" => self.list_products(),
            "create" => self.create(),
            "restock" => self.restock(),
            other => Self::unknown_method(other),
        }
    }

    fn context(&self) -> &ResourceContext {
        &self.context
    }

    fn context_mut(&mut self) -> &mut ResourceContext {
        &mut self.context
    }
}

impl ProductResource {
    fn require_admin(&self) -> ResourceResult<()> {
        if self.is_admin {
            Ok(())
        } else {
            self.context.access_denied(Some("admin role required"))
        }
    }

    fn get(&mut self) -> ResourceResult<()> {
        let Some(product) = &self.product else {
            return self.context.not_found(Some("no product given"));
        };
        self.context.output(product)?;
        Ok(())
    }

    fn list_products(&mut self) -> ResourceResult<()> {
        self.context.output(self.store.products.all())?;
        Ok(())
    }

    fn create(&mut self) -> ResourceResult<()> {
        self.require_admin()?;

        let (sku, name, price_cents) = (
            self.input.sku.clone(),
            self.input.name.clone(),
            self.input.price_cents,
        );
        if sku.is_none() {
            self.context.add_error("sku_required", Value::Null)?;
        }
        if name.is_none() {
            self.context.add_error("name_required", Value::Null)?;
        }
        if price_cents.is_none() {
            self.context.add_error("price_required", Value::Null)?;
        }
        self.context.check_errors()?;

        let stock = self.input.quantity.unwrap_or(0);
        let sku = sku.unwrap_or_default();
        let created = self.store.products.insert_unique_with(
            |p| p.sku == sku,
            |id| Product {
                id,
                ..Product::new(
                    sku.clone(),
                    name.unwrap_or_default(),
                    price_cents.unwrap_or_default(),
                    stock,
                )
            },
        );
        let Some(product) = created else {
            return self.context.error("sku_taken", json!({ "value": sku }));
        };
        info!(product_id = product.id, sku = %product.sku, "Product created");

        self.context.output(&product)?;
        self.product = Some(product);
        Ok(())
    }

    fn restock(&mut self) -> ResourceResult<()> {
        self.require_admin()?;

        let Some(id) = self.product.as_ref().map(|p| p.id) else {
            return self.context.not_found(Some("no product given"));
        };
        let Some(quantity) = self.input.quantity else {
            return self.context.error("quantity_required", Value::Null);
        };

        let Some(product) = self
            .store
            .products
            .update(id, |p| p.stock = p.stock.saturating_add(quantity))
        else {
            return self.context.not_found(None);
        };
        info!(product_id = product.id, stock = product.stock, "Product restocked");

        self.context.output(&product)?;
        self.product = Some(product);
        Ok(())
    }
}
