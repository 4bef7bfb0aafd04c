//! # Order Resource
//!
//! Placing an order reserves stock on the product; cancelling returns it.
//! Callers see and act on their own orders only, admins on everyone's.
//!
//! Orders are rendered as an [`OrderView`], which shows the user and product
//! by their external IDs (username and SKU) instead of internal IDs.

use super::{caller, Request};
use crate::model::{Order, OrderStatus, Product, User};
use crate::store::Store;
use http::StatusCode;
use resource_framework::{
    ActionDescriptor, ActionRegistry, Entity, EntityId, ErrorRegistry, Reference, ReferenceKind,
    Resource, ResourceContext, ResourceError, ResourceResult,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::{Arc, OnceLock};
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderInput {
    /// The order acted on: an ID or an order number.
    pub order: Option<Value>,
    /// Who the order is placed for; defaults to the caller.
    pub user: Option<Value>,
    pub product: Option<Value>,
    pub quantity: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderView {
    pub number: String,
    pub user: String,
    pub product: String,
    pub quantity: u32,
    pub total_cents: u64,
    pub status: OrderStatus,
}

pub struct OrderResource {
    context: ResourceContext,
    store: Arc<Store>,
    quantity: Option<u32>,
    order: Option<Order>,
    user: Option<User>,
    product: Option<Product>,
    subject: String,
    is_admin: bool,
}

impl Resource for OrderResource {
    const NAME: &'static str = "Order";
    type Params = Request<OrderInput>;

    fn possible_errors() -> &'static ErrorRegistry {
        static ERRORS: OnceLock<ErrorRegistry> = OnceLock::new();
        ERRORS.get_or_init(|| {
            ErrorRegistry::new(
                Self::NAME,
                json!({
                    "invalid_order": {
                        "message": "Order does not exist",
                        "fields": ["order"],
                    },
                    "invalid_user": {
                        "message": "User does not exist",
                        "fields": ["user"],
                    },
                    "invalid_product": {
                        "message": "Product does not exist",
                        "fields": ["product"],
                    },
                    "product_required": {
                        "message": "Product is required",
                        "fields": ["product"],
                        "type": "required",
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
                    "insufficient_stock": {
                        "message": "Not enough stock",
                        "fields": ["quantity"],
                        "type": "conflict",
                    },
                    "already_cancelled": {
                        "message": "Order is already cancelled",
                        "fields": ["order"],
                        "type": "conflict",
                    },
                }),
            )
        })
    }

    fn actions() -> &'static ActionRegistry {
        static ACTIONS: OnceLock<ActionRegistry> = OnceLock::new();
        ACTIONS.get_or_init(|| {
            ActionRegistry::new(Self::NAME)
                .action("get", ActionDescriptor::new().wrapper("order"))
                .action(
                    "list",
                    ActionDescriptor::new().method("listOrders").wrapper("orders"),
                )
                .action(
                    "place",
                    ActionDescriptor::new()
                        .method("placeOrder")
                        .status(StatusCode::CREATED)
                        .wrapper("order"),
                )
                .action("cancel", ActionDescriptor::new().wrapper("order"))
        })
    }

    fn new(params: Request<OrderInput>, mut context: ResourceContext) -> ResourceResult<Self> {
        let (subject, is_admin) = caller(&context)?;
        let Request { store, input } = params;

        let order = match &input.order {
            Some(value) => Some(load::<Order>(&context, value, "invalid_order")?),
            None => None,
        };
        if let Some(order) = &order {
            let owner =
                context.convert_to_ide(Reference::<User>::Id(order.user_id), "invalid_user")?;
            if !is_admin && owner != subject {
                return context.not_found(Some("no such order"));
            }
        }

        let user = match &input.user {
            Some(value) => Some(load::<User>(&context, value, "invalid_user")?),
            None => None,
        };
        if let Some(user) = &user {
            if !is_admin && user.username != subject {
                return context.access_denied(Some("orders can only be placed for yourself"));
            }
        }

        // Staged so that a bad product and a bad quantity are reported together.
        let product = match &input.product {
            Some(value) => match load::<Product>(&context, value, "invalid_product") {
                Ok(product) => Some(product),
                Err(ResourceError::Validation(_)) => {
                    context.add_error("invalid_product", json!({ "value": value }))?;
                    None
                }
                Err(e) => return Err(e),
            },
            None => None,
        };
        if input.quantity == Some(0) {
            context.add_error("bad_quantity", Value::Null)?;
        }
        context.check_errors()?;

        Ok(Self {
            context,
            store,
            quantity: input.quantity,
            order,
            user,
            product,
            subject,
            is_admin,
        })
    }

    fn invoke(&mut self, method: &str) -> ResourceResult<()> {
        match method {
            "get" => self.get(),
            "listOrders" => self.list_orders(),
            "placeOrder" => self.place_order(),
            "cancel" => self.cancel(),
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

impl OrderResource {
    fn get(&mut self) -> ResourceResult<()> {
        let Some(order) = self.order.clone() else {
            return self.context.not_found(Some("no order given"));
        };
        let view = self.view(&order)?;
        self.context.output(view)?;
        Ok(())
    }

    fn list_orders(&mut self) -> ResourceResult<()> {
        let owner = if self.is_admin {
            None
        } else {
            Some(self.caller_id()?)
        };
        let orders: Vec<Order> = self
            .store
            .orders
            .all()
            .into_iter()
            .filter(|order| owner.map_or(true, |id| order.user_id == id))
            .collect();

        let views = orders
            .iter()
            .map(|order| self.view(order))
            .collect::<ResourceResult<Vec<_>>>()?;
        self.context.output(views)?;
        Ok(())
    }

    fn place_order(&mut self) -> ResourceResult<()> {
        let (product, quantity) = match (self.product.clone(), self.quantity) {
            (Some(product), Some(quantity)) => (product, quantity),
            (product, quantity) => {
                if product.is_none() {
                    self.context.add_error("product_required", Value::Null)?;
                }
                if quantity.is_none() {
                    self.context.add_error("quantity_required", Value::Null)?;
                }
                return self.context.fail_with_staged();
            }
        };

        let user_id = match &self.user {
            Some(user) => user.id,
            None => self.caller_id()?,
        };

        let reserved = self.store.products.try_update(product.id, |p| {
            if p.stock < quantity {
                return Err(p.stock);
            }
            p.stock -= quantity;
            Ok(())
        });
        let product = match reserved {
            Some(Ok(product)) => product,
            Some(Err(available)) => {
                return self
                    .context
                    .error("insufficient_stock", json!({ "available": available }));
            }
            None => return self.context.error("invalid_product", Value::Null),
        };

        let total_cents = product.price_cents.saturating_mul(u64::from(quantity));
        let order = self.store.orders.insert_with(|id| Order {
            id,
            number: Order::number_for(id),
            user_id,
            product_id: product.id,
            quantity,
            total_cents,
            status: OrderStatus::Placed,
        });
        info!(order = %order.number, user_id, product_id = product.id, quantity, "Order placed");

        let view = self.view(&order)?;
        self.order = Some(order);
        self.context.output(view)?;
        Ok(())
    }

    fn cancel(&mut self) -> ResourceResult<()> {
        let Some(order) = self.order.clone() else {
            return self.context.not_found(Some("no order given"));
        };

        // Status check and flip under one lock, so stock is returned once.
        let cancelled = self.store.orders.try_update(order.id, |o| {
            if o.status == OrderStatus::Cancelled {
                return Err(());
            }
            o.status = OrderStatus::Cancelled;
            Ok(())
        });
        let order = match cancelled {
            Some(Ok(order)) => order,
            Some(Err(())) => return self.context.error("already_cancelled", Value::Null),
            None => return self.context.not_found(None),
        };
        self.store
            .products
            .update(order.product_id, |p| p.stock = p.stock.saturating_add(order.quantity));
        info!(order = %order.number, "Order cancelled");

        let view = self.view(&order)?;
        self.order = Some(order);
        self.context.output(view)?;
        Ok(())
    }

    /// The caller's own user ID.
    fn caller_id(&self) -> ResourceResult<EntityId> {
        self.context
            .convert_to_id(Reference::<User>::Ide(self.subject.clone()), "invalid_user")
    }

    fn view(&self, order: &Order) -> ResourceResult<OrderView> {
        let user = self
            .context
            .resolve(ReferenceKind::Ide, Reference::<User>::Id(order.user_id), "invalid_user")?;
        let product = self.context.resolve(
            ReferenceKind::Ide,
            Reference::<Product>::Id(order.product_id),
            "invalid_product",
        )?;

        Ok(OrderView {
            number: order.number.clone(),
            user: user.into_ide().unwrap_or_default(),
            product: product.into_ide().unwrap_or_default(),
            quantity: order.quantity,
            total_cents: order.total_cents,
            status: order.status,
        })
    }
}

/// Loads a referenced record, failing with `error_code` for anything that does
/// not name an existing one.
fn load<E: Entity>(
    context: &ResourceContext,
    value: &Value,
    error_code: &str,
) -> ResourceResult<E> {
    match Reference::<E>::from_json(value) {
        Some(reference) => context.convert_to_object(reference, error_code),
        None => context.error(error_code, json!({ "value": value })),
    }
}
