//! # Resource Sample
//!
//! Runs a handful of actions against a seeded in-memory shop:
//!
//! 1. Several orders placed concurrently by different callers.
//! 2. An order that exceeds the stock, rejected with a validation error.
//! 3. A signup with two bad fields, rejected with both errors at once.
//! 4. A listing that only admins may see.
//!
//! `.env` is loaded if present; see [`DispatchConfig`] for the variables read.

use resource_framework::tracing::setup_tracing;
use resource_framework::DispatchConfig;
use resource_sample::identity::Caller;
use resource_sample::lifecycle::AppSystem;
use resource_sample::resources::{OrderInput, OrderResource, UserInput, UserResource};
use resource_sample::AppError;
use serde_json::json;
use tracing::{info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    setup_tracing();

    let config = DispatchConfig::from_env()?;
    info!(?config, "Starting resource sample");

    let system = AppSystem::new(config);
    system.seed();

    let span = tracing::info_span!("concurrent_orders");
    async {
        let mut handles = Vec::new();
        for (username, quantity) in [("alice", 2), ("bob", 1), ("alice", 3), ("bob", 4)] {
            let system = system.clone();
            handles.push(tokio::spawn(async move {
                system.try_call::<OrderResource, _>(
                    "place",
                    OrderInput {
                        product: Some(json!("WIDGET-1")),
                        quantity: Some(quantity),
                        ..Default::default()
                    },
                    Caller::new(username),
                )
            }));
        }
        for handle in handles {
            let order = handle.await??;
            let order = &order["order"];
            info!(number = %order["number"], user = %order["user"], "Order placed");
        }
        Ok::<_, AppError>(())
    }
    .instrument(span)
    .await?;

    match system.try_call::<OrderResource, _>(
        "place",
        OrderInput {
            product: Some(json!("GADGET-1")),
            quantity: Some(5),
            ..Default::default()
        },
        Caller::new("bob"),
    ) {
        Ok(order) => info!(%order, "Order placed"),
        Err(e) => warn!(error = %e, "Order rejected"),
    }

    let signup = system.call::<UserResource, _>(
        "create",
        UserInput {
            username: Some("x".into()),
            name: Some("Xavier".into()),
            email: Some("not-an-email".into()),
            ..Default::default()
        },
        Caller::new("xavier"),
    );
    info!(status = %signup.status, body = %signup.body, "Signup answered");

    let denied = system.call::<UserResource, _>("list", UserInput::default(), Caller::new("bob"));
    info!(status = %denied.status, "User listing as non-admin");

    let orders =
        system.try_call::<OrderResource, _>("list", OrderInput::default(), Caller::admin("root"))?;
    info!(orders = %orders["orders"], "All orders");

    info!("Resource sample completed");
    Ok(())
}
