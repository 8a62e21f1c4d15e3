use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::db::{
    DbPool, item_store::ItemStore, purchase_store::PurchaseStore, shipping_store::ShippingStore,
};

pub mod extract;
pub mod item;
pub mod purchase;
pub mod shipping;

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub item_store: ItemStore,
    pub purchase_store: PurchaseStore,
    pub shipping_store: ShippingStore,
}

impl AppState {
    pub fn new(pool: DbPool) -> Self {
        Self {
            item_store: ItemStore::new(pool.clone()),
            purchase_store: PurchaseStore::new(pool.clone()),
            shipping_store: ShippingStore::new(pool),
        }
    }
}

/// All store routes, mounted under `/api`, plus a liveness route at `/`
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/items", post(item::create_item).get(item::get_all_items))
        .route("/items/{id}", put(item::update_item).delete(item::delete_item))
        .route("/inventory", post(item::set_inventory))
        .route(
            "/inventory/{item_id}",
            get(item::get_inventory).delete(item::zero_inventory),
        )
        .route("/items-with-inventory", get(item::get_items_with_inventory))
        .route(
            "/purchase",
            post(purchase::create_purchase).get(purchase::get_all_purchases),
        )
        .route("/purchase/{id}", delete(purchase::delete_purchase))
        .route("/purchase-details/{id}", get(purchase::get_purchase_details))
        .route(
            "/shipping",
            post(shipping::create_shipment).get(shipping::get_all_shipments),
        )
        .route(
            "/shipping/{id}",
            put(shipping::update_shipment).delete(shipping::delete_shipment),
        );

    Router::new()
        .route("/", get(|| async { "Store server is running." }))
        .nest("/api", api)
        .with_state(state)
}
