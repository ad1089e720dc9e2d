pub mod customers;
pub mod inventory;
pub mod orders;
pub mod production;
pub mod products;
pub mod work_centers;

use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub customers: Arc<crate::services::customers::CustomerService>,
    pub inventory: Arc<crate::services::inventory::InventoryService>,
    pub orders: Arc<crate::services::orders::CustomerOrderService>,
    pub production_orders: Arc<crate::services::production::ProductionOrderService>,
    pub products: Arc<crate::services::products::ProductService>,
    pub work_centers: Arc<crate::services::work_centers::WorkCenterService>,
}

impl AppServices {
    /// Build the AppServices container, wiring the order-intake pipeline:
    /// orders depend on the inventory check and production trigger, which in
    /// turn resolves work centers.
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        let inventory = Arc::new(crate::services::inventory::InventoryService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let work_centers = Arc::new(crate::services::work_centers::WorkCenterService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let production_orders = Arc::new(crate::services::production::ProductionOrderService::new(
            db_pool.clone(),
            work_centers.clone(),
            event_sender.clone(),
        ));
        let orders = Arc::new(crate::services::orders::CustomerOrderService::new(
            db_pool.clone(),
            inventory.clone(),
            production_orders.clone(),
            event_sender.clone(),
        ));
        let products = Arc::new(crate::services::products::ProductService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let customers = Arc::new(crate::services::customers::CustomerService::new(
            db_pool,
            event_sender,
        ));

        Self {
            customers,
            inventory,
            orders,
            production_orders,
            products,
            work_centers,
        }
    }
}
