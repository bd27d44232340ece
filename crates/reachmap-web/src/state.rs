//! Shared application state.

use reachmap_inventory::ClusterInventory;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub inventory: Arc<ClusterInventory>,
}

impl AppState {
    pub fn new(inventory: ClusterInventory) -> Self {
        Self {
            inventory: Arc::new(inventory),
        }
    }
}
