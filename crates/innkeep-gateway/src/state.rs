use std::sync::Arc;

use innkeep_core::{Bookings, Catalog};

#[derive(Clone)]
pub struct AppState {
    catalog: Arc<dyn Catalog>,
    bookings: Arc<dyn Bookings>,
}

impl AppState {
    pub fn new(catalog: Arc<dyn Catalog>, bookings: Arc<dyn Bookings>) -> Self {
        Self { catalog, bookings }
    }

    pub fn catalog(&self) -> &dyn Catalog {
        self.catalog.as_ref()
    }

    pub fn bookings(&self) -> &dyn Bookings {
        self.bookings.as_ref()
    }
}
