//! Storage backends for the innkeep catalog and reservations.
//!
//! Two backends implement the repository traits from `innkeep-core`:
//! [`InMemoryStore`] for tests and single-process deployments, and
//! [`MySqlStore`] for persistence.

pub mod memory;
pub mod mysql;

pub use innkeep_core::error::StorageError;
pub use innkeep_core::repository::{BookingRepository, HotelRepository, RoomRepository, Store};
pub use memory::InMemoryStore;
pub use mysql::MySqlStore;
