//! Catalog and reservation services.
//!
//! [`CatalogService`] manages hotels and rooms; [`BookingService`] quotes,
//! books and moves bookings through their lifecycle. Both run over any
//! [`innkeep_core::Store`] and take their ids from a [`Generator`].

pub mod catalog;
pub mod generator;
pub mod service;

pub use catalog::CatalogService;
pub use generator::seq::SeqGenerator;
pub use generator::ulid::UlidGenerator;
pub use generator::Generator;
pub use service::BookingService;
