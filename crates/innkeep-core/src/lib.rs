//! Core types and traits for the innkeep hotel booking backend.
//!
//! This crate holds the booking kernel (stays, availability checks, pricing,
//! and the reservation lifecycle) together with the repository and service
//! traits shared by the storage backends, the services and the gateway.

pub mod availability;
pub mod booking;
pub mod clock;
pub mod error;
pub mod hotel;
pub mod id;
pub mod money;
pub mod pricing;
pub mod repository;
pub mod reservation;
pub mod room;
pub mod service;
pub mod stay;

pub use booking::{Booking, Quote};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{BookingError, CatalogError, CoreError, StorageError};
pub use hotel::{Hotel, HotelPatch};
pub use id::{BookingId, GuestRef, HotelId, RoomId};
pub use money::Amount;
pub use repository::{BookingRepository, HotelRepository, RoomRepository, Store};
pub use reservation::{ReservationInterval, ReservationStatus};
pub use room::{Room, RoomKind, RoomPatch};
pub use service::{BookingParams, Bookings, Catalog, NewHotel, NewRoom};
pub use stay::Stay;
