use crate::booking::{Booking, Quote};
use crate::error::{BookingError, CatalogError};
use crate::hotel::{Hotel, HotelPatch};
use crate::id::{BookingId, GuestRef, HotelId, RoomId};
use crate::money::Amount;
use crate::room::{Room, RoomKind, RoomPatch};
use crate::stay::Stay;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Parameters for adding a hotel to the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHotel {
    pub name: String,
    pub city: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub description: String,
}

/// Parameters for adding a room to a hotel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRoom {
    pub number: String,
    pub kind: RoomKind,
    pub capacity: u32,
    pub nightly_rate: Amount,
    #[serde(default = "default_open")]
    pub is_available: bool,
}

fn default_open() -> bool {
    true
}

/// Parameters for booking a room.
#[derive(Debug, Clone, TypedBuilder)]
pub struct BookingParams {
    #[builder(setter(into))]
    pub room_id: RoomId,
    #[builder(setter(into))]
    pub guest: GuestRef,
    pub stay: Stay,
    /// Set when staff books on the guest's behalf; the booking then starts
    /// out `confirmed-by-venue` instead of `pending`.
    #[builder(default)]
    pub by_staff: bool,
}

#[async_trait]
pub trait Catalog: Send + Sync + 'static {
    async fn create_hotel(&self, hotel: NewHotel) -> Result<Hotel, CatalogError>;

    async fn hotel(&self, id: &HotelId) -> Result<Option<Hotel>, CatalogError>;

    /// Lists hotels, optionally only those in `city` (case-insensitive).
    async fn hotels(&self, city: Option<&str>) -> Result<Vec<Hotel>, CatalogError>;

    async fn update_hotel(&self, id: &HotelId, patch: HotelPatch) -> Result<Hotel, CatalogError>;

    /// Returns `true` if the hotel existed and was removed.
    async fn delete_hotel(&self, id: &HotelId) -> Result<bool, CatalogError>;

    async fn add_room(&self, hotel: &HotelId, room: NewRoom) -> Result<Room, CatalogError>;

    async fn room(&self, id: &RoomId) -> Result<Option<Room>, CatalogError>;

    /// Lists the rooms of a hotel. Fails with `HotelNotFound` for an unknown hotel.
    async fn rooms(&self, hotel: &HotelId) -> Result<Vec<Room>, CatalogError>;

    async fn update_room(&self, id: &RoomId, patch: RoomPatch) -> Result<Room, CatalogError>;

    async fn delete_room(&self, id: &RoomId) -> Result<bool, CatalogError>;
}

#[async_trait]
pub trait Bookings: Send + Sync + 'static {
    async fn check_availability(&self, room: &RoomId, stay: &Stay) -> Result<bool, BookingError>;

    /// Prices `stay` on `room` and reports whether it is currently free.
    async fn quote(&self, room: &RoomId, stay: &Stay) -> Result<Quote, BookingError>;

    /// Quotes every room of `hotel` that is free for `stay`.
    async fn available_rooms(
        &self,
        hotel: &HotelId,
        stay: &Stay,
    ) -> Result<Vec<Quote>, BookingError>;

    async fn book(&self, params: BookingParams) -> Result<Booking, BookingError>;

    async fn confirm(&self, id: &BookingId) -> Result<Booking, BookingError>;

    /// Cancels the booking and releases its stay on the room.
    async fn cancel(&self, id: &BookingId) -> Result<Booking, BookingError>;

    async fn complete(&self, id: &BookingId) -> Result<Booking, BookingError>;

    async fn booking(&self, id: &BookingId) -> Result<Option<Booking>, BookingError>;

    async fn bookings_for_room(&self, room: &RoomId) -> Result<Vec<Booking>, BookingError>;

    async fn bookings_for_guest(&self, guest: &GuestRef) -> Result<Vec<Booking>, BookingError>;
}
