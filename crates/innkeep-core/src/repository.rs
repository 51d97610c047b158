use crate::booking::Booking;
use crate::error::StorageError;
use crate::hotel::{Hotel, HotelPatch};
use crate::id::{BookingId, GuestRef, HotelId, RoomId};
use crate::reservation::ReservationStatus;
use crate::room::{Room, RoomPatch};
use async_trait::async_trait;
use jiff::Timestamp;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

#[async_trait]
pub trait HotelRepository: Send + Sync + 'static {
    /// Inserts a new hotel. Returns `Err(Conflict)` if the id is taken.
    async fn insert_hotel(&self, hotel: Hotel) -> Result<()>;

    /// Returns `None` if the hotel does not exist.
    async fn get_hotel(&self, id: &HotelId) -> Result<Option<Hotel>>;

    async fn list_hotels(&self) -> Result<Vec<Hotel>>;

    /// Applies `patch` and returns the updated hotel, or `None` if it does not exist.
    async fn update_hotel(&self, id: &HotelId, patch: &HotelPatch) -> Result<Option<Hotel>>;

    /// Deletes a hotel together with its rooms.
    ///
    /// Returns `Err(Conflict)` if any of its rooms still has an active
    /// reservation, and `false` if the hotel did not exist.
    async fn delete_hotel(&self, id: &HotelId) -> Result<bool>;
}

#[async_trait]
pub trait RoomRepository: Send + Sync + 'static {
    /// Inserts a room and links it to its hotel.
    ///
    /// Returns `Err(NotFound)` if the hotel does not exist and
    /// `Err(Conflict)` if the id or the room number within the hotel is taken.
    async fn insert_room(&self, room: Room) -> Result<()>;

    /// Returns the room with all its recorded reservations.
    async fn get_room(&self, id: &RoomId) -> Result<Option<Room>>;

    async fn list_rooms(&self, hotel: &HotelId) -> Result<Vec<Room>>;

    /// Applies `patch` and returns the updated room, or `None` if it does not exist.
    async fn update_room(&self, id: &RoomId, patch: &RoomPatch) -> Result<Option<Room>>;

    /// Deletes a room and unlinks it from its hotel.
    ///
    /// Returns `Err(Conflict)` if it still has an active reservation.
    async fn delete_room(&self, id: &RoomId) -> Result<bool>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync + 'static {
    /// Records `booking` and its room interval in one step.
    ///
    /// The availability check runs again inside the same exclusive section
    /// as the write, so two concurrent requests for overlapping stays cannot
    /// both succeed. Fails with `Err(NotFound)` if the room does not exist,
    /// `Err(Domain(..))` if the room rejects the interval and `Err(Conflict)`
    /// if the booking id is taken.
    async fn reserve(&self, booking: Booking) -> Result<()>;

    async fn get_booking(&self, id: &BookingId) -> Result<Option<Booking>>;

    async fn list_bookings_for_room(&self, room: &RoomId) -> Result<Vec<Booking>>;

    async fn list_bookings_for_guest(&self, guest: &GuestRef) -> Result<Vec<Booking>>;

    /// Moves a booking and its room interval to `to` together.
    ///
    /// Returns the updated booking. Fails with `Err(NotFound)` if the booking
    /// does not exist and `Err(Domain(..))` if the transition is rejected.
    async fn transition(
        &self,
        id: &BookingId,
        to: ReservationStatus,
        at: Timestamp,
    ) -> Result<Booking>;
}

/// A backend implementing every repository.
pub trait Store: HotelRepository + RoomRepository + BookingRepository {}

impl<T: HotelRepository + RoomRepository + BookingRepository> Store for T {}
