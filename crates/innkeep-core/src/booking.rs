use crate::id::{BookingId, GuestRef, HotelId, RoomId};
use crate::money::Amount;
use crate::reservation::{ReservationInterval, ReservationStatus};
use crate::stay::Stay;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A guest's booking of one room for one stay.
///
/// The status always mirrors the interval the booking holds on its room.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub room_id: RoomId,
    pub hotel_id: HotelId,
    pub guest: GuestRef,
    pub stay: Stay,
    /// Rate at the time of booking; later rate changes do not reprice it.
    pub nightly_rate: Amount,
    pub total_price: Amount,
    pub status: ReservationStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Booking {
    /// The interval this booking records on its room.
    pub fn interval(&self) -> ReservationInterval {
        ReservationInterval {
            booking_id: self.id.clone(),
            guest: self.guest.clone(),
            stay: self.stay,
            status: self.status,
        }
    }

    pub fn nights(&self) -> u64 {
        self.stay.nights()
    }
}

/// Price and availability of a room for a prospective stay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub room_id: RoomId,
    pub hotel_id: HotelId,
    pub stay: Stay,
    pub nights: u64,
    pub nightly_rate: Amount,
    pub total_price: Amount,
    pub available: bool,
}
