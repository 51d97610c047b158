use innkeep_core::{Amount, Booking, BookingId, GuestRef, HotelId, ReservationStatus, RoomId};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub room_id: RoomId,
    pub check_in: String,
    pub check_out: String,
    /// Guest to book for; only staff may name someone other than themselves.
    #[serde(default)]
    pub guest: Option<GuestRef>,
}

#[derive(Debug, Deserialize)]
pub struct BookingListQuery {
    pub guest: Option<GuestRef>,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: BookingId,
    pub room_id: RoomId,
    pub hotel_id: HotelId,
    pub guest: GuestRef,
    pub check_in: Timestamp,
    pub check_out: Timestamp,
    pub nights: u64,
    pub nightly_rate: Amount,
    pub total_price: Amount,
    pub status: ReservationStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Booking> for BookingResponse {
    fn from(value: Booking) -> Self {
        Self {
            nights: value.nights(),
            check_in: value.stay.check_in(),
            check_out: value.stay.check_out(),
            id: value.id,
            room_id: value.room_id,
            hotel_id: value.hotel_id,
            guest: value.guest,
            nightly_rate: value.nightly_rate,
            total_price: value.total_price,
            status: value.status,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
