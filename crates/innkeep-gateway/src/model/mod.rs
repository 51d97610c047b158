mod booking;
mod catalog;
mod health;

pub use booking::{BookingListQuery, BookingResponse, CreateBookingRequest};
pub use catalog::{HotelListQuery, HotelResponse, QuoteResponse, RoomResponse, StayQuery};
pub use health::HealthResponse;

use serde::Serialize;

/// Envelope for list endpoints.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
}

impl<T, U> From<Vec<U>> for ListResponse<T>
where
    T: From<U>,
{
    fn from(value: Vec<U>) -> Self {
        Self {
            items: value.into_iter().map(T::from).collect(),
        }
    }
}
