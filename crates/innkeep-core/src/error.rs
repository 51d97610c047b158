use crate::id::{BookingId, HotelId, RoomId};
use crate::reservation::ReservationStatus;
use jiff::Timestamp;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by the booking kernel: stays, availability, pricing and
/// the reservation lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid stay: check-out {check_out} must be after check-in {check_in}")]
    InvalidRange {
        check_in: Timestamp,
        check_out: Timestamp,
    },
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("room {0} is not open for bookings")]
    RoomUnavailable(RoomId),
    #[error("room {room} is already booked by {booking} for an overlapping stay")]
    Conflict { room: RoomId, booking: BookingId },
    #[error("cannot move reservation from {from} to {to}")]
    InvalidTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },
    #[error("room {room} has no reservation for booking {booking}")]
    UnknownReservation { room: RoomId, booking: BookingId },
    #[error("room {room} already holds a reservation for booking {booking}")]
    DuplicateReservation { room: RoomId, booking: BookingId },
    #[error("price overflow: {nights} nights at {rate}")]
    AmountOverflow { rate: u64, nights: u64 },
}

/// Errors reported by repository backends.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("record already exists or is still in use: {0}")]
    Conflict(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error(transparent)]
    Domain(#[from] CoreError),
}

/// Errors returned by the hotel and room catalog.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("hotel not found: {0}")]
    HotelNotFound(HotelId),
    #[error("room not found: {0}")]
    RoomNotFound(RoomId),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<StorageError> for CatalogError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::Conflict(message) => Self::Conflict(message),
            StorageError::Domain(err) => Self::Conflict(err.to_string()),
            StorageError::Unavailable(message) | StorageError::Timeout(message) => {
                Self::Unavailable(message)
            }
            other => Self::Storage(other.to_string()),
        }
    }
}

/// Errors returned by the reservation desk.
#[derive(Debug, Clone, Error)]
pub enum BookingError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("hotel not found: {0}")]
    HotelNotFound(HotelId),
    #[error("room not found: {0}")]
    RoomNotFound(RoomId),
    #[error("booking not found: {0}")]
    BookingNotFound(BookingId),
    #[error(transparent)]
    Domain(CoreError),
    #[error("booking id already taken: {0}")]
    Duplicate(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<CoreError> for BookingError {
    fn from(value: CoreError) -> Self {
        match value {
            CoreError::InvalidRange { .. } | CoreError::InvalidDate(_) => {
                Self::InvalidInput(value.to_string())
            }
            other => Self::Domain(other),
        }
    }
}

impl From<StorageError> for BookingError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::Domain(err) => err.into(),
            StorageError::Conflict(message) => Self::Duplicate(message),
            StorageError::Unavailable(message) | StorageError::Timeout(message) => {
                Self::Unavailable(message)
            }
            other => Self::Storage(other.to_string()),
        }
    }
}
