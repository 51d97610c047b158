use innkeep_core::{Amount, CoreError, Hotel, HotelId, Quote, Room, RoomId, RoomKind, Stay};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct HotelListQuery {
    pub city: Option<String>,
}

/// `?check_in=&check_out=`, each RFC 3339 or `YYYY-MM-DD`.
#[derive(Debug, Deserialize)]
pub struct StayQuery {
    pub check_in: String,
    pub check_out: String,
}

impl StayQuery {
    pub fn stay(&self) -> Result<Stay, CoreError> {
        Stay::parse(&self.check_in, &self.check_out)
    }
}

#[derive(Debug, Serialize)]
pub struct HotelResponse {
    pub id: HotelId,
    pub name: String,
    pub city: String,
    pub address: String,
    pub description: String,
    pub rooms: Vec<RoomId>,
    pub created_at: Timestamp,
}

impl From<Hotel> for HotelResponse {
    fn from(value: Hotel) -> Self {
        let Hotel {
            id,
            name,
            city,
            address,
            description,
            rooms,
            created_at,
        } = value;
        Self {
            id,
            name,
            city,
            address,
            description,
            rooms,
            created_at,
        }
    }
}

/// A room without its reservation list, which names other guests.
#[derive(Debug, Serialize)]
pub struct RoomResponse {
    pub id: RoomId,
    pub hotel_id: HotelId,
    pub number: String,
    pub kind: RoomKind,
    pub capacity: u32,
    pub nightly_rate: Amount,
    pub is_available: bool,
    pub created_at: Timestamp,
}

impl From<Room> for RoomResponse {
    fn from(value: Room) -> Self {
        Self {
            id: value.id,
            hotel_id: value.hotel_id,
            number: value.number,
            kind: value.kind,
            capacity: value.capacity,
            nightly_rate: value.nightly_rate,
            is_available: value.is_available,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub room_id: RoomId,
    pub hotel_id: HotelId,
    pub check_in: Timestamp,
    pub check_out: Timestamp,
    pub nights: u64,
    pub nightly_rate: Amount,
    pub total_price: Amount,
    pub available: bool,
}

impl From<Quote> for QuoteResponse {
    fn from(value: Quote) -> Self {
        Self {
            room_id: value.room_id,
            hotel_id: value.hotel_id,
            check_in: value.stay.check_in(),
            check_out: value.stay.check_out(),
            nights: value.nights,
            nightly_rate: value.nightly_rate,
            total_price: value.total_price,
            available: value.available,
        }
    }
}
