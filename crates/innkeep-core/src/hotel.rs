use crate::id::{HotelId, RoomId};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A hotel in the catalog.
///
/// `rooms` lists the identifiers of the hotel's rooms; the rooms themselves
/// are owned by the room repository and resolved through it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotel {
    pub id: HotelId,
    pub name: String,
    pub city: String,
    pub address: String,
    pub description: String,
    #[serde(default)]
    pub rooms: Vec<RoomId>,
    pub created_at: Timestamp,
}

impl Hotel {
    /// Case-insensitive city match used by catalog listings.
    pub fn is_in_city(&self, city: &str) -> bool {
        self.city.trim().eq_ignore_ascii_case(city.trim())
    }
}

/// Partial update of a hotel's descriptive fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotelPatch {
    pub name: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
}

impl HotelPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.city.is_none()
            && self.address.is_none()
            && self.description.is_none()
    }

    pub fn apply(&self, hotel: &mut Hotel) {
        if let Some(name) = &self.name {
            hotel.name = name.clone();
        }
        if let Some(city) = &self.city {
            hotel.city = city.clone();
        }
        if let Some(address) = &self.address {
            hotel.address = address.clone();
        }
        if let Some(description) = &self.description {
            hotel.description = description.clone();
        }
    }
}
