use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use innkeep_core::error::StorageError;
use innkeep_core::repository::{BookingRepository, HotelRepository, Result, RoomRepository};
use innkeep_core::{
    Booking, BookingId, GuestRef, Hotel, HotelId, HotelPatch, ReservationStatus, Room, RoomId,
    RoomPatch,
};
use jiff::Timestamp;
use tracing::debug;

/// In-memory implementation of every repository, backed by DashMap.
///
/// Each room entry doubles as the room's lock: reservations and status
/// changes run while holding the room's shard write guard, which makes the
/// availability check and the write a single step.
///
/// Guards are always taken in the order hotel, room, booking.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    hotels: DashMap<HotelId, Hotel>,
    rooms: DashMap<RoomId, Room>,
    bookings: DashMap<BookingId, Booking>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HotelRepository for InMemoryStore {
    async fn insert_hotel(&self, hotel: Hotel) -> Result<()> {
        match self.hotels.entry(hotel.id.clone()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(format!("hotel {}", hotel.id))),
            Entry::Vacant(slot) => {
                slot.insert(hotel);
                Ok(())
            }
        }
    }

    async fn get_hotel(&self, id: &HotelId) -> Result<Option<Hotel>> {
        Ok(self.hotels.get(id).map(|hotel| hotel.clone()))
    }

    async fn list_hotels(&self) -> Result<Vec<Hotel>> {
        let mut hotels: Vec<Hotel> = self.hotels.iter().map(|e| e.value().clone()).collect();
        hotels.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        Ok(hotels)
    }

    async fn update_hotel(&self, id: &HotelId, patch: &HotelPatch) -> Result<Option<Hotel>> {
        let Some(mut hotel) = self.hotels.get_mut(id) else {
            return Ok(None);
        };
        patch.apply(&mut hotel);
        Ok(Some(hotel.clone()))
    }

    async fn delete_hotel(&self, id: &HotelId) -> Result<bool> {
        let Entry::Occupied(hotel) = self.hotels.entry(id.clone()) else {
            return Ok(false);
        };

        // Each room is checked and removed under its own guard, so a reserve
        // cannot land between the check and the removal. The hotel guard
        // keeps rooms from being added or removed meanwhile.
        let mut removed = Vec::with_capacity(hotel.get().rooms.len());
        for room_id in &hotel.get().rooms {
            if let Some(entry) = self
                .rooms
                .remove_if(room_id, |_, room| !room.has_active_reservations())
            {
                removed.push(entry);
            } else if self.rooms.contains_key(room_id) {
                for (room_id, room) in removed {
                    self.rooms.insert(room_id, room);
                }
                return Err(StorageError::Conflict(format!(
                    "hotel {id}: room {room_id} has active reservations"
                )));
            }
        }

        let (_, hotel) = hotel.remove_entry();
        debug!(hotel = %id, rooms = removed.len(), "deleted hotel");
        Ok(true)
    }
}

#[async_trait]
impl RoomRepository for InMemoryStore {
    async fn insert_room(&self, room: Room) -> Result<()> {
        let Some(mut hotel) = self.hotels.get_mut(&room.hotel_id) else {
            return Err(StorageError::NotFound(format!("hotel {}", room.hotel_id)));
        };

        let number_taken = hotel.rooms.iter().any(|room_id| {
            self.rooms
                .get(room_id)
                .is_some_and(|existing| existing.number == room.number)
        });
        if number_taken {
            return Err(StorageError::Conflict(format!(
                "hotel {} already has room number {}",
                room.hotel_id, room.number
            )));
        }

        match self.rooms.entry(room.id.clone()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(format!("room {}", room.id))),
            Entry::Vacant(slot) => {
                hotel.rooms.push(room.id.clone());
                slot.insert(room);
                Ok(())
            }
        }
    }

    async fn get_room(&self, id: &RoomId) -> Result<Option<Room>> {
        Ok(self.rooms.get(id).map(|room| room.clone()))
    }

    async fn list_rooms(&self, hotel: &HotelId) -> Result<Vec<Room>> {
        let Some(hotel) = self.hotels.get(hotel) else {
            return Ok(Vec::new());
        };
        Ok(hotel
            .rooms
            .iter()
            .filter_map(|room_id| self.rooms.get(room_id).map(|room| room.clone()))
            .collect())
    }

    async fn update_room(&self, id: &RoomId, patch: &RoomPatch) -> Result<Option<Room>> {
        let Some(mut room) = self.rooms.get_mut(id) else {
            return Ok(None);
        };
        patch.apply(&mut room);
        Ok(Some(room.clone()))
    }

    async fn delete_room(&self, id: &RoomId) -> Result<bool> {
        let Some(hotel_id) = self.rooms.get(id).map(|room| room.hotel_id.clone()) else {
            return Ok(false);
        };

        let mut hotel = self.hotels.get_mut(&hotel_id);
        match self.rooms.entry(id.clone()) {
            Entry::Vacant(_) => Ok(false),
            Entry::Occupied(room) if room.get().has_active_reservations() => Err(
                StorageError::Conflict(format!("room {id} has active reservations")),
            ),
            Entry::Occupied(room) => {
                room.remove();
                if let Some(hotel) = hotel.as_mut() {
                    hotel.rooms.retain(|room_id| room_id != id);
                }
                Ok(true)
            }
        }
    }
}

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn reserve(&self, booking: Booking) -> Result<()> {
        let Some(mut room) = self.rooms.get_mut(&booking.room_id) else {
            return Err(StorageError::NotFound(format!("room {}", booking.room_id)));
        };
        if self.bookings.contains_key(&booking.id) {
            return Err(StorageError::Conflict(format!("booking {}", booking.id)));
        }

        room.reserve(booking.interval())?;
        self.bookings.insert(booking.id.clone(), booking);
        Ok(())
    }

    async fn get_booking(&self, id: &BookingId) -> Result<Option<Booking>> {
        Ok(self.bookings.get(id).map(|booking| booking.clone()))
    }

    async fn list_bookings_for_room(&self, room: &RoomId) -> Result<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|e| &e.value().room_id == room)
            .map(|e| e.value().clone())
            .collect();
        bookings.sort_by(|a, b| (a.stay.check_in(), &a.id).cmp(&(b.stay.check_in(), &b.id)));
        Ok(bookings)
    }

    async fn list_bookings_for_guest(&self, guest: &GuestRef) -> Result<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|e| &e.value().guest == guest)
            .map(|e| e.value().clone())
            .collect();
        bookings.sort_by(|a, b| (a.stay.check_in(), &a.id).cmp(&(b.stay.check_in(), &b.id)));
        Ok(bookings)
    }

    async fn transition(
        &self,
        id: &BookingId,
        to: ReservationStatus,
        at: Timestamp,
    ) -> Result<Booking> {
        let Some(room_id) = self.bookings.get(id).map(|b| b.room_id.clone()) else {
            return Err(StorageError::NotFound(format!("booking {id}")));
        };
        let Some(mut room) = self.rooms.get_mut(&room_id) else {
            return Err(StorageError::NotFound(format!("room {room_id}")));
        };

        room.apply_status(id, to)?;

        let Some(mut booking) = self.bookings.get_mut(id) else {
            return Err(StorageError::NotFound(format!("booking {id}")));
        };
        booking.status = to;
        booking.updated_at = at;
        Ok(booking.clone())
    }
}
