use crate::generator::Generator;
use async_trait::async_trait;
use innkeep_core::pricing::price_for;
use innkeep_core::{
    Booking, BookingError, BookingId, BookingParams, Bookings, Clock, CoreError, GuestRef,
    HotelId, Quote, ReservationStatus, Room, RoomId, Stay, StorageError, Store,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reservation desk over a [`Store`].
///
/// Availability is advisory until [`Bookings::book`]: the store re-checks
/// the stay and records it in one atomic step, so two overlapping requests
/// can never both be admitted.
pub struct BookingService<S, G, C> {
    store: Arc<S>,
    booking_ids: G,
    clock: C,
}

impl<S: Store, G: Generator, C: Clock> BookingService<S, G, C> {
    pub fn new(store: Arc<S>, booking_ids: G, clock: C) -> Self {
        Self {
            store,
            booking_ids,
            clock,
        }
    }

    async fn require_room(&self, id: &RoomId) -> Result<Room, BookingError> {
        self.store
            .get_room(id)
            .await?
            .ok_or_else(|| BookingError::RoomNotFound(id.clone()))
    }

    fn quote_room(room: &Room, stay: &Stay) -> Result<Quote, BookingError> {
        Ok(Quote {
            room_id: room.id.clone(),
            hotel_id: room.hotel_id.clone(),
            stay: *stay,
            nights: stay.nights(),
            nightly_rate: room.nightly_rate,
            total_price: price_for(room.nightly_rate, stay)?,
            available: room.is_available_for(stay),
        })
    }

    async fn move_to(
        &self,
        id: &BookingId,
        to: ReservationStatus,
    ) -> Result<Booking, BookingError> {
        let result = self.store.transition(id, to, self.clock.now()).await;

        match result {
            Ok(booking) => {
                info!(booking = %id, room = %booking.room_id, status = %to, "booking updated");
                Ok(booking)
            }
            // either the booking or the room it points at is gone
            Err(StorageError::NotFound(_)) => match self.store.get_booking(id).await? {
                Some(booking) => Err(BookingError::RoomNotFound(booking.room_id)),
                None => Err(BookingError::BookingNotFound(id.clone())),
            },
            Err(err) => {
                warn!(booking = %id, status = %to, error = %err, "booking transition rejected");
                Err(err.into())
            }
        }
    }
}

#[async_trait]
impl<S: Store, G: Generator, C: Clock> Bookings for BookingService<S, G, C> {
    async fn check_availability(&self, room: &RoomId, stay: &Stay) -> Result<bool, BookingError> {
        let room = self.require_room(room).await?;
        let available = room.is_available_for(stay);
        debug!(
            room = %room.id,
            check_in = %stay.check_in(),
            check_out = %stay.check_out(),
            available,
            "checked availability"
        );
        Ok(available)
    }

    async fn quote(&self, room: &RoomId, stay: &Stay) -> Result<Quote, BookingError> {
        let room = self.require_room(room).await?;
        Self::quote_room(&room, stay)
    }

    async fn available_rooms(
        &self,
        hotel: &HotelId,
        stay: &Stay,
    ) -> Result<Vec<Quote>, BookingError> {
        if self.store.get_hotel(hotel).await?.is_none() {
            return Err(BookingError::HotelNotFound(hotel.clone()));
        }

        self.store
            .list_rooms(hotel)
            .await?
            .iter()
            .filter(|room| room.is_available_for(stay))
            .map(|room| Self::quote_room(room, stay))
            .collect()
    }

    async fn book(&self, params: BookingParams) -> Result<Booking, BookingError> {
        if params.guest.as_str().trim().is_empty() {
            return Err(BookingError::InvalidInput(
                "guest cannot be empty".to_string(),
            ));
        }

        let room = self.require_room(&params.room_id).await?;
        let total_price = price_for(room.nightly_rate, &params.stay)?;
        let status = if params.by_staff {
            ReservationStatus::ConfirmedByVenue
        } else {
            ReservationStatus::Pending
        };

        let now = self.clock.now();
        let booking = Booking {
            id: BookingId::new(self.booking_ids.generate()),
            room_id: room.id.clone(),
            hotel_id: room.hotel_id.clone(),
            guest: params.guest,
            stay: params.stay,
            nightly_rate: room.nightly_rate,
            total_price,
            status,
            created_at: now,
            updated_at: now,
        };

        match self.store.reserve(booking.clone()).await {
            Ok(()) => {}
            // the room went away between the lookup and the reservation
            Err(StorageError::NotFound(_)) => return Err(BookingError::RoomNotFound(room.id)),
            Err(err) => {
                if let StorageError::Domain(CoreError::Conflict {
                    booking: existing, ..
                }) = &err
                {
                    warn!(
                        room = %room.id,
                        existing = %existing,
                        "stay overlaps an existing booking"
                    );
                }
                return Err(err.into());
            }
        }

        info!(
            booking = %booking.id,
            room = %booking.room_id,
            guest = %booking.guest,
            nights = booking.nights(),
            total_price = %booking.total_price,
            status = %booking.status,
            "booked room"
        );
        Ok(booking)
    }

    async fn confirm(&self, id: &BookingId) -> Result<Booking, BookingError> {
        self.move_to(id, ReservationStatus::Confirmed).await
    }

    async fn cancel(&self, id: &BookingId) -> Result<Booking, BookingError> {
        self.move_to(id, ReservationStatus::Cancelled).await
    }

    async fn complete(&self, id: &BookingId) -> Result<Booking, BookingError> {
        self.move_to(id, ReservationStatus::Completed).await
    }

    async fn booking(&self, id: &BookingId) -> Result<Option<Booking>, BookingError> {
        Ok(self.store.get_booking(id).await?)
    }

    async fn bookings_for_room(&self, room: &RoomId) -> Result<Vec<Booking>, BookingError> {
        Ok(self.store.list_bookings_for_room(room).await?)
    }

    async fn bookings_for_guest(&self, guest: &GuestRef) -> Result<Vec<Booking>, BookingError> {
        Ok(self.store.list_bookings_for_guest(guest).await?)
    }
}
