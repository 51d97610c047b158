use crate::generator::Generator;
use async_trait::async_trait;
use innkeep_core::{
    Catalog, CatalogError, Clock, Hotel, HotelId, HotelPatch, NewHotel, NewRoom, Room, RoomId,
    RoomPatch, StorageError, Store,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Hotel and room management over a [`Store`].
pub struct CatalogService<S, G, C> {
    store: Arc<S>,
    hotel_ids: G,
    room_ids: G,
    clock: C,
}

impl<S: Store, G: Generator, C: Clock> CatalogService<S, G, C> {
    pub fn new(store: Arc<S>, hotel_ids: G, room_ids: G, clock: C) -> Self {
        Self {
            store,
            hotel_ids,
            room_ids,
            clock,
        }
    }

    fn require_text(field: &str, value: &str) -> Result<(), CatalogError> {
        if value.trim().is_empty() {
            return Err(CatalogError::InvalidInput(format!(
                "{field} cannot be empty"
            )));
        }
        Ok(())
    }

    fn require_capacity(capacity: u32) -> Result<(), CatalogError> {
        if capacity == 0 {
            return Err(CatalogError::InvalidInput(
                "capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    async fn require_hotel(&self, id: &HotelId) -> Result<Hotel, CatalogError> {
        self.store
            .get_hotel(id)
            .await?
            .ok_or_else(|| CatalogError::HotelNotFound(id.clone()))
    }
}

#[async_trait]
impl<S: Store, G: Generator, C: Clock> Catalog for CatalogService<S, G, C> {
    async fn create_hotel(&self, hotel: NewHotel) -> Result<Hotel, CatalogError> {
        Self::require_text("name", &hotel.name)?;
        Self::require_text("city", &hotel.city)?;

        let hotel = Hotel {
            id: HotelId::new(self.hotel_ids.generate()),
            name: hotel.name.trim().to_string(),
            city: hotel.city.trim().to_string(),
            address: hotel.address,
            description: hotel.description,
            rooms: Vec::new(),
            created_at: self.clock.now(),
        };
        self.store.insert_hotel(hotel.clone()).await?;

        info!(hotel = %hotel.id, city = %hotel.city, "created hotel");
        Ok(hotel)
    }

    async fn hotel(&self, id: &HotelId) -> Result<Option<Hotel>, CatalogError> {
        Ok(self.store.get_hotel(id).await?)
    }

    async fn hotels(&self, city: Option<&str>) -> Result<Vec<Hotel>, CatalogError> {
        let hotels = self.store.list_hotels().await?;
        Ok(match city {
            Some(city) => hotels.into_iter().filter(|h| h.is_in_city(city)).collect(),
            None => hotels,
        })
    }

    async fn update_hotel(&self, id: &HotelId, patch: HotelPatch) -> Result<Hotel, CatalogError> {
        if let Some(name) = &patch.name {
            Self::require_text("name", name)?;
        }
        if let Some(city) = &patch.city {
            Self::require_text("city", city)?;
        }

        let hotel = self
            .store
            .update_hotel(id, &patch)
            .await?
            .ok_or_else(|| CatalogError::HotelNotFound(id.clone()))?;

        info!(hotel = %id, "updated hotel");
        Ok(hotel)
    }

    async fn delete_hotel(&self, id: &HotelId) -> Result<bool, CatalogError> {
        let deleted = self.store.delete_hotel(id).await?;
        if deleted {
            info!(hotel = %id, "deleted hotel");
        }
        Ok(deleted)
    }

    async fn add_room(&self, hotel: &HotelId, room: NewRoom) -> Result<Room, CatalogError> {
        Self::require_text("number", &room.number)?;
        Self::require_capacity(room.capacity)?;

        let room = Room::builder()
            .id(self.room_ids.generate())
            .hotel_id(hotel.clone())
            .number(room.number.trim())
            .kind(room.kind)
            .capacity(room.capacity)
            .nightly_rate(room.nightly_rate)
            .is_available(room.is_available)
            .created_at(self.clock.now())
            .build();

        match self.store.insert_room(room.clone()).await {
            Ok(()) => {}
            Err(StorageError::NotFound(_)) => {
                return Err(CatalogError::HotelNotFound(hotel.clone()));
            }
            Err(err) => return Err(err.into()),
        }

        info!(hotel = %hotel, room = %room.id, number = %room.number, "added room");
        Ok(room)
    }

    async fn room(&self, id: &RoomId) -> Result<Option<Room>, CatalogError> {
        debug!(room = %id, "looking up room");
        Ok(self.store.get_room(id).await?)
    }

    async fn rooms(&self, hotel: &HotelId) -> Result<Vec<Room>, CatalogError> {
        self.require_hotel(hotel).await?;
        Ok(self.store.list_rooms(hotel).await?)
    }

    async fn update_room(&self, id: &RoomId, patch: RoomPatch) -> Result<Room, CatalogError> {
        if let Some(capacity) = patch.capacity {
            Self::require_capacity(capacity)?;
        }

        let room = self
            .store
            .update_room(id, &patch)
            .await?
            .ok_or_else(|| CatalogError::RoomNotFound(id.clone()))?;

        info!(room = %id, is_available = room.is_available, "updated room");
        Ok(room)
    }

    async fn delete_room(&self, id: &RoomId) -> Result<bool, CatalogError> {
        let deleted = self.store.delete_room(id).await?;
        if deleted {
            info!(room = %id, "deleted room");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::seq::SeqGenerator;
    use innkeep_core::{Amount, ManualClock, RoomKind};
    use innkeep_storage::InMemoryStore;

    type TestCatalog = CatalogService<InMemoryStore, SeqGenerator, ManualClock>;

    fn catalog() -> TestCatalog {
        CatalogService::new(
            Arc::new(InMemoryStore::new()),
            SeqGenerator::with_prefix("ht"),
            SeqGenerator::with_prefix("rm"),
            ManualClock::new("2024-01-01T00:00:00Z".parse().unwrap()),
        )
    }

    fn new_hotel(name: &str, city: &str) -> NewHotel {
        NewHotel {
            name: name.to_string(),
            city: city.to_string(),
            address: String::new(),
            description: String::new(),
        }
    }

    fn new_room(number: &str) -> NewRoom {
        NewRoom {
            number: number.to_string(),
            kind: RoomKind::Twin,
            capacity: 2,
            nightly_rate: Amount::new(80_00),
            is_available: true,
        }
    }

    #[tokio::test]
    async fn create_hotel_assigns_id_and_timestamp() {
        let catalog = catalog();

        let hotel = catalog
            .create_hotel(new_hotel(" Harbour View ", "Lisbon"))
            .await
            .unwrap();

        assert_eq!(hotel.id.as_str(), "ht000000");
        assert_eq!(hotel.name, "Harbour View");
        assert_eq!(hotel.created_at, "2024-01-01T00:00:00Z".parse::<jiff::Timestamp>().unwrap());
        assert_eq!(catalog.hotel(&hotel.id).await.unwrap(), Some(hotel));
    }

    #[tokio::test]
    async fn create_hotel_requires_name_and_city() {
        let catalog = catalog();

        let err = catalog.create_hotel(new_hotel("", "Lisbon")).await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidInput(_)));

        let err = catalog.create_hotel(new_hotel("Inn", "  ")).await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn hotels_filter_by_city() {
        let catalog = catalog();
        catalog.create_hotel(new_hotel("A", "Lisbon")).await.unwrap();
        catalog.create_hotel(new_hotel("B", "Porto")).await.unwrap();
        catalog.create_hotel(new_hotel("C", "lisbon")).await.unwrap();

        let names: Vec<_> = catalog
            .hotels(Some("LISBON"))
            .await
            .unwrap()
            .into_iter()
            .map(|h| h.name)
            .collect();
        assert_eq!(names, ["A", "C"]);
        assert_eq!(catalog.hotels(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn update_hotel_applies_patch() {
        let catalog = catalog();
        let hotel = catalog.create_hotel(new_hotel("A", "Lisbon")).await.unwrap();

        let updated = catalog
            .update_hotel(
                &hotel.id,
                HotelPatch {
                    description: Some("sea view".to_string()),
                    ..HotelPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.description, "sea view");
        assert_eq!(updated.name, "A");

        let err = catalog
            .update_hotel(&HotelId::new("nope"), HotelPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::HotelNotFound(_)));
    }

    #[tokio::test]
    async fn add_room_requires_known_hotel() {
        let catalog = catalog();

        let err = catalog
            .add_room(&HotelId::new("nope"), new_room("101"))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::HotelNotFound(_)));
    }

    #[tokio::test]
    async fn add_room_validates_and_rejects_duplicate_numbers() {
        let catalog = catalog();
        let hotel = catalog.create_hotel(new_hotel("A", "Lisbon")).await.unwrap();

        let room = catalog.add_room(&hotel.id, new_room("101")).await.unwrap();
        assert_eq!(room.id.as_str(), "rm000000");
        assert_eq!(room.hotel_id, hotel.id);

        let err = catalog
            .add_room(&hotel.id, new_room("101"))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Conflict(_)));

        let mut empty = new_room("102");
        empty.capacity = 0;
        let err = catalog.add_room(&hotel.id, empty).await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidInput(_)));

        let listed = catalog.rooms(&hotel.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        let hotel = catalog.hotel(&hotel.id).await.unwrap().unwrap();
        assert_eq!(hotel.rooms, vec![room.id]);
    }

    #[tokio::test]
    async fn rooms_of_unknown_hotel_is_not_found() {
        let catalog = catalog();

        let err = catalog.rooms(&HotelId::new("nope")).await.unwrap_err();
        assert!(matches!(err, CatalogError::HotelNotFound(_)));
    }

    #[tokio::test]
    async fn update_room_can_close_it() {
        let catalog = catalog();
        let hotel = catalog.create_hotel(new_hotel("A", "Lisbon")).await.unwrap();
        let room = catalog.add_room(&hotel.id, new_room("101")).await.unwrap();

        let updated = catalog
            .update_room(
                &room.id,
                RoomPatch {
                    is_available: Some(false),
                    ..RoomPatch::default()
                },
            )
            .await
            .unwrap();
        assert!(!updated.is_available);

        let err = catalog
            .update_room(
                &room.id,
                RoomPatch {
                    capacity: Some(0),
                    ..RoomPatch::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn delete_hotel_removes_rooms() {
        let catalog = catalog();
        let hotel = catalog.create_hotel(new_hotel("A", "Lisbon")).await.unwrap();
        let room = catalog.add_room(&hotel.id, new_room("101")).await.unwrap();

        assert!(catalog.delete_hotel(&hotel.id).await.unwrap());
        assert!(catalog.room(&room.id).await.unwrap().is_none());
        assert!(!catalog.delete_hotel(&hotel.id).await.unwrap());
    }
}
