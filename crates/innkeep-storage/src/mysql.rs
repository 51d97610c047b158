use async_trait::async_trait;
use innkeep_core::error::StorageError;
use innkeep_core::repository::{BookingRepository, HotelRepository, Result, RoomRepository};
use innkeep_core::{
    Amount, Booking, BookingId, GuestRef, Hotel, HotelId, HotelPatch, ReservationInterval,
    ReservationStatus, Room, RoomId, RoomPatch, Stay,
};
use jiff::Timestamp;
use sqlx::mysql::MySqlRow;
use sqlx::{Executor, MySql, MySqlPool, Row};
use std::collections::HashMap;
use tracing::debug;

/// MySQL implementation of the repository contracts.
///
/// A booking row doubles as the reservation interval on its room, so a
/// status change updates both in one statement. Writes that depend on a
/// room's reservations lock the room row with `SELECT ... FOR UPDATE` for
/// the length of the transaction.
#[derive(Debug, Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

const HOTEL_COLUMNS: &str = "id, name, city, address, description, created_at_ms";
const ROOM_COLUMNS: &str =
    "id, hotel_id, number, kind, capacity, nightly_rate, is_available, created_at_ms";
const BOOKING_COLUMNS: &str = "id, room_id, hotel_id, guest, check_in_ms, check_out_ms, \
     nightly_rate, total_price, status, created_at_ms, updated_at_ms";

/// Statuses that keep a room or hotel from being deleted.
const ACTIVE_STATUSES: &str = "('pending', 'confirmed', 'confirmed-by-venue')";

impl MySqlStore {
    /// Creates a store from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a store by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Applies the bundled schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!()
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::Query(format!("migration failed: {e}")))
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn timestamp_from_ms(value: i64, column: &str) -> Result<Timestamp> {
    Timestamp::from_millisecond(value).map_err(|e| {
        StorageError::InvalidData(format!("invalid {column} timestamp '{value}': {e}"))
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

fn get<'r, T>(row: &'r MySqlRow, column: &str) -> Result<T>
where
    T: sqlx::Decode<'r, MySql> + sqlx::Type<MySql>,
{
    row.try_get(column).map_err(map_sqlx_error)
}

fn decode_hotel(row: &MySqlRow, rooms: Vec<RoomId>) -> Result<Hotel> {
    Ok(Hotel {
        id: HotelId::new(get::<String>(row, "id")?),
        name: get(row, "name")?,
        city: get(row, "city")?,
        address: get(row, "address")?,
        description: get(row, "description")?,
        rooms,
        created_at: timestamp_from_ms(get(row, "created_at_ms")?, "created_at_ms")?,
    })
}

fn decode_room(row: &MySqlRow) -> Result<Room> {
    let kind: String = get(row, "kind")?;
    Ok(Room::builder()
        .id(get::<String>(row, "id")?)
        .hotel_id(get::<String>(row, "hotel_id")?)
        .number(get::<String>(row, "number")?)
        .kind(kind.parse().map_err(StorageError::InvalidData)?)
        .capacity(get(row, "capacity")?)
        .nightly_rate(Amount::new(get(row, "nightly_rate")?))
        .is_available(get(row, "is_available")?)
        .created_at(timestamp_from_ms(get(row, "created_at_ms")?, "created_at_ms")?)
        .build())
}

fn decode_stay(row: &MySqlRow) -> Result<Stay> {
    let check_in = timestamp_from_ms(get(row, "check_in_ms")?, "check_in_ms")?;
    let check_out = timestamp_from_ms(get(row, "check_out_ms")?, "check_out_ms")?;
    Stay::new(check_in, check_out).map_err(|e| StorageError::InvalidData(e.to_string()))
}

fn decode_status(row: &MySqlRow) -> Result<ReservationStatus> {
    let status: String = get(row, "status")?;
    status.parse().map_err(StorageError::InvalidData)
}

fn decode_interval(row: &MySqlRow) -> Result<ReservationInterval> {
    Ok(ReservationInterval {
        booking_id: BookingId::new(get::<String>(row, "id")?),
        guest: GuestRef::new(get::<String>(row, "guest")?),
        stay: decode_stay(row)?,
        status: decode_status(row)?,
    })
}

fn decode_booking(row: &MySqlRow) -> Result<Booking> {
    Ok(Booking {
        id: BookingId::new(get::<String>(row, "id")?),
        room_id: RoomId::new(get::<String>(row, "room_id")?),
        hotel_id: HotelId::new(get::<String>(row, "hotel_id")?),
        guest: GuestRef::new(get::<String>(row, "guest")?),
        stay: decode_stay(row)?,
        nightly_rate: Amount::new(get(row, "nightly_rate")?),
        total_price: Amount::new(get(row, "total_price")?),
        status: decode_status(row)?,
        created_at: timestamp_from_ms(get(row, "created_at_ms")?, "created_at_ms")?,
        updated_at: timestamp_from_ms(get(row, "updated_at_ms")?, "updated_at_ms")?,
    })
}

async fn room_ids<'e, E>(executor: E, hotel: &HotelId) -> Result<Vec<RoomId>>
where
    E: Executor<'e, Database = MySql>,
{
    let rows = sqlx::query("SELECT id FROM rooms WHERE hotel_id = ? ORDER BY created_at_ms, id")
        .bind(hotel.as_str())
        .fetch_all(executor)
        .await
        .map_err(map_sqlx_error)?;
    rows.iter()
        .map(|row| get::<String>(row, "id").map(RoomId::new))
        .collect()
}

async fn reservations<'e, E>(executor: E, room: &RoomId) -> Result<Vec<ReservationInterval>>
where
    E: Executor<'e, Database = MySql>,
{
    let rows = sqlx::query(
        r#"
        SELECT id, guest, check_in_ms, check_out_ms, status
        FROM bookings
        WHERE room_id = ?
        ORDER BY created_at_ms, id
        "#,
    )
    .bind(room.as_str())
    .fetch_all(executor)
    .await
    .map_err(map_sqlx_error)?;
    rows.iter().map(decode_interval).collect()
}

async fn lock_room<'e, E>(executor: E, room: &RoomId) -> Result<Option<Room>>
where
    E: Executor<'e, Database = MySql>,
{
    let row = sqlx::query(&format!(
        "SELECT {ROOM_COLUMNS} FROM rooms WHERE id = ? FOR UPDATE"
    ))
    .bind(room.as_str())
    .fetch_optional(executor)
    .await
    .map_err(map_sqlx_error)?;
    row.as_ref().map(decode_room).transpose()
}

#[async_trait]
impl HotelRepository for MySqlStore {
    async fn insert_hotel(&self, hotel: Hotel) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO hotels (id, name, city, address, description, created_at_ms)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(hotel.id.as_str())
        .bind(&hotel.name)
        .bind(&hotel.city)
        .bind(&hotel.address)
        .bind(&hotel.description)
        .bind(hotel.created_at.as_millisecond())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(format!("hotel {}", hotel.id)))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn get_hotel(&self, id: &HotelId) -> Result<Option<Hotel>> {
        let row = sqlx::query(&format!("SELECT {HOTEL_COLUMNS} FROM hotels WHERE id = ?"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let rooms = room_ids(&self.pool, id).await?;
        decode_hotel(&row, rooms).map(Some)
    }

    async fn list_hotels(&self) -> Result<Vec<Hotel>> {
        let rows = sqlx::query(&format!(
            "SELECT {HOTEL_COLUMNS} FROM hotels ORDER BY created_at_ms, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let room_rows = sqlx::query("SELECT id, hotel_id FROM rooms ORDER BY created_at_ms, id")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        let mut rooms_by_hotel: HashMap<String, Vec<RoomId>> = HashMap::new();
        for row in &room_rows {
            let hotel_id: String = get(row, "hotel_id")?;
            let room_id: String = get(row, "id")?;
            rooms_by_hotel
                .entry(hotel_id)
                .or_default()
                .push(RoomId::new(room_id));
        }

        rows.iter()
            .map(|row| {
                let id: String = get(row, "id")?;
                let rooms = rooms_by_hotel.remove(&id).unwrap_or_default();
                decode_hotel(row, rooms)
            })
            .collect()
    }

    async fn update_hotel(&self, id: &HotelId, patch: &HotelPatch) -> Result<Option<Hotel>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let row = sqlx::query(&format!(
            "SELECT {HOTEL_COLUMNS} FROM hotels WHERE id = ? FOR UPDATE"
        ))
        .bind(id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
        let Some(row) = row else {
            return Ok(None);
        };

        let rooms = room_ids(&mut *tx, id).await?;
        let mut hotel = decode_hotel(&row, rooms)?;
        patch.apply(&mut hotel);

        sqlx::query(
            r#"
            UPDATE hotels
            SET name = ?, city = ?, address = ?, description = ?
            WHERE id = ?
            "#,
        )
        .bind(&hotel.name)
        .bind(&hotel.city)
        .bind(&hotel.address)
        .bind(&hotel.description)
        .bind(id.as_str())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(Some(hotel))
    }

    async fn delete_hotel(&self, id: &HotelId) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let exists = sqlx::query("SELECT id FROM hotels WHERE id = ? FOR UPDATE")
            .bind(id.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_error)?
            .is_some();
        if !exists {
            return Ok(false);
        }

        // lock the rooms so no reservation lands while we check
        sqlx::query("SELECT id FROM rooms WHERE hotel_id = ? FOR UPDATE")
            .bind(id.as_str())
            .fetch_all(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        let active: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM bookings b JOIN rooms r ON r.id = b.room_id \
             WHERE r.hotel_id = ? AND b.status IN {ACTIVE_STATUSES}"
        ))
        .bind(id.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
        if active > 0 {
            return Err(StorageError::Conflict(format!(
                "hotel {id} has {active} active reservations"
            )));
        }

        // rooms go with the hotel through the foreign key
        sqlx::query("DELETE FROM hotels WHERE id = ?")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        debug!(hotel = %id, "deleted hotel");
        Ok(true)
    }
}

#[async_trait]
impl RoomRepository for MySqlStore {
    async fn insert_room(&self, room: Room) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let hotel_exists = sqlx::query("SELECT id FROM hotels WHERE id = ? FOR SHARE")
            .bind(room.hotel_id.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_error)?
            .is_some();
        if !hotel_exists {
            return Err(StorageError::NotFound(format!("hotel {}", room.hotel_id)));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO rooms
                (id, hotel_id, number, kind, capacity, nightly_rate, is_available, created_at_ms)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(room.id.as_str())
        .bind(room.hotel_id.as_str())
        .bind(&room.number)
        .bind(room.kind.as_str())
        .bind(room.capacity)
        .bind(room.nightly_rate.minor_units())
        .bind(room.is_available)
        .bind(room.created_at.as_millisecond())
        .execute(&mut *tx)
        .await;

        match result {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => {
                return Err(StorageError::Conflict(format!(
                    "room {} or number {} in hotel {}",
                    room.id, room.number, room.hotel_id
                )));
            }
            Err(err) => return Err(map_sqlx_error(err)),
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn get_room(&self, id: &RoomId) -> Result<Option<Room>> {
        let row = sqlx::query(&format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE id = ?"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let room = decode_room(&row)?;
        let intervals = reservations(&self.pool, id).await?;
        Ok(Some(room.with_reservations(intervals)))
    }

    async fn list_rooms(&self, hotel: &HotelId) -> Result<Vec<Room>> {
        let rows = sqlx::query(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE hotel_id = ? ORDER BY created_at_ms, id"
        ))
        .bind(hotel.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let interval_rows = sqlx::query(
            r#"
            SELECT b.room_id, b.id, b.guest, b.check_in_ms, b.check_out_ms, b.status
            FROM bookings b
            JOIN rooms r ON r.id = b.room_id
            WHERE r.hotel_id = ?
            ORDER BY b.created_at_ms, b.id
            "#,
        )
        .bind(hotel.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let mut by_room: HashMap<String, Vec<ReservationInterval>> = HashMap::new();
        for row in &interval_rows {
            let room_id: String = get(row, "room_id")?;
            by_room.entry(room_id).or_default().push(decode_interval(row)?);
        }

        rows.iter()
            .map(|row| {
                let room = decode_room(row)?;
                let intervals = by_room.remove(room.id.as_str()).unwrap_or_default();
                Ok(room.with_reservations(intervals))
            })
            .collect()
    }

    async fn update_room(&self, id: &RoomId, patch: &RoomPatch) -> Result<Option<Room>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let Some(mut room) = lock_room(&mut *tx, id).await? else {
            return Ok(None);
        };
        patch.apply(&mut room);

        sqlx::query(
            r#"
            UPDATE rooms
            SET kind = ?, capacity = ?, nightly_rate = ?, is_available = ?
            WHERE id = ?
            "#,
        )
        .bind(room.kind.as_str())
        .bind(room.capacity)
        .bind(room.nightly_rate.minor_units())
        .bind(room.is_available)
        .bind(id.as_str())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let intervals = reservations(&mut *tx, id).await?;
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(Some(room.with_reservations(intervals)))
    }

    async fn delete_room(&self, id: &RoomId) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let Some(room) = lock_room(&mut *tx, id).await? else {
            return Ok(false);
        };
        let room = room.with_reservations(reservations(&mut *tx, id).await?);
        if room.has_active_reservations() {
            return Err(StorageError::Conflict(format!(
                "room {id} has active reservations"
            )));
        }

        sqlx::query("DELETE FROM rooms WHERE id = ?")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(true)
    }
}

#[async_trait]
impl BookingRepository for MySqlStore {
    async fn reserve(&self, booking: Booking) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let Some(room) = lock_room(&mut *tx, &booking.room_id).await? else {
            return Err(StorageError::NotFound(format!("room {}", booking.room_id)));
        };
        let mut room = room.with_reservations(reservations(&mut *tx, &booking.room_id).await?);
        room.reserve(booking.interval())?;

        let result = sqlx::query(
            r#"
            INSERT INTO bookings
                (id, room_id, hotel_id, guest, check_in_ms, check_out_ms,
                 nightly_rate, total_price, status, created_at_ms, updated_at_ms)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(booking.id.as_str())
        .bind(booking.room_id.as_str())
        .bind(booking.hotel_id.as_str())
        .bind(booking.guest.as_str())
        .bind(booking.stay.check_in().as_millisecond())
        .bind(booking.stay.check_out().as_millisecond())
        .bind(booking.nightly_rate.minor_units())
        .bind(booking.total_price.minor_units())
        .bind(booking.status.as_str())
        .bind(booking.created_at.as_millisecond())
        .bind(booking.updated_at.as_millisecond())
        .execute(&mut *tx)
        .await;

        match result {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => {
                return Err(StorageError::Conflict(format!("booking {}", booking.id)));
            }
            Err(err) => return Err(map_sqlx_error(err)),
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn get_booking(&self, id: &BookingId) -> Result<Option<Booking>> {
        let row = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        row.as_ref().map(decode_booking).transpose()
    }

    async fn list_bookings_for_room(&self, room: &RoomId) -> Result<Vec<Booking>> {
        let rows = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE room_id = ? ORDER BY check_in_ms, id"
        ))
        .bind(room.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        rows.iter().map(decode_booking).collect()
    }

    async fn list_bookings_for_guest(&self, guest: &GuestRef) -> Result<Vec<Booking>> {
        let rows = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE guest = ? ORDER BY check_in_ms, id"
        ))
        .bind(guest.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        rows.iter().map(decode_booking).collect()
    }

    async fn transition(
        &self,
        id: &BookingId,
        to: ReservationStatus,
        at: Timestamp,
    ) -> Result<Booking> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        // locking read so the reservations loaded below see the latest commit
        let room_id: Option<String> =
            sqlx::query_scalar("SELECT room_id FROM bookings WHERE id = ? FOR UPDATE")
                .bind(id.as_str())
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        let Some(room_id) = room_id.map(RoomId::new) else {
            return Err(StorageError::NotFound(format!("booking {id}")));
        };

        let Some(room) = lock_room(&mut *tx, &room_id).await? else {
            return Err(StorageError::NotFound(format!("room {room_id}")));
        };
        let mut room = room.with_reservations(reservations(&mut *tx, &room_id).await?);
        room.apply_status(id, to)?;

        sqlx::query("UPDATE bookings SET status = ?, updated_at_ms = ? WHERE id = ?")
            .bind(to.as_str())
            .bind(at.as_millisecond())
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        let row = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?"
        ))
        .bind(id.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
        let booking = decode_booking(&row)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(booking)
    }
}
