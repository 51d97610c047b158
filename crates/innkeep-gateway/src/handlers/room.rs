use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppQuery, Caller};
use crate::model::{BookingResponse, ListResponse, QuoteResponse, RoomResponse, StayQuery};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use innkeep_core::{HotelId, NewRoom, RoomId, RoomPatch};

pub async fn create_room_handler(
    caller: Caller,
    Path(hotel_id): Path<HotelId>,
    State(state): State<AppState>,
    AppJson(request): AppJson<NewRoom>,
) -> Result<(StatusCode, Json<RoomResponse>)> {
    caller.require_staff()?;
    let room = state.catalog().add_room(&hotel_id, request).await?;
    Ok((StatusCode::CREATED, Json(room.into())))
}

pub async fn list_rooms_handler(
    Path(hotel_id): Path<HotelId>,
    State(state): State<AppState>,
) -> Result<Json<ListResponse<RoomResponse>>> {
    let rooms = state.catalog().rooms(&hotel_id).await?;
    Ok(Json(rooms.into()))
}

pub async fn get_room_handler(
    Path(room_id): Path<RoomId>,
    State(state): State<AppState>,
) -> Result<Json<RoomResponse>> {
    let room = state
        .catalog()
        .room(&room_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("room not found: {room_id}")))?;
    Ok(Json(room.into()))
}

pub async fn update_room_handler(
    caller: Caller,
    Path(room_id): Path<RoomId>,
    State(state): State<AppState>,
    AppJson(patch): AppJson<RoomPatch>,
) -> Result<Json<RoomResponse>> {
    caller.require_staff()?;
    let room = state.catalog().update_room(&room_id, patch).await?;
    Ok(Json(room.into()))
}

pub async fn delete_room_handler(
    caller: Caller,
    Path(room_id): Path<RoomId>,
    State(state): State<AppState>,
) -> Result<StatusCode> {
    caller.require_staff()?;
    if state.catalog().delete_room(&room_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("room not found: {room_id}")))
    }
}

pub async fn room_availability_handler(
    Path(room_id): Path<RoomId>,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<StayQuery>,
) -> Result<Json<QuoteResponse>> {
    let stay = query.stay()?;
    let quote = state.bookings().quote(&room_id, &stay).await?;
    Ok(Json(quote.into()))
}

pub async fn room_bookings_handler(
    caller: Caller,
    Path(room_id): Path<RoomId>,
    State(state): State<AppState>,
) -> Result<Json<ListResponse<BookingResponse>>> {
    caller.require_staff()?;
    let bookings = state.bookings().bookings_for_room(&room_id).await?;
    Ok(Json(bookings.into()))
}
