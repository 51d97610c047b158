use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppQuery, Caller};
use crate::model::{HotelListQuery, HotelResponse, ListResponse, QuoteResponse, StayQuery};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use innkeep_core::{HotelId, HotelPatch, NewHotel};

pub async fn create_hotel_handler(
    caller: Caller,
    State(state): State<AppState>,
    AppJson(request): AppJson<NewHotel>,
) -> Result<(StatusCode, Json<HotelResponse>)> {
    caller.require_staff()?;
    let hotel = state.catalog().create_hotel(request).await?;
    Ok((StatusCode::CREATED, Json(hotel.into())))
}

pub async fn list_hotels_handler(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<HotelListQuery>,
) -> Result<Json<ListResponse<HotelResponse>>> {
    let hotels = state.catalog().hotels(query.city.as_deref()).await?;
    Ok(Json(hotels.into()))
}

pub async fn get_hotel_handler(
    Path(hotel_id): Path<HotelId>,
    State(state): State<AppState>,
) -> Result<Json<HotelResponse>> {
    let hotel = state
        .catalog()
        .hotel(&hotel_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("hotel not found: {hotel_id}")))?;
    Ok(Json(hotel.into()))
}

pub async fn update_hotel_handler(
    caller: Caller,
    Path(hotel_id): Path<HotelId>,
    State(state): State<AppState>,
    AppJson(patch): AppJson<HotelPatch>,
) -> Result<Json<HotelResponse>> {
    caller.require_staff()?;
    let hotel = state.catalog().update_hotel(&hotel_id, patch).await?;
    Ok(Json(hotel.into()))
}

pub async fn delete_hotel_handler(
    caller: Caller,
    Path(hotel_id): Path<HotelId>,
    State(state): State<AppState>,
) -> Result<StatusCode> {
    caller.require_staff()?;
    if state.catalog().delete_hotel(&hotel_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("hotel not found: {hotel_id}")))
    }
}

pub async fn hotel_availability_handler(
    Path(hotel_id): Path<HotelId>,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<StayQuery>,
) -> Result<Json<ListResponse<QuoteResponse>>> {
    let stay = query.stay()?;
    let quotes = state.bookings().available_rooms(&hotel_id, &stay).await?;
    Ok(Json(quotes.into()))
}
