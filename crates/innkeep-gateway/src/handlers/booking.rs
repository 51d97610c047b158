use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppQuery, Caller};
use crate::model::{BookingListQuery, BookingResponse, CreateBookingRequest, ListResponse};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use innkeep_core::{Booking, BookingId, BookingParams, Stay};
use tracing::debug;

pub async fn create_booking_handler(
    caller: Caller,
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>)> {
    let guest = match (request.guest, caller.staff) {
        (Some(guest), true) => guest,
        (Some(guest), false) if caller.guest()? == &guest => guest,
        (Some(_), false) => {
            return Err(AppError::Forbidden(
                "only staff may book for another guest".to_string(),
            ))
        }
        (None, _) => caller.guest()?.clone(),
    };
    let stay = Stay::parse(&request.check_in, &request.check_out)?;

    let params = BookingParams::builder()
        .room_id(request.room_id)
        .guest(guest)
        .stay(stay)
        .by_staff(caller.staff)
        .build();
    let booking = state.bookings().book(params).await?;
    Ok((StatusCode::CREATED, Json(booking.into())))
}

pub async fn list_bookings_handler(
    caller: Caller,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<BookingListQuery>,
) -> Result<Json<ListResponse<BookingResponse>>> {
    let guest = match query.guest {
        Some(guest) => {
            caller.require_owner_or_staff(&guest)?;
            guest
        }
        None => caller.guest()?.clone(),
    };
    let bookings = state.bookings().bookings_for_guest(&guest).await?;
    Ok(Json(bookings.into()))
}

async fn owned_booking(state: &AppState, caller: &Caller, id: &BookingId) -> Result<Booking> {
    let booking = state
        .bookings()
        .booking(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("booking not found: {id}")))?;
    caller.require_owner_or_staff(&booking.guest)?;
    Ok(booking)
}

pub async fn booking_handler(
    caller: Caller,
    Path(booking_id): Path<BookingId>,
    State(state): State<AppState>,
) -> Result<Json<BookingResponse>> {
    let booking = owned_booking(&state, &caller, &booking_id).await?;
    Ok(Json(booking.into()))
}

pub async fn confirm_booking_handler(
    caller: Caller,
    Path(booking_id): Path<BookingId>,
    State(state): State<AppState>,
) -> Result<Json<BookingResponse>> {
    caller.require_staff()?;
    let booking = state.bookings().confirm(&booking_id).await?;
    Ok(Json(booking.into()))
}

pub async fn cancel_booking_handler(
    caller: Caller,
    Path(booking_id): Path<BookingId>,
    State(state): State<AppState>,
) -> Result<Json<BookingResponse>> {
    owned_booking(&state, &caller, &booking_id).await?;
    debug!(booking = %booking_id, staff = caller.staff, "cancelling booking");
    let booking = state.bookings().cancel(&booking_id).await?;
    Ok(Json(booking.into()))
}

pub async fn complete_booking_handler(
    caller: Caller,
    Path(booking_id): Path<BookingId>,
    State(state): State<AppState>,
) -> Result<Json<BookingResponse>> {
    caller.require_staff()?;
    let booking = state.bookings().complete(&booking_id).await?;
    Ok(Json(booking.into()))
}
