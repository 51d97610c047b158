use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::handlers::{
    booking_handler, cancel_booking_handler, complete_booking_handler, confirm_booking_handler,
    create_booking_handler, create_hotel_handler, create_room_handler, delete_hotel_handler,
    delete_room_handler, get_hotel_handler, get_room_handler, health_handler,
    hotel_availability_handler, list_bookings_handler, list_hotels_handler, list_rooms_handler,
    room_availability_handler, room_bookings_handler, update_hotel_handler, update_room_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .nest(
                "/v1",
                Router::new()
                    .merge(Self::catalog_routes())
                    .merge(Self::booking_routes()),
            )
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .with_state(state)
    }

    fn catalog_routes() -> Router<AppState> {
        Router::new()
            .route("/hotels", post(create_hotel_handler).get(list_hotels_handler))
            .route(
                "/hotels/{hotel_id}",
                get(get_hotel_handler)
                    .patch(update_hotel_handler)
                    .delete(delete_hotel_handler),
            )
            .route(
                "/hotels/{hotel_id}/rooms",
                post(create_room_handler).get(list_rooms_handler),
            )
            .route(
                "/hotels/{hotel_id}/availability",
                get(hotel_availability_handler),
            )
            .route(
                "/rooms/{room_id}",
                get(get_room_handler)
                    .patch(update_room_handler)
                    .delete(delete_room_handler),
            )
            .route(
                "/rooms/{room_id}/availability",
                get(room_availability_handler),
            )
    }

    fn booking_routes() -> Router<AppState> {
        Router::new()
            .route("/rooms/{room_id}/bookings", get(room_bookings_handler))
            .route(
                "/bookings",
                post(create_booking_handler).get(list_bookings_handler),
            )
            .route("/bookings/{booking_id}", get(booking_handler))
            .route(
                "/bookings/{booking_id}/confirm",
                post(confirm_booking_handler),
            )
            .route("/bookings/{booking_id}/cancel", post(cancel_booking_handler))
            .route(
                "/bookings/{booking_id}/complete",
                post(complete_booking_handler),
            )
    }
}
