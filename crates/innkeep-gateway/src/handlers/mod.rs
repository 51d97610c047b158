mod booking;
mod health;
mod hotel;
mod room;

pub use booking::{
    booking_handler, cancel_booking_handler, complete_booking_handler, confirm_booking_handler,
    create_booking_handler, list_bookings_handler,
};
pub use health::health_handler;
pub use hotel::{
    create_hotel_handler, delete_hotel_handler, get_hotel_handler, hotel_availability_handler,
    list_hotels_handler, update_hotel_handler,
};
pub use room::{
    create_room_handler, delete_room_handler, get_room_handler, list_rooms_handler,
    room_availability_handler, room_bookings_handler, update_room_handler,
};
