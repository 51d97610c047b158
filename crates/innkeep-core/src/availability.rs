//! Conflict checks between a requested stay and a room's reservations.

use crate::error::Result;
use crate::reservation::ReservationInterval;
use crate::room::Room;
use crate::stay::Stay;
use jiff::Timestamp;

/// Reports whether `room` can take a stay from `check_in` to `check_out`.
///
/// Fails with [`CoreError::InvalidRange`](crate::CoreError::InvalidRange)
/// when `check_out <= check_in`; otherwise never fails.
pub fn is_available(room: &Room, check_in: Timestamp, check_out: Timestamp) -> Result<bool> {
    let stay = Stay::new(check_in, check_out)?;
    Ok(is_available_for(room, &stay))
}

/// A room is available when it is globally open and no confirmed interval
/// overlaps `stay`.
pub fn is_available_for(room: &Room, stay: &Stay) -> bool {
    room.is_available && first_conflict(room.reservations(), stay).is_none()
}

/// Finds the first blocking interval that overlaps `stay`.
pub fn first_conflict<'a, I>(intervals: I, stay: &Stay) -> Option<&'a ReservationInterval>
where
    I: IntoIterator<Item = &'a ReservationInterval>,
{
    intervals.into_iter().find(|interval| interval.blocks(stay))
}
