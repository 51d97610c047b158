use crate::availability;
use crate::error::{CoreError, Result};
use crate::id::{BookingId, HotelId, RoomId};
use crate::money::Amount;
use crate::reservation::{ReservationInterval, ReservationStatus};
use crate::stay::Stay;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use typed_builder::TypedBuilder;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    Single,
    Double,
    Twin,
    Suite,
    Family,
}

impl RoomKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Double => "double",
            Self::Twin => "twin",
            Self::Suite => "suite",
            Self::Family => "family",
        }
    }
}

impl Display for RoomKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "single" => Ok(Self::Single),
            "double" => Ok(Self::Double),
            "twin" => Ok(Self::Twin),
            "suite" => Ok(Self::Suite),
            "family" => Ok(Self::Family),
            other => Err(format!("unknown room kind '{other}'")),
        }
    }
}

/// A bookable room and the reservations recorded against it.
///
/// The reservation list only grows: intervals are appended by
/// [`Room::reserve`] and change state through [`Room::apply_status`].
/// Cancelled intervals stay in the list as history but no longer block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct Room {
    #[builder(setter(into))]
    pub id: RoomId,
    #[builder(setter(into))]
    pub hotel_id: HotelId,
    #[builder(setter(into))]
    pub number: String,
    pub kind: RoomKind,
    /// Maximum number of guests.
    pub capacity: u32,
    pub nightly_rate: Amount,
    /// Global switch; a disabled room accepts no new bookings.
    #[builder(default = true)]
    pub is_available: bool,
    pub created_at: Timestamp,
    #[builder(default, setter(skip))]
    #[serde(default)]
    reservations: Vec<ReservationInterval>,
}

impl Room {
    pub fn reservations(&self) -> &[ReservationInterval] {
        &self.reservations
    }

    /// Intervals that currently block overlapping stays.
    pub fn blocking(&self) -> impl Iterator<Item = &ReservationInterval> {
        self.reservations.iter().filter(|r| r.is_blocking())
    }

    /// Whether any interval is still pending or confirmed.
    pub fn has_active_reservations(&self) -> bool {
        self.reservations.iter().any(|r| !r.status.is_terminal())
    }

    pub fn reservation(&self, booking: &BookingId) -> Option<&ReservationInterval> {
        self.reservations.iter().find(|r| &r.booking_id == booking)
    }

    /// See [`availability::is_available_for`].
    pub fn is_available_for(&self, stay: &Stay) -> bool {
        availability::is_available_for(self, stay)
    }

    /// Records a new interval after checking that the room is open and no
    /// blocking interval overlaps it.
    pub fn reserve(&mut self, interval: ReservationInterval) -> Result<()> {
        if self.reservation(&interval.booking_id).is_some() {
            return Err(CoreError::DuplicateReservation {
                room: self.id.clone(),
                booking: interval.booking_id,
            });
        }
        if !self.is_available {
            return Err(CoreError::RoomUnavailable(self.id.clone()));
        }
        if let Some(existing) = availability::first_conflict(&self.reservations, &interval.stay) {
            return Err(CoreError::Conflict {
                room: self.id.clone(),
                booking: existing.booking_id.clone(),
            });
        }
        self.reservations.push(interval);
        Ok(())
    }

    /// Moves the interval held by `booking` to `to` and returns its previous state.
    ///
    /// An interval that starts blocking is re-checked against every other
    /// blocking interval, since overlapping pending requests may coexist.
    pub fn apply_status(
        &mut self,
        booking: &BookingId,
        to: ReservationStatus,
    ) -> Result<ReservationStatus> {
        let Some(index) = self
            .reservations
            .iter()
            .position(|r| &r.booking_id == booking)
        else {
            return Err(CoreError::UnknownReservation {
                room: self.id.clone(),
                booking: booking.clone(),
            });
        };

        let from = self.reservations[index].status;
        let next = from.transition(to)?;

        if next.is_blocking() && !from.is_blocking() {
            let stay = self.reservations[index].stay;
            let others = self
                .reservations
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, r)| r);
            if let Some(existing) = availability::first_conflict(others, &stay) {
                return Err(CoreError::Conflict {
                    room: self.id.clone(),
                    booking: existing.booking_id.clone(),
                });
            }
        }

        self.reservations[index].status = next;
        Ok(from)
    }

    /// Rebuilds a room loaded from storage together with its recorded intervals.
    pub fn with_reservations(mut self, reservations: Vec<ReservationInterval>) -> Self {
        self.reservations = reservations;
        self
    }
}

/// Partial update of a room's descriptive fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomPatch {
    pub kind: Option<RoomKind>,
    pub capacity: Option<u32>,
    pub nightly_rate: Option<Amount>,
    pub is_available: Option<bool>,
}

impl RoomPatch {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.capacity.is_none()
            && self.nightly_rate.is_none()
            && self.is_available.is_none()
    }

    pub fn apply(&self, room: &mut Room) {
        if let Some(kind) = self.kind {
            room.kind = kind;
        }
        if let Some(capacity) = self.capacity {
            room.capacity = capacity;
        }
        if let Some(rate) = self.nightly_rate {
            room.nightly_rate = rate;
        }
        if let Some(is_available) = self.is_available {
            room.is_available = is_available;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::GuestRef;
    use jiff::civil::date;

    fn room() -> Room {
        Room::builder()
            .id("rm-1")
            .hotel_id("ht-1")
            .number("101")
            .kind(RoomKind::Double)
            .capacity(2)
            .nightly_rate(Amount::new(120_00))
            .created_at(Timestamp::UNIX_EPOCH)
            .build()
    }

    fn interval(
        id: &str,
        from: (i16, i8, i8),
        to: (i16, i8, i8),
        status: ReservationStatus,
    ) -> ReservationInterval {
        ReservationInterval {
            booking_id: BookingId::new(id),
            guest: GuestRef::new("guest"),
            stay: Stay::from_dates(date(from.0, from.1, from.2), date(to.0, to.1, to.2)).unwrap(),
            status,
        }
    }

    #[test]
    fn new_room_has_no_reservations() {
        let room = room();
        assert!(room.reservations().is_empty());
        assert!(room.is_available);
        assert!(!room.has_active_reservations());
    }

    #[test]
    fn reserve_rejects_overlap_with_confirmed() {
        let mut room = room();
        room.reserve(interval("b1", (2024, 6, 10), (2024, 6, 15), ReservationStatus::Confirmed))
            .unwrap();

        let err = room
            .reserve(interval("b2", (2024, 6, 12), (2024, 6, 14), ReservationStatus::Pending))
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::Conflict {
                room: RoomId::new("rm-1"),
                booking: BookingId::new("b1"),
            }
        );
        assert_eq!(room.reservations().len(), 1);
    }

    #[test]
    fn reserve_allows_overlap_with_pending() {
        let mut room = room();
        room.reserve(interval("b1", (2024, 6, 10), (2024, 6, 15), ReservationStatus::Pending))
            .unwrap();
        room.reserve(interval("b2", (2024, 6, 12), (2024, 6, 14), ReservationStatus::Pending))
            .unwrap();
        assert_eq!(room.reservations().len(), 2);
    }

    #[test]
    fn reserve_rejects_disabled_room_and_duplicates() {
        let mut room = room();
        room.reserve(interval("b1", (2024, 6, 10), (2024, 6, 11), ReservationStatus::Pending))
            .unwrap();
        assert!(matches!(
            room.reserve(interval("b1", (2024, 7, 1), (2024, 7, 2), ReservationStatus::Pending)),
            Err(CoreError::DuplicateReservation { .. })
        ));

        room.is_available = false;
        assert_eq!(
            room.reserve(interval("b2", (2024, 7, 1), (2024, 7, 2), ReservationStatus::Pending)),
            Err(CoreError::RoomUnavailable(RoomId::new("rm-1")))
        );
    }

    #[test]
    fn confirming_rechecks_other_blocking_intervals() {
        let mut room = room();
        room.reserve(interval("b1", (2024, 6, 10), (2024, 6, 15), ReservationStatus::Pending))
            .unwrap();
        room.reserve(interval("b2", (2024, 6, 12), (2024, 6, 14), ReservationStatus::Pending))
            .unwrap();

        assert_eq!(
            room.apply_status(&BookingId::new("b1"), ReservationStatus::Confirmed),
            Ok(ReservationStatus::Pending)
        );
        assert!(matches!(
            room.apply_status(&BookingId::new("b2"), ReservationStatus::Confirmed),
            Err(CoreError::Conflict { .. })
        ));
        // the loser can still be cancelled
        room.apply_status(&BookingId::new("b2"), ReservationStatus::Cancelled)
            .unwrap();
    }

    #[test]
    fn cancel_releases_range_but_keeps_history() {
        let mut room = room();
        let booked = Stay::from_dates(date(2024, 6, 10), date(2024, 6, 15)).unwrap();
        room.reserve(interval("b1", (2024, 6, 10), (2024, 6, 15), ReservationStatus::Confirmed))
            .unwrap();
        assert!(!room.is_available_for(&booked));

        room.apply_status(&BookingId::new("b1"), ReservationStatus::Cancelled)
            .unwrap();
        assert!(room.is_available_for(&booked));
        assert_eq!(room.reservations().len(), 1);
        assert_eq!(room.reservations()[0].status, ReservationStatus::Cancelled);
    }

    #[test]
    fn apply_status_rejects_unknown_booking_and_bad_transition() {
        let mut room = room();
        assert!(matches!(
            room.apply_status(&BookingId::new("nope"), ReservationStatus::Confirmed),
            Err(CoreError::UnknownReservation { .. })
        ));

        room.reserve(interval("b1", (2024, 6, 10), (2024, 6, 11), ReservationStatus::Pending))
            .unwrap();
        assert!(matches!(
            room.apply_status(&BookingId::new("b1"), ReservationStatus::Completed),
            Err(CoreError::InvalidTransition { .. })
        ));
        assert_eq!(room.reservations()[0].status, ReservationStatus::Pending);
    }

    #[test]
    fn patch_updates_only_given_fields() {
        let mut room = room();
        let patch = RoomPatch {
            nightly_rate: Some(Amount::new(99_00)),
            is_available: Some(false),
            ..Default::default()
        };
        patch.apply(&mut room);
        assert_eq!(room.nightly_rate, Amount::new(99_00));
        assert!(!room.is_available);
        assert_eq!(room.kind, RoomKind::Double);
        assert_eq!(room.capacity, 2);
        assert!(RoomPatch::default().is_empty());
    }
}
