use crate::error::{CoreError, Result};
use crate::id::{BookingId, GuestRef};
use crate::stay::Stay;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Lifecycle state shared by a booking and the interval it holds on its room.
///
/// ```text
/// pending ──► confirmed ──► completed
///    │            │
///    └────────────┴──► cancelled
///
/// confirmed-by-venue ──► completed | cancelled
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReservationStatus {
    /// Requested by the guest, not yet accepted. Does not block the room.
    Pending,
    /// Accepted by the venue.
    Confirmed,
    /// Created by staff on the guest's behalf; starts out accepted.
    ConfirmedByVenue,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    /// Whether an interval in this state prevents overlapping bookings.
    pub fn is_blocking(self) -> bool {
        matches!(self, Self::Confirmed | Self::ConfirmedByVenue)
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }

    pub fn can_transition_to(self, to: ReservationStatus) -> bool {
        use ReservationStatus::*;
        matches!(
            (self, to),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Completed)
                | (Confirmed, Cancelled)
                | (ConfirmedByVenue, Completed)
                | (ConfirmedByVenue, Cancelled)
        )
    }

    /// Validates the move to `to` and returns the new state.
    pub fn transition(self, to: ReservationStatus) -> Result<ReservationStatus> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(CoreError::InvalidTransition { from: self, to })
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::ConfirmedByVenue => "confirmed-by-venue",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

impl Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "confirmed-by-venue" => Ok(Self::ConfirmedByVenue),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown reservation status '{other}'")),
        }
    }
}

/// One stay recorded on a room.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationInterval {
    pub booking_id: BookingId,
    pub guest: GuestRef,
    pub stay: Stay,
    pub status: ReservationStatus,
}

impl ReservationInterval {
    pub fn is_blocking(&self) -> bool {
        self.status.is_blocking()
    }

    /// Whether this interval stands in the way of `requested`.
    pub fn blocks(&self, requested: &Stay) -> bool {
        self.is_blocking() && self.stay.overlaps(requested)
    }
}
