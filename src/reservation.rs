use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BookId, ReservationId, UserId};

/// Represents the possible statuses of a book reservation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Reservation is queued behind other holders
    #[default]
    Waiting,
    /// Reservation is at the head of the queue and the book is held for pickup
    Ready,
    /// The holder borrowed the book
    Completed,
    /// The holder cancelled before the book became ready
    Cancelled,
    /// The pickup window elapsed without the book being borrowed
    Expired,
}

impl ReservationStatus {
    /// Whether the reservation still occupies a place in its book's queue
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Waiting | Self::Ready)
    }

    /// Whether the status admits no further transitions
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Expired)
    }

    /// Get a human-readable description of the status
    #[must_use]
    pub const fn get_description(self) -> &'static str {
        match self {
            Self::Waiting => "Reservation is waiting in the queue",
            Self::Ready => "Book is held for pickup",
            Self::Completed => "Reservation was fulfilled",
            Self::Cancelled => "Reservation was cancelled",
            Self::Expired => "Pickup window expired",
        }
    }
}

/// A single reservation record owned by the registry.
///
/// Serializes to the flat persisted shape: camelCase field names,
/// lowercase status, optional dates omitted while unset. The handle is
/// not part of the record itself; in persisted form it is the map key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// Handle assigned at creation
    #[serde(skip)]
    pub id: ReservationId,
    /// User who placed the reservation
    pub user_id: UserId,
    /// Book the reservation is for
    pub book_id: BookId,
    /// Current lifecycle status
    pub status: ReservationStatus,
    /// When the reservation was placed
    pub reservation_date: DateTime<Utc>,
    /// Whether the holder was flagged for an availability notification
    pub notification_sent: bool,
    /// When the reservation became ready for pickup
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ready_date: Option<DateTime<Utc>>,
    /// Deadline for picking up a ready reservation
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub expiry_date: Option<DateTime<Utc>>,
    /// When the reservation was fulfilled
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub completion_date: Option<DateTime<Utc>>,
    /// When the reservation was cancelled
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cancel_date: Option<DateTime<Utc>>,
}

impl Reservation {
    /// Create a fresh waiting reservation stamped with the current time
    #[must_use]
    pub fn new(id: ReservationId, user_id: UserId, book_id: BookId) -> Self {
        Self {
            id,
            user_id,
            book_id,
            status: ReservationStatus::Waiting,
            reservation_date: Utc::now(),
            notification_sent: false,
            ready_date: None,
            expiry_date: None,
            completion_date: None,
            cancel_date: None,
        }
    }
}
