use crate::{ReservationId, reservation::ReservationStatus};

/// Trait for reservation status change observation
pub trait ReservationObserver {
    /// Called when a reservation's status changes
    fn on_status_change(&self, id: ReservationId, from: ReservationStatus, to: ReservationStatus);
}

/// Logs all status transitions that occur in the registry
#[derive(Debug)]
pub struct TransitionLogger;

impl ReservationObserver for TransitionLogger {
    fn on_status_change(&self, id: ReservationId, from: ReservationStatus, to: ReservationStatus) {
        println!("LOGGER: reservation {id}: {from:?} --> {to:?}");
    }
}

/// Flags the notifications the library would send for specific transitions.
/// Actual delivery is a host concern.
#[derive(Debug)]
pub struct NotificationService;

impl ReservationObserver for NotificationService {
    fn on_status_change(&self, id: ReservationId, _from: ReservationStatus, to: ReservationStatus) {
        match to {
            ReservationStatus::Ready => {
                println!("NOTIFICATION: reservation {id} is ready for pickup!");
            }
            ReservationStatus::Expired => {
                println!("NOTIFICATION: reservation {id} expired without pickup");
            }
            _ => {}
        }
    }
}
