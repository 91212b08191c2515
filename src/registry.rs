use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    fmt,
    path::Path,
};

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    BookId, ReservationId, UserId,
    directory::{BookDirectory, UserDirectory},
    error::LibraryError,
    observers::{NotificationService, ReservationObserver, TransitionLogger},
    persistence,
    reservation::{Reservation, ReservationStatus},
};

/// How long a ready reservation is held for pickup before it expires
const RESERVATION_EXPIRY_DAYS: i64 = 3;

/// Serializable representation of the registry state.
///
/// Queues are persisted separately from the reservation map, ordered
/// exactly as the live queues, so reload preserves priority order
/// bit for bit.
#[derive(Debug, Deserialize, Serialize)]
struct RegistrySnapshot {
    /// All reservation records, keyed by handle
    reservations: BTreeMap<ReservationId, Reservation>,
    /// Per-book queues in live order, sorted by book for stable output
    queues: Vec<(BookId, Vec<ReservationId>)>,
    /// Next handle to assign
    next_id: ReservationId,
    /// Pickup window length in days
    expiry_days: i64,
}

/// Owner of all reservation records and per-book FIFO queues.
///
/// The registry implements the reservation state machine: `reserve_book`
/// creates a waiting reservation, `book_returned` promotes the head of a
/// queue to ready, and cancellation, completion and the expiry sweep
/// drive reservations into their terminal statuses. Book and user
/// records are referenced by identifier only; the registry never owns
/// them and never flips book availability itself.
pub struct ReservationRegistry {
    /// All reservation records, keyed by handle. Records are never
    /// deleted; terminal reservations stay for history.
    reservations: BTreeMap<ReservationId, Reservation>,
    /// Per-book queues of active reservation handles, arrival order
    book_queues: HashMap<BookId, VecDeque<ReservationId>>,
    /// Next handle to assign, starting from 1, never reused
    next_id: ReservationId,
    /// Pickup window length in days
    expiry_days: i64,
    /// Registered status change observers
    observers: Vec<Box<dyn ReservationObserver>>,
}

// Manual implementation of Debug for ReservationRegistry
impl fmt::Debug for ReservationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReservationRegistry")
            .field("reservations", &self.reservations)
            .field("book_queues", &self.book_queues)
            .field("next_id", &self.next_id)
            .field("expiry_days", &self.expiry_days)
            .field("observers_count", &self.observers.len())
            .finish()
    }
}

impl Default for ReservationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ReservationRegistry {
    /// Create an empty registry with the standard three-day pickup window
    #[must_use]
    pub fn new() -> Self {
        Self {
            reservations: BTreeMap::new(),
            book_queues: HashMap::new(),
            next_id: 1,
            expiry_days: RESERVATION_EXPIRY_DAYS,
            observers: Vec::new(),
        }
    }

    /// Register an observer to be notified of status changes
    pub fn register_observer(&mut self, observer: Box<dyn ReservationObserver>) {
        self.observers.push(observer);
    }

    /// Place a reservation for a book that is currently on loan.
    ///
    /// The user is resolved before the book, so for doubly-invalid input
    /// the user error fires first. The book must be unavailable, and the
    /// user must not already hold a waiting or ready reservation for it.
    /// On success the new handle is appended to the book's queue.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::UserNotFound` or `LibraryError::BookNotFound`
    /// if a collaborator cannot resolve the identifier,
    /// `LibraryError::BookAvailable` if the book is on the shelf, or
    /// `LibraryError::DuplicateReservation` if the user already has an
    /// active reservation for this book.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn reserve_book(
        &mut self,
        users: &dyn UserDirectory,
        books: &dyn BookDirectory,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<ReservationId, LibraryError> {
        users.get_user(user_id)?;
        let book = books.get_book(book_id)?;

        if book.available {
            return Err(LibraryError::BookAvailable(book_id));
        }

        if self
            .reservations
            .values()
            .any(|r| r.user_id == user_id && r.book_id == book_id && r.status.is_active())
        {
            return Err(LibraryError::DuplicateReservation { user_id, book_id });
        }

        let id = self.next_id;
        self.next_id += 1;
        self.reservations.insert(id, Reservation::new(id, user_id, book_id));
        self.book_queues.entry(book_id).or_default().push_back(id);

        Ok(id)
    }

    /// Cancel a waiting or ready reservation and drop it from its queue
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::ReservationNotFound` if the handle is
    /// unknown, or `LibraryError::InvalidTransition` if the reservation
    /// is already terminal.
    pub fn cancel_reservation(&mut self, id: ReservationId) -> Result<(), LibraryError> {
        let res =
            self.reservations.get_mut(&id).ok_or(LibraryError::ReservationNotFound(id))?;
        if !res.status.is_active() {
            return Err(LibraryError::InvalidTransition { reservation: id, status: res.status });
        }

        let from = res.status;
        res.status = ReservationStatus::Cancelled;
        res.cancel_date = Some(Utc::now());
        let book_id = res.book_id;

        self.remove_from_queue(book_id, id);
        self.notify(id, from, ReservationStatus::Cancelled);

        Ok(())
    }

    /// React to a book coming back to the shelf: promote the head of its
    /// queue to ready and stamp the pickup window.
    ///
    /// The promoted handle stays in the queue while ready, so queue
    /// position queries keep counting the current holder; it leaves the
    /// queue only on completion, cancellation or expiry. Returns `None`
    /// when no reservation is waiting, which is a normal outcome. The
    /// registry does not touch book availability; that stays with the
    /// loan desk.
    pub fn book_returned(&mut self, book_id: BookId) -> Option<ReservationId> {
        let next = self.book_queues.get(&book_id).and_then(|queue| queue.front().copied())?;

        let now = Utc::now();
        let res = self.reservations.get_mut(&next)?;
        let from = res.status;
        res.status = ReservationStatus::Ready;
        res.ready_date = Some(now);
        res.expiry_date = now.checked_add_signed(Duration::days(self.expiry_days));
        res.notification_sent = true;

        self.notify(next, from, ReservationStatus::Ready);

        Some(next)
    }

    /// Mark a ready reservation as fulfilled, at the moment the holder
    /// actually borrows the book
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::ReservationNotFound` if the handle is
    /// unknown, or `LibraryError::InvalidTransition` unless the current
    /// status is exactly ready; a waiting reservation must first be
    /// promoted via [`Self::book_returned`].
    pub fn complete_reservation(&mut self, id: ReservationId) -> Result<(), LibraryError> {
        let res =
            self.reservations.get_mut(&id).ok_or(LibraryError::ReservationNotFound(id))?;
        if res.status != ReservationStatus::Ready {
            return Err(LibraryError::InvalidTransition { reservation: id, status: res.status });
        }

        res.status = ReservationStatus::Completed;
        res.completion_date = Some(Utc::now());
        let book_id = res.book_id;

        self.remove_from_queue(book_id, id);
        self.notify(id, ReservationStatus::Ready, ReservationStatus::Completed);

        Ok(())
    }

    /// Sweep all ready reservations whose pickup window has elapsed.
    ///
    /// Each expired reservation is dropped from its queue and the freed
    /// copy goes straight to the next holder in line, chaining through
    /// any number of consecutive expirations within one sweep. A fresh
    /// promotion is stamped with a future deadline, so it cannot be
    /// caught by the sweep that created it. Returns the expired handles.
    pub fn check_expired_reservations(&mut self) -> Vec<ReservationId> {
        let now = Utc::now();
        let due: Vec<(ReservationId, BookId)> = self
            .reservations
            .iter()
            .filter(|(_, r)| {
                r.status == ReservationStatus::Ready && r.expiry_date.is_some_and(|e| now > e)
            })
            .map(|(id, r)| (*id, r.book_id))
            .collect();

        let mut expired = Vec::new();
        for (id, book_id) in due {
            if let Some(res) = self.reservations.get_mut(&id) {
                res.status = ReservationStatus::Expired;
            }
            self.remove_from_queue(book_id, id);
            self.notify(id, ReservationStatus::Ready, ReservationStatus::Expired);
            expired.push(id);

            self.book_returned(book_id);
        }

        expired
    }

    /// 1-based position of a reservation in its book's queue, where 1 is
    /// next in line. Returns -1 if the book has no queue or the handle
    /// is no longer queued (terminal reservations leave the queue).
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::ReservationNotFound` if the handle is
    /// unknown.
    #[allow(clippy::arithmetic_side_effects, clippy::cast_possible_wrap)]
    pub fn position_in_queue(&self, id: ReservationId) -> Result<i64, LibraryError> {
        let res = self.reservations.get(&id).ok_or(LibraryError::ReservationNotFound(id))?;
        let Some(queue) = self.book_queues.get(&res.book_id) else {
            return Ok(-1);
        };
        Ok(queue.iter().position(|queued| *queued == id).map_or(-1, |pos| pos as i64 + 1))
    }

    /// Look up a reservation by handle, returned as a copy
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::ReservationNotFound` if the handle is
    /// unknown.
    pub fn get_reservation(&self, id: ReservationId) -> Result<Reservation, LibraryError> {
        self.reservations.get(&id).cloned().ok_or(LibraryError::ReservationNotFound(id))
    }

    /// All reservations, optionally filtered by status, as copies in
    /// handle order
    #[must_use]
    pub fn list_reservations(&self, status: Option<ReservationStatus>) -> Vec<Reservation> {
        self.reservations
            .values()
            .filter(|r| status.is_none_or(|wanted| r.status == wanted))
            .cloned()
            .collect()
    }

    /// All reservations placed by a user, as copies in handle order
    #[must_use]
    pub fn user_reservations(&self, user_id: UserId) -> Vec<Reservation> {
        self.reservations.values().filter(|r| r.user_id == user_id).cloned().collect()
    }

    /// All reservations placed for a book, as copies in handle order
    #[must_use]
    pub fn book_reservations(&self, book_id: BookId) -> Vec<Reservation> {
        self.reservations.values().filter(|r| r.book_id == book_id).cloned().collect()
    }

    /// Drop a handle from a book's queue; a no-op if absent
    fn remove_from_queue(&mut self, book_id: BookId, id: ReservationId) {
        if let Some(queue) = self.book_queues.get_mut(&book_id) {
            queue.retain(|queued| *queued != id);
        }
    }

    /// Tell every registered observer about a status change
    fn notify(&self, id: ReservationId, from: ReservationStatus, to: ReservationStatus) {
        for observer in &self.observers {
            observer.on_status_change(id, from, to);
        }
    }

    /// Save the registry state to a JSON file
    ///
    /// # Errors
    ///
    /// Returns a `LibraryError::Persistence` if serialization or the
    /// file write fails.
    pub fn save_to_file(&self, path: &Path) -> Result<(), LibraryError> {
        let mut queues: Vec<(BookId, Vec<ReservationId>)> = self
            .book_queues
            .iter()
            .map(|(book_id, queue)| (*book_id, queue.iter().copied().collect()))
            .collect();
        queues.sort_by_key(|(book_id, _)| *book_id);

        let snapshot = RegistrySnapshot {
            reservations: self.reservations.clone(),
            queues,
            next_id: self.next_id,
            expiry_days: self.expiry_days,
        };

        println!("PERSISTENCE: Saving registry to file: {}", path.display());
        persistence::save_json(&snapshot, path)
    }

    /// Load the registry state from a JSON file.
    ///
    /// Observers are not persisted; the standard logger and notification
    /// flagger are re-attached.
    ///
    /// # Errors
    ///
    /// Returns a `LibraryError::Load` if the file is missing, unreadable
    /// or not valid JSON.
    pub fn load_from_file(path: &Path) -> Result<Self, LibraryError> {
        println!("PERSISTENCE: Loading registry from file: {}", path.display());
        let mut snapshot: RegistrySnapshot = persistence::load_json(path)?;

        // Handles are the map keys in persisted form; restore them onto
        // the records.
        for (id, res) in &mut snapshot.reservations {
            res.id = *id;
        }

        let mut registry = Self {
            reservations: snapshot.reservations,
            book_queues: snapshot
                .queues
                .into_iter()
                .map(|(book_id, queue)| (book_id, queue.into_iter().collect()))
                .collect(),
            next_id: snapshot.next_id,
            expiry_days: snapshot.expiry_days,
            observers: Vec::new(),
        };

        // Re-register standard observers
        registry.register_observer(Box::new(TransitionLogger));
        registry.register_observer(Box::new(NotificationService));

        Ok(registry)
    }
}
