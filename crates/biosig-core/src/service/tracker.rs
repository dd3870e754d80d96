//! Latest-request-wins bookkeeping

use parking_lot::Mutex;

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Generation counter for one endpoint.
///
/// Every call takes a ticket before awaiting; when the reply arrives only the
/// holder of the newest ticket may apply it.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: Mutex<u64>,
}

impl RequestTracker {
    /// Tracker with no requests issued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket, superseding all earlier ones.
    pub fn issue(&self) -> Ticket {
        let mut latest = self.latest.lock();
        *latest += 1;
        Ticket(*latest)
    }

    /// Whether `ticket` is still the newest.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        *self.latest.lock() == ticket.0
    }

    /// Supersede every outstanding ticket without issuing a new call.
    pub fn cancel_all(&self) {
        *self.latest.lock() += 1;
    }
}

/// Outcome of a tracked call.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    /// The newest request for this endpoint
    Fresh(T),
    /// Superseded by a later request; discard
    Stale,
}

impl<T> Reply<T> {
    /// The payload of a fresh reply.
    pub fn into_fresh(self) -> Option<T> {
        match self {
            Reply::Fresh(value) => Some(value),
            Reply::Stale => None,
        }
    }

    /// Whether this reply was superseded.
    pub fn is_stale(&self) -> bool {
        matches!(self, Reply::Stale)
    }

    /// Transform a fresh payload.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reply<U> {
        match self {
            Reply::Fresh(value) => Reply::Fresh(f(value)),
            Reply::Stale => Reply::Stale,
        }
    }
}
