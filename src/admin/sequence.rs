//! Per-dataset request sequencing.
//!
//! The console refreshes the same dataset from two independent triggers
//! (the background timer and tab/filter changes). Each request takes a
//! ticket when it is issued; a response only commits if its ticket is newer
//! than the one that produced the current value.

/// Sequence number handed out when a request is issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    #[must_use]
    pub fn seq(self) -> u64 {
        self.0
    }
}

/// A dataset plus the bookkeeping that orders its refreshes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Versioned<T> {
    value: T,
    issued: u64,
    committed: u64,
}

impl<T> Versioned<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            issued: 0,
            committed: 0,
        }
    }

    pub fn issue(&mut self) -> RequestTicket {
        self.issued += 1;
        RequestTicket(self.issued)
    }

    /// Store `value` if `ticket` is newer than the last commit.
    ///
    /// Returns `false` when the response is stale and was dropped.
    pub fn commit(&mut self, ticket: RequestTicket, value: T) -> bool {
        if ticket.0 <= self.committed {
            return false;
        }
        self.value = value;
        self.committed = ticket.0;
        true
    }

    /// Whether a response for `ticket` would still be allowed to commit
    #[must_use]
    pub fn is_newer(&self, ticket: RequestTicket) -> bool {
        ticket.0 > self.committed
    }

    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }

    #[must_use]
    pub fn committed_seq(&self) -> u64 {
        self.committed
    }

    /// Whether any response has been committed yet
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.committed > 0
    }
}
