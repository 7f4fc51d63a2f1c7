//! In-flight request tracking for the editor and list controllers.

use std::fmt;

/// Identifies one outbound request. Responses are applied only when they
/// carry the ticket of the request currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues monotonically increasing tickets and remembers the pending one.
#[derive(Debug, Default)]
pub(crate) struct RequestTracker {
    issued: u64,
    pending: Option<RequestTicket>,
}

impl RequestTracker {
    /// Issue a new ticket, superseding any request still in flight.
    pub(crate) fn issue(&mut self) -> RequestTicket {
        self.issued += 1;
        let ticket = RequestTicket(self.issued);
        self.pending = Some(ticket);
        ticket
    }

    /// Consume the pending ticket if `ticket` matches it.
    pub(crate) fn settle(&mut self, ticket: RequestTicket) -> bool {
        if self.pending == Some(ticket) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Forget the pending request so its response is discarded.
    pub(crate) fn abandon(&mut self) -> Option<RequestTicket> {
        self.pending.take()
    }

    pub(crate) fn in_flight(&self) -> bool {
        self.pending.is_some()
    }
}
