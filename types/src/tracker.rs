use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

/// Hands out tickets for in-flight requests so late responses can be dropped.
///
/// Beginning a new request or cancelling the tracker invalidates every ticket
/// issued before it.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    generation: Arc<AtomicU64>,
}

#[derive(Debug, Clone)]
pub struct Ticket {
    generation: Arc<AtomicU64>,
    issued: u64,
}

impl RequestTracker {
    pub fn begin(&self) -> Ticket {
        let issued = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            generation: Arc::clone(&self.generation),
            issued,
        }
    }

    /// Invalidate all outstanding tickets, e.g. when the owning view goes away.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl Ticket {
    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::SeqCst) == self.issued
    }
}
