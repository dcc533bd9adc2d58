use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::{Location, Piece};

/// Published once for every successful write to a board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardChanged {
    pub location: Location,
    pub piece: Piece,
}

/// Receives change events from a board.
pub trait ChangeHandler: Send + Sync {
    fn on_changed(&self, event: &BoardChanged);
}

impl<F> ChangeHandler for F
where
    F: Fn(&BoardChanged) + Send + Sync,
{
    fn on_changed(&self, event: &BoardChanged) {
        self(event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Ordered list of subscribers. Dispatch runs in registration order.
#[derive(Default)]
pub struct ChangeChannel {
    handlers: Vec<(SubscriptionId, Arc<dyn ChangeHandler>)>,
    next_id: u64,
}

impl ChangeChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler`. Subscribing the same `Arc` twice returns the
    /// id it already has instead of registering it again.
    pub fn subscribe(&mut self, handler: Arc<dyn ChangeHandler>) -> SubscriptionId {
        if let Some((id, _)) = self.handlers.iter().find(|(_, h)| Arc::ptr_eq(h, &handler)) {
            return *id;
        }

        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, handler));
        debug!("subscribed change handler {:?} ({} total)", id, self.handlers.len());
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(existing, _)| *existing != id);
        let removed = self.handlers.len() != before;
        if removed {
            debug!("unsubscribed change handler {:?} ({} left)", id, self.handlers.len());
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    // Handlers only see the event, so none of them can reach the list while
    // it is being walked.
    pub fn publish(&self, event: &BoardChanged) {
        for (_, handler) in &self.handlers {
            handler.on_changed(event);
        }
    }
}

impl fmt::Debug for ChangeChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeChannel")
            .field("subscribers", &self.handlers.len())
            .finish()
    }
}
