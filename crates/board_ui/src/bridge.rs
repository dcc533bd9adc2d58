use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use board_core::{Board, BoardChanged, ChangeHandler, SubscriptionId};
use log::info;

type Queue = Arc<Mutex<VecDeque<BoardChanged>>>;

/// Carries board change events over to the render systems.
///
/// The board calls the handler synchronously inside each write; the handler
/// only queues the event, and the renderer drains the queue at its own pace.
pub struct ChangeBridge {
    queue: Queue,
    handler: Arc<dyn ChangeHandler>,
    subscription: Option<SubscriptionId>,
}

impl ChangeBridge {
    pub fn new() -> Self {
        let queue: Queue = Arc::new(Mutex::new(VecDeque::new()));
        let sink = Arc::clone(&queue);
        let handler: Arc<dyn ChangeHandler> = Arc::new(move |event: &BoardChanged| {
            if let Ok(mut pending) = sink.lock() {
                pending.push_back(*event);
            }
        });
        Self {
            queue,
            handler,
            subscription: None,
        }
    }

    pub fn is_synchronized(&self) -> bool {
        self.subscription.is_some()
    }

    /// Subscribes to or detaches from `board`. Repeating the current state
    /// does nothing.
    pub fn set_synchronize(&mut self, board: &mut Board, synchronize: bool) {
        match (synchronize, self.subscription) {
            (true, None) => {
                self.subscription = Some(board.subscribe(Arc::clone(&self.handler)));
                info!("renderer synchronised with board");
            }
            (false, Some(id)) => {
                board.unsubscribe(id);
                self.subscription = None;
                info!("renderer detached from board");
            }
            _ => {}
        }
    }

    /// Pops up to `limit` queued events, oldest first.
    pub fn drain(&self, limit: usize) -> Vec<BoardChanged> {
        match self.queue.lock() {
            Ok(mut pending) => {
                let take = limit.min(pending.len());
                pending.drain(..take).collect()
            }
            Err(_) => Vec::new(),
        }
    }

    pub fn discard_pending(&self) {
        if let Ok(mut pending) = self.queue.lock() {
            pending.clear();
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().map(|pending| pending.len()).unwrap_or(0)
    }
}

impl Default for ChangeBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_core::{Location, Piece};

    #[test]
    fn queues_writes_in_order() {
        let mut board = Board::new(3, 3).unwrap();
        let mut bridge = ChangeBridge::new();
        bridge.set_synchronize(&mut board, true);

        board.set(Location::new(1, 1), Piece::Black).unwrap();
        board.set(Location::new(2, 1), Piece::White).unwrap();
        board.set(Location::new(3, 1), Piece::Black).unwrap();

        assert_eq!(bridge.pending(), 3);
        let first = bridge.drain(2);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].location, Location::new(1, 1));
        assert_eq!(first[1].piece, Piece::White);
        assert_eq!(bridge.drain(usize::MAX).len(), 1);
        assert_eq!(bridge.pending(), 0);
    }

    #[test]
    fn toggling_is_idempotent() {
        let mut board = Board::new(2, 2).unwrap();
        let mut bridge = ChangeBridge::new();

        bridge.set_synchronize(&mut board, true);
        bridge.set_synchronize(&mut board, true);
        assert_eq!(board.subscriber_count(), 1);

        bridge.set_synchronize(&mut board, false);
        bridge.set_synchronize(&mut board, false);
        assert_eq!(board.subscriber_count(), 0);
        assert!(!bridge.is_synchronized());

        board.set(Location::new(1, 1), Piece::Black).unwrap();
        assert_eq!(bridge.pending(), 0);
    }

    #[test]
    fn discard_drops_backlog() {
        let mut board = Board::new(2, 2).unwrap();
        let mut bridge = ChangeBridge::new();
        bridge.set_synchronize(&mut board, true);
        board.fill_vacant(Piece::White).unwrap();

        bridge.discard_pending();
        assert!(bridge.drain(10).is_empty());
    }
}
