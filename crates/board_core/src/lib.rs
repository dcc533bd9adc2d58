// Board engine for grid games: sentinel-bordered storage, enumeration,
// ray walks and change notification
pub mod board;
pub mod change;
pub mod direction;
pub mod location;
pub mod piece;

// Re-export main types for convenience
pub use board::{Board, BoardError, Result, WriteGuard};
pub use change::{BoardChanged, ChangeChannel, ChangeHandler, SubscriptionId};
pub use direction::Direction;
pub use location::Location;
pub use piece::{Piece, PieceColor};
