use std::fmt;
use std::iter;
use std::ops::Index;
use std::sync::Arc;

use log::{debug, trace};
use thiserror::Error;

use crate::change::{BoardChanged, ChangeChannel, ChangeHandler, SubscriptionId};
use crate::{Direction, Location, Piece};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("board dimensions must be positive and fit in memory, got {x_size}x{y_size}")]
    InvalidDimensions { x_size: usize, y_size: usize },
    #[error("index {index} is not an addressable cell")]
    OutOfRange { index: usize },
    #[error("write to {location} rejected: {reason}")]
    Rejected { location: Location, reason: String },
}

pub type Result<T> = std::result::Result<T, BoardError>;

/// Veto point consulted by [`Board::put_piece`] before a cell changes.
///
/// Returning `Err(reason)` leaves the board untouched and publishes nothing.
pub trait WriteGuard: Send + Sync {
    fn check(&self, board: &Board, location: Location, piece: Piece) -> std::result::Result<(), String>;
}

impl<F> WriteGuard for F
where
    F: Fn(&Board, Location, Piece) -> std::result::Result<(), String> + Send + Sync,
{
    fn check(&self, board: &Board, location: Location, piece: Piece) -> std::result::Result<(), String> {
        self(board, location, piece)
    }
}

/// A rectangular board stored row-major in a single vector, surrounded by a
/// one-cell ring of [`Piece::Guard`].
///
/// Cell `(x, y)` lives at `x + y * (x_size + 2)`, so stepping by one of the
/// direction strides moves to a neighbour and every ray ends on a guard.
pub struct Board {
    x_size: usize,
    y_size: usize,
    pieces: Vec<Piece>,
    // Non-guard indexes in storage order. Fixed once built.
    valid_indexes: Vec<usize>,
    changed: ChangeChannel,
    guard: Option<Arc<dyn WriteGuard>>,
}

impl Board {
    pub fn new(x_size: usize, y_size: usize) -> Result<Self> {
        let invalid = || BoardError::InvalidDimensions { x_size, y_size };
        if x_size == 0 || y_size == 0 {
            return Err(invalid());
        }
        let cell_count = x_size
            .checked_add(2)
            .zip(y_size.checked_add(2))
            .and_then(|(width, height)| width.checked_mul(height))
            .ok_or_else(invalid)?;

        let mut board = Self {
            x_size,
            y_size,
            pieces: Vec::with_capacity(cell_count),
            valid_indexes: Vec::new(),
            changed: ChangeChannel::new(),
            guard: None,
        };

        for index in 0..cell_count {
            let piece = if board.is_on_board(board.to_location(index)) {
                Piece::Empty
            } else {
                Piece::Guard
            };
            board.pieces.push(piece);
        }
        board.valid_indexes = (0..cell_count)
            .filter(|&index| board.pieces[index] == Piece::Empty)
            .collect();

        debug!(
            "created {}x{} board ({} cells, {} playable)",
            x_size,
            y_size,
            cell_count,
            board.valid_indexes.len()
        );
        Ok(board)
    }

    /// Installs a guard that every later write must pass.
    pub fn with_write_guard<G>(mut self, guard: G) -> Self
    where
        G: WriteGuard + 'static,
    {
        self.guard = Some(Arc::new(guard));
        self
    }

    pub fn x_size(&self) -> usize {
        self.x_size
    }

    pub fn y_size(&self) -> usize {
        self.y_size
    }

    /// Number of stored cells, sentinel ring included.
    pub fn cell_count(&self) -> usize {
        self.pieces.len()
    }

    fn width(&self) -> usize {
        self.x_size + 2
    }

    pub fn to_index(&self, x: usize, y: usize) -> usize {
        x + y * self.width()
    }

    pub fn index_of(&self, location: Location) -> usize {
        self.to_index(location.x, location.y)
    }

    pub fn to_location(&self, index: usize) -> Location {
        Location::new(index % self.width(), index / self.width())
    }

    pub fn is_on_board(&self, location: Location) -> bool {
        (1..=self.x_size).contains(&location.x) && (1..=self.y_size).contains(&location.y)
    }

    pub fn is_valid_index(&self, index: usize) -> bool {
        matches!(self.pieces.get(index), Some(piece) if *piece != Piece::Guard)
    }

    /// Panics if `index` is past the end of storage.
    pub fn get_piece(&self, index: usize) -> Piece {
        self.pieces[index]
    }

    pub fn get(&self, index: usize) -> Option<Piece> {
        self.pieces.get(index).copied()
    }

    /// Reads any cell of the board or its sentinel ring. Panics for
    /// locations beyond the ring.
    pub fn piece_at(&self, location: Location) -> Piece {
        self.pieces[self.frame_index(location)]
    }

    fn frame_index(&self, location: Location) -> usize {
        assert!(
            location.x <= self.x_size + 1 && location.y <= self.y_size + 1,
            "location {} is outside a {}x{} board",
            location,
            self.x_size,
            self.y_size
        );
        self.index_of(location)
    }

    /// The only place stored pieces change after construction.
    pub fn put_piece(&mut self, index: usize, piece: Piece) -> Result<()> {
        if !self.is_valid_index(index) {
            debug!("rejected write of {:?} to index {}: sentinel or out of range", piece, index);
            return Err(BoardError::OutOfRange { index });
        }

        let location = self.to_location(index);
        if piece == Piece::Guard {
            debug!("rejected guard piece at {}", location);
            return Err(BoardError::Rejected {
                location,
                reason: "guard pieces are reserved for the border".to_string(),
            });
        }
        if let Some(guard) = &self.guard {
            if let Err(reason) = guard.check(self, location, piece) {
                debug!("write guard rejected {:?} at {}: {}", piece, location, reason);
                return Err(BoardError::Rejected { location, reason });
            }
        }

        self.pieces[index] = piece;
        trace!("{} <- {:?} ({} subscribers)", location, piece, self.changed.len());
        self.changed.publish(&BoardChanged { location, piece });
        Ok(())
    }

    /// Writes at a location. Locations off the playing area are refused
    /// rather than wrapped into a neighbouring row.
    pub fn set(&mut self, location: Location, piece: Piece) -> Result<()> {
        if !self.is_on_board(location) {
            let index = location
                .y
                .saturating_mul(self.width())
                .saturating_add(location.x);
            debug!("rejected write of {:?} to off-board location {}", piece, location);
            return Err(BoardError::OutOfRange { index });
        }
        self.put_piece(self.index_of(location), piece)
    }

    pub fn clear_piece(&mut self, location: Location) -> Result<()> {
        self.set(location, Piece::Empty)
    }

    /// Empties every occupied cell, one change event per cell.
    pub fn clear_all(&mut self) -> Result<()> {
        let occupied: Vec<usize> = self.get_occupied_indexes().collect();
        debug!("clearing {} occupied cells", occupied.len());
        for index in occupied {
            self.clear_piece(self.to_location(index))?;
        }
        Ok(())
    }

    /// Puts `piece` on every vacant cell and returns how many were filled.
    pub fn fill_vacant(&mut self, piece: Piece) -> Result<usize> {
        let vacant: Vec<usize> = self.get_vacant_indexes().collect();
        debug!("filling {} vacant cells with {:?}", vacant.len(), piece);
        for &index in &vacant {
            self.put_piece(index, piece)?;
        }
        Ok(vacant.len())
    }

    pub fn count(&self, piece: Piece) -> usize {
        self.get_indexes(piece).count()
    }

    pub fn get_all_pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        self.valid_indexes
            .iter()
            .map(move |&index| self.pieces[index])
            .filter(|piece| *piece != Piece::Empty)
    }

    /// Cells holding the same kind of piece as `piece`.
    pub fn get_indexes(&self, piece: Piece) -> impl Iterator<Item = usize> + '_ {
        self.valid_indexes
            .iter()
            .copied()
            .filter(move |&index| self.pieces[index].same_kind(&piece))
    }

    pub fn get_locations(&self, piece: Piece) -> impl Iterator<Item = Location> + '_ {
        self.get_indexes(piece).map(move |index| self.to_location(index))
    }

    pub fn get_valid_indexes(&self) -> impl Iterator<Item = usize> + '_ {
        self.valid_indexes.iter().copied()
    }

    pub fn get_valid_locations(&self) -> impl Iterator<Item = Location> + '_ {
        self.get_valid_indexes().map(move |index| self.to_location(index))
    }

    pub fn get_occupied_indexes(&self) -> impl Iterator<Item = usize> + '_ {
        self.valid_indexes
            .iter()
            .copied()
            .filter(move |&index| self.pieces[index] != Piece::Empty)
    }

    pub fn get_occupied_locations(&self) -> impl Iterator<Item = Location> + '_ {
        self.get_occupied_indexes().map(move |index| self.to_location(index))
    }

    pub fn get_vacant_indexes(&self) -> impl Iterator<Item = usize> + '_ {
        self.get_indexes(Piece::Empty)
    }

    pub fn get_vacant_locations(&self) -> impl Iterator<Item = Location> + '_ {
        self.get_vacant_indexes().map(move |index| self.to_location(index))
    }

    /// Walks from `start` by `direction` until the next cell is a guard.
    ///
    /// Yields nothing when `start` is itself a guard or outside storage, and
    /// only `start` for a zero stride. Strides other than the eight direction
    /// strides can hop over the ring.
    pub fn get_series_indexes(&self, start: usize, direction: isize) -> impl Iterator<Item = usize> + '_ {
        iter::successors(Some(start), move |&index| {
            if direction == 0 {
                None
            } else {
                index.checked_add_signed(direction)
            }
        })
        .take_while(move |&index| self.is_valid_index(index))
    }

    pub fn get_series_locations(&self, start: Location, direction: Direction) -> impl Iterator<Item = Location> + '_ {
        // Anything beyond the frame maps to no cell at all.
        let start = if start.x <= self.x_size + 1 && start.y <= self.y_size + 1 {
            self.index_of(start)
        } else {
            usize::MAX
        };
        self.get_series_indexes(start, self.direction(direction))
            .map(move |index| self.to_location(index))
    }

    pub fn up_direction(&self) -> isize {
        -(self.width() as isize)
    }

    pub fn down_direction(&self) -> isize {
        self.width() as isize
    }

    pub fn left_direction(&self) -> isize {
        -1
    }

    pub fn right_direction(&self) -> isize {
        1
    }

    pub fn upper_right_direction(&self) -> isize {
        self.up_direction() + self.right_direction()
    }

    pub fn upper_left_direction(&self) -> isize {
        self.up_direction() + self.left_direction()
    }

    pub fn lower_right_direction(&self) -> isize {
        self.down_direction() + self.right_direction()
    }

    pub fn lower_left_direction(&self) -> isize {
        self.down_direction() + self.left_direction()
    }

    pub fn direction(&self, direction: Direction) -> isize {
        let (dx, dy) = direction.offset();
        dx + dy * self.width() as isize
    }

    pub fn directions(&self) -> impl Iterator<Item = (Direction, isize)> + '_ {
        Direction::ALL.into_iter().map(move |dir| (dir, self.direction(dir)))
    }

    pub fn subscribe(&mut self, handler: Arc<dyn ChangeHandler>) -> SubscriptionId {
        self.changed.subscribe(handler)
    }

    pub fn on_change<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: Fn(&BoardChanged) + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(handler))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.changed.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.changed.len()
    }
}

/// Copies storage and the write guard. Subscribers stay with the original.
impl Clone for Board {
    fn clone(&self) -> Self {
        Self {
            x_size: self.x_size,
            y_size: self.y_size,
            pieces: self.pieces.clone(),
            valid_indexes: self.valid_indexes.clone(),
            changed: ChangeChannel::new(),
            guard: self.guard.clone(),
        }
    }
}

impl Index<usize> for Board {
    type Output = Piece;

    fn index(&self, index: usize) -> &Piece {
        &self.pieces[index]
    }
}

impl Index<Location> for Board {
    type Output = Piece;

    fn index(&self, location: Location) -> &Piece {
        &self.pieces[self.frame_index(location)]
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("x_size", &self.x_size)
            .field("y_size", &self.y_size)
            .field("occupied", &self.get_occupied_indexes().count())
            .field("changed", &self.changed)
            .field("guarded", &self.guard.is_some())
            .finish()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 1..=self.y_size {
            let row: String = (1..=self.x_size)
                .map(|x| self.pieces[self.to_index(x, y)].symbol())
                .collect();
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder(board: &mut Board) -> Arc<Mutex<Vec<BoardChanged>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        board.on_change(move |event| sink.lock().unwrap().push(*event));
        events
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert_eq!(
            Board::new(0, 4).unwrap_err(),
            BoardError::InvalidDimensions { x_size: 0, y_size: 4 }
        );
        assert!(Board::new(4, 0).is_err());
        assert!(Board::new(usize::MAX, 2).is_err());
    }

    #[test]
    fn border_is_guarded() {
        let board = Board::new(4, 3).unwrap();
        assert_eq!(board.cell_count(), 6 * 5);

        for index in 0..board.cell_count() {
            let expected = if board.is_on_board(board.to_location(index)) {
                Piece::Empty
            } else {
                Piece::Guard
            };
            assert_eq!(board.get_piece(index), expected, "index {}", index);
        }
        assert_eq!(board.get_valid_indexes().count(), 12);
    }

    #[test]
    fn index_and_location_round_trip() {
        let board = Board::new(7, 4).unwrap();
        for index in 0..board.cell_count() {
            assert_eq!(board.index_of(board.to_location(index)), index);
        }
        assert_eq!(board.to_index(1, 1), 10);
        assert_eq!(board.to_location(10), Location::new(1, 1));
    }

    #[test]
    fn write_publishes_once() {
        let mut board = Board::new(3, 3).unwrap();
        let events = recorder(&mut board);
        let loc = Location::new(2, 3);

        board.set(loc, Piece::Black).unwrap();
        board.set(loc, Piece::Black).unwrap();

        assert_eq!(board[loc], Piece::Black);
        let expected = BoardChanged { location: loc, piece: Piece::Black };
        assert_eq!(*events.lock().unwrap(), vec![expected, expected]);
    }

    #[test]
    fn sentinel_writes_fail_silently_for_subscribers() {
        let mut board = Board::new(3, 3).unwrap();
        let events = recorder(&mut board);

        assert_eq!(board.put_piece(0, Piece::Black), Err(BoardError::OutOfRange { index: 0 }));
        let past_end = board.cell_count();
        assert_eq!(
            board.put_piece(past_end, Piece::White),
            Err(BoardError::OutOfRange { index: past_end })
        );
        assert!(board.set(Location::new(4, 1), Piece::Black).is_err());
        assert!(board.set(Location::new(9, 1), Piece::Black).is_err());

        assert_eq!(board.get_piece(0), Piece::Guard);
        assert_eq!(board.piece_at(Location::new(4, 1)), Piece::Guard);
        assert_eq!(board.piece_at(Location::new(1, 2)), Piece::Empty);
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn guard_piece_cannot_be_written_inside() {
        let mut board = Board::new(2, 2).unwrap();
        let err = board.set(Location::new(1, 1), Piece::Guard).unwrap_err();
        assert!(matches!(err, BoardError::Rejected { .. }));
        assert_eq!(board.piece_at(Location::new(1, 1)), Piece::Empty);
    }

    #[test]
    fn write_guard_can_veto() {
        let mut board = Board::new(3, 3)
            .unwrap()
            .with_write_guard(|board: &Board, location: Location, piece: Piece| {
                if piece.has_color() && board.piece_at(location).has_color() {
                    Err(format!("{} is taken", location))
                } else {
                    Ok(())
                }
            });
        let events = recorder(&mut board);
        let loc = Location::new(1, 1);

        board.set(loc, Piece::Black).unwrap();
        let err = board.set(loc, Piece::White).unwrap_err();

        assert_eq!(
            err,
            BoardError::Rejected { location: loc, reason: "(1,1) is taken".to_string() }
        );
        assert_eq!(board[loc], Piece::Black);
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn clear_all_fires_per_cell() {
        let mut board = Board::new(4, 4).unwrap();
        board.set(Location::new(1, 1), Piece::Black).unwrap();
        board.set(Location::new(4, 2), Piece::White).unwrap();
        board.set(Location::new(3, 4), Piece::Black).unwrap();
        let events = recorder(&mut board);

        board.clear_all().unwrap();

        assert_eq!(board.get_occupied_indexes().count(), 0);
        let cleared: Vec<_> = events.lock().unwrap().iter().map(|e| (e.location, e.piece)).collect();
        assert_eq!(
            cleared,
            vec![
                (Location::new(1, 1), Piece::Empty),
                (Location::new(4, 2), Piece::Empty),
                (Location::new(3, 4), Piece::Empty),
            ]
        );
    }

    #[test]
    fn fill_and_count() {
        let mut board = Board::new(3, 2).unwrap();
        board.set(Location::new(2, 1), Piece::Black).unwrap();

        assert_eq!(board.fill_vacant(Piece::White).unwrap(), 5);
        assert_eq!(board.count(Piece::White), 5);
        assert_eq!(board.count(Piece::Black), 1);
        assert_eq!(board.get_vacant_indexes().count(), 0);
    }

    #[test]
    fn direction_strides() {
        let board = Board::new(5, 5).unwrap();
        assert_eq!(board.right_direction(), 1);
        assert_eq!(board.down_direction(), 7);
        assert_eq!(board.upper_left_direction(), -8);
        assert_eq!(board.upper_right_direction(), -6);
        assert_eq!(board.lower_left_direction(), 6);
        assert_eq!(board.lower_right_direction(), 8);

        for (dir, stride) in board.directions() {
            assert_eq!(board.direction(dir.opposite()), -stride);
        }
        assert_eq!(board.direction(Direction::Up), board.up_direction());
    }

    #[test]
    fn series_stops_before_border() {
        let board = Board::new(5, 5).unwrap();
        let start = board.to_index(2, 3);

        let right: Vec<_> = board.get_series_indexes(start, board.right_direction()).collect();
        assert_eq!(right, (2..=5).map(|x| board.to_index(x, 3)).collect::<Vec<_>>());

        let upper_left: Vec<_> = board
            .get_series_locations(Location::new(2, 3), Direction::UpperLeft)
            .collect();
        assert_eq!(upper_left, vec![Location::new(2, 3), Location::new(1, 2)]);

        assert_eq!(board.get_series_indexes(0, 1).count(), 0);
        assert_eq!(board.get_series_indexes(start, 0).count(), 1);
        assert_eq!(board.get_series_indexes(usize::MAX, -1).count(), 0);
    }

    #[test]
    fn clone_is_independent() {
        let mut board = Board::new(3, 3).unwrap();
        let events = recorder(&mut board);
        board.set(Location::new(1, 1), Piece::Black).unwrap();

        let mut copy = board.clone();
        assert_eq!(copy.subscriber_count(), 0);
        copy.set(Location::new(1, 1), Piece::White).unwrap();
        copy.set(Location::new(3, 3), Piece::Black).unwrap();

        assert_eq!(board.piece_at(Location::new(1, 1)), Piece::Black);
        assert_eq!(board.piece_at(Location::new(3, 3)), Piece::Empty);
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn displays_rows() {
        let mut board = Board::new(3, 2).unwrap();
        board.set(Location::new(1, 1), Piece::Black).unwrap();
        board.set(Location::new(3, 2), Piece::White).unwrap();
        assert_eq!(board.to_string(), "B..\n..W\n");
    }

    #[test]
    #[should_panic]
    fn reading_past_storage_panics() {
        let board = Board::new(2, 2).unwrap();
        board.get_piece(board.cell_count());
    }
}
