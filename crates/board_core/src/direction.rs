/// The eight neighbours of a cell. Strides depend on the board width, see
/// [`Board::direction`](crate::Board::direction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    UpperRight,
    Right,
    LowerRight,
    Down,
    LowerLeft,
    Left,
    UpperLeft,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::Up,
        Direction::UpperRight,
        Direction::Right,
        Direction::LowerRight,
        Direction::Down,
        Direction::LowerLeft,
        Direction::Left,
        Direction::UpperLeft,
    ];

    pub fn opposite(&self) -> Direction {
        use Direction::*;
        match self {
            Up => Down,
            UpperRight => LowerLeft,
            Right => Left,
            LowerRight => UpperLeft,
            Down => Up,
            LowerLeft => UpperRight,
            Left => Right,
            UpperLeft => LowerRight,
        }
    }

    /// Column and row offsets, y growing downwards.
    pub fn offset(&self) -> (isize, isize) {
        use Direction::*;
        match self {
            Up => (0, -1),
            UpperRight => (1, -1),
            Right => (1, 0),
            LowerRight => (1, 1),
            Down => (0, 1),
            LowerLeft => (-1, 1),
            Left => (-1, 0),
            UpperLeft => (-1, -1),
        }
    }
}
