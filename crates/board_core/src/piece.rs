use std::mem;

/// Display colour of a stone, stored as alpha/red/green/blue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceColor {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl PieceColor {
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }
}

/// What a single cell holds.
///
/// `Guard` only ever appears on the one-cell border around the playing area,
/// so walks across the storage can stop on it instead of checking bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Piece {
    #[default]
    Empty,
    Guard,
    Black,
    White,
}

impl Piece {
    /// Colour used when drawing the piece. Only stones have one.
    pub fn color(&self) -> Option<PieceColor> {
        match self {
            Piece::Black => Some(PieceColor::from_argb(255, 128, 128, 128)),
            Piece::White => Some(PieceColor::from_argb(255, 255, 255, 255)),
            Piece::Empty | Piece::Guard => None,
        }
    }

    pub fn has_color(&self) -> bool {
        self.color().is_some()
    }

    /// True when both pieces are the same variant.
    pub fn same_kind(&self, other: &Piece) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }

    /// Empty -> Black -> White -> Empty. Guard stays Guard.
    pub fn cycle(&self) -> Piece {
        match self {
            Piece::Empty => Piece::Black,
            Piece::Black => Piece::White,
            Piece::White => Piece::Empty,
            Piece::Guard => Piece::Guard,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Piece::Empty => '.',
            Piece::Guard => '#',
            Piece::Black => 'B',
            Piece::White => 'W',
        }
    }
}
