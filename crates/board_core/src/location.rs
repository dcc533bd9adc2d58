use std::fmt;

/// A cell coordinate, 1-based inside the board. Column 0 and row 0 (and
/// `size + 1` on each axis) address the sentinel ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub x: usize,
    pub y: usize,
}

impl Location {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl From<(usize, usize)> for Location {
    fn from((x, y): (usize, usize)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_as_pair() {
        assert_eq!(Location::new(3, 10).to_string(), "(3,10)");
    }

    #[test]
    fn equality_is_by_value() {
        assert_eq!(Location::new(2, 5), Location::from((2, 5)));
        assert_ne!(Location::new(2, 5), Location::new(5, 2));
    }
}
