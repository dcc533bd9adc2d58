use bevy::math::Vec2;
use board_core::Location;

/// How the grid lines are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoardType {
    /// Lines through cell centres, stones sit on intersections.
    Go,
    /// Lines on cell boundaries, pieces sit inside squares.
    #[default]
    Chess,
}

/// Pixel layout of a board.
///
/// Canvas space has its origin at the top-left corner with y pointing down,
/// matching board rows. World space is bevy's: origin at the centre, y up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasGeometry {
    pub x_size: usize,
    pub y_size: usize,
    pub cell_width: f32,
    pub cell_height: f32,
}

impl CanvasGeometry {
    pub fn new(x_size: usize, y_size: usize, cell_size: f32) -> Self {
        Self {
            x_size,
            y_size,
            cell_width: cell_size,
            cell_height: cell_size,
        }
    }

    pub fn width(&self) -> f32 {
        self.cell_width * self.x_size as f32
    }

    pub fn height(&self) -> f32 {
        self.cell_height * self.y_size as f32
    }

    /// Top-left corner of a cell in canvas space.
    pub fn to_point(&self, location: Location) -> Vec2 {
        Vec2::new(
            self.cell_width * (location.x as f32 - 1.0),
            self.cell_height * (location.y as f32 - 1.0),
        )
    }

    /// Cell under a canvas point. Points off the canvas snap to the
    /// nearest edge cell.
    pub fn to_location(&self, point: Vec2) -> Location {
        let column = ((point.x / self.cell_width).floor().max(0.0) as usize).min(self.x_size - 1);
        let row = ((point.y / self.cell_height).floor().max(0.0) as usize).min(self.y_size - 1);
        Location::new(column + 1, row + 1)
    }

    pub fn canvas_to_world(&self, point: Vec2) -> Vec2 {
        Vec2::new(point.x - self.width() / 2.0, self.height() / 2.0 - point.y)
    }

    pub fn world_to_canvas(&self, world: Vec2) -> Vec2 {
        Vec2::new(world.x + self.width() / 2.0, self.height() / 2.0 - world.y)
    }

    pub fn cell_center_world(&self, location: Location) -> Vec2 {
        let corner = self.to_point(location);
        self.canvas_to_world(corner + Vec2::new(self.cell_width / 2.0, self.cell_height / 2.0))
    }

    /// Canvas x positions of the vertical lines and y positions of the
    /// horizontal ones.
    pub fn ruled_lines(&self, board_type: BoardType) -> (Vec<f32>, Vec<f32>) {
        let (start_x, start_y) = match board_type {
            BoardType::Chess => (0.0, 0.0),
            BoardType::Go => (self.cell_width / 2.0, self.cell_height / 2.0),
        };
        let lines = |start: f32, step: f32, limit: f32| {
            let mut positions = Vec::new();
            let mut at = start;
            // Half a pixel of slack so the closing boundary survives rounding.
            while at <= limit + 0.5 {
                positions.push(at);
                at += step;
            }
            positions
        };
        (
            lines(start_x, self.cell_width, self.width()),
            lines(start_y, self.cell_height, self.height()),
        )
    }
}
