use bevy::prelude::*;
use board_core::{Location, Piece};
use board_ui::{BoardUiPlugin, BoardUiConfig, BoardState};

// Seeds a couple of stones so the first frame shows something.
fn seed_board(mut state: ResMut<BoardState>) {
    for (x, y, piece) in [(4, 4, Piece::Black), (5, 5, Piece::Black), (4, 5, Piece::White), (5, 4, Piece::White)] {
        if let Err(err) = state.board.set(Location::new(x, y), piece) {
            warn!("could not seed ({},{}): {}", x, y, err);
        }
    }
}

fn main() {
    App::new()
        .add_plugins(BoardUiPlugin {
            config: BoardUiConfig::default(),
        })
        .add_systems(PreStartup, seed_board)
        .run();
}
