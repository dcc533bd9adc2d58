pub mod bridge;
pub mod canvas;

use bevy::{
    prelude::*,
    sprite::{MaterialMesh2dBundle, Mesh2dHandle},
    window::{PresentMode, WindowResolution},
};
use board_core::{Board, Location, Piece};
use log::{debug, warn};
use std::{collections::HashMap, time::Duration};

pub use bridge::ChangeBridge;
pub use canvas::{BoardType, CanvasGeometry};

const BOARD_MARGIN: f32 = 20.0;
const TEXT_BAND: f32 = 40.0;
const STONE_SCALE: f32 = 0.85;
const OUTLINE_WIDTH: f32 = 1.5;
const HELP: &str = "click: cycle   C: clear   F: fill white   N: count white   S: sync   R: repaint";

/// Demo settings. Sizes are in cells, `cell_size` in pixels.
#[derive(Resource, Debug, Clone)]
pub struct BoardUiConfig {
    pub x_size: usize,
    pub y_size: usize,
    pub board_type: BoardType,
    pub cell_size: f32,
    /// Delay between applied changes. Zero applies everything queued each frame.
    pub update_interval: Duration,
    pub title: String,
}

impl Default for BoardUiConfig {
    fn default() -> Self {
        Self {
            x_size: 10,
            y_size: 10,
            board_type: BoardType::Chess,
            cell_size: 60.0,
            update_interval: Duration::ZERO,
            title: "Board Demo".into(),
        }
    }
}

#[derive(Default)]
pub struct BoardUiPlugin {
    pub config: BoardUiConfig,
}

#[derive(Resource)]
pub struct BoardState {
    pub board: Board,
    pub bridge: ChangeBridge,
    pub geometry: CanvasGeometry,
    pacing: Option<Timer>,
}

impl BoardState {
    pub fn new(config: &BoardUiConfig) -> board_core::Result<Self> {
        let board = Board::new(config.x_size, config.y_size)?;
        let pacing = (!config.update_interval.is_zero())
            .then(|| Timer::new(config.update_interval, TimerMode::Repeating));
        Ok(Self {
            board,
            bridge: ChangeBridge::new(),
            geometry: CanvasGeometry::new(config.x_size, config.y_size, config.cell_size),
            pacing,
        })
    }
}

#[derive(Resource)]
struct PieceAssets {
    stone_mesh: Mesh2dHandle,
    outline_mesh: Mesh2dHandle,
    outline: Handle<ColorMaterial>,
    materials: HashMap<Piece, Handle<ColorMaterial>>,
}

/// Drawn stone entity per cell.
#[derive(Resource, Default)]
struct PieceSprites(HashMap<Location, Entity>);

#[derive(Event)]
struct RepaintBoard;

#[derive(Component)]
struct StatusText;

impl Plugin for BoardUiPlugin {
    fn build(&self, app: &mut App) {
        let state = BoardState::new(&self.config)
            .unwrap_or_else(|err| panic!("invalid board configuration: {}", err));
        let width = state.geometry.width() + 2.0 * BOARD_MARGIN;
        let height = state.geometry.height() + 2.0 * (BOARD_MARGIN + TEXT_BAND);

        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: self.config.title.clone(),
                resolution: WindowResolution::new(width, height),
                present_mode: PresentMode::AutoVsync,
                resizable: false,
                ..default()
            }),
            ..default()
        }))
        .insert_resource(self.config.clone())
        .insert_resource(state)
        .init_resource::<PieceSprites>()
        .add_event::<RepaintBoard>()
        .add_systems(Startup, setup)
        .add_systems(Update, (handle_click, handle_keys, apply_changes, repaint).chain());
    }
}

fn setup(
    mut commands: Commands,
    config: Res<BoardUiConfig>,
    mut state: ResMut<BoardState>,
    mut sprites: ResMut<PieceSprites>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    commands.spawn(Camera2dBundle::default());

    let geometry = state.geometry;
    commands.spawn(SpriteBundle {
        sprite: Sprite {
            color: Color::rgb(0.86, 0.7, 0.45),
            custom_size: Some(Vec2::new(
                geometry.width() + BOARD_MARGIN,
                geometry.height() + BOARD_MARGIN,
            )),
            ..default()
        },
        transform: Transform::from_xyz(0.0, 0.0, 0.0),
        ..default()
    });
    draw_ruled_lines(&mut commands, &geometry, config.board_type);

    let radius = geometry.cell_width.min(geometry.cell_height) * STONE_SCALE / 2.0;
    let assets = PieceAssets {
        stone_mesh: meshes.add(shape::Circle::new(radius).into()).into(),
        outline_mesh: meshes.add(shape::Circle::new(radius + OUTLINE_WIDTH).into()).into(),
        outline: materials.add(ColorMaterial::from(Color::DARK_GRAY)),
        materials: [Piece::Black, Piece::White]
            .into_iter()
            .filter_map(|piece| {
                let c = piece.color()?;
                Some((piece, materials.add(ColorMaterial::from(Color::rgba_u8(c.r, c.g, c.b, c.a)))))
            })
            .collect(),
    };

    // Paint what is already there, then follow changes.
    let state = &mut *state;
    for location in state.board.get_valid_locations() {
        paint_cell(&mut commands, &mut sprites, &assets, &geometry, location, state.board[location]);
    }
    state.bridge.set_synchronize(&mut state.board, true);
    commands.insert_resource(assets);

    commands.spawn((
        TextBundle::from_section(
            "",
            TextStyle {
                font_size: 24.0,
                color: Color::WHITE,
                ..default()
            },
        )
        .with_style(Style {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        }),
        StatusText,
    ));
    commands.spawn(
        TextBundle::from_section(
            HELP,
            TextStyle {
                font_size: 16.0,
                color: Color::GRAY,
                ..default()
            },
        )
        .with_style(Style {
            position_type: PositionType::Absolute,
            bottom: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        }),
    );
}

fn draw_ruled_lines(commands: &mut Commands, geometry: &CanvasGeometry, board_type: BoardType) {
    let (xs, ys) = geometry.ruled_lines(board_type);
    let color = Color::rgb_u8(211, 211, 211);

    for x in xs {
        let at = geometry.canvas_to_world(Vec2::new(x, geometry.height() / 2.0));
        spawn_line(commands, at, Vec2::new(1.0, geometry.height()), color);
    }
    for y in ys {
        let at = geometry.canvas_to_world(Vec2::new(geometry.width() / 2.0, y));
        spawn_line(commands, at, Vec2::new(geometry.width(), 1.0), color);
    }
}

fn spawn_line(commands: &mut Commands, at: Vec2, size: Vec2, color: Color) {
    commands.spawn(SpriteBundle {
        sprite: Sprite {
            color,
            custom_size: Some(size),
            ..default()
        },
        transform: Transform::from_xyz(at.x, at.y, 1.0),
        ..default()
    });
}

/// Replaces whatever is drawn at `location` with `piece`.
fn paint_cell(
    commands: &mut Commands,
    sprites: &mut PieceSprites,
    assets: &PieceAssets,
    geometry: &CanvasGeometry,
    location: Location,
    piece: Piece,
) {
    if let Some(entity) = sprites.0.remove(&location) {
        commands.entity(entity).despawn_recursive();
    }
    let Some(material) = assets.materials.get(&piece) else {
        return;
    };

    let center = geometry.cell_center_world(location);
    let entity = commands
        .spawn(MaterialMesh2dBundle {
            mesh: assets.outline_mesh.clone(),
            material: assets.outline.clone(),
            transform: Transform::from_xyz(center.x, center.y, 2.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn(MaterialMesh2dBundle {
                mesh: assets.stone_mesh.clone(),
                material: material.clone(),
                transform: Transform::from_xyz(0.0, 0.0, 0.1),
                ..default()
            });
        })
        .id();
    sprites.0.insert(location, entity);
}

fn handle_click(
    windows: Query<&Window>,
    camera_q: Query<(&Camera, &GlobalTransform)>,
    mouse_button: Res<Input<MouseButton>>,
    mut state: ResMut<BoardState>,
) {
    if !mouse_button.just_pressed(MouseButton::Left) {
        return;
    }

    let window = windows.single();
    let (camera, camera_transform) = camera_q.single();
    let Some(world_position) = window
        .cursor_position()
        .and_then(|cursor| camera.viewport_to_world(camera_transform, cursor))
        .map(|ray| ray.origin.truncate())
    else {
        return;
    };

    let location = state.geometry.to_location(state.geometry.world_to_canvas(world_position));
    let next = state.board[location].cycle();
    if let Err(err) = state.board.set(location, next) {
        warn!("click at {} ignored: {}", location, err);
    }
}

fn handle_keys(
    keys: Res<Input<KeyCode>>,
    mut state: ResMut<BoardState>,
    mut status: Query<&mut Text, With<StatusText>>,
    mut repaint: EventWriter<RepaintBoard>,
) {
    let state = &mut *state;
    let message = if keys.just_pressed(KeyCode::C) {
        match state.board.clear_all() {
            Ok(()) => "Cleared".to_string(),
            Err(err) => format!("Clear failed: {}", err),
        }
    } else if keys.just_pressed(KeyCode::F) {
        match state.board.fill_vacant(Piece::White) {
            Ok(filled) => format!("Filled {} cells with white", filled),
            Err(err) => format!("Fill failed: {}", err),
        }
    } else if keys.just_pressed(KeyCode::N) {
        format!("White stones: {}", state.board.count(Piece::White))
    } else if keys.just_pressed(KeyCode::S) {
        let synchronize = !state.bridge.is_synchronized();
        state.bridge.set_synchronize(&mut state.board, synchronize);
        if synchronize {
            // Changes made while detached were never queued.
            repaint.send(RepaintBoard);
            "Sync on".to_string()
        } else {
            "Sync off".to_string()
        }
    } else if keys.just_pressed(KeyCode::R) {
        repaint.send(RepaintBoard);
        "Repainted".to_string()
    } else {
        return;
    };

    if let Ok(mut text) = status.get_single_mut() {
        text.sections[0].value = message;
    }
}

fn apply_changes(
    time: Res<Time>,
    mut commands: Commands,
    mut state: ResMut<BoardState>,
    mut sprites: ResMut<PieceSprites>,
    assets: Res<PieceAssets>,
) {
    let limit = match state.pacing.as_mut() {
        None => usize::MAX,
        Some(timer) => {
            if timer.tick(time.delta()).just_finished() {
                1
            } else {
                0
            }
        }
    };
    if limit == 0 {
        return;
    }

    let geometry = state.geometry;
    for event in state.bridge.drain(limit) {
        paint_cell(&mut commands, &mut sprites, &assets, &geometry, event.location, event.piece);
    }
}

fn repaint(
    mut events: EventReader<RepaintBoard>,
    mut commands: Commands,
    state: Res<BoardState>,
    mut sprites: ResMut<PieceSprites>,
    assets: Res<PieceAssets>,
) {
    if events.is_empty() {
        return;
    }
    events.clear();

    debug!("repainting {} cells", state.board.get_valid_indexes().count());
    state.bridge.discard_pending();
    for (_, entity) in sprites.0.drain() {
        commands.entity(entity).despawn_recursive();
    }
    for location in state.board.get_valid_locations() {
        paint_cell(&mut commands, &mut sprites, &assets, &state.geometry, location, state.board[location]);
    }
}
