#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Snake Quest adapters.
//!
//! The scene is a flat list of sprites expressed in grid cell units plus the
//! text a screen needs. Backends decide how pixels are produced; nothing in
//! this crate feeds back into the simulation.

pub mod assets;
pub mod visuals;

use anyhow::Result as AnyResult;
use glam::Vec2;
use snake_quest_core::{Intent, Screen};
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the color with its alpha multiplied by `factor`.
    #[must_use]
    pub fn with_alpha(self, factor: f32) -> Self {
        Self {
            alpha: self.alpha * factor.clamp(0.0, 1.0),
            ..self
        }
    }
}

/// Fixed palette shared by every backend.
pub mod palette {
    use super::Color;

    /// Playfield background.
    pub const BACKGROUND: Color = Color::from_rgb_u8(10, 10, 10);
    /// Grid lines.
    pub const GRID: Color = Color::from_rgb_u8(40, 40, 40);
    /// Snake body.
    pub const SNAKE: Color = Color::from_rgb_u8(0, 200, 0);
    /// Snake head.
    pub const SNAKE_HEAD: Color = Color::from_rgb_u8(80, 230, 80);
    /// Food.
    pub const FOOD: Color = Color::from_rgb_u8(200, 30, 30);
    /// Walls.
    pub const WALL: Color = Color::from_rgb_u8(120, 120, 140);
    /// Gate button.
    pub const BUTTON: Color = Color::from_rgb_u8(60, 120, 220);
    /// Gate key.
    pub const KEY: Color = Color::from_rgb_u8(230, 200, 40);
    /// HUD text.
    pub const HUD: Color = Color::from_rgb_u8(235, 235, 235);
    /// Explosion rings.
    pub const EXPLOSION: Color = Color::from_rgb_u8(255, 210, 120);
    /// Boss body.
    pub const BOSS: Color = Color::from_rgb_u8(170, 40, 160);
    /// Boss bullets.
    pub const BOSS_BULLET: Color = Color::from_rgb_u8(255, 90, 60);
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Logical intents captured during the frame.
    pub intents: Vec<Intent>,
    /// Whether the window was asked to close.
    pub close_requested: bool,
}

/// Decision returned by the frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Keep presenting frames.
    Continue,
    /// Close the window and return from the backend.
    Exit,
}

/// Dimensions of the playfield and the HUD band above it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPresentation {
    /// Number of columns in the grid.
    pub columns: u32,
    /// Number of rows in the grid.
    pub rows: u32,
    /// Side length of a cell in pixels.
    pub tile_size: f32,
    /// Height of the HUD band in pixels.
    pub hud_height: f32,
    /// Color used when drawing grid lines.
    pub line_color: Color,
}

impl GridPresentation {
    /// Creates a new grid descriptor.
    ///
    /// Returns an error when `tile_size` is not a positive finite number.
    pub fn new(
        columns: u32,
        rows: u32,
        tile_size: f32,
        hud_height: f32,
        line_color: Color,
    ) -> std::result::Result<Self, RenderingError> {
        if !tile_size.is_finite() || tile_size <= 0.0 {
            return Err(RenderingError::InvalidTileSize { tile_size });
        }

        Ok(Self {
            columns,
            rows,
            tile_size,
            hud_height: hud_height.max(0.0),
            line_color,
        })
    }

    /// Width of the playfield in pixels.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile_size
    }

    /// Height of the playfield in pixels, excluding the HUD band.
    #[must_use]
    pub fn playfield_height(&self) -> f32 {
        self.rows as f32 * self.tile_size
    }

    /// Height of the whole window content in pixels.
    #[must_use]
    pub fn total_height(&self) -> f32 {
        self.playfield_height() + self.hud_height
    }

    /// Converts a position in cell units into unscaled pixels below the HUD.
    #[must_use]
    pub fn cell_to_pixels(&self, cell: Vec2) -> Vec2 {
        Vec2::new(
            cell.x * self.tile_size,
            cell.y * self.tile_size + self.hud_height,
        )
    }
}

/// What a sprite depicts; backends map roles to textures or primitives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteRole {
    /// Snake head on one of its animation frames.
    SnakeHead {
        /// Animation frame index.
        frame: u8,
    },
    /// Snake body segment.
    SnakeBody,
    /// Food item.
    Food,
    /// Solid wall.
    Wall,
    /// Wall that a breaker shot can destroy.
    BreakableWall,
    /// Gate button.
    Button {
        /// Whether the body has passed over it.
        pressed: bool,
    },
    /// Gate key.
    Key {
        /// Whether the key can be collected.
        unlocked: bool,
    },
    /// Shot fired at a breakable wall.
    BreakerShot,
    /// Expanding ring left by a broken wall.
    Explosion,
    /// Player projectile in the side-scroller.
    PlayerShot,
    /// Boss projectile.
    BossBullet,
    /// Boss body.
    Boss,
}

impl SpriteRole {
    /// Name used for the role in sprite manifests.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::SnakeHead { frame: 0 } => "snake_head_0",
            Self::SnakeHead { frame: 1 } => "snake_head_1",
            Self::SnakeHead { .. } => "snake_head_2",
            Self::SnakeBody => "snake_body",
            Self::Food => "food",
            Self::Wall => "wall",
            Self::BreakableWall => "breakable_wall",
            Self::Button { pressed: false } => "button",
            Self::Button { pressed: true } => "button_pressed",
            Self::Key { unlocked: false } => "key_locked",
            Self::Key { unlocked: true } => "key",
            Self::BreakerShot => "breaker_shot",
            Self::Explosion => "explosion",
            Self::PlayerShot => "player_shot",
            Self::BossBullet => "boss_bullet",
            Self::Boss => "boss",
        }
    }

    /// Fallback color used when no texture is available for the role.
    #[must_use]
    pub const fn fallback_color(self) -> Color {
        match self {
            Self::SnakeHead { .. } => palette::SNAKE_HEAD,
            Self::SnakeBody => palette::SNAKE,
            Self::Food => palette::FOOD,
            Self::Wall | Self::BreakableWall => palette::WALL,
            Self::Button { .. } => palette::BUTTON,
            Self::Key { .. } => palette::KEY,
            Self::BreakerShot | Self::PlayerShot => palette::HUD,
            Self::Explosion => palette::EXPLOSION,
            Self::BossBullet => palette::BOSS_BULLET,
            Self::Boss => palette::BOSS,
        }
    }
}

/// Positioned sprite expressed in cell units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneSprite {
    /// Top-left corner of the sprite in cells; fractional during interpolation.
    pub position: Vec2,
    /// Footprint of the sprite in cells.
    pub size: Vec2,
    /// Clockwise rotation applied around the sprite centre, in degrees.
    pub rotation_degrees: f32,
    /// What the sprite depicts.
    pub role: SpriteRole,
    /// Opacity multiplier in the range 0.0..=1.0.
    pub alpha: f32,
}

impl SceneSprite {
    /// Creates an opaque, unrotated single-cell sprite.
    #[must_use]
    pub fn cell(position: Vec2, role: SpriteRole) -> Self {
        Self {
            position,
            size: Vec2::ONE,
            rotation_degrees: 0.0,
            role,
            alpha: 1.0,
        }
    }

    /// Replaces the footprint of the sprite.
    #[must_use]
    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    /// Replaces the rotation of the sprite.
    #[must_use]
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation_degrees = degrees;
        self
    }

    /// Replaces the opacity of the sprite.
    #[must_use]
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    /// Centre of the sprite in cells.
    #[must_use]
    pub fn centre(&self) -> Vec2 {
        self.position + self.size * 0.5
    }
}

/// Values shown in the HUD band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HudView {
    /// Points scored in the run.
    pub points: u32,
    /// Current level number.
    pub level: u32,
    /// Gameplay time elapsed in the run.
    pub elapsed: Duration,
    /// Remaining shots, shown only where shooting is available.
    pub ammo: Option<u32>,
}

impl HudView {
    /// Elapsed time formatted as `mm:ss`.
    #[must_use]
    pub fn time_label(&self) -> String {
        let seconds = self.elapsed.as_secs();
        format!("{:02}:{:02}", seconds / 60, seconds % 60)
    }

    /// Text lines drawn in the HUD, left to right.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        let mut labels = vec![
            format!("Score: {}", self.points),
            format!("Level: {}", self.level),
            format!("Time: {}", self.time_label()),
        ];
        if let Some(ammo) = self.ammo {
            labels.push(format!("Ammo: {ammo}"));
        }
        labels
    }
}

/// Single row of a menu page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuEntry {
    /// Text shown for the row.
    pub label: String,
    /// Whether the cursor rests on the row.
    pub selected: bool,
}

/// Title menu page ready for drawing.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct MenuView {
    /// Page heading.
    pub title: String,
    /// Rows in display order.
    pub entries: Vec<MenuEntry>,
    /// Key hint drawn along the bottom edge.
    pub prompt: String,
}

/// Modal text drawn over the playfield.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct OverlayView {
    /// Headline of the overlay.
    pub title: String,
    /// Body and prompt lines.
    pub lines: Vec<String>,
    /// Whether the text sits in a bordered box.
    pub boxed: bool,
}

/// Everything a backend needs to draw one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Playfield dimensions.
    pub grid: GridPresentation,
    /// Screen the frame belongs to.
    pub screen: Screen,
    /// Sprites in draw order.
    pub sprites: Vec<SceneSprite>,
    /// HUD values, when the HUD is visible.
    pub hud: Option<HudView>,
    /// Menu page, when a menu is visible.
    pub menu: Option<MenuView>,
    /// Modal overlay, when one is visible.
    pub overlay: Option<OverlayView>,
    /// Opacity of the title text drawn during story and intro animations.
    pub title_fade: Option<f32>,
    /// Darkening applied over the playfield, 0.0 for none.
    pub screen_fade: f32,
}

impl Scene {
    /// Creates an empty scene on the intro screen.
    #[must_use]
    pub fn new(grid: GridPresentation) -> Self {
        Self {
            grid,
            screen: Screen::Intro,
            sprites: Vec::new(),
            hud: None,
            menu: None,
            overlay: None,
            title_fade: None,
            screen_fade: 0.0,
        }
    }

    /// Drops all per-frame content while keeping the grid and sprite buffer.
    pub fn clear(&mut self) {
        self.sprites.clear();
        self.hud = None;
        self.menu = None;
        self.overlay = None;
        self.title_fade = None;
        self.screen_fade = 0.0;
    }

    /// Height of the entire scene including the HUD band.
    #[must_use]
    pub fn total_height(&self) -> f32 {
        self.grid.total_height()
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Snake Quest scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until the callback asks to exit.
    ///
    /// The provided `update_scene` closure receives the monotonic time since
    /// the backend started, the input captured for the frame, and rebuilds the
    /// scene before it is drawn.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameOutcome + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Tiles must have a positive finite size.
    InvalidTileSize {
        /// Provided size that failed validation.
        tile_size: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileSize { tile_size } => {
                write!(f, "tile_size must be positive (received {tile_size})")
            }
        }
    }
}

impl Error for RenderingError {}
