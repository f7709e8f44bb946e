use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use glam::Vec2;
use macroquad::{
    math::Vec2 as MacroquadVec2,
    texture::{self, DrawTextureParams, Texture2D},
};
use snake_quest_rendering::{
    assets::{Asset, AssetCatalog},
    Color, SpriteRole,
};

use crate::to_macroquad_color;

const SUPPORTED_MANIFEST_VERSION: u32 = 1;

/// Every role a manifest may provide a texture for.
const ALL_SPRITE_ROLES: [SpriteRole; 16] = [
    SpriteRole::SnakeHead { frame: 0 },
    SpriteRole::SnakeHead { frame: 1 },
    SpriteRole::SnakeHead { frame: 2 },
    SpriteRole::SnakeBody,
    SpriteRole::Food,
    SpriteRole::Wall,
    SpriteRole::BreakableWall,
    SpriteRole::Button { pressed: false },
    SpriteRole::Button { pressed: true },
    SpriteRole::Key { unlocked: false },
    SpriteRole::Key { unlocked: true },
    SpriteRole::BreakerShot,
    SpriteRole::Explosion,
    SpriteRole::PlayerShot,
    SpriteRole::BossBullet,
    SpriteRole::Boss,
];

/// Parameters describing how a sprite should be drawn on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DrawParams {
    /// Top-left corner in screen-space pixels.
    pub(crate) position: Vec2,
    /// Destination size in screen-space pixels.
    pub(crate) size: Vec2,
    /// Rotation applied around the sprite centre, in radians.
    pub(crate) rotation_radians: f32,
    /// Tint applied to the sprite.
    pub(crate) tint: Color,
}

impl DrawParams {
    pub(crate) fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            rotation_radians: 0.0,
            tint: Color::new(1.0, 1.0, 1.0, 1.0),
        }
    }

    pub(crate) fn with_rotation(mut self, rotation_radians: f32) -> Self {
        self.rotation_radians = rotation_radians;
        self
    }

    pub(crate) fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }
}

/// Cache of textures loaded from the sprite manifest.
///
/// Manifests may list any subset of roles; roles without a texture are drawn
/// with primitives.
#[derive(Debug)]
pub(crate) struct SpriteAtlas {
    textures: HashMap<&'static str, Texture2D>,
}

impl SpriteAtlas {
    /// Loads sprites from the manifest located at the provided path.
    pub(crate) fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_manifest_with_loader(path, default_loader)
    }

    /// Returns the default manifest path relative to the working directory.
    pub(crate) fn default_manifest_path() -> PathBuf {
        PathBuf::from("assets/manifest.toml")
    }

    /// Draws the texture for `role`, returning `false` when none is loaded.
    pub(crate) fn draw(&self, role: SpriteRole, params: DrawParams) -> bool {
        let Some(texture) = self.textures.get(role.key()).copied() else {
            return false;
        };

        let DrawParams {
            position,
            size,
            rotation_radians,
            tint,
        } = params;
        let draw_params = DrawTextureParams {
            dest_size: Some(MacroquadVec2::new(size.x, size.y)),
            rotation: rotation_radians,
            pivot: Some(MacroquadVec2::new(
                position.x + size.x * 0.5,
                position.y + size.y * 0.5,
            )),
            ..DrawTextureParams::default()
        };

        texture::draw_texture_ex(
            texture,
            position.x,
            position.y,
            to_macroquad_color(tint),
            draw_params,
        );
        true
    }

    /// Returns the number of textures stored in the atlas.
    pub(crate) fn texture_count(&self) -> usize {
        self.textures.len()
    }

    fn from_manifest_with_loader(
        path: impl AsRef<Path>,
        mut loader: impl FnMut(SpriteRole, &Path) -> Result<Texture2D>,
    ) -> Result<Self> {
        let manifest_path = path.as_ref();
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read sprite manifest at {}",
                manifest_path.display()
            )
        })?;
        let base = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let entries = parse_manifest(&contents, &base)?;
        Self::from_entries(entries, &mut loader)
    }

    fn from_entries(
        entries: Vec<(SpriteRole, PathBuf)>,
        loader: &mut impl FnMut(SpriteRole, &Path) -> Result<Texture2D>,
    ) -> Result<Self> {
        let mut textures = HashMap::with_capacity(entries.len());
        for (role, path) in entries {
            let texture = loader(role, &path).with_context(|| {
                format!("failed to load sprite {} from {}", role.key(), path.display())
            })?;
            if textures.insert(role.key(), texture).is_some() {
                bail!("duplicate sprite entry for {}", role.key());
            }
        }
        Ok(Self { textures })
    }
}

impl AssetCatalog for SpriteAtlas {
    fn contains(&self, asset: Asset) -> bool {
        match asset {
            Asset::Sprite(role) => self.textures.contains_key(role.key()),
            Asset::Font => false,
        }
    }
}

fn default_loader(_role: SpriteRole, path: &Path) -> Result<Texture2D> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read sprite asset at {}", path.display()))?;
    Ok(Texture2D::from_file_with_format(&bytes, None))
}

#[derive(Debug, serde::Deserialize)]
struct Manifest {
    version: u32,
    #[serde(default)]
    sprites: HashMap<String, String>,
}

/// Resolves manifest entries in canonical role order.
fn parse_manifest(contents: &str, base_path: &Path) -> Result<Vec<(SpriteRole, PathBuf)>> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse sprite manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported sprite manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }

    let mut resolved = HashMap::new();
    for (name, relative_path) in manifest.sprites {
        let role = parse_sprite_role(&name)
            .with_context(|| format!("unknown sprite key `{name}` in manifest"))?;
        let _ = resolved.insert(role.key(), (role, base_path.join(relative_path)));
    }

    let mut ordered = Vec::with_capacity(resolved.len());
    for role in ALL_SPRITE_ROLES {
        if let Some(entry) = resolved.remove(role.key()) {
            ordered.push(entry);
        }
    }
    Ok(ordered)
}

fn parse_sprite_role(name: &str) -> Result<SpriteRole> {
    match ALL_SPRITE_ROLES.iter().find(|role| role.key() == name) {
        Some(role) => Ok(*role),
        None => bail!("unknown sprite key `{name}`"),
    }
}
