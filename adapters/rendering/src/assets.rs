//! Asset-existence queries.
//!
//! Every visual is optional. Backends ask a catalog whether an asset is
//! present and fall back to generated primitives when it is not.

use crate::SpriteRole;

/// Asset a backend may want to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Asset {
    /// Texture for a sprite role.
    Sprite(SpriteRole),
    /// Font used for HUD and overlay text.
    Font,
}

/// Answers whether an asset was loaded.
pub trait AssetCatalog {
    /// Reports whether `asset` is available.
    fn contains(&self, asset: Asset) -> bool;
}

/// Catalog with nothing loaded; everything uses fallbacks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoAssets;

impl AssetCatalog for NoAssets {
    fn contains(&self, _asset: Asset) -> bool {
        false
    }
}

impl<T: AssetCatalog> AssetCatalog for Option<T> {
    fn contains(&self, asset: Asset) -> bool {
        self.as_ref().is_some_and(|catalog| catalog.contains(asset))
    }
}
