//! Sprite images used by the track builder and the renderer
//!
//! The core only needs integer dimensions and per-texel transparency, so
//! any source of images can stand behind [`AssetProvider`]. The built-in
//! [`ProceduralAssets`] doubles as the placeholder set when nothing else
//! is available.

pub mod procedural;
pub mod sprite;

pub use procedural::ProceduralAssets;
pub use sprite::Sprite;

use crate::game::Facing;

/// Supplies decoration and vehicle sprites
pub trait AssetProvider {
    /// Decoration sprites, indexed by the track builder
    fn decorations(&self) -> &[Sprite];

    /// Player vehicle for the given steering direction
    fn vehicle(&self, facing: Facing) -> &Sprite;

    /// Opponent vehicle, drawn on the road at its track position
    fn opponent(&self) -> &Sprite;
}
