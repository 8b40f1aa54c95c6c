//! Model catalogue and loaders.

pub mod library;
pub mod obj;

use crate::data::MeshData;
use anyhow::Result;
use parallax_core::Aabb;

pub use library::ObjLibrary;

/// A model ready for upload, plus the bounds used to auto-fit it.
#[derive(Debug, Clone)]
pub struct LoadedAsset {
    pub mesh: MeshData,
    /// Bounds after recentring (symmetric about the origin).
    pub bounds: Aabb,
}

/// Source of selectable models.
pub trait AssetProvider {
    /// Display names, sorted, stable between calls.
    fn names(&self) -> &[String];

    fn load(&self, name: &str) -> Result<LoadedAsset>;
}
