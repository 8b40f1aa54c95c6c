//! `.obj` files found under a models directory.

use super::{obj::parse_obj, AssetProvider, LoadedAsset};
use anyhow::{Context, Result};
use std::{
    collections::BTreeMap,
    fs::File,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

pub struct ObjLibrary {
    names: Vec<String>,
    paths: BTreeMap<String, PathBuf>,
}

impl ObjLibrary {
    /// Scans `root` recursively. A missing directory yields an empty catalogue.
    pub fn scan(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let paths: BTreeMap<String, PathBuf> = WalkDir::new(&root)
            .follow_links(true)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path()
                    .extension()
                    .and_then(|s| s.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("obj"))
            })
            .map(|e| {
                let name = e
                    .path()
                    .strip_prefix(&root)
                    .unwrap_or(e.path())
                    .to_string_lossy()
                    .replace('\\', "/");
                (name, e.path().to_path_buf())
            })
            .collect();

        if paths.is_empty() {
            log::warn!("No .obj files found in '{}'", root.display());
        } else {
            log::info!("Found {} models in '{}'", paths.len(), root.display());
        }

        Self {
            names: paths.keys().cloned().collect(),
            paths,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl AssetProvider for ObjLibrary {
    fn names(&self) -> &[String] {
        &self.names
    }

    fn load(&self, name: &str) -> Result<LoadedAsset> {
        let path = self
            .paths
            .get(name)
            .with_context(|| format!("unknown model '{name}'"))?;
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let asset = parse_obj(file).with_context(|| format!("parsing {}", path.display()))?;
        log::info!(
            "Loaded '{}': {} vertices, {} triangles",
            name,
            asset.mesh.vertices.len(),
            asset.mesh.indices.len() / 3
        );
        Ok(asset)
    }
}
