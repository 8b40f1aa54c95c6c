//! Data handling modules for the viewer.
//!
//! This module provides the vertex and uniform layouts shared between the
//! asset loader and the GPU pipelines.

pub mod types;

// Re-export commonly used types for convenience.
pub use self::types::{LineVertex, MeshData, MeshGpu, MeshUniformStd140, MeshVertex};
