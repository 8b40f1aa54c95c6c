//! Minimal Wavefront OBJ reader: positions and polygon faces only.
//!
//! Texture coordinates, normals, groups and materials are skipped; normals
//! are recomputed per vertex from the triangulated faces.

use super::LoadedAsset;
use crate::data::{MeshData, MeshVertex};
use anyhow::{bail, Context, Result};
use glam::Vec3;
use parallax_core::Aabb;
use rayon::prelude::*;
use std::io::{BufRead, BufReader, Read};

/// Read positions and faces from an OBJ source and build a renderable mesh,
/// recentred on its bounding-box centre.
pub fn parse_obj<R: Read>(reader: R) -> Result<LoadedAsset> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();
    let mut polygon: Vec<u32> = Vec::with_capacity(8);

    for (line_no, line_result) in BufReader::new(reader).lines().enumerate() {
        let line = line_result?;
        let mut parts = line.split_whitespace();

        match parts.next() {
            Some("v") => {
                let mut coord = |axis: &str| -> Result<f32> {
                    parts
                        .next()
                        .with_context(|| format!("line {}: missing {axis} coordinate", line_no + 1))?
                        .parse::<f32>()
                        .with_context(|| format!("line {}: bad {axis} coordinate", line_no + 1))
                };
                let p = Vec3::new(coord("x")?, coord("y")?, coord("z")?);
                if !p.is_finite() {
                    bail!("line {}: non-finite vertex", line_no + 1);
                }
                positions.push(p);
            }
            Some("f") => {
                polygon.clear();
                for token in parts {
                    polygon.push(resolve_index(token, positions.len()).with_context(|| {
                        format!("line {}: bad face index '{token}'", line_no + 1)
                    })?);
                }
                if polygon.len() < 3 {
                    bail!("line {}: face needs at least 3 vertices", line_no + 1);
                }
                // Fan triangulation; fine for the convex polygons exporters emit.
                for i in 1..polygon.len() - 1 {
                    indices.extend_from_slice(&[polygon[0], polygon[i], polygon[i + 1]]);
                }
            }
            _ => {}
        }
    }

    if indices.is_empty() {
        bail!("no faces found ({} vertices)", positions.len());
    }

    let raw_bounds =
        Aabb::from_points(positions.iter().copied()).context("mesh has no usable vertices")?;
    let center = raw_bounds.center();
    positions.par_iter_mut().for_each(|p| *p -= center);

    let normals = vertex_normals(&positions, &indices);
    let vertices = positions
        .par_iter()
        .zip(normals.par_iter())
        .map(|(p, n)| MeshVertex {
            position: p.to_array(),
            normal: n.to_array(),
        })
        .collect();

    Ok(LoadedAsset {
        mesh: MeshData { vertices, indices },
        bounds: Aabb {
            min: raw_bounds.min - center,
            max: raw_bounds.max - center,
        },
    })
}

/// Resolves a `v`, `v/vt`, `v//vn` or `v/vt/vn` token to a zero-based index.
/// Negative indices count back from the most recent vertex.
fn resolve_index(token: &str, vertex_count: usize) -> Result<u32> {
    let raw: i64 = token
        .split('/')
        .next()
        .unwrap_or_default()
        .parse()
        .context("not an integer")?;
    let resolved = match raw {
        0 => bail!("OBJ indices are 1-based"),
        r if r > 0 => r - 1,
        r => vertex_count as i64 + r,
    };
    if resolved < 0 || resolved >= vertex_count as i64 {
        bail!("index {raw} out of range for {vertex_count} vertices");
    }
    Ok(resolved as u32)
}

/// Area-weighted smooth normals.
fn vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let face_normals: Vec<Vec3> = indices
        .par_chunks_exact(3)
        .map(|tri| {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| positions[i as usize]);
            (b - a).cross(c - a)
        })
        .collect();

    let mut normals = vec![Vec3::ZERO; positions.len()];
    for (tri, n) in indices.chunks_exact(3).zip(&face_normals) {
        for &i in tri {
            normals[i as usize] += *n;
        }
    }
    normals.par_iter_mut().for_each(|n| *n = n.normalize_or_zero());
    normals
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
# unit quad in the XY plane, offset from the origin
v 1 1 0
v 3 1 0
v 3 2 0
v 1 2 0
vt 0 0
f 1/1 2/1 3/1 4/1
";

    #[test]
    fn quad_is_triangulated_and_recentred() {
        let obj = parse_obj(QUAD.as_bytes()).unwrap();
        assert_eq!(obj.mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(obj.mesh.vertices.len(), 4);
        assert_eq!(obj.mesh.vertices[0].position, [-1.0, -0.5, 0.0]);
        assert_eq!(obj.bounds.size(), Vec3::new(2.0, 1.0, 0.0));
        assert_eq!(obj.bounds.center(), Vec3::ZERO);
        for v in &obj.mesh.vertices {
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn negative_and_slashed_indices() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3//1 -2//1 -1//1\n";
        let obj = parse_obj(src.as_bytes()).unwrap();
        assert_eq!(obj.mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_obj("v 0 0 0\nv 1 0 0\n".as_bytes()).is_err());
        assert!(parse_obj("v 0 0\nf 1 1 1\n".as_bytes()).is_err());
        assert!(parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\n".as_bytes()).is_err());
        assert!(parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n".as_bytes()).is_err());
        assert!(parse_obj("v 0 0 0\nv 1 0 0\nf 1 2\n".as_bytes()).is_err());
    }

    #[test]
    fn index_resolution() {
        assert_eq!(resolve_index("4/2/1", 10).unwrap(), 3);
        assert_eq!(resolve_index("-1", 10).unwrap(), 9);
        assert!(resolve_index("-11", 10).is_err());
        assert!(resolve_index("x", 10).is_err());
    }
}
