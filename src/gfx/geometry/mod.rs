//! # Procedural Geometry Generation
//!
//! Generates the primitive shapes used to populate scenes without external
//! model files, plus the inward-facing cube the skybox is drawn with.
//!
//! ## Usage
//!
//! ```rust
//! use spectral_explorer::gfx::geometry::{generate_cube, generate_sphere};
//!
//! let cube = generate_cube();
//! let sphere = generate_sphere(32, 16);
//! assert_eq!(cube.to_triangle_list().len(), 36);
//! assert!(sphere.triangle_count() > 0);
//! ```

pub mod primitives;

pub use primitives::*;

use crate::gfx::scene::vertex::Vertex3D;

/// Indexed geometry as produced by the generators
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Expands the indexed data into the flat triangle list models are drawn from.
    ///
    /// Indices that point past the vertex array are skipped together with the
    /// rest of their triangle.
    pub fn to_triangle_list(&self) -> Vec<Vertex3D> {
        let mut out = Vec::with_capacity(self.indices.len());
        for triangle in self.indices.chunks_exact(3) {
            let corners: Option<Vec<Vertex3D>> = triangle
                .iter()
                .map(|&i| {
                    let i = i as usize;
                    self.vertices.get(i).map(|&position| {
                        Vertex3D::new(position, self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]))
                    })
                })
                .collect();
            if let Some(corners) = corners {
                out.extend(corners);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_list_skips_out_of_range_triangles() {
        let data = GeometryData {
            vertices: vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            indices: vec![0, 1, 2, 0, 1, 9],
        };
        let list = data.to_triangle_list();
        assert_eq!(list.len(), 3);
        assert_eq!(list[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(list[2].normal, [0.0, 0.0, 1.0]);
    }
}
