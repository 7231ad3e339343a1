//! # Primitive Shape Generation
//!
//! All shapes are Y-up with counter-clockwise winding seen from outside, so
//! back-face culling in the shadow pass keeps the lit side.

use super::GeometryData;
use std::f32::consts::PI;

/// Generate a unit cube centered at the origin
///
/// Returns a cube with vertices from -0.5 to 0.5 on all axes.
/// Each face has its own four vertices so normals stay flat.
pub fn generate_cube() -> GeometryData {
    let mut data = GeometryData::new();

    #[rustfmt::skip]
    let positions = [
        // Front face
        [-0.5, -0.5,  0.5], [ 0.5, -0.5,  0.5], [ 0.5,  0.5,  0.5], [-0.5,  0.5,  0.5],
        // Back face
        [-0.5, -0.5, -0.5], [-0.5,  0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5, -0.5, -0.5],
        // Left face
        [-0.5, -0.5, -0.5], [-0.5, -0.5,  0.5], [-0.5,  0.5,  0.5], [-0.5,  0.5, -0.5],
        // Right face
        [ 0.5, -0.5,  0.5], [ 0.5, -0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5,  0.5,  0.5],
        // Top face
        [-0.5,  0.5,  0.5], [ 0.5,  0.5,  0.5], [ 0.5,  0.5, -0.5], [-0.5,  0.5, -0.5],
        // Bottom face
        [-0.5, -0.5, -0.5], [ 0.5, -0.5, -0.5], [ 0.5, -0.5,  0.5], [-0.5, -0.5,  0.5],
    ];

    let face_normals = [
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [-1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
    ];

    data.vertices = positions.to_vec();
    data.normals = face_normals
        .iter()
        .flat_map(|normal| std::iter::repeat(*normal).take(4))
        .collect();

    // Two triangles per face
    data.indices = (0..6u32)
        .flat_map(|face| {
            let base = face * 4;
            [base, base + 1, base + 2, base + 2, base + 3, base]
        })
        .collect();

    data
}

/// Generate the skybox cube: a cube of the given half extent seen from inside.
///
/// Winding and normals are flipped so the faces point towards the centre.
pub fn generate_skybox_cube(half_extent: f32) -> GeometryData {
    let mut data = generate_cube();
    let scale = half_extent * 2.0;

    for position in &mut data.vertices {
        for component in position.iter_mut() {
            *component *= scale;
        }
    }
    for normal in &mut data.normals {
        for component in normal.iter_mut() {
            *component = -*component;
        }
    }
    for triangle in data.indices.chunks_exact_mut(3) {
        triangle.swap(1, 2);
    }

    data
}

/// Generate a UV sphere with specified resolution
///
/// # Arguments
/// * `longitude_segments` - Number of vertical segments (longitude lines)
/// * `latitude_segments` - Number of horizontal segments (latitude lines)
///
/// Returns a sphere of radius 1.0 centered at the origin.
pub fn generate_sphere(longitude_segments: u32, latitude_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let long_segs = longitude_segments.max(3);
    let lat_segs = latitude_segments.max(2);

    for lat in 0..=lat_segs {
        let theta = lat as f32 * PI / lat_segs as f32; // 0 to PI
        let sin_theta = theta.sin();
        let cos_theta = theta.cos();

        for long in 0..=long_segs {
            let phi = long as f32 * 2.0 * PI / long_segs as f32; // 0 to 2*PI

            let x = sin_theta * phi.cos();
            let y = cos_theta;
            let z = sin_theta * phi.sin();

            data.vertices.push([x, y, z]);
            data.normals.push([x, y, z]); // Normal is same as position for unit sphere
        }
    }

    for lat in 0..lat_segs {
        for long in 0..long_segs {
            let first = lat * (long_segs + 1) + long;
            let second = first + long_segs + 1;

            data.indices.extend_from_slice(&[first, first + 1, second]);
            data.indices.extend_from_slice(&[second, first + 1, second + 1]);
        }
    }

    data
}

/// Generate a horizontal plane in the XZ plane with its normal pointing up (+Y)
///
/// # Arguments
/// * `width` - Extent along X
/// * `depth` - Extent along Z
/// * `width_segments` - Number of subdivisions along width
/// * `depth_segments` - Number of subdivisions along depth
pub fn generate_plane(width: f32, depth: f32, width_segments: u32, depth_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let w_segs = width_segments.max(1);
    let d_segs = depth_segments.max(1);

    for row in 0..=d_segs {
        let v = row as f32 / d_segs as f32;
        let pos_z = (v - 0.5) * depth;

        for column in 0..=w_segs {
            let u = column as f32 / w_segs as f32;
            let pos_x = (u - 0.5) * width;

            data.vertices.push([pos_x, 0.0, pos_z]);
            data.normals.push([0.0, 1.0, 0.0]);
        }
    }

    for row in 0..d_segs {
        for column in 0..w_segs {
            let i = row * (w_segs + 1) + column;
            let next_row = i + w_segs + 1;

            data.indices.extend_from_slice(&[i, next_row, i + 1]);
            data.indices.extend_from_slice(&[next_row, next_row + 1, i + 1]);
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face_normal(data: &GeometryData, triangle: &[u32]) -> [f32; 3] {
        let [a, b, c] = [0, 1, 2].map(|k| data.vertices[triangle[k] as usize]);
        let e1 = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
        let e2 = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
        [
            e1[1] * e2[2] - e1[2] * e2[1],
            e1[2] * e2[0] - e1[0] * e2[2],
            e1[0] * e2[1] - e1[1] * e2[0],
        ]
    }

    fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube();
        assert_eq!(cube.vertices.len(), 24); // 6 faces * 4 vertices
        assert_eq!(cube.indices.len(), 36); // 6 faces * 2 triangles * 3 indices
        assert_eq!(cube.normals.len(), 24);
        assert_eq!(cube.triangle_count(), 12);
    }

    #[test]
    fn cube_winding_matches_normals() {
        let cube = generate_cube();
        for triangle in cube.indices.chunks_exact(3) {
            let n = face_normal(&cube, triangle);
            assert!(dot(n, cube.normals[triangle[0] as usize]) > 0.0);
        }
    }

    #[test]
    fn skybox_faces_inwards() {
        let sky = generate_skybox_cube(50.0);
        assert_eq!(sky.vertices[0], [-50.0, -50.0, 50.0]);
        for triangle in sky.indices.chunks_exact(3) {
            let n = face_normal(&sky, triangle);
            let corner = sky.vertices[triangle[0] as usize];
            assert!(dot(n, corner) < 0.0);
        }
    }

    #[test]
    fn test_sphere_generation() {
        let sphere = generate_sphere(8, 6);
        assert!(!sphere.vertices.is_empty());
        assert_eq!(sphere.vertices.len(), sphere.normals.len());
        assert_eq!(sphere.triangle_count(), 8 * 6 * 2);
    }

    #[test]
    fn sphere_triangles_face_outwards() {
        let sphere = generate_sphere(12, 8);
        for triangle in sphere.indices.chunks_exact(3) {
            let n = face_normal(&sphere, triangle);
            if dot(n, n) < 1e-10 {
                continue; // collapsed at the poles
            }
            let centroid = [0, 1, 2].map(|axis| {
                triangle.iter().map(|&i| sphere.vertices[i as usize][axis]).sum::<f32>() / 3.0
            });
            assert!(dot(n, centroid) > 0.0);
        }
    }

    #[test]
    fn test_plane_generation() {
        let plane = generate_plane(2.0, 2.0, 2, 2);
        assert_eq!(plane.vertices.len(), 9); // 3x3 grid
        assert_eq!(plane.indices.len(), 24); // 4 quads * 2 triangles * 3 indices
        for triangle in plane.indices.chunks_exact(3) {
            assert!(face_normal(&plane, triangle)[1] > 0.0);
        }
    }
}
