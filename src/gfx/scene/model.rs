use cgmath::{Deg, Matrix4, SquareMatrix, Vector3};
use wgpu::util::DeviceExt;

use crate::gfx::geometry::GeometryData;

use super::vertex::Vertex3D;

/// Surface response parameters read by the model shader
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: [0.1, 0.1, 0.1],
            diffuse: [0.8, 0.8, 0.8],
            specular: [0.3, 0.3, 0.3],
            shininess: 32.0,
        }
    }
}

impl Material {
    /// Plain material with the given diffuse colour
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self {
            ambient: [r * 0.1, g * 0.1, b * 0.1],
            diffuse: [r, g, b],
            ..Default::default()
        }
    }

    /// Builds a material from an MTL entry, falling back to defaults for missing terms
    pub fn from_mtl(mtl: &tobj::Material) -> Self {
        let defaults = Self::default();
        Self {
            ambient: mtl.ambient.unwrap_or(defaults.ambient),
            diffuse: mtl.diffuse.unwrap_or(defaults.diffuse),
            specular: mtl.specular.unwrap_or(defaults.specular),
            shininess: mtl.shininess.unwrap_or(defaults.shininess),
        }
    }
}

/// Matrices derived from the camera, projection and light every update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelMatrices {
    pub model_view: Matrix4<f32>,
    pub model_view_projection: Matrix4<f32>,
    /// Inverse-transpose of `model_view`
    pub normal: Matrix4<f32>,
    /// Light-space model-view-projection used by the shadow pass
    pub model_view_projection_light: Matrix4<f32>,
}

impl Default for ModelMatrices {
    fn default() -> Self {
        Self {
            model_view: Matrix4::identity(),
            model_view_projection: Matrix4::identity(),
            normal: Matrix4::identity(),
            model_view_projection_light: Matrix4::identity(),
        }
    }
}

/// A drawable scene model.
///
/// Geometry is stored as a flat triangle list of [`Vertex3D`] and drawn
/// without an index buffer. The vertex buffer only exists between renderer
/// start and shutdown.
pub struct Model {
    pub name: String,
    vertices: Vec<Vertex3D>,
    pub model_matrix: Matrix4<f32>,
    pub matrices: ModelMatrices,
    pub material: Material,
    vertex_buffer: Option<wgpu::Buffer>,
}

impl Model {
    pub fn new(name: impl Into<String>, vertices: Vec<Vertex3D>) -> Self {
        Self {
            name: name.into(),
            vertices,
            model_matrix: Matrix4::identity(),
            matrices: ModelMatrices::default(),
            material: Material::default(),
            vertex_buffer: None,
        }
    }

    /// Creates a model from generated primitive geometry
    pub fn from_geometry(name: impl Into<String>, geometry: &GeometryData) -> Self {
        Self::new(name, geometry.to_triangle_list())
    }

    /// Creates a model from flat OBJ-style position/normal arrays and triangle indices.
    ///
    /// Missing or mismatched normals are replaced by averaged face normals.
    pub fn from_indexed(name: impl Into<String>, positions: &[f32], normals: &[f32], indices: &[u32]) -> Self {
        let normals = if !normals.is_empty() && normals.len() == positions.len() {
            normals.to_vec()
        } else {
            calculate_face_normals(positions, indices)
        };

        let geometry = GeometryData {
            vertices: positions.chunks_exact(3).map(|p| [p[0], p[1], p[2]]).collect(),
            normals: normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]).collect(),
            indices: indices.to_vec(),
        };
        Self::from_geometry(name, &geometry)
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_transform(mut self, transform: Matrix4<f32>) -> Self {
        self.model_matrix = transform;
        self
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    /// Number of vertices issued by a draw of this model
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn stride(&self) -> wgpu::BufferAddress {
        Vertex3D::stride()
    }

    /// Set translation
    pub fn set_translation(&mut self, translation: Vector3<f32>) {
        self.model_matrix = Matrix4::from_translation(translation);
    }

    /// Apply uniform scale (multiplies with existing transform)
    pub fn scale(&mut self, scale: f32) {
        self.model_matrix = self.model_matrix * Matrix4::from_scale(scale);
    }

    /// Apply rotation around Y axis
    pub fn rotate_y(&mut self, angle: Deg<f32>) {
        self.model_matrix = self.model_matrix * Matrix4::from_angle_y(angle);
    }

    /// Reset to identity matrix
    pub fn reset_transform(&mut self) {
        self.model_matrix = Matrix4::identity();
    }

    /// Whether [`init_gpu_resources`](Self::init_gpu_resources) would create a buffer.
    ///
    /// Models without vertices never get one, so draws skip them.
    pub fn needs_upload(&self) -> bool {
        self.vertex_buffer.is_none() && !self.vertices.is_empty()
    }

    /// Uploads the vertex data. Does nothing if the buffer already exists or
    /// the model has no vertices.
    pub fn init_gpu_resources(&mut self, device: &wgpu::Device) {
        if !self.needs_upload() {
            return;
        }

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", self.name)),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        log::debug!("Uploaded {} vertices for '{}'", self.vertices.len(), self.name);
        self.vertex_buffer = Some(buffer);
    }

    pub fn vertex_buffer(&self) -> Option<&wgpu::Buffer> {
        self.vertex_buffer.as_ref()
    }

    pub fn has_gpu_resources(&self) -> bool {
        self.vertex_buffer.is_some()
    }

    /// Hands the vertex buffer over for destruction, leaving the model without one
    pub fn take_vertex_buffer(&mut self) -> Option<wgpu::Buffer> {
        self.vertex_buffer.take()
    }
}

/// Averages face normals onto shared vertices for meshes that ship without normals
pub fn calculate_face_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
    let vertex_count = positions.len() / 3;
    let mut normals = vec![0.0; vertex_count * 3];
    let position = |i: usize| [positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]];

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
        if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
            continue;
        }

        let (v0, v1, v2) = (position(i0), position(i1), position(i2));
        let edge1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
        let edge2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];
        let face_normal = [
            edge1[1] * edge2[2] - edge1[2] * edge2[1],
            edge1[2] * edge2[0] - edge1[0] * edge2[2],
            edge1[0] * edge2[1] - edge1[1] * edge2[0],
        ];

        for vertex in [i0, i1, i2] {
            for axis in 0..3 {
                normals[vertex * 3 + axis] += face_normal[axis];
            }
        }
    }

    for normal in normals.chunks_exact_mut(3) {
        let length = (normal[0].powi(2) + normal[1].powi(2) + normal[2].powi(2)).sqrt();
        if length > 0.0 {
            normal.iter_mut().for_each(|c| *c /= length);
        }
    }

    normals
}

/// Draw helpers for models on a render pass
pub trait DrawModel {
    /// Binds the model's vertex buffer to slot 0 and draws its triangle list.
    /// Models without GPU resources are skipped.
    fn draw_model(&mut self, model: &Model);
}

impl DrawModel for wgpu::RenderPass<'_> {
    fn draw_model(&mut self, model: &Model) {
        let Some(vertex_buffer) = model.vertex_buffer() else {
            return;
        };

        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.draw(0..model.vertex_count(), 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_cube;

    #[test]
    fn geometry_is_expanded_to_triangle_list() {
        let model = Model::from_geometry("cube", &generate_cube());
        assert_eq!(model.vertex_count(), 36);
        assert_eq!(model.stride(), 24);
        assert!(!model.has_gpu_resources());
    }

    #[test]
    fn missing_normals_are_computed() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let model = Model::from_indexed("tri", &positions, &[], &[0, 1, 2]);
        assert_eq!(model.vertex_count(), 3);
        for vertex in model.vertices() {
            assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn face_normals_ignore_bad_indices() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let normals = calculate_face_normals(&positions, &[0, 1, 7]);
        assert!(normals.iter().all(|&c| c == 0.0));
    }

    #[test]
    fn transforms_compose_right_to_left() {
        let mut model = Model::new("empty", Vec::new());
        model.set_translation(Vector3::new(1.0, 0.0, 0.0));
        model.scale(2.0);
        let origin = model.model_matrix * cgmath::Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert_eq!(origin.x, 3.0);

        model.reset_transform();
        assert_eq!(model.model_matrix, Matrix4::identity());
    }

    #[test]
    fn empty_model_is_never_uploaded() {
        let empty = Model::new("points", Vec::new());
        assert_eq!(empty.vertex_count(), 0);
        assert!(!empty.needs_upload());

        let cube = Model::from_geometry("cube", &generate_cube());
        assert!(cube.needs_upload());
    }

    #[test]
    fn rgb_material_sets_diffuse() {
        let material = Material::rgb(1.0, 0.5, 0.0);
        assert_eq!(material.diffuse, [1.0, 0.5, 0.0]);
        assert_eq!(material.shininess, Material::default().shininess);
    }
}
