//! # Vertex Data Structures
//!
//! GPU-compatible vertex format shared by the shadow, skybox and model
//! programs.

/// A 3D vertex with position and normal data.
///
/// Models are stored as plain triangle lists of these vertices and drawn
/// without an index buffer. The shadow pass only reads the position
/// attribute; the colour pass reads both.
///
/// # Memory Layout
///
/// `#[repr(C)]` keeps the layout stable for upload; the stride is 24 bytes
/// with the normal at byte offset 12.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3D {
    /// 3D position coordinates [x, y, z]
    pub position: [f32; 3],
    /// 3D normal vector [nx, ny, nz] for lighting calculations
    pub normal: [f32; 3],
}

impl Vertex3D {
    /// Shader location of the position attribute
    pub const POSITION_LOCATION: u32 = 0;
    /// Shader location of the normal attribute
    pub const NORMAL_LOCATION: u32 = 1;

    const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3
    ];

    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }

    /// Byte distance between consecutive vertices
    pub const fn stride() -> wgpu::BufferAddress {
        std::mem::size_of::<Vertex3D>() as wgpu::BufferAddress
    }

    /// Returns the vertex buffer layout for wgpu rendering.
    ///
    /// - Attribute 0: Position (Float32x3) at shader location 0
    /// - Attribute 1: Normal (Float32x3) at shader location 1
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::stride(),
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_interleaves_position_and_normal() {
        let layout = Vertex3D::desc();
        assert_eq!(layout.array_stride, 24);
        assert_eq!(layout.attributes.len(), 2);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[0].shader_location, Vertex3D::POSITION_LOCATION);
        assert_eq!(layout.attributes[1].offset, 12);
        assert_eq!(layout.attributes[1].shader_location, Vertex3D::NORMAL_LOCATION);
    }
}
