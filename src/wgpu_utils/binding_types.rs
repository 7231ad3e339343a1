// src/wgpu_utils/binding_types.rs
//! WGPU binding type utilities

pub fn uniform() -> wgpu::BindingType {
    wgpu::BindingType::Buffer {
        ty: wgpu::BufferBindingType::Uniform,
        has_dynamic_offset: false,
        min_binding_size: None,
    }
}

/// Depth texture sampled with a comparison sampler
pub fn depth_texture_2d() -> wgpu::BindingType {
    wgpu::BindingType::Texture {
        sample_type: wgpu::TextureSampleType::Depth,
        view_dimension: wgpu::TextureViewDimension::D2,
        multisampled: false,
    }
}

pub fn comparison_sampler() -> wgpu::BindingType {
    wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison)
}

/// Layout entry visible to both vertex and fragment stages
pub fn rendering_entry(binding: u32, ty: wgpu::BindingType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty,
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendering_entries_cover_both_stages() {
        let entry = rendering_entry(2, comparison_sampler());
        assert_eq!(entry.binding, 2);
        assert_eq!(entry.visibility, wgpu::ShaderStages::VERTEX_FRAGMENT);
        assert!(matches!(
            entry.ty,
            wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison)
        ));
    }
}
