//! Texture resource management for wgpu
//!
//! Depth buffers for the colour pass and the fixed-size shadow map the
//! shadow pass renders into.

use crate::config::SHADOW_MAP_SIZE;

/// GPU texture together with its default view
pub struct TextureResource {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl TextureResource {
    /// Standard depth buffer format for the colour pass
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Creates a depth texture matching the surface configuration
    ///
    /// # Arguments
    /// * `device` - WGPU device for creating resources
    /// * `config` - Surface configuration to match dimensions
    /// * `label` - Debug label for the texture
    pub fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self { texture, view }
    }
}

/// Creation parameters of the shadow map.
///
/// The values are fixed; [`ShadowMapParams::FIXED`] is the only instance the
/// renderer uses, so every start produces an identical texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowMapParams {
    pub size: u32,
    pub format: wgpu::TextureFormat,
    pub filter: wgpu::FilterMode,
    pub address_mode: wgpu::AddressMode,
    pub compare: wgpu::CompareFunction,
}

impl ShadowMapParams {
    pub const FIXED: Self = Self {
        size: SHADOW_MAP_SIZE,
        format: wgpu::TextureFormat::Depth24Plus,
        filter: wgpu::FilterMode::Nearest,
        address_mode: wgpu::AddressMode::ClampToEdge,
        compare: wgpu::CompareFunction::LessEqual,
    };

    pub fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.size,
            height: self.size,
            depth_or_array_layers: 1,
        }
    }

    pub fn texture_descriptor(&self) -> wgpu::TextureDescriptor<'static> {
        wgpu::TextureDescriptor {
            label: Some("Shadow Map"),
            size: self.extent(),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        }
    }

    /// Comparison sampler the colour pass reads the shadow map through
    pub fn sampler_descriptor(&self) -> wgpu::SamplerDescriptor<'static> {
        wgpu::SamplerDescriptor {
            label: Some("Shadow Sampler"),
            address_mode_u: self.address_mode,
            address_mode_v: self.address_mode,
            address_mode_w: self.address_mode,
            mag_filter: self.filter,
            min_filter: self.filter,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(self.compare),
            ..Default::default()
        }
    }
}

/// Shadow depth texture together with its render target view.
///
/// The view doubles as the depth attachment of the shadow pass, so this type
/// plays the role of the offscreen framebuffer as well.
pub struct ShadowMap {
    params: ShadowMapParams,
    resource: TextureResource,
    sampler: wgpu::Sampler,
}

impl ShadowMap {
    pub fn new(device: &wgpu::Device) -> Self {
        let params = ShadowMapParams::FIXED;
        let texture = device.create_texture(&params.texture_descriptor());
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&params.sampler_descriptor());
        log::debug!("Created {}x{} shadow map", params.size, params.size);

        Self {
            params,
            resource: TextureResource { texture, view },
            sampler,
        }
    }

    pub fn size(&self) -> u32 {
        self.params.size
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.resource.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    /// Depth attachment for the shadow pass, cleared to the far plane
    pub fn depth_attachment(&self) -> wgpu::RenderPassDepthStencilAttachment<'_> {
        wgpu::RenderPassDepthStencilAttachment {
            view: &self.resource.view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }
    }

    pub fn destroy(self) {
        self.resource.texture.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadow_map_params_are_fixed() {
        let params = ShadowMapParams::FIXED;
        assert_eq!(params.size, 1024);
        assert_eq!(params.filter, wgpu::FilterMode::Nearest);
        assert_eq!(params.address_mode, wgpu::AddressMode::ClampToEdge);
        assert_eq!(params.compare, wgpu::CompareFunction::LessEqual);
    }

    #[test]
    fn texture_descriptor_is_square_depth_target() {
        let desc = ShadowMapParams::FIXED.texture_descriptor();
        assert_eq!(desc.size.width, 1024);
        assert_eq!(desc.size.height, 1024);
        assert!(desc.format.is_depth_stencil_format());
        assert!(desc.usage.contains(wgpu::TextureUsages::RENDER_ATTACHMENT));
        assert!(desc.usage.contains(wgpu::TextureUsages::TEXTURE_BINDING));
    }

    #[test]
    fn sampler_compares_with_nearest_clamped_lookup() {
        let desc = ShadowMapParams::FIXED.sampler_descriptor();
        assert_eq!(desc.compare, Some(wgpu::CompareFunction::LessEqual));
        assert_eq!(desc.mag_filter, wgpu::FilterMode::Nearest);
        assert_eq!(desc.min_filter, wgpu::FilterMode::Nearest);
        assert_eq!(desc.address_mode_u, wgpu::AddressMode::ClampToEdge);
        assert_eq!(desc.address_mode_v, wgpu::AddressMode::ClampToEdge);
    }

    #[test]
    fn descriptors_do_not_vary_between_calls() {
        let a = ShadowMapParams::FIXED;
        let b = ShadowMapParams::FIXED;
        assert_eq!(a, b);
        assert_eq!(a.texture_descriptor().size, b.texture_descriptor().size);
        assert_eq!(a.sampler_descriptor().compare, b.sampler_descriptor().compare);
    }
}
