//! Renderer configuration
//!
//! Holds the knobs the renderer reads at start-up and on every update. The
//! values default to the fixed constants the explorer was tuned with; the
//! shader directory can be redirected through `SPECTRAL_SHADERS_PATH`.

use std::path::{Path, PathBuf};

use cgmath::Deg;

/// Environment variable overriding [`RendererConfig::shaders_base_path`]
pub const SHADERS_PATH_ENV: &str = "SPECTRAL_SHADERS_PATH";

/// Shadow map resolution in texels (both axes).
pub const SHADOW_MAP_SIZE: u32 = 1024;

/// Orthographic box used as the light's projection volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightVolume {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for LightVolume {
    fn default() -> Self {
        Self {
            left: -10.0,
            right: 10.0,
            bottom: -10.0,
            top: 10.0,
            near: -20.0,
            far: 20.0,
        }
    }
}

/// Depth bias applied while rendering the shadow map.
///
/// `factor` scales with polygon slope, `units` is the constant term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonOffset {
    pub factor: f32,
    pub units: f32,
}

impl Default for PolygonOffset {
    fn default() -> Self {
        Self {
            factor: 5.0,
            units: 100.0,
        }
    }
}

impl PolygonOffset {
    /// Converts the offset into the pipeline depth bias state
    pub fn depth_bias(&self) -> wgpu::DepthBiasState {
        wgpu::DepthBiasState {
            constant: self.units as i32,
            slope_scale: self.factor,
            clamp: 0.0,
        }
    }
}

/// Configuration consumed by the renderer
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub shaders_base_path: PathBuf,
    pub field_of_view_y: Deg<f32>,
    pub light_volume: LightVolume,
    pub polygon_offset: PolygonOffset,
    pub clear_color: wgpu::Color,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            shaders_base_path: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders")),
            field_of_view_y: Deg(65.0),
            light_volume: LightVolume::default(),
            polygon_offset: PolygonOffset::default(),
            clear_color: wgpu::Color::BLACK,
        }
    }
}

impl RendererConfig {
    /// Default configuration with the shader directory taken from
    /// `SPECTRAL_SHADERS_PATH` when it is set.
    pub fn from_env() -> Self {
        let config = Self::default();
        match std::env::var_os(SHADERS_PATH_ENV) {
            Some(path) if !path.is_empty() => {
                log::info!("Using shaders from {}", Path::new(&path).display());
                config.with_shaders_base_path(path)
            }
            _ => config,
        }
    }

    pub fn with_shaders_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.shaders_base_path = path.into();
        self
    }

    /// Full path of a shader file inside the configured base directory
    pub fn shader_path(&self, file_name: &str) -> PathBuf {
        self.shaders_base_path.join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_constants() {
        let config = RendererConfig::default();
        assert_eq!(config.field_of_view_y, Deg(65.0));
        assert_eq!(config.light_volume.left, -10.0);
        assert_eq!(config.light_volume.far, 20.0);
        assert_eq!(config.polygon_offset, PolygonOffset { factor: 5.0, units: 100.0 });
        assert!(config.shaders_base_path.ends_with("shaders"));
    }

    #[test]
    fn polygon_offset_maps_to_depth_bias() {
        let bias = PolygonOffset::default().depth_bias();
        assert_eq!(bias.constant, 100);
        assert_eq!(bias.slope_scale, 5.0);
        assert_eq!(bias.clamp, 0.0);
    }

    #[test]
    fn shader_path_joins_base() {
        let config = RendererConfig::default().with_shaders_base_path("/tmp/shaders");
        assert_eq!(config.shader_path("model.wgsl"), PathBuf::from("/tmp/shaders/model.wgsl"));
    }
}
