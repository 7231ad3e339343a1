//! Shader programs bound to scene geometry
//!
//! Each program pairs a pipeline from the [`PipelineManager`] with the
//! uniform buffers and bind groups it feeds. Uniform content is rebuilt from
//! the derived model matrices every frame; the buffers themselves are created
//! once at start and released at shutdown.

use cgmath::{InnerSpace, Matrix4, Vector3};

use crate::{
    config::PolygonOffset,
    gfx::{
        camera::convert_matrix4_to_array,
        resources::{ShadowMap, ShadowMapParams},
        scene::{DrawModel, Material, Model},
    },
    wgpu_utils::{binding_types, UniformBuffer},
};

use super::pipeline_manager::{PipelineConfig, PipelineManager};

pub const MODEL_PROGRAM: &str = "model";
pub const SKYBOX_PROGRAM: &str = "skybox";
pub const SHADOW_PROGRAM: &str = "shadow_map";

/// Uniform block of the model shader. Layout must match `ModelUniforms` in `model.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniforms {
    pub model_view_projection: [[f32; 4]; 4],
    pub model_view: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    pub light_model_view_projection: [[f32; 4]; 4],
    /// View-space direction towards the light, w = 0
    pub light_direction: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    /// rgb specular colour, shininess in w
    pub specular: [f32; 4],
}

impl ModelUniforms {
    pub fn new(model: &Model, light_direction_view: Vector3<f32>) -> Self {
        let matrices = &model.matrices;
        let light = if light_direction_view.magnitude2() > 0.0 {
            light_direction_view.normalize()
        } else {
            Vector3::unit_y()
        };
        let Material {
            ambient,
            diffuse,
            specular,
            shininess,
        } = model.material;

        Self {
            model_view_projection: convert_matrix4_to_array(matrices.model_view_projection),
            model_view: convert_matrix4_to_array(matrices.model_view),
            normal: convert_matrix4_to_array(matrices.normal),
            light_model_view_projection: convert_matrix4_to_array(matrices.model_view_projection_light),
            light_direction: [light.x, light.y, light.z, 0.0],
            ambient: [ambient[0], ambient[1], ambient[2], 1.0],
            diffuse: [diffuse[0], diffuse[1], diffuse[2], 1.0],
            specular: [specular[0], specular[1], specular[2], shininess],
        }
    }
}

/// Single matrix uniform shared by the skybox and shadow shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MatrixUniform {
    pub matrix: [[f32; 4]; 4],
}

impl MatrixUniform {
    pub fn new(matrix: Matrix4<f32>) -> Self {
        Self {
            matrix: convert_matrix4_to_array(matrix),
        }
    }
}

fn uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[binding_types::rendering_entry(0, binding_types::uniform())],
    })
}

/// Uniform buffer with the bind group exposing it at binding 0
struct UniformBinding<Content> {
    buffer: UniformBuffer<Content>,
    bind_group: wgpu::BindGroup,
}

impl<Content: bytemuck::Pod> UniformBinding<Content> {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, label: &str) -> Self {
        let buffer = UniformBuffer::<Content>::new(device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.binding_resource(),
            }],
        });
        Self { buffer, bind_group }
    }
}

/// Shadow map texture and comparison sampler as seen by the model shader (group 1)
pub struct ShadowBindings {
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl ShadowBindings {
    pub fn new(device: &wgpu::Device, shadow_map: &ShadowMap) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow Map Layout"),
            entries: &[
                binding_types::rendering_entry(0, binding_types::depth_texture_2d()),
                binding_types::rendering_entry(1, binding_types::comparison_sampler()),
            ],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Map Bind Group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(shadow_map.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(shadow_map.sampler()),
                },
            ],
        });
        Self { layout, bind_group }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// Draws one scene model with Blinn-Phong shading and shadow lookups
pub struct ModelProgram {
    model_name: String,
    uniforms: UniformBinding<ModelUniforms>,
}

impl ModelProgram {
    pub fn layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        uniform_layout(device, "Model Uniform Layout")
    }

    /// Pipeline the model programs share: depth tested, back faces culled
    pub fn pipeline_config(
        uniform_layout: wgpu::BindGroupLayout,
        shadow_layout: wgpu::BindGroupLayout,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> PipelineConfig {
        PipelineConfig::default()
            .with_label("Model Pipeline")
            .with_shader(MODEL_PROGRAM)
            .with_bind_group_layouts(vec![uniform_layout, shadow_layout])
            .with_color_format(color_format)
            .with_depth(depth_format, true, wgpu::CompareFunction::Less)
    }

    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, model: &Model) -> Self {
        Self {
            model_name: model.name.clone(),
            uniforms: UniformBinding::new(device, layout, &format!("{} Uniforms", model.name)),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn update(&mut self, queue: &wgpu::Queue, model: &Model, light_direction_view: Vector3<f32>) {
        self.uniforms
            .buffer
            .update_content(queue, ModelUniforms::new(model, light_direction_view));
    }

    /// Records the model draw; pipeline and shadow bind group are set by the caller
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, model: &Model) {
        if model.vertex_buffer().is_none() {
            return;
        }
        pass.set_bind_group(0, &self.uniforms.bind_group, &[]);
        pass.draw_model(model);
    }

    pub fn destroy(self) {
        self.uniforms.buffer.destroy();
    }
}

/// Draws the inward-facing skybox cube behind the scene
pub struct SkyboxProgram {
    uniforms: UniformBinding<MatrixUniform>,
}

impl SkyboxProgram {
    pub fn layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        uniform_layout(device, "Skybox Uniform Layout")
    }

    /// The skybox is viewed from inside, so nothing is culled and depth is not written
    pub fn pipeline_config(
        layout: wgpu::BindGroupLayout,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> PipelineConfig {
        PipelineConfig::default()
            .with_label("Skybox Pipeline")
            .with_shader(SKYBOX_PROGRAM)
            .with_bind_group_layouts(vec![layout])
            .with_cull_mode(None)
            .with_color_format(color_format)
            .with_depth(depth_format, false, wgpu::CompareFunction::LessEqual)
    }

    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> Self {
        Self {
            uniforms: UniformBinding::new(device, layout, "Skybox Uniforms"),
        }
    }

    pub fn update(&mut self, queue: &wgpu::Queue, skybox: &Model) {
        self.uniforms
            .buffer
            .update_content(queue, MatrixUniform::new(skybox.matrices.model_view_projection));
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, pipelines: &PipelineManager, skybox: &Model) {
        let Some(pipeline) = pipelines.get_pipeline(SKYBOX_PROGRAM) else {
            return;
        };
        if skybox.vertex_buffer().is_none() {
            return;
        }
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &self.uniforms.bind_group, &[]);
        pass.draw_model(skybox);
    }

    pub fn destroy(self) {
        self.uniforms.buffer.destroy();
    }
}

/// Renders model depth from the light's point of view into the shadow map.
///
/// Holds one light-space MVP uniform per model; that matrix is the only
/// input of the shadow shader.
pub struct ShadowProgram {
    layout: wgpu::BindGroupLayout,
    light_uniforms: Vec<UniformBinding<MatrixUniform>>,
}

impl ShadowProgram {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            layout: uniform_layout(device, "Shadow Uniform Layout"),
            light_uniforms: Vec::new(),
        }
    }

    /// Depth-only pipeline: back-face culling, polygon offset, no fragment stage
    pub fn pipeline_config(&self, polygon_offset: &PolygonOffset) -> PipelineConfig {
        PipelineConfig::default()
            .with_label("Shadow Pipeline")
            .with_shader(SHADOW_PROGRAM)
            .with_bind_group_layouts(vec![self.layout.clone()])
            .with_cull_mode(Some(wgpu::Face::Back))
            .with_vertex_only()
            .with_depth(ShadowMapParams::FIXED.format, true, wgpu::CompareFunction::LessEqual)
            .with_depth_bias(polygon_offset.depth_bias())
    }

    /// Allocates one light uniform per model
    pub fn bind_models(&mut self, device: &wgpu::Device, models: &[Model]) {
        self.light_uniforms = models
            .iter()
            .map(|model| UniformBinding::new(device, &self.layout, &format!("{} Light Uniform", model.name)))
            .collect();
    }

    pub fn update(&mut self, queue: &wgpu::Queue, models: &[Model]) {
        for (binding, model) in self.light_uniforms.iter_mut().zip(models) {
            binding
                .buffer
                .update_content(queue, MatrixUniform::new(model.matrices.model_view_projection_light));
        }
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, pipelines: &PipelineManager, models: &[Model]) {
        let Some(pipeline) = pipelines.get_pipeline(SHADOW_PROGRAM) else {
            return;
        };
        pass.set_pipeline(pipeline);
        for (binding, model) in self.light_uniforms.iter().zip(models) {
            if model.vertex_buffer().is_none() {
                continue;
            }
            pass.set_bind_group(0, &binding.bind_group, &[]);
            pass.draw_model(model);
        }
    }

    pub fn destroy(self) {
        for binding in self.light_uniforms {
            binding.buffer.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{geometry::generate_cube, scene::ModelMatrices};
    use cgmath::SquareMatrix;

    #[test]
    fn model_uniforms_match_shader_block_size() {
        // four mat4x4<f32> plus four vec4<f32>
        assert_eq!(std::mem::size_of::<ModelUniforms>(), 4 * 64 + 4 * 16);
        assert_eq!(std::mem::size_of::<MatrixUniform>(), 64);
    }

    #[test]
    fn model_uniforms_carry_material_and_light() {
        let mut model = Model::from_geometry("cube", &generate_cube()).with_material(Material {
            ambient: [0.1, 0.2, 0.3],
            diffuse: [0.4, 0.5, 0.6],
            specular: [0.7, 0.8, 0.9],
            shininess: 16.0,
        });
        model.matrices = ModelMatrices {
            model_view_projection_light: Matrix4::from_scale(3.0),
            ..ModelMatrices::default()
        };

        let uniforms = ModelUniforms::new(&model, Vector3::new(0.0, 0.0, 2.0));
        assert_eq!(uniforms.light_direction, [0.0, 0.0, 1.0, 0.0]);
        assert_eq!(uniforms.diffuse, [0.4, 0.5, 0.6, 1.0]);
        assert_eq!(uniforms.specular, [0.7, 0.8, 0.9, 16.0]);
        assert_eq!(uniforms.light_model_view_projection[0][0], 3.0);
        assert_eq!(uniforms.normal, convert_matrix4_to_array(Matrix4::identity()));
    }

    #[test]
    fn zero_light_direction_falls_back_to_up() {
        let model = Model::from_geometry("cube", &generate_cube());
        let uniforms = ModelUniforms::new(&model, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(uniforms.light_direction, [0.0, 1.0, 0.0, 0.0]);
    }
}
