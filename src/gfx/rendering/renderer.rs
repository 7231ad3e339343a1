//! Forward renderer with a shadow-mapped light
//!
//! Lifecycle: [`Renderer::start`] loads the shader programs, uploads model
//! geometry and allocates the shadow map; [`Renderer::update`] recomputes the
//! derived matrices of every model; [`Renderer::draw`] records the shadow pass
//! followed by the colour pass; [`Renderer::shutdown`] releases every GPU
//! object created in `start`.

use cgmath::Vector3;

use crate::{
    config::RendererConfig,
    error::{RendererError, Result},
    gfx::{
        camera::SceneCamera,
        resources::{GpuContext, ShadowMap},
        scene::Scene,
    },
};

use super::{
    frame::{FrameSequencer, PassState, RenderPhase, RenderTarget},
    pipeline_manager::{load_program_source, PipelineManager, ProgramSource, FRAGMENT_ENTRY, VERTEX_ENTRY},
    programs::{
        ModelProgram, ShadowBindings, ShadowProgram, SkyboxProgram, MODEL_PROGRAM, SHADOW_PROGRAM,
        SKYBOX_PROGRAM,
    },
    transforms::FrameTransforms,
};

/// GPU objects that only exist while the renderer runs
struct GpuResources {
    pipelines: PipelineManager,
    model_programs: Vec<ModelProgram>,
    skybox_program: SkyboxProgram,
    shadow_program: ShadowProgram,
    shadow_map: ShadowMap,
    shadow_bindings: ShadowBindings,
}

enum Lifecycle {
    Idle,
    Running(Box<GpuResources>),
    Stopped,
}

pub struct Renderer {
    config: RendererConfig,
    camera: SceneCamera,
    state: Lifecycle,
    frame: Option<FrameTransforms>,
}

impl Renderer {
    pub fn new(config: RendererConfig, camera: SceneCamera) -> Self {
        Self {
            config,
            camera,
            state: Lifecycle::Idle,
            frame: None,
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn camera(&self) -> &SceneCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut SceneCamera {
        &mut self.camera
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, Lifecycle::Running(_))
    }

    /// Matrices of the last [`update`](Self::update), if any
    pub fn frame_transforms(&self) -> Option<&FrameTransforms> {
        self.frame.as_ref()
    }

    /// Loads the programs, uploads the scene geometry and creates the shadow map.
    ///
    /// The camera is retargeted to the scene centre first. A program that
    /// fails to read, parse, validate or compile aborts the start with its
    /// diagnostics; no vertex buffer is uploaded in that case.
    pub fn start(&mut self, gpu: &GpuContext, scene: &mut Scene) -> Result<()> {
        if self.is_running() {
            return Err(RendererError::AlreadyStarted);
        }

        self.camera.set_scene_center(scene.scene_center);

        let model_source = self.load_program(MODEL_PROGRAM, &[VERTEX_ENTRY, FRAGMENT_ENTRY])?;
        let skybox_source = self.load_program(SKYBOX_PROGRAM, &[VERTEX_ENTRY, FRAGMENT_ENTRY])?;
        let shadow_source = self.load_program(SHADOW_PROGRAM, &[VERTEX_ENTRY])?;

        let device = gpu.device();
        let mut pipelines = PipelineManager::new(gpu.device_handle());
        for source in [&model_source, &skybox_source, &shadow_source] {
            pipelines.load_shader(source)?;
        }

        let shadow_map = ShadowMap::new(device);
        let shadow_bindings = ShadowBindings::new(device, &shadow_map);
        let model_layout = ModelProgram::layout(device);
        let skybox_layout = SkyboxProgram::layout(device);
        let mut shadow_program = ShadowProgram::new(device);

        pipelines.register_pipeline(
            MODEL_PROGRAM,
            ModelProgram::pipeline_config(
                model_layout.clone(),
                shadow_bindings.layout().clone(),
                gpu.surface_format(),
                gpu.depth_format(),
            ),
        );
        pipelines.register_pipeline(
            SKYBOX_PROGRAM,
            SkyboxProgram::pipeline_config(skybox_layout.clone(), gpu.surface_format(), gpu.depth_format()),
        );
        pipelines.register_pipeline(
            SHADOW_PROGRAM,
            shadow_program.pipeline_config(&self.config.polygon_offset),
        );
        pipelines.create_all_pipelines()?;

        let model_programs = scene
            .models
            .iter()
            .map(|model| ModelProgram::new(device, &model_layout, model))
            .collect();
        shadow_program.bind_models(device, &scene.models);
        let skybox_program = SkyboxProgram::new(device, &skybox_layout);

        for model in &mut scene.models {
            model.init_gpu_resources(device);
        }
        scene.skybox.init_gpu_resources(device);

        let stats = pipelines.get_stats();
        log::info!(
            "Renderer started: {} models, {} pipelines, {}x{} shadow map",
            scene.model_count(),
            stats.total_pipelines,
            shadow_map.size(),
            shadow_map.size()
        );

        self.state = Lifecycle::Running(Box::new(GpuResources {
            pipelines,
            model_programs,
            skybox_program,
            shadow_program,
            shadow_map,
            shadow_bindings,
        }));
        Ok(())
    }

    fn load_program(&self, name: &str, entry_points: &[&str]) -> Result<ProgramSource> {
        let path = self.config.shader_path(&format!("{name}.wgsl"));
        load_program_source(name, &path, entry_points).inspect_err(|e| log::error!("{e}"))
    }

    /// Recomputes the derived matrices of every model and the skybox for a
    /// `width` × `height` viewport.
    ///
    /// Works whether or not the renderer has started. `_elapsed` is accepted
    /// for callers driving animation but does not affect the result.
    pub fn update(&mut self, scene: &mut Scene, width: u32, height: u32, _elapsed: f32) {
        let frame = FrameTransforms::compute(&self.config, &self.camera, scene, width as f32, height as f32);
        frame.apply(scene);
        self.frame = Some(frame);
    }

    /// Renders one frame into `target`: shadow pass, then skybox and models.
    ///
    /// Drawing before `start` logs a warning and does nothing.
    pub fn draw(&mut self, gpu: &GpuContext, scene: &Scene, target: &wgpu::TextureView) {
        let Lifecycle::Running(resources) = &mut self.state else {
            log::warn!("draw called on a renderer that is not running; skipping frame");
            return;
        };

        let light_direction = self
            .frame
            .map(|frame| frame.light_direction_view)
            .unwrap_or(scene.light_direction);
        resources.write_uniforms(gpu.queue(), scene, light_direction);

        let mut encoder = gpu.device().create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });

        let mut sequencer = FrameSequencer::begin(
            gpu.viewport(),
            resources.shadow_map.size(),
            self.config.polygon_offset,
        );
        for phase in RenderPhase::SEQUENCE {
            let state = sequencer.enter(phase);
            match state.target {
                RenderTarget::ShadowMap => resources.record_shadow_pass(&mut encoder, phase, &state, scene),
                RenderTarget::Surface => resources.record_color_pass(
                    &mut encoder,
                    phase,
                    &state,
                    gpu.depth_view(),
                    target,
                    self.config.clear_color,
                    scene,
                ),
            }
        }
        sequencer.finish();

        gpu.queue().submit(std::iter::once(encoder.finish()));
    }

    /// Releases the shadow program, all model programs, every model vertex
    /// buffer and the skybox buffer.
    ///
    /// Fails with [`RendererError::NotStarted`] unless the renderer is running.
    pub fn shutdown(&mut self, scene: &mut Scene) -> Result<()> {
        match std::mem::replace(&mut self.state, Lifecycle::Stopped) {
            Lifecycle::Running(resources) => {
                resources.release(scene);
                log::info!("Renderer shut down");
                Ok(())
            }
            previous => {
                self.state = previous;
                Err(RendererError::NotStarted)
            }
        }
    }
}

impl GpuResources {
    fn write_uniforms(&mut self, queue: &wgpu::Queue, scene: &Scene, light_direction: Vector3<f32>) {
        self.shadow_program.update(queue, &scene.models);
        for (program, model) in self.model_programs.iter_mut().zip(&scene.models) {
            program.update(queue, model, light_direction);
        }
        self.skybox_program.update(queue, &scene.skybox);
    }

    fn record_shadow_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        phase: RenderPhase,
        state: &PassState,
        scene: &Scene,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(phase.label()),
            color_attachments: &[],
            depth_stencil_attachment: Some(self.shadow_map.depth_attachment()),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        state.viewport.apply(&mut pass);
        self.shadow_program.draw(&mut pass, &self.pipelines, &scene.models);
    }

    #[allow(clippy::too_many_arguments)]
    fn record_color_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        phase: RenderPhase,
        state: &PassState,
        depth_view: &wgpu::TextureView,
        target: &wgpu::TextureView,
        clear_color: wgpu::Color,
        scene: &Scene,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(phase.label()),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        state.viewport.apply(&mut pass);

        self.skybox_program.draw(&mut pass, &self.pipelines, &scene.skybox);

        let Some(pipeline) = self.pipelines.get_pipeline(MODEL_PROGRAM) else {
            return;
        };
        pass.set_pipeline(pipeline);
        pass.set_bind_group(1, self.shadow_bindings.bind_group(), &[]);
        for (program, model) in self.model_programs.iter().zip(&scene.models) {
            program.draw(&mut pass, model);
        }
    }

    fn release(self, scene: &mut Scene) {
        self.shadow_program.destroy();
        for program in self.model_programs {
            log::debug!("Releasing program for '{}'", program.model_name());
            program.destroy();
        }
        self.skybox_program.destroy();

        let buffers: Vec<wgpu::Buffer> = scene
            .models
            .iter_mut()
            .filter_map(|model| model.take_vertex_buffer())
            .chain(scene.skybox.take_vertex_buffer())
            .collect();
        log::debug!("Releasing {} vertex buffers", buffers.len());
        for buffer in buffers {
            buffer.destroy();
        }

        self.shadow_map.destroy();
    }
}
