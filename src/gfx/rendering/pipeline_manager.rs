//! Shader loading and render pipeline management
//!
//! Shader programs are read from disk, parsed and validated with naga before
//! any GPU object is created, so a broken shader produces a readable
//! diagnostic instead of a driver-side failure. Validated sources are then
//! compiled into wgpu modules and referenced by name from pipeline configs.

use std::{
    collections::HashMap,
    fmt::Write as _,
    path::{Path, PathBuf},
    sync::Arc,
};

use wgpu::*;

use crate::{
    error::{RendererError, Result},
    gfx::scene::vertex::Vertex3D,
};

/// Vertex stage entry point every program provides
pub const VERTEX_ENTRY: &str = "vs_main";
/// Fragment stage entry point of programs that write colour
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// WGSL source of one program, already parsed and validated
#[derive(Debug, Clone)]
pub struct ProgramSource {
    pub name: String,
    pub path: PathBuf,
    pub source: String,
}

/// Reads and validates the WGSL program at `path`.
///
/// Every diagnostic found (read failure, parse error, validation error,
/// missing entry points) ends up in the returned error, so the message is
/// never empty.
pub fn load_program_source(name: &str, path: &Path, entry_points: &[&str]) -> Result<ProgramSource> {
    let fail = |errors: String| RendererError::ProgramLoad {
        program: name.to_string(),
        errors,
    };

    let source = std::fs::read_to_string(path)
        .map_err(|e| fail(format!("unable to read {}: {}", path.display(), e)))?;

    let errors = validate_wgsl(&source, entry_points);
    if !errors.is_empty() {
        return Err(fail(errors));
    }

    log::debug!("Validated program '{}' from {}", name, path.display());
    Ok(ProgramSource {
        name: name.to_string(),
        path: path.to_path_buf(),
        source,
    })
}

/// Parses and validates WGSL, returning the accumulated diagnostics
/// (empty when the source is usable).
pub fn validate_wgsl(source: &str, entry_points: &[&str]) -> String {
    if source.trim().is_empty() {
        return "shader source is empty".to_string();
    }

    let module = match naga::front::wgsl::parse_str(source) {
        Ok(module) => module,
        Err(e) => return e.emit_to_string(source),
    };

    let mut errors = String::new();
    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    );
    if let Err(e) = validator.validate(&module) {
        errors.push_str(&e.emit_to_string(source));
    }

    for entry in entry_points {
        if !module.entry_points.iter().any(|ep| ep.name == *entry) {
            let _ = writeln!(errors, "missing entry point '{}'", entry);
        }
    }

    errors
}

/// Configuration for creating a render pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub label: String,
    pub shader: String,
    pub bind_group_layouts: Vec<BindGroupLayout>,
    pub primitive_topology: PrimitiveTopology,
    pub cull_mode: Option<Face>,
    pub depth_format: Option<TextureFormat>,
    pub depth_write_enabled: bool,
    pub depth_compare: CompareFunction,
    pub depth_bias: DepthBiasState,
    pub color_targets: Vec<Option<ColorTargetState>>,
    /// Depth-only pipeline without a fragment stage (shadow pass)
    pub vertex_only: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label: "Default Pipeline".to_string(),
            shader: "model".to_string(),
            bind_group_layouts: Vec::new(),
            primitive_topology: PrimitiveTopology::TriangleList,
            cull_mode: Some(Face::Back),
            depth_format: None,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            depth_bias: DepthBiasState::default(),
            color_targets: vec![Some(ColorTargetState {
                format: TextureFormat::Bgra8UnormSrgb,
                blend: Some(BlendState::REPLACE),
                write_mask: ColorWrites::ALL,
            })],
            vertex_only: false,
        }
    }
}

impl PipelineConfig {
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_owned();
        self
    }

    pub fn with_shader(mut self, shader: &str) -> Self {
        self.shader = shader.to_string();
        self
    }

    pub fn with_cull_mode(mut self, face: Option<Face>) -> Self {
        self.cull_mode = face;
        self
    }

    /// Drops the fragment stage and colour targets, leaving a depth-only pipeline
    pub fn with_vertex_only(mut self) -> Self {
        self.vertex_only = true;
        self.color_targets.clear();
        self
    }

    pub fn with_bind_group_layouts(mut self, layouts: Vec<BindGroupLayout>) -> Self {
        self.bind_group_layouts = layouts;
        self
    }

    /// Enables depth testing against an attachment of the given format
    pub fn with_depth(mut self, format: TextureFormat, write: bool, compare: CompareFunction) -> Self {
        self.depth_format = Some(format);
        self.depth_write_enabled = write;
        self.depth_compare = compare;
        self
    }

    pub fn with_depth_bias(mut self, bias: DepthBiasState) -> Self {
        self.depth_bias = bias;
        self
    }

    /// Single colour target of `format` without blending
    pub fn with_color_format(mut self, format: TextureFormat) -> Self {
        self.color_targets = vec![Some(ColorTargetState {
            format,
            blend: Some(BlendState::REPLACE),
            write_mask: ColorWrites::ALL,
        })];
        self
    }
}

/// Compiled shader modules and the pipelines built from them
pub struct PipelineManager {
    device: Arc<Device>,
    pipelines: HashMap<String, RenderPipeline>,
    pipeline_configs: HashMap<String, PipelineConfig>,
    shader_modules: HashMap<String, ShaderModule>,
    pending_pipelines: Vec<String>,
}

impl PipelineManager {
    pub fn new(device: Arc<Device>) -> Self {
        Self {
            device,
            pipelines: HashMap::new(),
            pipeline_configs: HashMap::new(),
            shader_modules: HashMap::new(),
            pending_pipelines: Vec::new(),
        }
    }

    /// Compiles a validated program into a shader module.
    ///
    /// Modules are cached by program name; loading the same program twice
    /// is a no-op. Driver-side validation errors are caught with an error
    /// scope and reported like parse errors.
    pub fn load_shader(&mut self, program: &ProgramSource) -> Result<()> {
        if self.shader_modules.contains_key(&program.name) {
            return Ok(());
        }

        self.device.push_error_scope(ErrorFilter::Validation);
        let module = self.device.create_shader_module(ShaderModuleDescriptor {
            label: Some(&program.name),
            source: ShaderSource::Wgsl(program.source.as_str().into()),
        });
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(RendererError::ProgramLoad {
                program: program.name.clone(),
                errors: error.to_string(),
            });
        }

        self.shader_modules.insert(program.name.clone(), module);
        Ok(())
    }

    /// Registers a pipeline configuration; it is built by [`create_all_pipelines`](Self::create_all_pipelines)
    pub fn register_pipeline(&mut self, name: &str, config: PipelineConfig) {
        self.pipeline_configs.insert(name.to_string(), config);
        if !self.pending_pipelines.iter().any(|n| n == name) {
            self.pending_pipelines.push(name.to_string());
        }
    }

    /// Builds every pending pipeline, collecting all failures into one error
    pub fn create_all_pipelines(&mut self) -> Result<()> {
        let mut errors = String::new();
        let pending = std::mem::take(&mut self.pending_pipelines);

        for name in pending {
            let Some(config) = self.pipeline_configs.get(&name).cloned() else {
                continue;
            };
            match self.create_pipeline_from_config(&config) {
                Ok(pipeline) => {
                    self.pipelines.insert(name, pipeline);
                }
                Err(e) => {
                    let _ = writeln!(errors, "pipeline '{}': {}", name, e);
                    self.pending_pipelines.push(name);
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(RendererError::ProgramLoad {
                program: "pipelines".to_string(),
                errors,
            })
        }
    }

    pub fn get_pipeline(&self, name: &str) -> Option<&RenderPipeline> {
        self.pipelines.get(name)
    }

    fn create_pipeline_from_config(&self, config: &PipelineConfig) -> std::result::Result<RenderPipeline, String> {
        let shader = self
            .shader_modules
            .get(&config.shader)
            .ok_or_else(|| format!("shader '{}' not loaded", config.shader))?;

        let bind_group_layout_refs: Vec<&BindGroupLayout> = config.bind_group_layouts.iter().collect();
        let pipeline_layout = self.device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some(&format!("{} Layout", config.label)),
            bind_group_layouts: &bind_group_layout_refs,
            push_constant_ranges: &[],
        });

        let fragment_state = if config.vertex_only {
            None
        } else {
            Some(FragmentState {
                module: shader,
                entry_point: Some(FRAGMENT_ENTRY),
                targets: &config.color_targets,
                compilation_options: PipelineCompilationOptions::default(),
            })
        };

        let depth_stencil = config.depth_format.map(|format| DepthStencilState {
            format,
            depth_write_enabled: config.depth_write_enabled,
            depth_compare: config.depth_compare,
            stencil: StencilState::default(),
            bias: config.depth_bias,
        });

        self.device.push_error_scope(ErrorFilter::Validation);
        let pipeline = self.device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(&config.label),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: shader,
                entry_point: Some(VERTEX_ENTRY),
                buffers: &[Vertex3D::desc()],
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment: fragment_state,
            primitive: PrimitiveState {
                topology: config.primitive_topology,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                cull_mode: config.cull_mode,
                polygon_mode: PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil,
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        });
        match pollster::block_on(self.device.pop_error_scope()) {
            Some(error) => Err(error.to_string()),
            None => Ok(pipeline),
        }
    }

    pub fn get_stats(&self) -> PipelineStats {
        PipelineStats {
            total_pipelines: self.pipelines.len(),
            pending_pipelines: self.pending_pipelines.len(),
            loaded_shaders: self.shader_modules.len(),
        }
    }
}

/// Statistics about pipeline manager state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStats {
    pub total_pipelines: usize,
    pub pending_pipelines: usize,
    pub loaded_shaders: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 0.0, 0.0, 1.0);
}
"#;

    fn write_shader(dir: &Path, name: &str, source: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, source).unwrap();
        path
    }

    #[test]
    fn valid_program_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_shader(dir.path(), "ok.wgsl", VALID);
        let program = load_program_source("ok", &path, &[VERTEX_ENTRY, FRAGMENT_ENTRY]).unwrap();
        assert_eq!(program.name, "ok");
        assert_eq!(program.source, VALID);
    }

    #[test]
    fn missing_file_reports_non_empty_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_program_source("gone", &dir.path().join("gone.wgsl"), &[VERTEX_ENTRY]).unwrap_err();
        let errors = err.program_errors().unwrap();
        assert!(!errors.is_empty());
        assert!(errors.contains("unable to read"));
    }

    #[test]
    fn syntax_error_reports_non_empty_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_shader(dir.path(), "bad.wgsl", "@vertex fn vs_main( -> {");
        let err = load_program_source("bad", &path, &[VERTEX_ENTRY]).unwrap_err();
        assert!(matches!(err, RendererError::ProgramLoad { ref program, .. } if program == "bad"));
        assert!(!err.program_errors().unwrap().trim().is_empty());
    }

    #[test]
    fn type_error_is_caught_by_validation() {
        let source = r#"
@vertex
fn vs_main() -> @builtin(position) vec4<f32> {
    let x: f32 = 1.0;
    return x;
}
"#;
        assert!(!validate_wgsl(source, &[VERTEX_ENTRY]).is_empty());
    }

    #[test]
    fn missing_entry_point_is_reported() {
        let source = VALID.replace("fs_main", "fragment_main");
        let errors = validate_wgsl(&source, &[VERTEX_ENTRY, FRAGMENT_ENTRY]);
        assert!(errors.contains("missing entry point 'fs_main'"));
    }

    #[test]
    fn empty_source_is_rejected() {
        assert_eq!(validate_wgsl("  \n", &[]), "shader source is empty");
    }

    #[test]
    fn vertex_only_config_has_no_color_targets() {
        let config = PipelineConfig::default().with_vertex_only();
        assert!(config.vertex_only);
        assert!(config.color_targets.is_empty());
    }
}
