//! # Scene Module
//!
//! The explicitly passed scene the renderer reads each frame: models with
//! their derived matrices, the skybox, the light and the clip planes.
//!
//! ## Key Components
//!
//! - [`Scene`] - Container for models, skybox and scene-wide parameters
//! - [`Model`] - Triangle-list geometry with transform, material and derived matrices
//! - [`Vertex3D`] - Interleaved position + normal vertex
//!
//! ## Usage
//!
//! ```no_run
//! use spectral_explorer::gfx::geometry::generate_sphere;
//! use spectral_explorer::gfx::scene::{Material, Model, Scene};
//!
//! let mut scene = Scene::new();
//! scene.load_obj("bunny.obj").expect("load model");
//! scene
//!     .add_model(Model::from_geometry("ball", &generate_sphere(32, 16)))
//!     .material = Material::rgb(0.9, 0.2, 0.2);
//! scene.fit_center_to_models();
//! ```

pub mod model;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use model::{DrawModel, Material, Model, ModelMatrices};
pub use scene::{Scene, SceneStatistics};
pub use vertex::Vertex3D;
