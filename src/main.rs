use std::path::PathBuf;

use anyhow::Context;
use cgmath::{Deg, Matrix4, Vector3};
use spectral_explorer::{
    gfx::{
        geometry::{generate_cube, generate_plane, generate_sphere},
        scene::{Material, Model, Scene},
    },
    ExplorerApp, RendererConfig,
};

/// Ground plane, a sphere and a rotated cube
fn demo_scene() -> Scene {
    let mut scene = Scene::new();

    scene.add_model(
        Model::from_geometry("ground", &generate_plane(12.0, 12.0, 1, 1))
            .with_material(Material::rgb(0.6, 0.6, 0.6)),
    );
    scene.add_model(
        Model::from_geometry("sphere", &generate_sphere(48, 24))
            .with_material(Material {
                specular: [0.8, 0.8, 0.8],
                shininess: 64.0,
                ..Material::rgb(0.85, 0.25, 0.2)
            })
            .with_transform(Matrix4::from_translation(Vector3::new(-1.5, 1.0, 0.0))),
    );
    scene.add_model(
        Model::from_geometry("cube", &generate_cube())
            .with_material(Material::rgb(0.2, 0.45, 0.85))
            .with_transform(
                Matrix4::from_translation(Vector3::new(1.5, 0.5, 0.5)) * Matrix4::from_angle_y(Deg(30.0)),
            ),
    );

    scene.fit_center_to_models();
    scene
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let paths: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    let scene = if paths.is_empty() {
        log::info!("No models given, showing the demo scene");
        demo_scene()
    } else {
        let mut scene = Scene::new();
        for path in &paths {
            let count = scene
                .load_obj(path)
                .with_context(|| format!("loading {}", path.display()))?;
            log::info!("Loaded {} meshes from {}", count, path.display());
        }
        scene.fit_center_to_models();
        scene
    };

    let stats = scene.get_statistics();
    log::info!(
        "Scene: {} models, {} triangles",
        stats.model_count,
        stats.total_triangles
    );

    ExplorerApp::new(scene, RendererConfig::from_env())?.run()
}
