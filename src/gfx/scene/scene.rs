use std::path::Path;

use cgmath::{EuclideanSpace, Matrix4, Point3, Vector3, Vector4};

use crate::{
    error::{RendererError, Result},
    gfx::geometry::generate_skybox_cube,
};

use super::model::{Material, Model};

/// Half extent of the default skybox cube
pub const SKYBOX_HALF_EXTENT: f32 = 40.0;

/// Everything the renderer reads each frame: models, skybox, light and clip planes
pub struct Scene {
    pub models: Vec<Model>,
    pub skybox: Model,
    /// Point the camera is retargeted to when the renderer starts
    pub scene_center: Point3<f32>,
    /// Position the directional light looks from, towards the camera centre
    pub light_direction: Vector3<f32>,
    pub near_plane: f32,
    pub far_plane: f32,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            models: Vec::new(),
            skybox: Model::from_geometry("Skybox", &generate_skybox_cube(SKYBOX_HALF_EXTENT)),
            scene_center: Point3::origin(),
            light_direction: Vector3::new(4.0, 8.0, 4.0),
            near_plane: 0.1,
            far_plane: 200.0,
        }
    }

    /// Adds a model and returns it for further configuration
    pub fn add_model(&mut self, model: Model) -> &mut Model {
        self.models.push(model);
        let index = self.models.len() - 1;
        &mut self.models[index]
    }

    /// Loads every mesh of an OBJ file as a separate model.
    ///
    /// Materials from an accompanying MTL file are applied when present.
    /// Meshes without faces (points, lines or bare vertices) are skipped.
    /// Returns the number of models added.
    pub fn load_obj(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let (meshes, materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|source| RendererError::ModelLoad {
            path: path.to_path_buf(),
            source,
        })?;

        let materials = materials.unwrap_or_else(|err| {
            log::warn!("No materials for '{}': {}", path.display(), err);
            Vec::new()
        });

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());

        let mut added = 0;
        for (i, mesh_model) in meshes.iter().enumerate() {
            let mesh = &mesh_model.mesh;
            let name = if mesh_model.name.is_empty() {
                format!("{} ({})", stem, i)
            } else {
                mesh_model.name.clone()
            };

            if mesh.indices.is_empty() {
                log::warn!("Skipping '{}' in '{}': no faces", name, path.display());
                continue;
            }

            let material = mesh
                .material_id
                .and_then(|id| materials.get(id))
                .map(Material::from_mtl)
                .unwrap_or_default();

            let model = Model::from_indexed(name, &mesh.positions, &mesh.normals, &mesh.indices)
                .with_material(material);
            log::info!("Loaded '{}' with {} vertices", model.name, model.vertex_count());
            self.models.push(model);
            added += 1;
        }

        Ok(added)
    }

    /// Moves the scene centre to the middle of the models' world-space bounds
    pub fn fit_center_to_models(&mut self) {
        let mut min = Vector3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut max = Vector3::new(f32::MIN, f32::MIN, f32::MIN);
        let mut any = false;

        for model in &self.models {
            for vertex in model.vertices() {
                let p = model.model_matrix
                    * Vector4::new(vertex.position[0], vertex.position[1], vertex.position[2], 1.0);
                min = Vector3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
                max = Vector3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
                any = true;
            }
        }

        if any {
            self.scene_center = Point3::from_vec((min + max) * 0.5);
        }
    }

    pub fn set_skybox_transform(&mut self, transform: Matrix4<f32>) {
        self.skybox.model_matrix = transform;
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn find_model(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn get_statistics(&self) -> SceneStatistics {
        SceneStatistics {
            model_count: self.models.len(),
            total_vertices: self.models.iter().map(|m| m.vertex_count()).sum(),
            total_triangles: self.models.iter().map(|m| m.vertex_count() / 3).sum(),
        }
    }
}

/// Scene statistics for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneStatistics {
    pub model_count: usize,
    pub total_triangles: u32,
    pub total_vertices: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::{generate_cube, generate_plane};
    use std::io::Write;

    #[test]
    fn new_scene_has_skybox_but_no_models() {
        let scene = Scene::new();
        assert_eq!(scene.model_count(), 0);
        assert_eq!(scene.skybox.vertex_count(), 36);
        assert!(scene.near_plane < scene.far_plane);
    }

    #[test]
    fn statistics_count_triangles() {
        let mut scene = Scene::new();
        scene.add_model(Model::from_geometry("cube", &generate_cube()));
        scene.add_model(Model::from_geometry("floor", &generate_plane(4.0, 4.0, 1, 1)));
        let stats = scene.get_statistics();
        assert_eq!(stats.model_count, 2);
        assert_eq!(stats.total_triangles, 12 + 2);
        assert_eq!(stats.total_vertices, 36 + 6);
        assert!(scene.find_model("floor").is_some());
    }

    #[test]
    fn fit_center_uses_transformed_bounds() {
        let mut scene = Scene::new();
        scene
            .add_model(Model::from_geometry("cube", &generate_cube()))
            .set_translation(Vector3::new(2.0, 0.0, 0.0));
        scene.fit_center_to_models();
        assert_eq!(scene.scene_center, Point3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn fit_center_without_models_keeps_center() {
        let mut scene = Scene::new();
        scene.scene_center = Point3::new(1.0, 1.0, 1.0);
        scene.fit_center_to_models();
        assert_eq!(scene.scene_center, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn loads_obj_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quad.obj");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "o quad").unwrap();
        writeln!(file, "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0").unwrap();
        writeln!(file, "f 1 2 3 4").unwrap();
        drop(file);

        let mut scene = Scene::new();
        let added = scene.load_obj(&path).unwrap();
        assert_eq!(added, 1);
        assert_eq!(scene.models[0].name, "quad");
        assert_eq!(scene.models[0].vertex_count(), 6);
    }

    #[test]
    fn faceless_obj_groups_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed.obj");
        std::fs::write(
            &path,
            "o tri\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\no points\nv 5 5 5\n",
        )
        .unwrap();

        let mut scene = Scene::new();
        let added = scene.load_obj(&path).unwrap();
        assert_eq!(added, 1);
        assert_eq!(scene.model_count(), 1);
        assert_eq!(scene.models[0].name, "tri");
        assert!(scene.models.iter().all(|m| m.vertex_count() > 0));
        assert!(scene.find_model("points").is_none());
    }

    #[test]
    fn missing_obj_is_reported() {
        let mut scene = Scene::new();
        let err = scene.load_obj("/definitely/not/here.obj").unwrap_err();
        assert!(matches!(err, RendererError::ModelLoad { .. }));
    }
}
