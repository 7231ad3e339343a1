//! Per-frame matrix computation
//!
//! Pure functions of the camera, scene parameters and viewport size. The
//! renderer calls these from `update`; nothing here touches the GPU, so the
//! results are bit-for-bit reproducible for identical inputs.

use cgmath::{EuclideanSpace, Matrix, Matrix4, Point3, SquareMatrix, Vector3, Vector4};

use crate::{
    config::{LightVolume, RendererConfig},
    gfx::{
        camera::{SceneCamera, OPENGL_TO_WGPU_MATRIX},
        scene::{ModelMatrices, Scene},
    },
};

/// Matrices shared by every model in one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransforms {
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    /// Light projection × light view; multiplied by each model matrix
    pub light_view_projection: Matrix4<f32>,
    /// Direction from the camera centre towards the light, in view space
    pub light_direction_view: Vector3<f32>,
}

impl FrameTransforms {
    /// Computes the frame matrices for a viewport of `width` × `height` pixels.
    ///
    /// A zero-sized viewport falls back to an aspect ratio of 1.
    pub fn compute(
        config: &RendererConfig,
        camera: &SceneCamera,
        scene: &Scene,
        width: f32,
        height: f32,
    ) -> Self {
        let view = camera.look_at_matrix();
        let projection = OPENGL_TO_WGPU_MATRIX
            * cgmath::perspective(
                config.field_of_view_y,
                aspect_ratio(width, height),
                scene.near_plane,
                scene.far_plane,
            );

        let light_eye = Point3::from_vec(scene.light_direction);
        let light_view = Matrix4::look_at_rh(light_eye, camera.center, Vector3::unit_y());
        let light_view_projection = light_projection(&config.light_volume) * light_view;

        // shading and shadow lookups share the light's view axis
        let towards_light = light_eye - camera.center;
        let light_direction_view = (view * towards_light.extend(0.0)).truncate();

        Self {
            view,
            projection,
            light_view_projection,
            light_direction_view,
        }
    }

    /// Derived matrices for one model
    pub fn model_matrices(&self, model_matrix: &Matrix4<f32>) -> ModelMatrices {
        let model_view = self.view * *model_matrix;
        ModelMatrices {
            model_view,
            model_view_projection: self.projection * model_view,
            normal: normal_matrix(&model_view),
            model_view_projection_light: self.light_view_projection * *model_matrix,
        }
    }

    /// Model-view-projection of the skybox
    pub fn skybox_matrix(&self, model_matrix: &Matrix4<f32>) -> Matrix4<f32> {
        self.projection * self.view * *model_matrix
    }

    /// Overwrites the derived matrices of every model and the skybox
    pub fn apply(&self, scene: &mut Scene) {
        for model in &mut scene.models {
            model.matrices = self.model_matrices(&model.model_matrix);
        }
        let skybox_mvp = self.skybox_matrix(&scene.skybox.model_matrix);
        scene.skybox.matrices = ModelMatrices {
            model_view_projection: skybox_mvp,
            ..ModelMatrices::default()
        };
    }
}

/// |width / height|, or 1 when either side is zero
pub fn aspect_ratio(width: f32, height: f32) -> f32 {
    if width == 0.0 || height == 0.0 {
        return 1.0;
    }
    (width / height).abs()
}

/// Orthographic projection of the light volume, remapped to wgpu depth
pub fn light_projection(volume: &LightVolume) -> Matrix4<f32> {
    OPENGL_TO_WGPU_MATRIX
        * cgmath::ortho(
            volume.left,
            volume.right,
            volume.bottom,
            volume.top,
            volume.near,
            volume.far,
        )
}

/// Inverse-transpose of `model_view`; identity when it is singular
pub fn normal_matrix(model_view: &Matrix4<f32>) -> Matrix4<f32> {
    model_view
        .invert()
        .unwrap_or_else(Matrix4::identity)
        .transpose()
}

/// Projects a world-space point with the given light-space matrix into
/// shadow-map texture coordinates and depth.
pub fn shadow_coordinates(light_mvp: &Matrix4<f32>, point: Point3<f32>) -> Vector3<f32> {
    let clip: Vector4<f32> = *light_mvp * point.to_homogeneous();
    let ndc = clip.truncate() / clip.w;
    Vector3::new(ndc.x * 0.5 + 0.5, 0.5 - ndc.y * 0.5, ndc.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{geometry::generate_cube, scene::Model};
    use cgmath::{Deg, InnerSpace};

    fn bits(m: &Matrix4<f32>) -> Vec<u32> {
        let values: &[f32; 16] = m.as_ref();
        values.iter().map(|v| v.to_bits()).collect()
    }

    fn sample_scene() -> Scene {
        let mut scene = Scene::new();
        let mut cube = Model::from_geometry("cube", &generate_cube());
        cube.set_translation(Vector3::new(1.0, 0.5, -2.0));
        cube.rotate_y(Deg(30.0));
        scene.add_model(cube);
        scene.add_model(Model::from_geometry("other", &generate_cube()));
        scene
    }

    #[test]
    fn recomputation_is_bit_identical() {
        let config = RendererConfig::default();
        let camera = SceneCamera::new(Point3::new(3.0, 4.0, 5.0), Point3::origin());
        let mut scene = sample_scene();

        FrameTransforms::compute(&config, &camera, &scene, 1280.0, 720.0).apply(&mut scene);
        let first: Vec<_> = scene.models.iter().map(|m| m.matrices).collect();
        let first_sky = scene.skybox.matrices.model_view_projection;

        FrameTransforms::compute(&config, &camera, &scene, 1280.0, 720.0).apply(&mut scene);
        for (model, before) in scene.models.iter().zip(&first) {
            assert_eq!(bits(&model.matrices.model_view), bits(&before.model_view));
            assert_eq!(bits(&model.matrices.model_view_projection), bits(&before.model_view_projection));
            assert_eq!(bits(&model.matrices.normal), bits(&before.normal));
            assert_eq!(
                bits(&model.matrices.model_view_projection_light),
                bits(&before.model_view_projection_light)
            );
        }
        assert_eq!(bits(&scene.skybox.matrices.model_view_projection), bits(&first_sky));
    }

    #[test]
    fn aspect_ratio_is_absolute_and_guards_zero() {
        assert_eq!(aspect_ratio(200.0, 100.0), 2.0);
        assert_eq!(aspect_ratio(-200.0, 100.0), 2.0);
        assert_eq!(aspect_ratio(200.0, 0.0), 1.0);
    }

    #[test]
    fn normal_matrix_keeps_normals_perpendicular_under_scale() {
        let model_view = Matrix4::from_nonuniform_scale(2.0, 1.0, 1.0);
        let normal = normal_matrix(&model_view);
        // surface x + y = 0 has normal (1, 1, 0); after scaling, tangent (1, -1, 0) becomes (2, -1, 0)
        let n = (normal * Vector4::new(1.0, 1.0, 0.0, 0.0)).truncate();
        let t = Vector3::new(2.0, -1.0, 0.0);
        assert!(n.dot(t).abs() < 1e-6);
    }

    #[test]
    fn singular_model_view_yields_identity_normal_matrix() {
        let flat = Matrix4::from_nonuniform_scale(1.0, 0.0, 1.0);
        assert_eq!(normal_matrix(&flat), Matrix4::identity());
    }

    #[test]
    fn projection_uses_configured_fov() {
        let config = RendererConfig::default();
        let camera = SceneCamera::default();
        let scene = Scene::new();
        let frame = FrameTransforms::compute(&config, &camera, &scene, 100.0, 100.0);
        let expected = 1.0 / (65.0f32.to_radians() / 2.0).tan();
        assert!((frame.projection.y.y - expected).abs() < 1e-5);
    }

    #[test]
    fn camera_center_lands_in_middle_of_shadow_map() {
        let config = RendererConfig::default();
        let camera = SceneCamera::new(Point3::new(0.0, 3.0, 6.0), Point3::new(1.0, 0.0, 0.0));
        let scene = Scene::new();
        let frame = FrameTransforms::compute(&config, &camera, &scene, 800.0, 600.0);

        let uv = shadow_coordinates(&frame.light_view_projection, camera.center);
        assert!((uv.x - 0.5).abs() < 1e-5);
        assert!((uv.y - 0.5).abs() < 1e-5);
        assert!(uv.z > 0.0 && uv.z < 1.0);
    }

    #[test]
    fn shading_direction_follows_shadow_axis_off_origin() {
        let config = RendererConfig::default();
        let camera = SceneCamera::new(Point3::new(5.0, 4.0, 9.0), Point3::new(3.0, 1.0, -2.0));
        let scene = Scene::new();
        let frame = FrameTransforms::compute(&config, &camera, &scene, 800.0, 600.0);

        let world = (frame.view.invert().unwrap() * frame.light_direction_view.extend(0.0)).truncate();
        let expected = (Point3::from_vec(scene.light_direction) - camera.center).normalize();
        assert!((world.normalize() - expected).magnitude() < 1e-4);

        // the light looks down -z in its own view space, so "towards the light" is +z
        let light_view = Matrix4::look_at_rh(
            Point3::from_vec(scene.light_direction),
            camera.center,
            Vector3::unit_y(),
        );
        let in_light_space = (light_view * expected.extend(0.0)).truncate();
        assert!((in_light_space - Vector3::unit_z()).magnitude() < 1e-4);
    }

    #[test]
    fn skybox_matrix_matches_projection_view_model() {
        let config = RendererConfig::default();
        let camera = SceneCamera::default();
        let mut scene = Scene::new();
        scene.set_skybox_transform(Matrix4::from_scale(2.0));
        let frame = FrameTransforms::compute(&config, &camera, &scene, 640.0, 480.0);
        frame.apply(&mut scene);
        assert_eq!(
            scene.skybox.matrices.model_view_projection,
            frame.projection * frame.view * Matrix4::from_scale(2.0)
        );
    }
}
