use cgmath::*;

/// Bounds for interactive orbiting around the scene centre
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitBounds {
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,
}

impl Default for OrbitBounds {
    fn default() -> Self {
        let limit = std::f32::consts::FRAC_PI_2 - 0.01;
        Self {
            min_distance: 0.5,
            max_distance: 100.0,
            min_pitch: -limit,
            max_pitch: limit,
        }
    }
}

/// Look-at camera used by the renderer.
///
/// The camera is defined by an eye position, the point it looks at (`center`)
/// and an up vector. The renderer retargets `center` to the scene centre on
/// start and uses it as the focus point of the directional light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneCamera {
    pub eye: Point3<f32>,
    pub center: Point3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitBounds,
}

impl Default for SceneCamera {
    fn default() -> Self {
        Self::new(Point3::new(0.0, 2.0, 6.0), Point3::origin())
    }
}

impl SceneCamera {
    pub fn new(eye: Point3<f32>, center: Point3<f32>) -> Self {
        Self {
            eye,
            center,
            up: Vector3::unit_y(),
            bounds: OrbitBounds::default(),
        }
    }

    /// Right-handed view matrix looking from `eye` towards `center`
    pub fn look_at_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye, self.center, self.up)
    }

    /// Moves the focus point, keeping the eye where it is
    pub fn set_scene_center(&mut self, center: Point3<f32>) {
        self.center = center;
    }

    pub fn distance(&self) -> f32 {
        self.eye.distance(self.center)
    }

    /// Orbits the eye around the centre by the given yaw/pitch deltas (radians)
    pub fn orbit(&mut self, yaw_delta: f32, pitch_delta: f32) {
        let offset = self.eye - self.center;
        let distance = offset.magnitude();
        if distance <= f32::EPSILON {
            return;
        }

        let yaw = offset.x.atan2(offset.z) + yaw_delta;
        let pitch = ((offset.y / distance).asin() + pitch_delta)
            .clamp(self.bounds.min_pitch, self.bounds.max_pitch);

        self.eye = self.center + spherical_offset(yaw, pitch, distance);
    }

    /// Moves the eye towards (negative delta) or away from the centre
    pub fn zoom(&mut self, delta: f32) {
        let offset = self.eye - self.center;
        let distance = offset.magnitude();
        if distance <= f32::EPSILON {
            return;
        }

        let target = (distance + delta).clamp(self.bounds.min_distance, self.bounds.max_distance);
        self.eye = self.center + offset * (target / distance);
    }
}

fn spherical_offset(yaw: f32, pitch: f32, distance: f32) -> Vector3<f32> {
    Vector3::new(
        distance * pitch.cos() * yaw.sin(),
        distance * pitch.sin(),
        distance * pitch.cos() * yaw.cos(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn look_at_maps_center_onto_negative_z() {
        let camera = SceneCamera::new(Point3::new(0.0, 0.0, 5.0), Point3::origin());
        let center_in_view = camera.look_at_matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!(approx(center_in_view.x, 0.0));
        assert!(approx(center_in_view.y, 0.0));
        assert!(approx(center_in_view.z, -5.0));
    }

    #[test]
    fn set_scene_center_keeps_eye() {
        let mut camera = SceneCamera::default();
        let eye = camera.eye;
        camera.set_scene_center(Point3::new(1.0, 2.0, 3.0));
        assert_eq!(camera.eye, eye);
        assert_eq!(camera.center, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn orbit_preserves_distance() {
        let mut camera = SceneCamera::new(Point3::new(0.0, 1.0, 4.0), Point3::origin());
        let before = camera.distance();
        camera.orbit(0.7, 0.2);
        assert!(approx(camera.distance(), before));
    }

    #[test]
    fn orbit_clamps_pitch() {
        let mut camera = SceneCamera::new(Point3::new(0.0, 0.0, 4.0), Point3::origin());
        camera.orbit(0.0, 10.0);
        let offset = camera.eye - camera.center;
        let pitch = (offset.y / offset.magnitude()).asin();
        assert!(pitch <= camera.bounds.max_pitch + 1e-5);
    }

    #[test]
    fn zoom_respects_bounds() {
        let mut camera = SceneCamera::new(Point3::new(0.0, 0.0, 4.0), Point3::origin());
        camera.zoom(-100.0);
        assert!(approx(camera.distance(), camera.bounds.min_distance));
        camera.zoom(1000.0);
        assert!(approx(camera.distance(), camera.bounds.max_distance));
    }
}
