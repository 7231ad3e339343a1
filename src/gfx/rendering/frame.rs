//! Render pass sequencing
//!
//! A frame is the fixed sequence [`RenderPhase::SEQUENCE`]: a depth-only
//! shadow pass into the shadow map, then the colour pass into the surface.
//! [`FrameSequencer`] tracks which target and viewport each phase uses so
//! the colour pass always runs with the viewport that was current before the
//! shadow pass.

use crate::config::PolygonOffset;

/// Rectangle of the render target that is drawn to, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Square viewport covering a `size` × `size` target
    pub fn square(size: u32) -> Self {
        Self::new(0, 0, size, size)
    }

    pub fn apply(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_viewport(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
            0.0,
            1.0,
        );
    }
}

/// Where a pass renders to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    /// The window surface plus the main depth buffer
    Surface,
    /// The offscreen shadow map depth target
    ShadowMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPhase {
    Shadow,
    Color,
}

impl RenderPhase {
    /// Order in which the phases run every frame
    pub const SEQUENCE: [RenderPhase; 2] = [RenderPhase::Shadow, RenderPhase::Color];

    pub fn label(&self) -> &'static str {
        match self {
            RenderPhase::Shadow => "Shadow Depth Pass",
            RenderPhase::Color => "Main Render Pass",
        }
    }
}

/// Fixed-function state a pass runs with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassState {
    pub target: RenderTarget,
    pub viewport: Viewport,
    pub depth_test: bool,
    pub cull_back_faces: bool,
    pub color_writes: bool,
    pub polygon_offset: Option<PolygonOffset>,
}

impl PassState {
    /// State of the default target before any pass of the frame ran
    pub fn surface(viewport: Viewport) -> Self {
        Self {
            target: RenderTarget::Surface,
            viewport,
            depth_test: true,
            cull_back_faces: false,
            color_writes: true,
            polygon_offset: None,
        }
    }
}

/// Walks the phases of one frame and hands out the state each phase needs
#[derive(Debug, Clone)]
pub struct FrameSequencer {
    saved_viewport: Viewport,
    shadow_size: u32,
    polygon_offset: PolygonOffset,
    current: PassState,
    completed: Vec<RenderPhase>,
}

impl FrameSequencer {
    /// Starts a frame. `viewport` is the viewport in effect before the shadow pass.
    pub fn begin(viewport: Viewport, shadow_size: u32, polygon_offset: PolygonOffset) -> Self {
        Self {
            saved_viewport: viewport,
            shadow_size,
            polygon_offset,
            current: PassState::surface(viewport),
            completed: Vec::with_capacity(RenderPhase::SEQUENCE.len()),
        }
    }

    /// Switches to `phase` and returns the state to record it with.
    ///
    /// The shadow phase binds the shadow map with a square viewport of the
    /// shadow resolution, back-face culling, polygon offset and no colour
    /// writes. The colour phase restores the surface target and the saved
    /// viewport.
    pub fn enter(&mut self, phase: RenderPhase) -> PassState {
        self.current = match phase {
            RenderPhase::Shadow => PassState {
                target: RenderTarget::ShadowMap,
                viewport: Viewport::square(self.shadow_size),
                depth_test: true,
                cull_back_faces: true,
                color_writes: false,
                polygon_offset: Some(self.polygon_offset),
            },
            RenderPhase::Color => PassState::surface(self.saved_viewport),
        };
        self.completed.push(phase);
        self.current
    }

    pub fn current(&self) -> &PassState {
        &self.current
    }

    pub fn completed(&self) -> &[RenderPhase] {
        &self.completed
    }

    /// Ends the frame and returns the state left behind
    pub fn finish(self) -> PassState {
        debug_assert_eq!(self.completed, RenderPhase::SEQUENCE);
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_frame(viewport: Viewport) -> (Vec<PassState>, PassState) {
        let mut sequencer = FrameSequencer::begin(viewport, 1024, PolygonOffset::default());
        let states = RenderPhase::SEQUENCE
            .iter()
            .map(|&phase| sequencer.enter(phase))
            .collect();
        (states, sequencer.finish())
    }

    #[test]
    fn shadow_pass_comes_first() {
        assert_eq!(RenderPhase::SEQUENCE, [RenderPhase::Shadow, RenderPhase::Color]);
    }

    #[test]
    fn shadow_pass_binds_shadow_map_at_its_resolution() {
        let (states, _) = run_frame(Viewport::new(0, 0, 1920, 1080));
        let shadow = states[0];
        assert_eq!(shadow.target, RenderTarget::ShadowMap);
        assert_eq!(shadow.viewport, Viewport::square(1024));
        assert!(shadow.depth_test);
        assert!(shadow.cull_back_faces);
        assert!(!shadow.color_writes);
        assert_eq!(shadow.polygon_offset, Some(PolygonOffset::default()));
    }

    #[test]
    fn color_pass_restores_surface_and_viewport() {
        let original = Viewport::new(0, 0, 800, 600);
        let (states, _) = run_frame(original);
        let color = states[1];
        assert_eq!(color.target, RenderTarget::Surface);
        assert_eq!(color.viewport, original);
        assert!(color.color_writes);
        assert_eq!(color.polygon_offset, None);
    }

    #[test]
    fn viewport_after_frame_equals_viewport_before() {
        for original in [Viewport::new(0, 0, 640, 480), Viewport::new(10, 20, 300, 200)] {
            let (_, after) = run_frame(original);
            assert_eq!(after.viewport, original);
            assert_eq!(after.target, RenderTarget::Surface);
        }
    }

    #[test]
    fn sequencer_records_completed_phases() {
        let mut sequencer = FrameSequencer::begin(Viewport::square(64), 1024, PolygonOffset::default());
        sequencer.enter(RenderPhase::Shadow);
        assert_eq!(sequencer.current().target, RenderTarget::ShadowMap);
        assert_eq!(sequencer.completed(), &[RenderPhase::Shadow]);
    }
}
