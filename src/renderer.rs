use crate::batch::VertexBatch;
use crate::error::RendererError;
use crate::geometry::{quad_vertices, Color, Rectangle, Vertex, Viewport};

/// Background for every frame; the desktop stays visible behind the overlay.
pub const CLEAR_COLOR: Color = Color::TRANSPARENT;

/// GPU-side half of the renderer. Implementations own every device resource.
pub trait FrameTarget {
    fn clear(&mut self, color: [f32; 4]);

    /// Uploads `vertices` and issues one triangle-list draw covering all of them.
    fn submit(&mut self, vertices: &[Vertex]) -> Result<(), RendererError>;

    fn present(&mut self) -> Result<(), RendererError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    Idle,
    FrameOpen,
}

pub struct Renderer<T: FrameTarget> {
    target: T,
    viewport: Viewport,
    batch: VertexBatch,
    phase: FramePhase,
}

impl<T: FrameTarget> Renderer<T> {
    pub fn with_target(target: T, viewport: Viewport, max_vertices: usize) -> Self {
        Self {
            target,
            viewport,
            batch: VertexBatch::with_capacity(max_vertices),
            phase: FramePhase::Idle,
        }
    }

    pub fn begin_frame(&mut self) {
        self.target.clear(CLEAR_COLOR.to_array());
        self.phase = FramePhase::FrameOpen;
    }

    pub fn add_rectangle(&mut self, rect: &Rectangle) -> Result<(), RendererError> {
        let vertices = quad_vertices(rect, self.viewport);
        self.batch.push_quad(&vertices)
    }

    /// Draws and presents the pending batch. An empty batch submits nothing.
    pub fn render(&mut self) -> Result<(), RendererError> {
        if self.batch.is_empty() {
            self.phase = FramePhase::Idle;
            return Ok(());
        }

        self.target.submit(self.batch.as_slice())?;
        self.batch.clear();
        self.phase = FramePhase::Idle;

        self.target.present()
    }

    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    pub fn pending_vertices(&self) -> usize {
        self.batch.len()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn target(&self) -> &T {
        &self.target
    }
}
