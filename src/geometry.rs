use crate::error::RendererError;
use serde::{Deserialize, Serialize};

pub const VERTICES_PER_RECT: usize = 6;

/// One vertex as the input layout sees it: POSITION at 0, COLOR at 12.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Vertex {
    /// Normalized device coordinates, z unused.
    pub position: [f32; 3],
    /// Straight (non-premultiplied) RGBA.
    pub color: [f32; 4],
}

pub const VERTEX_STRIDE: u32 = std::mem::size_of::<Vertex>() as u32;
pub const COLOR_OFFSET: u32 = std::mem::size_of::<[f32; 3]>() as u32;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Axis-aligned rectangle in window pixels, positioned by its center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: Color,
}

impl Rectangle {
    pub fn new(x: f32, y: f32, width: f32, height: f32, color: Color) -> Self {
        Self { x, y, width, height, color }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    width: u32,
    height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Result<Self, RendererError> {
        if width == 0 || height == 0 {
            return Err(RendererError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Converts a pixel-space rectangle into two clockwise triangles in device space.
///
/// Pixel space is y-down with the origin at the top-left; device space is
/// y-up, so the rectangle's top edge lands at `cy + hh`.
pub fn quad_vertices(rect: &Rectangle, viewport: Viewport) -> [Vertex; VERTICES_PER_RECT] {
    let w = viewport.width as f32;
    let h = viewport.height as f32;

    let cx = (2.0 * rect.x / w) - 1.0;
    let cy = 1.0 - (2.0 * rect.y / h);
    let hw = rect.width / w;
    let hh = rect.height / h;

    let color = rect.color.to_array();
    let vertex = |x: f32, y: f32| Vertex { position: [x, y, 0.0], color };

    let top_left = vertex(cx - hw, cy + hh);
    let top_right = vertex(cx + hw, cy + hh);
    let bottom_left = vertex(cx - hw, cy - hh);
    let bottom_right = vertex(cx + hw, cy - hh);

    [top_left, top_right, bottom_left, top_right, bottom_right, bottom_left]
}
