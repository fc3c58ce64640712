use crate::error::RendererError;
use crate::geometry::Vertex;

pub const DEFAULT_MAX_VERTICES: usize = 1024;

/// Largest buffer every D3D11 device accepts (D3D11_REQ_RESOURCE_SIZE_IN_MEGABYTES_EXPRESSION_A_TERM).
pub const MAX_BUFFER_BYTES: usize = 128 * 1024 * 1024;
pub const MAX_VERTICES: usize = MAX_BUFFER_BYTES / std::mem::size_of::<Vertex>();

/// Vertices pending for the next draw call, bounded by the GPU buffer size.
#[derive(Debug, Clone)]
pub struct VertexBatch {
    vertices: Vec<Vertex>,
    capacity: usize,
}

impl VertexBatch {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vertices: Vec::new(),
            capacity,
        }
    }

    /// Appends all of `vertices` or none of them.
    pub fn push_quad(&mut self, vertices: &[Vertex]) -> Result<(), RendererError> {
        let requested = self.vertices.len() + vertices.len();
        if requested > self.capacity {
            return Err(RendererError::CapacityExceeded {
                requested,
                capacity: self.capacity,
            });
        }

        self.vertices.extend_from_slice(vertices);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.vertices.len()
    }

    pub fn as_slice(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

impl Default for VertexBatch {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_VERTICES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{quad_vertices, Color, Rectangle, Viewport, VERTICES_PER_RECT};

    fn quad(i: usize) -> [Vertex; VERTICES_PER_RECT] {
        let viewport = Viewport::new(800, 600).unwrap();
        let rect = Rectangle::new(i as f32, i as f32, 10.0, 10.0, Color::rgba(0.0, 1.0, 0.0, 1.0));
        quad_vertices(&rect, viewport)
    }

    #[test]
    fn fills_up_to_capacity() {
        let mut batch = VertexBatch::with_capacity(12);
        batch.push_quad(&quad(0)).unwrap();
        batch.push_quad(&quad(1)).unwrap();
        assert_eq!(batch.len(), 12);
        assert_eq!(batch.remaining(), 0);
    }

    #[test]
    fn rejection_leaves_batch_unchanged() {
        let mut batch = VertexBatch::default();
        for i in 0..170 {
            batch.push_quad(&quad(i)).unwrap();
        }
        assert_eq!(batch.len(), 1020);
        let before = batch.as_bytes().to_vec();

        let err = batch.push_quad(&quad(170)).unwrap_err();
        assert!(matches!(
            err,
            RendererError::CapacityExceeded { requested: 1026, capacity: 1024 }
        ));
        assert_eq!(batch.len(), 1020);
        assert_eq!(batch.as_bytes(), before.as_slice());

        // rejecting again changes nothing either
        assert!(batch.push_quad(&quad(171)).is_err());
        assert_eq!(batch.as_bytes(), before.as_slice());
    }

    #[test]
    fn bytes_cover_every_vertex() {
        let mut batch = VertexBatch::with_capacity(6);
        batch.push_quad(&quad(3)).unwrap();
        assert_eq!(batch.as_bytes().len(), 6 * std::mem::size_of::<Vertex>());
    }

    #[test]
    fn huge_capacity_allocates_lazily() {
        let mut batch = VertexBatch::with_capacity(usize::MAX);
        assert!(batch.is_empty());
        batch.push_quad(&quad(0)).unwrap();
        assert_eq!(batch.len(), 6);
    }

    #[test]
    fn clear_empties_but_keeps_capacity() {
        let mut batch = VertexBatch::with_capacity(6);
        batch.push_quad(&quad(0)).unwrap();
        batch.clear();
        assert!(batch.is_empty());
        assert_eq!(batch.capacity(), 6);
        batch.push_quad(&quad(1)).unwrap();
    }
}
