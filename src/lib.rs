pub mod batch;
pub mod config;
pub mod error;
pub mod geometry;
pub mod logger;
pub mod pacing;
pub mod renderer;
pub mod shader;

#[cfg(windows)]
pub mod d3d11;
#[cfg(windows)]
pub mod window;

pub use batch::{VertexBatch, DEFAULT_MAX_VERTICES, MAX_VERTICES};
pub use config::{Config, OverlayConfig};
pub use error::{InitStage, RendererError};
pub use geometry::{Color, Rectangle, Vertex, Viewport};
pub use logger::*;
pub use pacing::FramePacer;
pub use renderer::{FramePhase, FrameTarget, Renderer};
pub use shader::{ShaderConfig, ShaderSource};

#[cfg(windows)]
pub use d3d11::{D3D11Pipeline, OverlayRenderer, PipelineOptions};
#[cfg(windows)]
pub use window::OverlayWindow;
