use std::fmt;
use std::path::PathBuf;

/// Pipeline setup steps, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStage {
    DeviceAndSwapChain,
    BackBuffer,
    RenderTargetView,
    VertexShader,
    PixelShader,
    InputLayout,
    VertexBuffer,
}

impl fmt::Display for InitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InitStage::DeviceAndSwapChain => "create device and swap chain",
            InitStage::BackBuffer => "get back buffer",
            InitStage::RenderTargetView => "create render target view",
            InitStage::VertexShader => "create vertex shader",
            InitStage::PixelShader => "create pixel shader",
            InitStage::InputLayout => "create input layout",
            InitStage::VertexBuffer => "create vertex buffer",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("invalid window dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("failed to {stage}: {message}")]
    Init { stage: InitStage, message: String },

    #[error("failed to read shader source {}: {source}", .path.display())]
    ShaderSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Display is the compiler diagnostics, unmodified.
    #[error("{diagnostics}")]
    ShaderCompilation {
        entry_point: String,
        profile: String,
        diagnostics: String,
    },

    #[error("vertex capacity exceeded: {requested} vertices requested, capacity is {capacity}")]
    CapacityExceeded { requested: usize, capacity: usize },

    #[error("frame submission failed: {0}")]
    FrameSubmission(String),
}

impl RendererError {
    pub fn init(stage: InitStage, message: impl Into<String>) -> Self {
        RendererError::Init {
            stage,
            message: message.into(),
        }
    }

    pub fn compilation(entry_point: &str, profile: &str, diagnostics: impl Into<String>) -> Self {
        RendererError::ShaderCompilation {
            entry_point: entry_point.to_string(),
            profile: profile.to_string(),
            diagnostics: diagnostics.into(),
        }
    }

    /// Only a full batch can be recovered from by the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RendererError::CapacityExceeded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_error_names_the_stage() {
        let err = RendererError::init(InitStage::InputLayout, "E_INVALIDARG");
        assert_eq!(err.to_string(), "failed to create input layout: E_INVALIDARG");
    }

    #[test]
    fn compilation_error_is_verbatim() {
        let text = "shaders.hlsl(3,5): error X3000: syntax error: unexpected token '}'";
        let err = RendererError::compilation("PShader", "ps_5_0", text);
        assert_eq!(err.to_string(), text);
        match err {
            RendererError::ShaderCompilation { entry_point, profile, .. } => {
                assert_eq!(entry_point, "PShader");
                assert_eq!(profile, "ps_5_0");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn only_capacity_errors_are_recoverable() {
        assert!(RendererError::CapacityExceeded { requested: 1026, capacity: 1024 }.is_recoverable());
        assert!(!RendererError::FrameSubmission("map failed".into()).is_recoverable());
        assert!(!RendererError::InvalidDimensions { width: 0, height: 600 }.is_recoverable());
    }
}
