// HLSL source loading and compilation for the overlay pipeline
use crate::error::RendererError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderStage {
    pub entry_point: String,
    pub profile: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    pub vertex: ShaderStage,
    pub pixel: ShaderStage,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            vertex: ShaderStage {
                entry_point: "VShader".to_string(),
                profile: "vs_5_0".to_string(),
            },
            pixel: ShaderStage {
                entry_point: "PShader".to_string(),
                profile: "ps_5_0".to_string(),
            },
        }
    }
}

/// Shader text read once at startup, with the stages to compile from it.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    path: PathBuf,
    text: String,
    stages: ShaderConfig,
}

impl ShaderSource {
    pub fn load(path: impl AsRef<Path>, stages: &ShaderConfig) -> Result<Self, RendererError> {
        let path = path.as_ref().to_path_buf();
        let text = fs::read_to_string(&path).map_err(|source| RendererError::ShaderSource {
            path: path.clone(),
            source,
        })?;

        Ok(Self {
            path,
            text,
            stages: stages.clone(),
        })
    }

    pub fn from_text(name: impl Into<PathBuf>, text: impl Into<String>, stages: &ShaderConfig) -> Self {
        Self {
            path: name.into(),
            text: text.into(),
            stages: stages.clone(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn vertex_stage(&self) -> &ShaderStage {
        &self.stages.vertex
    }

    pub fn pixel_stage(&self) -> &ShaderStage {
        &self.stages.pixel
    }

    /// Compiles one stage to bytecode with strict semantics.
    #[cfg(windows)]
    pub fn compile(&self, stage: &ShaderStage) -> Result<Vec<u8>, RendererError> {
        use std::ffi::CString;
        use windows::core::PCSTR;
        use windows::Win32::Graphics::Direct3D::Fxc::*;
        use windows::Win32::Graphics::Direct3D::ID3DBlob;

        let fail = |diagnostics: String| RendererError::compilation(&stage.entry_point, &stage.profile, diagnostics);
        let invalid = |what: &str| fail(format!("{} contains a NUL byte", what));
        let name_cstr = CString::new(self.path.to_string_lossy().into_owned()).map_err(|_| invalid("shader path"))?;
        let entry_cstr = CString::new(stage.entry_point.as_str()).map_err(|_| invalid("entry point"))?;
        let target_cstr = CString::new(stage.profile.as_str()).map_err(|_| invalid("shader profile"))?;

        let mut flags = D3DCOMPILE_ENABLE_STRICTNESS;
        if cfg!(debug_assertions) {
            flags |= D3DCOMPILE_DEBUG;
        }

        let mut blob: Option<ID3DBlob> = None;
        let mut error_blob: Option<ID3DBlob> = None;

        unsafe {
            let result = D3DCompile(
                self.text.as_ptr() as *const _,
                self.text.len(),
                PCSTR(name_cstr.as_ptr() as *const u8),
                None,
                None,
                PCSTR(entry_cstr.as_ptr() as *const u8),
                PCSTR(target_cstr.as_ptr() as *const u8),
                flags,
                0,
                &mut blob,
                Some(&mut error_blob),
            );

            if let Err(e) = result {
                if let Some(error_blob) = error_blob {
                    let error_msg = std::slice::from_raw_parts(
                        error_blob.GetBufferPointer() as *const u8,
                        error_blob.GetBufferSize(),
                    );
                    let error_str = String::from_utf8_lossy(error_msg);
                    return Err(fail(error_str.trim_end_matches('\0').to_string()));
                }
                return Err(fail(format!(
                    "failed to compile {} ({}): {}",
                    stage.entry_point, stage.profile, e
                )));
            }

            let blob = blob.ok_or_else(|| fail(format!("{} produced no bytecode", stage.entry_point)))?;

            Ok(std::slice::from_raw_parts(blob.GetBufferPointer() as *const u8, blob.GetBufferSize()).to_vec())
        }
    }
}

/// Relative paths are looked up next to the executable, then in the working directory.
pub fn resolve_shader_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }

    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.join(path)));

    match beside_exe {
        Some(candidate) if candidate.exists() => candidate,
        _ => path.to_path_buf(),
    }
}
