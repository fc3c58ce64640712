// Direct3D 11 backend: device, swap chain and the rectangle pipeline bound to one window
use crate::batch::MAX_VERTICES;
use crate::error::{InitStage, RendererError};
use crate::geometry::{Vertex, Viewport, COLOR_OFFSET, VERTEX_STRIDE};
use crate::renderer::{FrameTarget, Renderer};
use crate::shader::ShaderSource;
use crate::log_info;

use windows::{
    core::*,
    Win32::{
        Foundation::*,
        Graphics::{
            Direct3D::*,
            Direct3D11::*,
            Dxgi::Common::*,
            Dxgi::*,
        },
    },
};

pub type OverlayRenderer = Renderer<D3D11Pipeline>;

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub max_vertices: usize,
    pub debug_device: bool,
}

fn failed(stage: InitStage) -> impl Fn(Error) -> RendererError {
    move |e| RendererError::init(stage, e.to_string())
}

fn created<T>(object: Option<T>, stage: InitStage) -> std::result::Result<T, RendererError> {
    object.ok_or_else(|| RendererError::init(stage, "driver returned no object"))
}

/// All GPU state for the overlay. Built in one pass, never modified, released on drop.
pub struct D3D11Pipeline {
    _device: ID3D11Device,
    context: ID3D11DeviceContext,
    swap_chain: IDXGISwapChain,
    render_target_view: ID3D11RenderTargetView,
    _vertex_shader: ID3D11VertexShader,
    _pixel_shader: ID3D11PixelShader,
    _input_layout: ID3D11InputLayout,
    vertex_buffer: ID3D11Buffer,
    buffer_bytes: usize,
}

impl D3D11Pipeline {
    pub fn new(
        hwnd: HWND,
        viewport: Viewport,
        shader: &ShaderSource,
        options: PipelineOptions,
    ) -> std::result::Result<Self, RendererError> {
        unsafe {
            let (device, context, swap_chain) =
                Self::create_device_and_swap_chain(hwnd, viewport, options.debug_device)?;
            log_info!(
                "Device and swap chain created ({}x{})",
                viewport.width(),
                viewport.height()
            );

            let render_target_view = Self::bind_render_target(&device, &context, &swap_chain)?;
            Self::set_viewport(&context, viewport);

            let (vertex_shader, pixel_shader, input_layout) =
                Self::init_shader_pipeline(&device, &context, shader)?;
            log_info!("Shaders compiled from {}", shader.path().display());

            let (vertex_buffer, buffer_bytes) =
                Self::create_vertex_buffer(&device, &context, options.max_vertices)?;
            log_info!(
                "Vertex buffer allocated ({} vertices, {} bytes)",
                options.max_vertices,
                buffer_bytes
            );

            Ok(Self {
                _device: device,
                context,
                swap_chain,
                render_target_view,
                _vertex_shader: vertex_shader,
                _pixel_shader: pixel_shader,
                _input_layout: input_layout,
                vertex_buffer,
                buffer_bytes,
            })
        }
    }

    unsafe fn create_device_and_swap_chain(
        hwnd: HWND,
        viewport: Viewport,
        debug_device: bool,
    ) -> std::result::Result<(ID3D11Device, ID3D11DeviceContext, IDXGISwapChain), RendererError> {
        let stage = InitStage::DeviceAndSwapChain;

        let swap_chain_desc = DXGI_SWAP_CHAIN_DESC {
            BufferDesc: DXGI_MODE_DESC {
                Width: viewport.width(),
                Height: viewport.height(),
                Format: DXGI_FORMAT_R8G8B8A8_UNORM,
                ..Default::default()
            },
            SampleDesc: DXGI_SAMPLE_DESC { Count: 1, Quality: 0 },
            BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
            BufferCount: 1,
            OutputWindow: hwnd,
            Windowed: true.into(),
            SwapEffect: DXGI_SWAP_EFFECT_DISCARD,
            Flags: 0,
        };

        let flags = if debug_device {
            D3D11_CREATE_DEVICE_DEBUG
        } else {
            D3D11_CREATE_DEVICE_FLAG(0)
        };

        let mut swap_chain: Option<IDXGISwapChain> = None;
        let mut device: Option<ID3D11Device> = None;
        let mut context: Option<ID3D11DeviceContext> = None;

        D3D11CreateDeviceAndSwapChain(
            None,
            D3D_DRIVER_TYPE_HARDWARE,
            HMODULE::default(),
            flags,
            None,
            D3D11_SDK_VERSION,
            Some(&swap_chain_desc),
            Some(&mut swap_chain),
            Some(&mut device),
            None,
            Some(&mut context),
        )
        .map_err(failed(stage))?;

        Ok((
            created(device, stage)?,
            created(context, stage)?,
            created(swap_chain, stage)?,
        ))
    }

    unsafe fn bind_render_target(
        device: &ID3D11Device,
        context: &ID3D11DeviceContext,
        swap_chain: &IDXGISwapChain,
    ) -> std::result::Result<ID3D11RenderTargetView, RendererError> {
        let back_buffer: ID3D11Texture2D = swap_chain
            .GetBuffer(0)
            .map_err(failed(InitStage::BackBuffer))?;

        let mut rtv: Option<ID3D11RenderTargetView> = None;
        device
            .CreateRenderTargetView(&back_buffer, None, Some(&mut rtv))
            .map_err(failed(InitStage::RenderTargetView))?;
        let rtv = created(rtv, InitStage::RenderTargetView)?;

        // no depth/stencil
        context.OMSetRenderTargets(Some(&[Some(rtv.clone())]), None);

        Ok(rtv)
    }

    unsafe fn set_viewport(context: &ID3D11DeviceContext, viewport: Viewport) {
        let viewport = D3D11_VIEWPORT {
            TopLeftX: 0.0,
            TopLeftY: 0.0,
            Width: viewport.width() as f32,
            Height: viewport.height() as f32,
            MinDepth: 0.0,
            MaxDepth: 1.0,
        };
        context.RSSetViewports(Some(&[viewport]));
    }

    unsafe fn init_shader_pipeline(
        device: &ID3D11Device,
        context: &ID3D11DeviceContext,
        shader: &ShaderSource,
    ) -> std::result::Result<(ID3D11VertexShader, ID3D11PixelShader, ID3D11InputLayout), RendererError> {
        let vs_bytecode = shader.compile(shader.vertex_stage())?;
        let ps_bytecode = shader.compile(shader.pixel_stage())?;

        let mut vertex_shader: Option<ID3D11VertexShader> = None;
        device
            .CreateVertexShader(&vs_bytecode, None, Some(&mut vertex_shader))
            .map_err(failed(InitStage::VertexShader))?;
        let vertex_shader = created(vertex_shader, InitStage::VertexShader)?;

        let mut pixel_shader: Option<ID3D11PixelShader> = None;
        device
            .CreatePixelShader(&ps_bytecode, None, Some(&mut pixel_shader))
            .map_err(failed(InitStage::PixelShader))?;
        let pixel_shader = created(pixel_shader, InitStage::PixelShader)?;

        context.VSSetShader(&vertex_shader, None);
        context.PSSetShader(&pixel_shader, None);

        let input_elements = [
            D3D11_INPUT_ELEMENT_DESC {
                SemanticName: s!("POSITION"),
                SemanticIndex: 0,
                Format: DXGI_FORMAT_R32G32B32_FLOAT,
                InputSlot: 0,
                AlignedByteOffset: 0,
                InputSlotClass: D3D11_INPUT_PER_VERTEX_DATA,
                InstanceDataStepRate: 0,
            },
            D3D11_INPUT_ELEMENT_DESC {
                SemanticName: s!("COLOR"),
                SemanticIndex: 0,
                Format: DXGI_FORMAT_R32G32B32A32_FLOAT,
                InputSlot: 0,
                AlignedByteOffset: COLOR_OFFSET,
                InputSlotClass: D3D11_INPUT_PER_VERTEX_DATA,
                InstanceDataStepRate: 0,
            },
        ];

        let mut input_layout: Option<ID3D11InputLayout> = None;
        device
            .CreateInputLayout(&input_elements, &vs_bytecode, Some(&mut input_layout))
            .map_err(failed(InitStage::InputLayout))?;
        let input_layout = created(input_layout, InitStage::InputLayout)?;

        context.IASetInputLayout(&input_layout);

        Ok((vertex_shader, pixel_shader, input_layout))
    }

    unsafe fn create_vertex_buffer(
        device: &ID3D11Device,
        context: &ID3D11DeviceContext,
        max_vertices: usize,
    ) -> std::result::Result<(ID3D11Buffer, usize), RendererError> {
        let stage = InitStage::VertexBuffer;
        let byte_width = Some(max_vertices)
            .filter(|&n| n > 0 && n <= MAX_VERTICES)
            .and_then(|n| u32::try_from(n * VERTEX_STRIDE as usize).ok())
            .ok_or_else(|| RendererError::init(stage, format!("{} vertices do not fit in one buffer", max_vertices)))?;

        let buffer_desc = D3D11_BUFFER_DESC {
            ByteWidth: byte_width,
            Usage: D3D11_USAGE_DYNAMIC,
            BindFlags: D3D11_BIND_VERTEX_BUFFER.0 as u32,
            CPUAccessFlags: D3D11_CPU_ACCESS_WRITE.0 as u32,
            MiscFlags: 0,
            StructureByteStride: 0,
        };

        let mut vertex_buffer: Option<ID3D11Buffer> = None;
        device
            .CreateBuffer(&buffer_desc, None, Some(&mut vertex_buffer))
            .map_err(failed(stage))?;
        let vertex_buffer = created(vertex_buffer, stage)?;

        let offset = 0u32;
        context.IASetVertexBuffers(
            0,
            1,
            Some(&Some(vertex_buffer.clone())),
            Some(&VERTEX_STRIDE),
            Some(&offset),
        );

        Ok((vertex_buffer, byte_width as usize))
    }
}

impl FrameTarget for D3D11Pipeline {
    fn clear(&mut self, color: [f32; 4]) {
        unsafe {
            self.context.ClearRenderTargetView(&self.render_target_view, &color);
        }
    }

    fn submit(&mut self, vertices: &[Vertex]) -> std::result::Result<(), RendererError> {
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        if bytes.len() > self.buffer_bytes {
            return Err(RendererError::FrameSubmission(format!(
                "{} bytes of vertices exceed the {} byte buffer",
                bytes.len(),
                self.buffer_bytes
            )));
        }

        unsafe {
            let mut mapped = D3D11_MAPPED_SUBRESOURCE::default();
            self.context
                .Map(&self.vertex_buffer, 0, D3D11_MAP_WRITE_DISCARD, 0, Some(&mut mapped))
                .map_err(|e| RendererError::FrameSubmission(format!("failed to map vertex buffer: {}", e)))?;

            std::ptr::copy_nonoverlapping(bytes.as_ptr(), mapped.pData as *mut u8, bytes.len());
            self.context.Unmap(&self.vertex_buffer, 0);

            let offset = 0u32;
            self.context.IASetVertexBuffers(
                0,
                1,
                Some(&Some(self.vertex_buffer.clone())),
                Some(&VERTEX_STRIDE),
                Some(&offset),
            );
            self.context.IASetPrimitiveTopology(D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST);
            self.context.Draw(vertices.len() as u32, 0);
        }

        Ok(())
    }

    fn present(&mut self) -> std::result::Result<(), RendererError> {
        // sync interval 0: the host loop paces frames
        unsafe {
            self.swap_chain
                .Present(0, DXGI_PRESENT(0))
                .ok()
                .map_err(|e| RendererError::FrameSubmission(format!("failed to present: {}", e)))
        }
    }
}

impl Renderer<D3D11Pipeline> {
    /// Builds the whole pipeline for `hwnd`; no renderer exists if any step fails.
    pub fn new(
        hwnd: HWND,
        viewport: Viewport,
        shader: &ShaderSource,
        options: PipelineOptions,
    ) -> std::result::Result<Self, RendererError> {
        let pipeline = D3D11Pipeline::new(hwnd, viewport, shader, options)?;
        Ok(Renderer::with_target(pipeline, viewport, options.max_vertices))
    }
}
