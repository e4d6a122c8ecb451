//! D3D12 设备提供者
//!
//! 把与 API 无关的描述类型转换成 `D3D12_*` 结构体并创建对应的 COM 对象。
//! 返回的句柄都是 `windows` crate 的 COM 包装，drop 时自动 Release。

use std::ffi::c_void;

use tracing::debug;
use windows::core::PCSTR;
use windows::Win32::Graphics::Direct3D::ID3DBlob;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;

use super::{blob_text, win_error};
use crate::core::error::{GraphicsError, Result};
use crate::gfx::device::{Bytecode, GpuBuffer, GraphicsDevice};
use crate::gfx::types::{CullMode, FillMode, Format, PipelineStateDesc, RootSignatureDesc};

impl Bytecode for ID3DBlob {
    fn as_bytes(&self) -> &[u8] {
        unsafe {
            std::slice::from_raw_parts(self.GetBufferPointer() as *const u8, self.GetBufferSize())
        }
    }
}

pub(crate) fn dxgi_format(format: Format) -> DXGI_FORMAT {
    match format {
        Format::R32G32B32A32Float => DXGI_FORMAT_R32G32B32A32_FLOAT,
        Format::R8G8B8A8Unorm => DXGI_FORMAT_R8G8B8A8_UNORM,
        Format::R8G8B8A8UnormSrgb => DXGI_FORMAT_R8G8B8A8_UNORM_SRGB,
    }
}

fn cull_mode(mode: CullMode) -> D3D12_CULL_MODE {
    match mode {
        CullMode::Back => D3D12_CULL_MODE_BACK,
    }
}

fn fill_mode(mode: FillMode) -> D3D12_FILL_MODE {
    match mode {
        FillMode::Solid => D3D12_FILL_MODE_SOLID,
    }
}

fn shader_bytecode(bytes: &[u8]) -> D3D12_SHADER_BYTECODE {
    D3D12_SHADER_BYTECODE {
        pShaderBytecode: bytes.as_ptr() as *const c_void,
        BytecodeLength: bytes.len(),
    }
}

/// 上传堆上的缓冲区
pub struct UploadBuffer {
    resource: ID3D12Resource,
    size_in_bytes: u64,
}

impl UploadBuffer {
    pub fn resource(&self) -> &ID3D12Resource {
        &self.resource
    }
}

impl GpuBuffer for UploadBuffer {
    fn size_in_bytes(&self) -> u64 {
        self.size_in_bytes
    }

    fn gpu_virtual_address(&self) -> u64 {
        unsafe { self.resource.GetGPUVirtualAddress() }
    }

    fn write_bytes(&self, offset: u64, data: &[u8]) -> Result<()> {
        let end = offset + data.len() as u64;
        if end > self.size_in_bytes {
            return Err(GraphicsError::InvalidArgument(format!(
                "write of {} bytes at {} exceeds buffer of {} bytes",
                data.len(),
                offset,
                self.size_in_bytes
            ))
            .into());
        }

        unsafe {
            let mut mapped: *mut c_void = std::ptr::null_mut();
            self.resource
                .Map(0, None, Some(&mut mapped))
                .map_err(win_error(GraphicsError::ResourceCreation, "Failed to map vertex buffer"))?;
            std::ptr::copy_nonoverlapping(
                data.as_ptr(),
                (mapped as *mut u8).add(offset as usize),
                data.len(),
            );
            self.resource.Unmap(0, None);
        }
        Ok(())
    }
}

/// D3D12 设备
#[derive(Clone)]
pub struct Dx12Device {
    device: ID3D12Device,
}

impl Dx12Device {
    pub fn new(device: ID3D12Device) -> Self {
        Self { device }
    }

    pub fn raw(&self) -> &ID3D12Device {
        &self.device
    }
}

impl GraphicsDevice for Dx12Device {
    type SerializedBlob = ID3DBlob;
    type RootSignature = ID3D12RootSignature;
    type Buffer = UploadBuffer;
    type PipelineState = ID3D12PipelineState;

    fn serialize_root_signature(&self, desc: &RootSignatureDesc) -> Result<ID3DBlob> {
        let flags = if desc.allow_input_assembler_input_layout {
            D3D12_ROOT_SIGNATURE_FLAG_ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT
        } else {
            D3D12_ROOT_SIGNATURE_FLAG_NONE
        };
        let root_desc = D3D12_ROOT_SIGNATURE_DESC { Flags: flags, ..Default::default() };

        let mut signature: Option<ID3DBlob> = None;
        let mut error: Option<ID3DBlob> = None;
        let result = unsafe {
            D3D12SerializeRootSignature(
                &root_desc,
                D3D_ROOT_SIGNATURE_VERSION_1,
                &mut signature,
                Some(&mut error),
            )
        };
        if let Err(e) = result {
            let detail = error
                .as_ref()
                .map(|blob| blob_text(blob.as_bytes()))
                .unwrap_or_else(|| e.to_string());
            return Err(GraphicsError::RootSignatureCreation(detail).into());
        }

        signature.ok_or_else(|| {
            GraphicsError::RootSignatureCreation("serializer returned no blob".to_string()).into()
        })
    }

    fn create_root_signature(&self, serialized: &[u8]) -> Result<ID3D12RootSignature> {
        let root_signature = unsafe { self.device.CreateRootSignature(0, serialized) }.map_err(
            win_error(GraphicsError::RootSignatureCreation, "Failed to create root signature"),
        )?;
        Ok(root_signature)
    }

    fn create_upload_buffer(&self, size_in_bytes: u64) -> Result<UploadBuffer> {
        // CPU 可写的堆
        let heap_props = D3D12_HEAP_PROPERTIES {
            Type: D3D12_HEAP_TYPE_UPLOAD,
            ..Default::default()
        };
        // 缓冲区的高度、深度、mip 固定为 1，布局为行主序
        let resource_desc = D3D12_RESOURCE_DESC {
            Dimension: D3D12_RESOURCE_DIMENSION_BUFFER,
            Width: size_in_bytes,
            Height: 1,
            DepthOrArraySize: 1,
            MipLevels: 1,
            SampleDesc: DXGI_SAMPLE_DESC { Count: 1, Quality: 0 },
            Layout: D3D12_TEXTURE_LAYOUT_ROW_MAJOR,
            ..Default::default()
        };

        let mut resource: Option<ID3D12Resource> = None;
        unsafe {
            self.device.CreateCommittedResource(
                &heap_props,
                D3D12_HEAP_FLAG_NONE,
                &resource_desc,
                D3D12_RESOURCE_STATE_GENERIC_READ,
                None,
                &mut resource,
            )
        }
        .map_err(win_error(GraphicsError::ResourceCreation, "Failed to create upload buffer"))?;

        let resource = resource.ok_or_else(|| {
            GraphicsError::ResourceCreation("device returned no resource".to_string())
        })?;
        debug!(size_in_bytes, "Upload buffer created");
        Ok(UploadBuffer { resource, size_in_bytes })
    }

    fn create_graphics_pipeline(
        &self,
        desc: &PipelineStateDesc<'_, ID3D12RootSignature>,
    ) -> Result<ID3D12PipelineState> {
        let input_elements: Vec<D3D12_INPUT_ELEMENT_DESC> = desc
            .input_layout
            .iter()
            .map(|element| D3D12_INPUT_ELEMENT_DESC {
                SemanticName: PCSTR(element.semantic_name.as_ptr() as *const u8),
                SemanticIndex: element.semantic_index,
                Format: dxgi_format(element.format),
                InputSlot: 0,
                AlignedByteOffset: element
                    .aligned_byte_offset
                    .unwrap_or(D3D12_APPEND_ALIGNED_ELEMENT),
                InputSlotClass: D3D12_INPUT_CLASSIFICATION_PER_VERTEX_DATA,
                InstanceDataStepRate: 0,
            })
            .collect();

        let mut pso_desc = D3D12_GRAPHICS_PIPELINE_STATE_DESC {
            // 只借用根签名，不增加引用计数
            pRootSignature: unsafe { std::mem::transmute_copy(desc.root_signature) },
            VS: shader_bytecode(desc.vertex_shader),
            PS: shader_bytecode(desc.pixel_shader),
            InputLayout: D3D12_INPUT_LAYOUT_DESC {
                pInputElementDescs: input_elements.as_ptr(),
                NumElements: input_elements.len() as u32,
            },
            RasterizerState: D3D12_RASTERIZER_DESC {
                FillMode: fill_mode(desc.rasterizer.fill_mode),
                CullMode: cull_mode(desc.rasterizer.cull_mode),
                ..Default::default()
            },
            DepthStencilState: D3D12_DEPTH_STENCIL_DESC {
                DepthEnable: desc.depth_stencil.depth_enable.into(),
                StencilEnable: desc.depth_stencil.stencil_enable.into(),
                ..Default::default()
            },
            SampleMask: desc.sample_mask,
            PrimitiveTopologyType: D3D12_PRIMITIVE_TOPOLOGY_TYPE_TRIANGLE,
            NumRenderTargets: 1,
            SampleDesc: DXGI_SAMPLE_DESC { Count: desc.sample_count, Quality: 0 },
            ..Default::default()
        };
        if desc.blend.write_all_channels {
            pso_desc.BlendState.RenderTarget[0].RenderTargetWriteMask =
                D3D12_COLOR_WRITE_ENABLE_ALL.0 as u8;
        }
        pso_desc.RTVFormats[0] = dxgi_format(desc.render_target_format);

        let pipeline_state = unsafe { self.device.CreateGraphicsPipelineState(&pso_desc) }
            .map_err(win_error(GraphicsError::PipelineCreation, "Failed to create PSO"))?;
        Ok(pipeline_state)
    }
}
