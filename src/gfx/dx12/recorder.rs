//! 把记录器接口转发到 `ID3D12GraphicsCommandList`

use windows::Win32::Foundation::RECT;
use windows::Win32::Graphics::Direct3D::D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST;
use windows::Win32::Graphics::Direct3D12::*;

use super::device::Dx12Device;
use crate::gfx::device::CommandRecorder;
use crate::gfx::types::{PrimitiveTopology, ScissorRect, VertexBufferView, Viewport};

/// 借用处于记录状态的命令列表，生命周期限定在一帧之内
pub struct Dx12Recorder<'a> {
    list: &'a ID3D12GraphicsCommandList,
}

impl<'a> Dx12Recorder<'a> {
    pub(crate) fn new(list: &'a ID3D12GraphicsCommandList) -> Self {
        Self { list }
    }
}

impl CommandRecorder<Dx12Device> for Dx12Recorder<'_> {
    fn set_viewport(&mut self, viewport: &Viewport) {
        let viewport = D3D12_VIEWPORT {
            TopLeftX: viewport.top_left_x,
            TopLeftY: viewport.top_left_y,
            Width: viewport.width,
            Height: viewport.height,
            MinDepth: viewport.min_depth,
            MaxDepth: viewport.max_depth,
        };
        unsafe { self.list.RSSetViewports(&[viewport]) };
    }

    fn set_scissor_rect(&mut self, rect: &ScissorRect) {
        let rect = RECT { left: rect.left, top: rect.top, right: rect.right, bottom: rect.bottom };
        unsafe { self.list.RSSetScissorRects(&[rect]) };
    }

    fn set_root_signature(&mut self, root_signature: &ID3D12RootSignature) {
        unsafe { self.list.SetGraphicsRootSignature(root_signature) };
    }

    fn set_pipeline_state(&mut self, pipeline: &ID3D12PipelineState) {
        unsafe { self.list.SetPipelineState(pipeline) };
    }

    fn set_vertex_buffer(&mut self, slot: u32, view: &VertexBufferView) {
        let view = D3D12_VERTEX_BUFFER_VIEW {
            BufferLocation: view.buffer_location,
            SizeInBytes: view.size_in_bytes,
            StrideInBytes: view.stride_in_bytes,
        };
        unsafe { self.list.IASetVertexBuffers(slot, Some(&[view])) };
    }

    fn set_primitive_topology(&mut self, topology: PrimitiveTopology) {
        let topology = match topology {
            PrimitiveTopology::TriangleList => D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST,
        };
        unsafe { self.list.IASetPrimitiveTopology(topology) };
    }

    fn draw_instanced(&mut self, vertex_count: u32, instance_count: u32, start_vertex: u32, start_instance: u32) {
        unsafe {
            self.list
                .DrawInstanced(vertex_count, instance_count, start_vertex, start_instance)
        };
    }
}
