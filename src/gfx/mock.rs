//! 测试用的设备、编译器和命令记录器
//!
//! 每个 mock 句柄在创建和 drop 时都会通知一个 [`ReleaseTracker`]，
//! 测试通过它检查“恰好释放一次”“同一时刻最多一个存活句柄”等性质。

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::compile::TargetProfile;
use super::device::{Bytecode, CommandRecorder, GpuBuffer, GraphicsDevice, ShaderCompiler};
use super::types::{
    Format, PipelineStateDesc, PrimitiveTopology, RasterizerState, RootSignatureDesc, ScissorRect,
    VertexBufferView, Viewport,
};
use crate::core::error::{GraphicsError, Result};

/// 记录句柄的创建与释放次数
#[derive(Debug, Default)]
pub struct ReleaseTracker {
    created: Cell<u32>,
    released: Cell<u32>,
    max_live: Cell<u32>,
}

impl ReleaseTracker {
    pub fn created(&self) -> u32 {
        self.created.get()
    }

    pub fn released(&self) -> u32 {
        self.released.get()
    }

    pub fn live(&self) -> u32 {
        self.created.get() - self.released.get()
    }

    pub fn max_live(&self) -> u32 {
        self.max_live.get()
    }
}

/// 被跟踪的句柄，drop 即释放
#[derive(Debug)]
pub struct MockHandle {
    pub id: u32,
    tracker: Rc<ReleaseTracker>,
}

impl MockHandle {
    pub fn new(tracker: &Rc<ReleaseTracker>) -> Self {
        tracker.created.set(tracker.created.get() + 1);
        let live = tracker.live();
        if live > tracker.max_live.get() {
            tracker.max_live.set(live);
        }
        Self { id: tracker.created.get(), tracker: Rc::clone(tracker) }
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        self.tracker.released.set(self.tracker.released.get() + 1);
    }
}

#[derive(Debug)]
pub struct MockBlob {
    pub handle: MockHandle,
    pub bytes: Vec<u8>,
}

impl Bytecode for MockBlob {
    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[derive(Debug)]
pub struct MockBuffer {
    pub handle: MockHandle,
    pub address: u64,
    pub data: RefCell<Vec<u8>>,
}

impl GpuBuffer for MockBuffer {
    fn size_in_bytes(&self) -> u64 {
        self.data.borrow().len() as u64
    }

    fn gpu_virtual_address(&self) -> u64 {
        self.address
    }

    fn write_bytes(&self, offset: u64, data: &[u8]) -> Result<()> {
        let mut storage = self.data.borrow_mut();
        let start = offset as usize;
        let end = start + data.len();
        if end > storage.len() {
            return Err(GraphicsError::InvalidArgument(format!(
                "write of {} bytes at {} exceeds buffer of {} bytes",
                data.len(),
                offset,
                storage.len()
            ))
            .into());
        }
        storage[start..end].copy_from_slice(data);
        Ok(())
    }
}

/// 管线创建时收到的描述快照
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSnapshot {
    pub root_signature_id: u32,
    pub vertex_shader: Vec<u8>,
    pub pixel_shader: Vec<u8>,
    pub input_semantics: Vec<String>,
    pub render_target_format: Format,
    pub sample_mask: u32,
    pub rasterizer: RasterizerState,
}

/// 可注入失败的设备
#[derive(Debug, Default)]
pub struct MockDevice {
    pub blobs: Rc<ReleaseTracker>,
    pub root_signatures: Rc<ReleaseTracker>,
    pub buffers: Rc<ReleaseTracker>,
    pub pipelines: Rc<ReleaseTracker>,
    pub fail_serialize: Cell<bool>,
    pub fail_root_signature: Cell<bool>,
    pub fail_buffer: Cell<bool>,
    pub fail_pipeline: Cell<bool>,
    pub serialized_descs: RefCell<Vec<RootSignatureDesc>>,
    pub pipeline_snapshots: RefCell<Vec<PipelineSnapshot>>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }
}

const MOCK_BASE_ADDRESS: u64 = 0x1_0000_0000;

impl GraphicsDevice for MockDevice {
    type SerializedBlob = MockBlob;
    type RootSignature = MockHandle;
    type Buffer = MockBuffer;
    type PipelineState = MockHandle;

    fn serialize_root_signature(&self, desc: &RootSignatureDesc) -> Result<MockBlob> {
        if self.fail_serialize.get() {
            return Err(GraphicsError::RootSignatureCreation("serializer rejected descriptor".into()).into());
        }
        self.serialized_descs.borrow_mut().push(*desc);
        Ok(MockBlob { handle: MockHandle::new(&self.blobs), bytes: vec![0x44, 0x58, 0x42, 0x43] })
    }

    fn create_root_signature(&self, serialized: &[u8]) -> Result<MockHandle> {
        if self.fail_root_signature.get() || serialized.is_empty() {
            return Err(GraphicsError::RootSignatureCreation("E_INVALIDARG".into()).into());
        }
        Ok(MockHandle::new(&self.root_signatures))
    }

    fn create_upload_buffer(&self, size_in_bytes: u64) -> Result<MockBuffer> {
        if self.fail_buffer.get() {
            return Err(GraphicsError::ResourceCreation("E_OUTOFMEMORY".into()).into());
        }
        let handle = MockHandle::new(&self.buffers);
        let address = MOCK_BASE_ADDRESS * handle.id as u64;
        Ok(MockBuffer { handle, address, data: RefCell::new(vec![0; size_in_bytes as usize]) })
    }

    fn create_graphics_pipeline(
        &self,
        desc: &PipelineStateDesc<'_, MockHandle>,
    ) -> Result<MockHandle> {
        if self.fail_pipeline.get() {
            return Err(GraphicsError::PipelineCreation("E_INVALIDARG".into()).into());
        }
        self.pipeline_snapshots.borrow_mut().push(PipelineSnapshot {
            root_signature_id: desc.root_signature.id,
            vertex_shader: desc.vertex_shader.to_vec(),
            pixel_shader: desc.pixel_shader.to_vec(),
            input_semantics: desc
                .input_layout
                .iter()
                .map(|e| e.semantic_name.to_string_lossy().into_owned())
                .collect(),
            render_target_format: desc.render_target_format,
            sample_mask: desc.sample_mask,
            rasterizer: desc.rasterizer,
        });
        Ok(MockHandle::new(&self.pipelines))
    }
}

/// 可注入失败的编译器
///
/// `modern` 为 true 时模拟 DXC（只接受 6.0+），否则模拟 FXC。
#[derive(Debug)]
pub struct MockCompiler {
    pub modern: bool,
    pub blobs: Rc<ReleaseTracker>,
    pub diagnostics: RefCell<Option<String>>,
    pub fail: Cell<bool>,
    pub calls: RefCell<Vec<(PathBuf, String, String)>>,
}

impl MockCompiler {
    pub fn legacy() -> Self {
        Self::with_kind(false)
    }

    pub fn modern() -> Self {
        Self::with_kind(true)
    }

    fn with_kind(modern: bool) -> Self {
        Self {
            modern,
            blobs: Rc::default(),
            diagnostics: RefCell::new(None),
            fail: Cell::new(false),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl ShaderCompiler for MockCompiler {
    type Blob = MockBlob;

    fn backend_name(&self) -> &'static str {
        if self.modern { "MockDXC" } else { "MockFXC" }
    }

    fn supports(&self, profile: &TargetProfile) -> bool {
        profile.requires_dxc() == self.modern
    }

    fn compile_file(&self, path: &Path, entry_point: &str, profile: &TargetProfile) -> Result<MockBlob> {
        self.calls
            .borrow_mut()
            .push((path.to_path_buf(), entry_point.to_string(), profile.to_string()));

        if self.fail.get() {
            return Err(GraphicsError::ShaderCompilation {
                path: path.to_path_buf(),
                message: "error X3000: syntax error".into(),
            }
            .into());
        }
        if let Some(text) = self.diagnostics.borrow().as_deref() {
            super::compile::check_diagnostics(path, text)?;
        }

        let bytes = format!("{}:{}", self.backend_name(), profile).into_bytes();
        Ok(MockBlob { handle: MockHandle::new(&self.blobs), bytes })
    }
}

/// 记录下来的一条命令
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    Viewport(Viewport),
    Scissor(ScissorRect),
    RootSignature(u32),
    PipelineState(u32),
    VertexBuffer(u32, VertexBufferView),
    Topology(PrimitiveTopology),
    DrawInstanced(u32, u32, u32, u32),
}

#[derive(Debug, Default)]
pub struct MockRecorder {
    pub commands: Vec<RecordedCommand>,
}

impl CommandRecorder<MockDevice> for MockRecorder {
    fn set_viewport(&mut self, viewport: &Viewport) {
        self.commands.push(RecordedCommand::Viewport(*viewport));
    }

    fn set_scissor_rect(&mut self, rect: &ScissorRect) {
        self.commands.push(RecordedCommand::Scissor(*rect));
    }

    fn set_root_signature(&mut self, root_signature: &MockHandle) {
        self.commands.push(RecordedCommand::RootSignature(root_signature.id));
    }

    fn set_pipeline_state(&mut self, pipeline: &MockHandle) {
        self.commands.push(RecordedCommand::PipelineState(pipeline.id));
    }

    fn set_vertex_buffer(&mut self, slot: u32, view: &VertexBufferView) {
        self.commands.push(RecordedCommand::VertexBuffer(slot, *view));
    }

    fn set_primitive_topology(&mut self, topology: PrimitiveTopology) {
        self.commands.push(RecordedCommand::Topology(topology));
    }

    fn draw_instanced(&mut self, vertex_count: u32, instance_count: u32, start_vertex: u32, start_instance: u32) {
        self.commands.push(RecordedCommand::DrawInstanced(
            vertex_count,
            instance_count,
            start_vertex,
            start_instance,
        ));
    }
}
