//! 设备提供者、着色器编译器、命令记录器的统一抽象接口
//!
//! 资源组件（`renderer` 模块）只依赖这里的 trait，
//! DX12 后端和测试用的 mock 分别实现它们。
//!
//! 所有句柄类型都是“拥有型”的：drop 时释放底层资源且只释放一次。
//! `windows` crate 的 COM 包装类型天然满足这一点。

use std::path::Path;

use super::compile::TargetProfile;
use super::types::{
    PipelineStateDesc, PrimitiveTopology, RootSignatureDesc, ScissorRect, VertexBufferView,
    Viewport,
};
use crate::core::error::Result;

/// 一段二进制数据（序列化后的根签名、编译后的着色器）
pub trait Bytecode {
    fn as_bytes(&self) -> &[u8];
}

impl Bytecode for Vec<u8> {
    fn as_bytes(&self) -> &[u8] {
        self
    }
}

/// CPU 可写的 GPU 缓冲区
pub trait GpuBuffer {
    /// 缓冲区大小（字节）
    fn size_in_bytes(&self) -> u64;

    /// GPU 虚拟地址
    fn gpu_virtual_address(&self) -> u64;

    /// 映射、拷贝、解除映射
    ///
    /// `offset + data.len()` 超出缓冲区时返回错误。
    fn write_bytes(&self, offset: u64, data: &[u8]) -> Result<()>;
}

/// 设备提供者
///
/// 提供当前图形设备的资源创建能力。设备只在单次调用期间被借用，
/// 组件不会保存对设备的引用。
pub trait GraphicsDevice {
    /// 序列化后的根签名（中间产物）
    type SerializedBlob: Bytecode;
    /// 根签名句柄
    type RootSignature;
    /// 上传堆缓冲区
    type Buffer: GpuBuffer;
    /// 管线状态对象
    type PipelineState;

    /// 把根签名描述序列化为二进制形式
    fn serialize_root_signature(&self, desc: &RootSignatureDesc) -> Result<Self::SerializedBlob>;

    /// 由序列化数据创建根签名
    fn create_root_signature(&self, serialized: &[u8]) -> Result<Self::RootSignature>;

    /// 在上传堆上创建一个线性缓冲区
    fn create_upload_buffer(&self, size_in_bytes: u64) -> Result<Self::Buffer>;

    /// 创建图形管线状态对象
    fn create_graphics_pipeline(
        &self,
        desc: &PipelineStateDesc<'_, Self::RootSignature>,
    ) -> Result<Self::PipelineState>;
}

/// 着色器编译器后端
///
/// 旧版（FXC）和新版（DXC）各实现一次。
/// 编译器上下文由宿主创建一次，以引用传给每次加载。
pub trait ShaderCompiler {
    type Blob: Bytecode;

    /// 后端名称，用于日志
    fn backend_name(&self) -> &'static str;

    /// 是否能编译该目标配置
    fn supports(&self, profile: &TargetProfile) -> bool;

    /// 编译一个 HLSL 文件
    fn compile_file(
        &self,
        path: &Path,
        entry_point: &str,
        profile: &TargetProfile,
    ) -> Result<Self::Blob>;
}

/// 命令记录器
///
/// 接收每帧的绘制命令。资源组件只提供句柄，不产生命令。
pub trait CommandRecorder<D: GraphicsDevice> {
    fn set_viewport(&mut self, viewport: &Viewport);
    fn set_scissor_rect(&mut self, rect: &ScissorRect);
    fn set_root_signature(&mut self, root_signature: &D::RootSignature);
    fn set_pipeline_state(&mut self, pipeline: &D::PipelineState);
    fn set_vertex_buffer(&mut self, slot: u32, view: &VertexBufferView);
    fn set_primitive_topology(&mut self, topology: PrimitiveTopology);
    fn draw_instanced(
        &mut self,
        vertex_count: u32,
        instance_count: u32,
        start_vertex: u32,
        start_instance: u32,
    );
}
