//! 与图形 API 无关的描述类型
//!
//! 这些类型在 `GraphicsDevice` / `CommandRecorder` 接口上传递，
//! DX12 后端把它们转换成对应的 `D3D12_*` 结构体。

use std::ffi::CStr;

/// 根签名描述
///
/// 只覆盖本项目需要的部分：标志位，没有根参数和静态采样器。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootSignatureDesc {
    /// 允许使用输入装配器的顶点输入布局
    pub allow_input_assembler_input_layout: bool,
}

impl RootSignatureDesc {
    /// 固定的描述：只允许输入布局，版本 1.0
    pub const fn input_assembler() -> Self {
        Self { allow_input_assembler_input_layout: true }
    }
}

/// 顶点缓冲区视图
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VertexBufferView {
    /// 缓冲区的 GPU 虚拟地址
    pub buffer_location: u64,
    /// 视图覆盖的字节数
    pub size_in_bytes: u32,
    /// 单个顶点的字节数
    pub stride_in_bytes: u32,
}

/// 视口
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub top_left_x: f32,
    pub top_left_y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// 覆盖整个渲染目标、深度范围 0..1
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            top_left_x: 0.0,
            top_left_y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// 裁剪矩形
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScissorRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ScissorRect {
    pub fn full(width: u32, height: u32) -> Self {
        Self { left: 0, top: 0, right: width as i32, bottom: height as i32 }
    }
}

/// 图元拓扑（绘制时设置）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    TriangleList,
}

/// 图元拓扑类型（管线状态中设置）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopologyType {
    Triangle,
}

/// 像素/顶点格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    R32G32B32A32Float,
    R8G8B8A8Unorm,
    R8G8B8A8UnormSrgb,
}

/// 输入布局中的一个元素
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputElement {
    pub semantic_name: &'static CStr,
    pub semantic_index: u32,
    pub format: Format,
    /// `None` 表示紧接上一个元素（APPEND_ALIGNED_ELEMENT）
    pub aligned_byte_offset: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillMode {
    Solid,
}

/// 光栅化状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterizerState {
    pub cull_mode: CullMode,
    pub fill_mode: FillMode,
}

/// 混合状态（只有第 0 个渲染目标）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendState {
    /// 是否写入全部颜色通道
    pub write_all_channels: bool,
}

/// 深度模板状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthStencilState {
    pub depth_enable: bool,
    pub stencil_enable: bool,
}

/// 图形管线状态描述
///
/// `R` 是后端的根签名句柄类型；描述只借用根签名和着色器字节码，
/// 生命周期不超过一次 `create_graphics_pipeline` 调用。
#[derive(Debug, Clone, Copy)]
pub struct PipelineStateDesc<'a, R> {
    pub root_signature: &'a R,
    pub vertex_shader: &'a [u8],
    pub pixel_shader: &'a [u8],
    pub input_layout: &'a [InputElement],
    pub blend: BlendState,
    pub rasterizer: RasterizerState,
    pub depth_stencil: DepthStencilState,
    pub render_target_format: Format,
    pub primitive_topology: PrimitiveTopologyType,
    pub sample_count: u32,
    pub sample_mask: u32,
}
