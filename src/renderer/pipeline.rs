//! 图形管线状态对象
//!
//! 把根签名、两个着色器和固定功能状态组合成一个 PSO，
//! 生命周期规则与其他资源组件相同：创建或替换，drop 时释放一次。

use tracing::debug;

use crate::core::error::{GraphicsError, Result};
use crate::core::log;
use crate::gfx::device::GraphicsDevice;
use crate::gfx::types::{
    BlendState, CullMode, DepthStencilState, FillMode, Format, PipelineStateDesc,
    PrimitiveTopologyType, RasterizerState,
};
use crate::renderer::root_signature::RootSignature;
use crate::renderer::vertex::VERTEX_INPUT_LAYOUT;

/// 默认采样掩码
pub const DEFAULT_SAMPLE_MASK: u32 = 0xFFFF_FFFF;

/// 三角形管线的描述
///
/// 写入全部颜色通道、背面剔除、实心填充、关闭深度和模板测试、
/// 一个 sRGB 渲染目标、三角形拓扑。
pub fn triangle_pipeline_desc<'a, R>(
    root_signature: &'a R,
    vertex_shader: &'a [u8],
    pixel_shader: &'a [u8],
) -> PipelineStateDesc<'a, R> {
    PipelineStateDesc {
        root_signature,
        vertex_shader,
        pixel_shader,
        input_layout: &VERTEX_INPUT_LAYOUT,
        blend: BlendState { write_all_channels: true },
        rasterizer: RasterizerState { cull_mode: CullMode::Back, fill_mode: FillMode::Solid },
        depth_stencil: DepthStencilState { depth_enable: false, stencil_enable: false },
        render_target_format: Format::R8G8B8A8UnormSrgb,
        primitive_topology: PrimitiveTopologyType::Triangle,
        sample_count: 1,
        sample_mask: DEFAULT_SAMPLE_MASK,
    }
}

/// 图形管线
pub struct GraphicsPipeline<D: GraphicsDevice> {
    pipeline_state: Option<D::PipelineState>,
}

impl<D: GraphicsDevice> GraphicsPipeline<D> {
    pub fn new() -> Self {
        Self { pipeline_state: None }
    }

    /// 创建三角形管线
    ///
    /// 根签名必须已创建，两个着色器字节码都不能为空。
    pub fn create(
        &mut self,
        device: &D,
        root_signature: &RootSignature<D>,
        vertex_shader: &[u8],
        pixel_shader: &[u8],
    ) -> Result<()> {
        let Some(root_signature) = root_signature.get() else {
            let err = GraphicsError::InvalidArgument("root signature has not been created".into());
            return Err(log::report(err).into());
        };
        if vertex_shader.is_empty() || pixel_shader.is_empty() {
            let err = GraphicsError::InvalidArgument("shader bytecode is empty".into());
            return Err(log::report(err).into());
        }

        self.pipeline_state = None;
        let desc = triangle_pipeline_desc(root_signature, vertex_shader, pixel_shader);
        let pipeline_state = device.create_graphics_pipeline(&desc).map_err(log::report)?;
        self.pipeline_state = Some(pipeline_state);

        debug!(
            vs_bytes = vertex_shader.len(),
            ps_bytes = pixel_shader.len(),
            "Graphics pipeline created"
        );
        Ok(())
    }

    pub fn get(&self) -> Option<&D::PipelineState> {
        self.pipeline_state.as_ref()
    }
}

impl<D: GraphicsDevice> Default for GraphicsPipeline<D> {
    fn default() -> Self {
        Self::new()
    }
}
