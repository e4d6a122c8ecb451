//! 三角形场景
//!
//! 按启动顺序创建根签名、管线和顶点缓冲区，写入三个顶点；
//! 每帧向命令记录器发出固定的命令序列：
//!
//! ```text
//! 视口 -> 裁剪矩形 -> 根签名 -> 管线 -> 顶点缓冲区 -> 拓扑 -> DrawInstanced(3, 1, 0, 0)
//! ```

use crate::core::error::{BootstrapError, Result};
use crate::gfx::device::{CommandRecorder, GraphicsDevice};
use crate::gfx::types::{PrimitiveTopology, ScissorRect, Viewport};
use crate::renderer::pipeline::GraphicsPipeline;
use crate::renderer::root_signature::RootSignature;
use crate::renderer::vertex::{triangle_vertices, Vertex};
use crate::renderer::vertex_buffer::VertexBuffer;

pub struct TriangleScene<D: GraphicsDevice> {
    root_signature: RootSignature<D>,
    pipeline: GraphicsPipeline<D>,
    vertex_buffer: VertexBuffer<D>,
    vertex_count: u32,
}

impl<D: GraphicsDevice> TriangleScene<D> {
    /// 创建场景所需的全部资源
    ///
    /// # 参数
    ///
    /// * `device` - 设备提供者
    /// * `vertex_shader` / `pixel_shader` - 已编译的着色器字节码
    pub fn new(device: &D, vertex_shader: &[u8], pixel_shader: &[u8]) -> Result<Self> {
        let mut root_signature = RootSignature::new();
        root_signature.create(device)?;

        let mut pipeline = GraphicsPipeline::new();
        pipeline.create(device, &root_signature, vertex_shader, pixel_shader)?;

        let vertices = triangle_vertices();
        let mut vertex_buffer = VertexBuffer::new();
        vertex_buffer.create(
            device,
            std::mem::size_of_val(&vertices) as u32,
            std::mem::size_of::<Vertex>() as u32,
        )?;
        vertex_buffer.write(&vertices)?;

        crate::engine_info!(vertices = vertices.len(), "Triangle scene created");

        Ok(Self {
            root_signature,
            pipeline,
            vertex_buffer,
            vertex_count: vertices.len() as u32,
        })
    }

    /// 记录一帧的绘制命令
    pub fn record<R: CommandRecorder<D>>(&self, recorder: &mut R, width: u32, height: u32) -> Result<()> {
        let root_signature = self
            .root_signature
            .get()
            .ok_or_else(|| BootstrapError::Runtime("root signature missing".to_string()))?;
        let pipeline = self
            .pipeline
            .get()
            .ok_or_else(|| BootstrapError::Runtime("pipeline state missing".to_string()))?;

        recorder.set_viewport(&Viewport::full(width, height));
        recorder.set_scissor_rect(&ScissorRect::full(width, height));
        recorder.set_root_signature(root_signature);
        recorder.set_pipeline_state(pipeline);
        recorder.set_vertex_buffer(0, self.vertex_buffer.view());
        recorder.set_primitive_topology(PrimitiveTopology::TriangleList);
        recorder.draw_instanced(self.vertex_count, 1, 0, 0);
        Ok(())
    }

    pub fn vertex_buffer(&self) -> &VertexBuffer<D> {
        &self.vertex_buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::mock::{MockDevice, MockRecorder, RecordedCommand};

    #[test]
    fn test_scene_uploads_triangle() {
        let device = MockDevice::new();
        let scene = TriangleScene::new(&device, b"vs", b"ps").unwrap();

        let view = scene.vertex_buffer().view();
        assert_eq!(view.size_in_bytes, 48);
        assert_eq!(view.stride_in_bytes, 16);

        let data = scene.vertex_buffer().get().unwrap().data.borrow();
        assert_eq!(&data[..], bytemuck::cast_slice::<Vertex, u8>(&triangle_vertices()));
    }

    #[test]
    fn test_record_emits_commands_in_order() {
        let device = MockDevice::new();
        let scene = TriangleScene::new(&device, b"vs", b"ps").unwrap();
        let mut recorder = MockRecorder::default();

        scene.record(&mut recorder, 1280, 720).unwrap();

        let view = *scene.vertex_buffer().view();
        assert_eq!(
            recorder.commands,
            vec![
                RecordedCommand::Viewport(Viewport::full(1280, 720)),
                RecordedCommand::Scissor(ScissorRect { left: 0, top: 0, right: 1280, bottom: 720 }),
                RecordedCommand::RootSignature(1),
                RecordedCommand::PipelineState(1),
                RecordedCommand::VertexBuffer(0, view),
                RecordedCommand::Topology(PrimitiveTopology::TriangleList),
                RecordedCommand::DrawInstanced(3, 1, 0, 0),
            ]
        );
    }

    #[test]
    fn test_scene_failure_releases_partial_resources() {
        let device = MockDevice::new();
        device.fail_buffer.set(true);

        assert!(TriangleScene::new(&device, b"vs", b"ps").is_err());
        assert_eq!(device.root_signatures.live(), 0);
        assert_eq!(device.pipelines.live(), 0);
    }
}
