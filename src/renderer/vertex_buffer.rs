//! 顶点缓冲区
//!
//! 在上传堆上创建指定大小的线性缓冲区，并由它派生顶点缓冲区视图。
//! `create` 本身不上传任何数据；写入顶点数据由调用方通过 [`VertexBuffer::write`]
//! （映射、拷贝、解除映射）完成。

use bytemuck::Pod;
use tracing::debug;

use crate::core::error::{GraphicsError, Result};
use crate::core::log;
use crate::gfx::device::{GpuBuffer, GraphicsDevice};
use crate::gfx::types::VertexBufferView;

/// 顶点缓冲区资源
///
/// 持有缓冲区句柄和视图描述（GPU 地址、大小、步长）。
pub struct VertexBuffer<D: GraphicsDevice> {
    vertex_buffer: Option<D::Buffer>,
    vertex_buffer_view: VertexBufferView,
}

impl<D: GraphicsDevice> VertexBuffer<D> {
    pub fn new() -> Self {
        Self {
            vertex_buffer: None,
            vertex_buffer_view: VertexBufferView::default(),
        }
    }

    /// 创建顶点缓冲区
    ///
    /// # 参数
    ///
    /// * `device` - 设备提供者
    /// * `size_in_bytes` - 缓冲区大小（字节），视图的大小与之相同
    /// * `stride_in_bytes` - 单个顶点的大小（字节）
    ///
    /// # 错误
    ///
    /// 大小或步长为 0、步长大于大小时，在调用设备之前返回 `InvalidArgument`；
    /// 设备创建失败时返回 `ResourceCreation`。
    pub fn create(&mut self, device: &D, size_in_bytes: u32, stride_in_bytes: u32) -> Result<()> {
        if size_in_bytes == 0 || stride_in_bytes == 0 || stride_in_bytes > size_in_bytes {
            let err = GraphicsError::InvalidArgument(format!(
                "vertex buffer size {} / stride {} is not a valid layout",
                size_in_bytes, stride_in_bytes
            ));
            return Err(log::report(err).into());
        }

        self.vertex_buffer = None;
        self.vertex_buffer_view = VertexBufferView::default();

        let buffer = device
            .create_upload_buffer(u64::from(size_in_bytes))
            .map_err(log::report)?;

        // 从缓冲区开头开始使用，大小为整个缓冲区
        self.vertex_buffer_view = VertexBufferView {
            buffer_location: buffer.gpu_virtual_address(),
            size_in_bytes,
            stride_in_bytes,
        };
        self.vertex_buffer = Some(buffer);

        debug!(size_in_bytes, stride_in_bytes, "Vertex buffer created");
        Ok(())
    }

    /// 把顶点数据写入缓冲区开头
    pub fn write<T: Pod>(&self, vertices: &[T]) -> Result<()> {
        let buffer = self.vertex_buffer.as_ref().ok_or_else(|| {
            GraphicsError::InvalidArgument("vertex buffer has not been created".to_string())
        })?;
        buffer.write_bytes(0, bytemuck::cast_slice(vertices))
    }

    /// 获取缓冲区句柄，未创建时为 `None`
    pub fn get(&self) -> Option<&D::Buffer> {
        self.vertex_buffer.as_ref()
    }

    /// 获取顶点缓冲区视图，生命周期与本实例相同
    pub fn view(&self) -> &VertexBufferView {
        &self.vertex_buffer_view
    }

    /// 视图能容纳的顶点数
    pub fn vertex_count(&self) -> u32 {
        match self.vertex_buffer_view.stride_in_bytes {
            0 => 0,
            stride => self.vertex_buffer_view.size_in_bytes / stride,
        }
    }
}

impl<D: GraphicsDevice> Default for VertexBuffer<D> {
    fn default() -> Self {
        Self::new()
    }
}
