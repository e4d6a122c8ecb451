//! 顶点数据定义
//!
//! - 使用 `#[repr(C)]` 确保内存布局与 HLSL 输入布局一致
//! - 实现 `Pod` 和 `Zeroable` trait 以支持零拷贝写入上传堆

use bytemuck::{Pod, Zeroable};

use crate::gfx::types::{Format, InputElement};

/// 顶点结构体
///
/// 只有一个齐次坐标位置，对应输入布局中的 `POSITION`（`R32G32B32A32_FLOAT`）。
/// 总大小：16 字节
#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 4],
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { position: [x, y, z, 1.0] }
    }
}

/// 与 [`Vertex`] 对应的输入布局
pub const VERTEX_INPUT_LAYOUT: [InputElement; 1] = [InputElement {
    semantic_name: c"POSITION",
    semantic_index: 0,
    format: Format::R32G32B32A32Float,
    aligned_byte_offset: None,
}];

/// 默认三角形：左下、上、右下
pub fn triangle_vertices() -> [Vertex; 3] {
    [
        Vertex::new(-0.5, -0.5, 0.0), // 左下
        Vertex::new(0.0, 0.5, 0.0),   // 上
        Vertex::new(0.5, -0.5, 0.0),  // 右下
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_size() {
        assert_eq!(std::mem::size_of::<Vertex>(), 16);
        assert_eq!(std::mem::size_of_val(&triangle_vertices()), 48);
    }

    #[test]
    fn test_triangle_is_homogeneous() {
        let vertices = triangle_vertices();
        assert!(vertices.iter().all(|v| v.position[3] == 1.0 && v.position[2] == 0.0));
        assert_eq!(vertices[1].position, [0.0, 0.5, 0.0, 1.0]);
    }

    #[test]
    fn test_vertex_bytes() {
        let vertex = Vertex::new(1.0, 2.0, 3.0);
        let bytes: &[u8] = bytemuck::bytes_of(&vertex);
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[12..16], &1.0f32.to_ne_bytes());
    }
}
