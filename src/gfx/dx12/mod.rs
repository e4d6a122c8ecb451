//! DirectX 12 后端
//!
//! - `context`: 窗口、命令队列、交换链、RTV 堆、围栏，负责每帧的开始与呈现
//! - `device`: 设备提供者，实现 [`GraphicsDevice`](crate::gfx::device::GraphicsDevice)
//! - `compiler`: FXC 与 DXC 两个着色器编译器后端
//! - `recorder`: 基于命令列表的命令记录器

pub mod compiler;
pub mod context;
pub mod device;
pub mod recorder;

pub use compiler::{DxcToolchain, FxcCompiler};
pub use context::Dx12Context;
pub use device::{Dx12Device, UploadBuffer};
pub use recorder::Dx12Recorder;

use crate::core::error::{BootstrapError, GraphicsError};

/// 把 `windows` 的错误包装成带上下文的图形错误
pub(crate) fn win_error<F>(wrap: F, what: &'static str) -> impl FnOnce(windows::core::Error) -> BootstrapError
where
    F: FnOnce(String) -> GraphicsError,
{
    move |e| BootstrapError::Graphics(wrap(format!("{}: {}", what, e)))
}

/// 读取 blob 中的文本（编译器诊断、序列化错误）
pub(crate) fn blob_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim_end_matches('\0').to_string()
}
