//! 图形抽象层
//!
//! 资源组件只依赖 `device` 中的 trait；具体实现有两个：
//! Windows 上的 DirectX 12 后端，以及测试用的 mock。

pub mod compile;
pub mod device;
pub mod types;

#[cfg(target_os = "windows")]
pub mod dx12;

#[cfg(test)]
pub(crate) mod mock;

pub use device::{CommandRecorder, GraphicsDevice, ShaderCompiler};
