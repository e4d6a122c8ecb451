//! DxTriangle - 最小的 Direct3D 12 启动程序
//!
//! 创建根签名、编译两个着色器、在上传堆上建立顶点缓冲区，
//! 然后每帧绘制一个三角形。
//!
//! # 模块结构
//!
//! - `core`: 日志、配置、错误处理
//! - `gfx`: 设备/编译器/命令记录器接口，以及 DirectX 12 实现
//! - `renderer`: 根签名、着色器、顶点缓冲区、管线等资源组件
//!
//! # 使用示例
//!
//! ```no_run
//! use dx_triangle::core::Config;
//!
//! let mut config = Config::from_file_or_default("config.toml");
//! config.apply_args(std::env::args());
//! config.validate().expect("invalid configuration");
//! ```

pub mod core;
pub mod gfx;
pub mod renderer;
