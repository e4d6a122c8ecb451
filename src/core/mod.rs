//! 核心功能模块
//!
//! - `log`: 基于 tracing 的日志系统和调试输出通道
//! - `config`: 配置文件（TOML）与命令行覆盖
//! - `error`: 统一的错误类型

pub mod log;
pub mod config;
pub mod error;

pub use error::{Result, BootstrapError, OrFatal};
pub use config::Config;
