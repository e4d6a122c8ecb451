//! 错误处理模块
//!
//! 定义了引擎中使用的统一错误类型。
//!
//! 资源组件（根签名、着色器、顶点缓冲区）在失败时只返回错误，从不终止进程；
//! 是否把失败视为致命由调用方决定，见 [`OrFatal`]。
//!
//! # 错误分类
//!
//! - 原生调用失败：设备或编译器返回失败状态
//! - 诊断信息非空：DXC 输出了非空的错误/警告文本（即使调用本身成功）

use std::fmt;
use std::path::PathBuf;

/// 引擎统一的 Result 类型
pub type Result<T> = std::result::Result<T, BootstrapError>;

/// DxTriangle 的错误类型
#[derive(Debug)]
pub enum BootstrapError {
    /// 配置错误
    Config(ConfigError),

    /// 图形 API 错误
    Graphics(GraphicsError),

    /// IO 错误
    Io(std::io::Error),

    /// 初始化错误
    Initialization(String),

    /// 运行时错误
    Runtime(String),
}

/// 配置相关的错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件未找到
    FileNotFound(String),

    /// 配置文件解析失败
    ParseError(String),

    /// 配置值无效
    InvalidValue { field: String, reason: String },
}

/// 图形 API 相关的错误
#[derive(Debug)]
pub enum GraphicsError {
    /// 设备创建失败
    DeviceCreation(String),

    /// 根签名序列化或创建失败
    RootSignatureCreation(String),

    /// 缓冲区等资源创建失败
    ResourceCreation(String),

    /// 管线状态对象创建失败
    PipelineCreation(String),

    /// 着色器编译失败（编译器返回失败状态）
    ShaderCompilation { path: PathBuf, message: String },

    /// 编译器输出了非空诊断信息
    ShaderDiagnostics { path: PathBuf, diagnostics: String },

    /// 参数无效，在调用设备之前就被拒绝
    InvalidArgument(String),

    /// 渲染命令执行失败
    CommandExecution(String),
}

impl GraphicsError {
    /// 是否属于“诊断信息非空”一类
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, GraphicsError::ShaderDiagnostics { .. })
    }
}

impl BootstrapError {
    /// 若是图形错误则返回其引用
    pub fn as_graphics(&self) -> Option<&GraphicsError> {
        match self {
            BootstrapError::Graphics(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapError::Config(e) => write!(f, "Configuration error: {}", e),
            BootstrapError::Graphics(e) => write!(f, "Graphics error: {}", e),
            BootstrapError::Io(e) => write!(f, "IO error: {}", e),
            BootstrapError::Initialization(msg) => write!(f, "Initialization error: {}", msg),
            BootstrapError::Runtime(msg) => write!(f, "Runtime error: {}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphicsError::DeviceCreation(msg) => write!(f, "Device creation failed: {}", msg),
            GraphicsError::RootSignatureCreation(msg) => {
                write!(f, "Root signature creation failed: {}", msg)
            }
            GraphicsError::ResourceCreation(msg) => write!(f, "Resource creation failed: {}", msg),
            GraphicsError::PipelineCreation(msg) => write!(f, "Pipeline creation failed: {}", msg),
            GraphicsError::ShaderCompilation { path, message } => {
                write!(f, "Shader compilation failed for {}: {}", path.display(), message)
            }
            GraphicsError::ShaderDiagnostics { path, diagnostics } => {
                write!(f, "Shader compiler reported diagnostics for {}:\n{}", path.display(), diagnostics)
            }
            GraphicsError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            GraphicsError::CommandExecution(msg) => write!(f, "Command execution failed: {}", msg),
        }
    }
}

impl std::error::Error for BootstrapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BootstrapError::Io(e) => Some(e),
            BootstrapError::Config(e) => Some(e),
            BootstrapError::Graphics(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for GraphicsError {}

impl From<std::io::Error> for BootstrapError {
    fn from(err: std::io::Error) -> Self {
        BootstrapError::Io(err)
    }
}

impl From<ConfigError> for BootstrapError {
    fn from(err: ConfigError) -> Self {
        BootstrapError::Config(err)
    }
}

impl From<GraphicsError> for BootstrapError {
    fn from(err: GraphicsError) -> Self {
        BootstrapError::Graphics(err)
    }
}

/// 致命失败策略
///
/// 启动期资源（根签名、着色器、顶点缓冲区）失败后程序无法继续。
/// 组件在返回错误之前已经把它写入调试输出通道，`or_fatal` 只负责带上下文 panic；
/// 组件本身只返回 `Result`，由宿主决定是否走这条路径。
///
/// # 示例
///
/// ```no_run
/// use dx_triangle::core::error::{OrFatal, Result};
///
/// fn create() -> Result<u32> { Ok(1) }
///
/// let value = create().or_fatal("Failed to create root signature");
/// ```
pub trait OrFatal<T> {
    /// 成功时返回值，失败时终止
    fn or_fatal(self, context: &str) -> T;
}

impl<T, E: fmt::Display> OrFatal<T> for std::result::Result<T, E> {
    #[track_caller]
    fn or_fatal(self, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(e) => panic!("{}: {}", context, e),
        }
    }
}
