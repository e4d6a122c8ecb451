//! 配置管理模块
//!
//! 提供配置的加载、解析和管理功能。
//! 支持从 TOML 配置文件加载，也支持命令行参数覆盖。
//!
//! # 配置文件格式 (config.toml)
//!
//! ```toml
//! [window]
//! width = 1280
//! height = 720
//! title = "DxTriangle"
//!
//! [shaders]
//! compiler = "dxc"    # 或 "fxc"
//!
//! [shaders.vertex]
//! path = "shaders/triangle_vs.hlsl"
//! profile = "vs_6_0"
//!
//! [shaders.pixel]
//! path = "shaders/triangle_ps.hlsl"
//! profile = "ps_6_0"
//!
//! [logging]
//! level = "info"      # trace, debug, info, warn, error
//! file_output = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{ConfigError, Result};
use crate::gfx::compile::{ShaderStage, TargetProfile};

/// 引擎配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// 窗口配置
    #[serde(default)]
    pub window: WindowConfig,

    /// 着色器配置
    #[serde(default)]
    pub shaders: ShaderConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 窗口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// 窗口宽度
    #[serde(default = "default_width")]
    pub width: u32,

    /// 窗口高度
    #[serde(default = "default_height")]
    pub height: u32,

    /// 窗口标题
    #[serde(default = "default_title")]
    pub title: String,

    /// 是否可调整大小
    #[serde(default = "default_resizable")]
    pub resizable: bool,

    /// 垂直同步
    #[serde(default = "default_vsync")]
    pub vsync: bool,
}

/// 着色器编译器后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShaderCompilerKind {
    /// 旧版编译器（D3DCompile，着色器模型 5.x 及以下）
    Fxc,
    /// 新版编译器（DXC，着色器模型 6.0+）
    Dxc,
}

/// 单个着色器源文件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShaderSource {
    /// HLSL 文件路径
    pub path: String,
    /// 目标配置，例如 "vs_6_0"
    pub profile: String,
}

/// 着色器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShaderConfig {
    #[serde(default = "default_compiler")]
    pub compiler: ShaderCompilerKind,

    #[serde(default = "default_vertex_shader")]
    pub vertex: ShaderSource,

    #[serde(default = "default_pixel_shader")]
    pub pixel: ShaderSource,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// 是否输出到文件
    #[serde(default = "default_file_output")]
    pub file_output: bool,

    /// 日志文件路径
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

// 默认值函数
fn default_width() -> u32 { 1280 }
fn default_height() -> u32 { 720 }
fn default_title() -> String { "DxTriangle".to_string() }
fn default_resizable() -> bool { true }
fn default_vsync() -> bool { true }
fn default_compiler() -> ShaderCompilerKind { ShaderCompilerKind::Dxc }
fn default_vertex_shader() -> ShaderSource {
    ShaderSource { path: "shaders/triangle_vs.hlsl".to_string(), profile: "vs_6_0".to_string() }
}
fn default_pixel_shader() -> ShaderSource {
    ShaderSource { path: "shaders/triangle_ps.hlsl".to_string(), profile: "ps_6_0".to_string() }
}
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_file_output() -> bool { false }
fn default_log_file() -> String { "dx_triangle.log".to_string() }

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: default_title(),
            resizable: default_resizable(),
            vsync: default_vsync(),
        }
    }
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            compiler: default_compiler(),
            vertex: default_vertex_shader(),
            pixel: default_pixel_shader(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: default_file_output(),
            log_file: default_log_file(),
        }
    }
}

impl Config {
    /// 从配置文件加载
    ///
    /// # 参数
    ///
    /// * `path` - 配置文件路径
    ///
    /// # 返回值
    ///
    /// 成功返回 `Config` 实例，失败返回错误
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let contents = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path_str.clone()))?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// 从配置文件加载，如果文件不存在或无法解析则使用默认配置
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::from_file(path).unwrap_or_default()
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// 从命令行参数覆盖配置
    ///
    /// 支持的参数：
    /// - `--fxc`: 使用旧版编译器，6.x 的目标配置降为 5.0
    /// - `--dxc`: 使用新版编译器
    /// - `--width <value>`: 设置窗口宽度
    /// - `--height <value>`: 设置窗口高度
    pub fn apply_args<I>(&mut self, args: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

        if args.iter().any(|a| a == "--fxc") {
            self.shaders.compiler = ShaderCompilerKind::Fxc;
            for source in [&mut self.shaders.vertex, &mut self.shaders.pixel] {
                if let Ok(profile) = TargetProfile::parse(&source.profile) {
                    if profile.requires_dxc() {
                        source.profile = profile.with_model(5, 0).to_string();
                    }
                }
            }
        }

        if args.iter().any(|a| a == "--dxc") {
            self.shaders.compiler = ShaderCompilerKind::Dxc;
        }

        if let Some(idx) = args.iter().position(|a| a == "--width") {
            if let Some(width) = args.get(idx + 1).and_then(|s| s.parse().ok()) {
                self.window.width = width;
            }
        }

        if let Some(idx) = args.iter().position(|a| a == "--height") {
            if let Some(height) = args.get(idx + 1).and_then(|s| s.parse().ok()) {
                self.window.height = height;
            }
        }
    }

    /// 验证配置的有效性
    ///
    /// 检查窗口尺寸、着色器路径、目标配置格式，
    /// 以及目标配置与所选编译器是否匹配。
    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "window.width/height".to_string(),
                reason: "Window dimensions must be greater than 0".to_string(),
            }
            .into());
        }

        let sources = [
            ("shaders.vertex", &self.shaders.vertex, ShaderStage::Vertex),
            ("shaders.pixel", &self.shaders.pixel, ShaderStage::Pixel),
        ];
        for (field, source, stage) in sources {
            if source.path.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}.path", field),
                    reason: "Shader path must not be empty".to_string(),
                }
                .into());
            }

            let profile = TargetProfile::parse(&source.profile).map_err(|e| {
                ConfigError::InvalidValue { field: format!("{}.profile", field), reason: e.to_string() }
            })?;

            if profile.stage != stage {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}.profile", field),
                    reason: format!("expected a {} profile, got '{}'", stage.prefix(), source.profile),
                }
                .into());
            }

            if profile.requires_dxc() != (self.shaders.compiler == ShaderCompilerKind::Dxc) {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}.profile", field),
                    reason: format!(
                        "profile '{}' cannot be compiled by {}",
                        source.profile,
                        self.shaders.compiler.name()
                    ),
                }
                .into());
            }
        }

        Ok(())
    }
}

impl ShaderCompilerKind {
    /// 获取编译器名称
    pub fn name(&self) -> &'static str {
        match self {
            ShaderCompilerKind::Fxc => "FXC",
            ShaderCompilerKind::Dxc => "DXC",
        }
    }
}
