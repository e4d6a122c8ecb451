//! 着色器编译的公共部分
//!
//! 与具体编译器无关的逻辑：目标配置（target profile）解析、
//! DXC 命令行参数、诊断信息检查。FXC / DXC 的原生调用在 `gfx::dx12::compiler` 中。

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::core::error::{GraphicsError, Result};

/// 所有着色器的入口函数名
pub const SHADER_ENTRY_POINT: &str = "main";

/// 着色器阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Pixel,
    Geometry,
    Hull,
    Domain,
    Compute,
    Mesh,
    Amplification,
    /// 着色器库（`lib_*`），没有单一入口阶段
    Library,
}

impl ShaderStage {
    /// 目标配置字符串中的阶段前缀
    pub fn prefix(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vs",
            ShaderStage::Pixel => "ps",
            ShaderStage::Geometry => "gs",
            ShaderStage::Hull => "hs",
            ShaderStage::Domain => "ds",
            ShaderStage::Compute => "cs",
            ShaderStage::Mesh => "ms",
            ShaderStage::Amplification => "as",
            ShaderStage::Library => "lib",
        }
    }

    /// 网格和放大着色器只存在于 6.x 模型
    fn min_major(&self) -> u8 {
        match self {
            ShaderStage::Mesh | ShaderStage::Amplification => 6,
            _ => 2,
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        Some(match prefix {
            "vs" => ShaderStage::Vertex,
            "ps" => ShaderStage::Pixel,
            "gs" => ShaderStage::Geometry,
            "hs" => ShaderStage::Hull,
            "ds" => ShaderStage::Domain,
            "cs" => ShaderStage::Compute,
            "ms" => ShaderStage::Mesh,
            "as" => ShaderStage::Amplification,
            "lib" => ShaderStage::Library,
            _ => return None,
        })
    }
}

/// 目标配置，例如 `vs_6_0`
///
/// 编码了着色器阶段和着色器模型版本。
/// 模型 6.0 及以上只能由 DXC 编译，以下只能由 FXC 编译。
/// FXC 的 `<stage>_4_0_level_9_<n>` 形式保留在 `level_9` 中。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetProfile {
    pub stage: ShaderStage,
    pub major: u8,
    pub minor: u8,
    pub level_9: Option<u8>,
}

impl TargetProfile {
    pub fn new(stage: ShaderStage, major: u8, minor: u8) -> Self {
        Self { stage, major, minor, level_9: None }
    }

    /// 解析 `<stage>_<major>_<minor>[_level_9_<n>]` 形式的字符串
    ///
    /// # 示例
    ///
    /// ```
    /// use dx_triangle::gfx::compile::{ShaderStage, TargetProfile};
    ///
    /// let profile = TargetProfile::parse("ps_6_0").unwrap();
    /// assert_eq!(profile.stage, ShaderStage::Pixel);
    /// assert!(profile.requires_dxc());
    ///
    /// let mesh = TargetProfile::parse("ms_6_5").unwrap();
    /// assert_eq!(mesh.stage, ShaderStage::Mesh);
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || -> crate::core::error::BootstrapError {
            GraphicsError::InvalidArgument(format!(
                "target profile '{}' is not of the form <stage>_<major>_<minor>[_level_9_<n>]",
                text
            ))
            .into()
        };

        let parts: Vec<&str> = text.split('_').collect();
        let (stage, major, minor, level_9) = match parts.as_slice() {
            [stage, major, minor] => (*stage, *major, *minor, None),
            [stage, major, minor, "level", "9", level] => (*stage, *major, *minor, Some(*level)),
            _ => return Err(invalid()),
        };

        let stage = ShaderStage::from_prefix(stage).ok_or_else(invalid)?;
        let major: u8 = major.parse().map_err(|_| invalid())?;
        let minor: u8 = minor.parse().map_err(|_| invalid())?;
        if !(stage.min_major()..=6).contains(&major) || minor > 9 {
            return Err(invalid());
        }

        let level_9 = match level_9 {
            None => None,
            Some(level) => {
                let level: u8 = level.parse().map_err(|_| invalid())?;
                // 只有 4.0 模型带有 9.x 特性级别后缀
                if (major, minor) != (4, 0) || !(1..=3).contains(&level) {
                    return Err(invalid());
                }
                Some(level)
            }
        };

        Ok(Self { stage, major, minor, level_9 })
    }

    /// 是否需要 DXC（着色器模型 6.0+）
    pub fn requires_dxc(&self) -> bool {
        self.major >= 6
    }

    /// 同一阶段、不同模型版本，去掉特性级别后缀
    pub fn with_model(self, major: u8, minor: u8) -> Self {
        Self { major, minor, level_9: None, ..self }
    }
}

impl fmt::Display for TargetProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.stage.prefix(), self.major, self.minor)?;
        if let Some(level) = self.level_9 {
            write!(f, "_level_9_{}", level)?;
        }
        Ok(())
    }
}

impl FromStr for TargetProfile {
    type Err = crate::core::error::BootstrapError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// DXC 的编译参数
///
/// 调试信息内嵌、关闭优化、行主序矩阵。
pub fn dxc_arguments(path: &str, entry_point: &str, profile: &TargetProfile) -> Vec<String> {
    vec![
        path.to_string(),
        "-E".to_string(),
        entry_point.to_string(),
        "-T".to_string(),
        profile.to_string(),
        "-Zi".to_string(),
        "-Qembed_debug".to_string(),
        "-Od".to_string(),
        "-Zpr".to_string(),
    ]
}

/// 检查编译器输出的诊断文本
///
/// 任何非空文本（包括警告）都视为失败，即便编译本身返回成功。
/// 只忽略末尾的 NUL 字符。
pub fn check_diagnostics(path: &Path, diagnostics: &str) -> Result<()> {
    let diagnostics = diagnostics.trim_end_matches('\0');
    if diagnostics.is_empty() {
        return Ok(());
    }
    Err(GraphicsError::ShaderDiagnostics {
        path: path.to_path_buf(),
        diagnostics: diagnostics.to_string(),
    }
    .into())
}
