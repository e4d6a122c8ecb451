//! 着色器
//!
//! 提供两个互不替代的编译入口：
//!
//! - `load`：旧版编译器（FXC），生成旧格式的二进制
//! - `load_alt`：新版编译器（DXC），生成新格式的二进制
//!
//! 每个实例只会持有其中一种二进制，另一个访问器返回 `None`。
//! 新版编译器的工具链（工具工厂、编译器实例、默认 include 处理器）
//! 由调用方创建一次并以引用传入，不是隐藏的全局状态。

use std::path::Path;

use tracing::debug;

use crate::core::error::{GraphicsError, Result};
use crate::core::log;
use crate::gfx::compile::{TargetProfile, SHADER_ENTRY_POINT};
use crate::gfx::device::{Bytecode, ShaderCompiler};

/// 编译后的着色器
///
/// * `L` - 旧版编译器后端
/// * `M` - 新版编译器后端
pub struct Shader<L: ShaderCompiler, M: ShaderCompiler> {
    blob: Option<L::Blob>,
    alt_blob: Option<M::Blob>,
}

impl<L: ShaderCompiler, M: ShaderCompiler> Shader<L, M> {
    pub fn new() -> Self {
        Self { blob: None, alt_blob: None }
    }

    /// 使用旧版编译器编译
    ///
    /// # 参数
    ///
    /// * `compiler` - 旧版编译器
    /// * `path` - HLSL 源文件路径
    /// * `profile` - 目标配置，例如 "vs_5_0"
    pub fn load(&mut self, compiler: &L, path: impl AsRef<Path>, profile: &str) -> Result<()> {
        let path = path.as_ref();
        let profile = resolve_profile(compiler, profile)?;

        self.release();
        let blob = compiler
            .compile_file(path, SHADER_ENTRY_POINT, &profile)
            .map_err(log::report)?;

        debug!(path = %path.display(), %profile, backend = compiler.backend_name(), "Shader compiled");
        self.blob = Some(blob);
        Ok(())
    }

    /// 使用新版编译器编译
    ///
    /// 编译器返回失败，或者输出了任何非空诊断文本，都视为失败。
    pub fn load_alt(&mut self, toolchain: &M, path: impl AsRef<Path>, profile: &str) -> Result<()> {
        let path = path.as_ref();
        let profile = resolve_profile(toolchain, profile)?;

        self.release();
        let blob = toolchain
            .compile_file(path, SHADER_ENTRY_POINT, &profile)
            .map_err(log::report)?;

        debug!(path = %path.display(), %profile, backend = toolchain.backend_name(), "Shader compiled");
        self.alt_blob = Some(blob);
        Ok(())
    }

    /// 旧版编译器的二进制
    pub fn blob(&self) -> Option<&L::Blob> {
        self.blob.as_ref()
    }

    /// 新版编译器的二进制
    pub fn alt_blob(&self) -> Option<&M::Blob> {
        self.alt_blob.as_ref()
    }

    /// 已加载的字节码，不论来自哪个编译器
    pub fn bytecode(&self) -> Option<&[u8]> {
        self.blob
            .as_ref()
            .map(Bytecode::as_bytes)
            .or_else(|| self.alt_blob.as_ref().map(Bytecode::as_bytes))
    }

    fn release(&mut self) {
        self.blob = None;
        self.alt_blob = None;
    }
}

impl<L: ShaderCompiler, M: ShaderCompiler> Default for Shader<L, M> {
    fn default() -> Self {
        Self::new()
    }
}

/// 解析目标配置并确认编译器能处理它，在调用编译器之前完成
fn resolve_profile<C: ShaderCompiler>(compiler: &C, profile: &str) -> Result<TargetProfile> {
    let parsed = TargetProfile::parse(profile).map_err(log::report)?;
    if !compiler.supports(&parsed) {
        let err = GraphicsError::InvalidArgument(format!(
            "target profile '{}' is not supported by {}",
            parsed,
            compiler.backend_name()
        ));
        return Err(log::report(err).into());
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::mock::MockCompiler;

    type TestShader = Shader<MockCompiler, MockCompiler>;

    #[test]
    fn test_load_alt_pixel_shader() {
        let dxc = MockCompiler::modern();
        let mut shader = TestShader::new();

        shader.load_alt(&dxc, "shaders/triangle_ps.hlsl", "ps_6_0").unwrap();

        assert!(shader.alt_blob().is_some());
        assert!(shader.blob().is_none());
        assert_eq!(shader.bytecode(), Some(&b"MockDXC:ps_6_0"[..]));

        let calls = dxc.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Path::new("shaders/triangle_ps.hlsl"));
        assert_eq!(calls[0].1, "main");
        assert_eq!(calls[0].2, "ps_6_0");
    }

    #[test]
    fn test_load_legacy_leaves_alt_empty() {
        let fxc = MockCompiler::legacy();
        let mut shader = TestShader::new();

        shader.load(&fxc, "shaders/triangle_vs.hlsl", "vs_5_0").unwrap();

        assert!(shader.blob().is_some());
        assert!(shader.alt_blob().is_none());
    }

    #[test]
    fn test_loads_are_mutually_exclusive() {
        let fxc = MockCompiler::legacy();
        let dxc = MockCompiler::modern();
        let mut shader = TestShader::new();

        shader.load(&fxc, "vs.hlsl", "vs_5_0").unwrap();
        shader.load_alt(&dxc, "vs.hlsl", "vs_6_0").unwrap();
        assert!(shader.blob().is_none());
        assert!(shader.alt_blob().is_some());
        assert_eq!(fxc.blobs.live(), 0);

        shader.load(&fxc, "vs.hlsl", "vs_5_0").unwrap();
        assert_eq!(shader.blob().map(|blob| blob.handle.id), Some(2));
        assert!(shader.alt_blob().is_none());
        assert_eq!(dxc.blobs.live(), 0);
    }

    #[test]
    fn test_drop_releases_loaded_blob_once() {
        let dxc = MockCompiler::modern();
        {
            let mut shader = TestShader::new();
            shader.load_alt(&dxc, "ps.hlsl", "ps_6_0").unwrap();
            assert_eq!(dxc.blobs.live(), 1);
        }
        assert_eq!(dxc.blobs.created(), 1);
        assert_eq!(dxc.blobs.released(), 1);
    }

    #[test]
    fn test_profile_backend_mismatch_rejected_before_compile() {
        let fxc = MockCompiler::legacy();
        let dxc = MockCompiler::modern();
        let mut shader = TestShader::new();

        assert!(shader.load(&fxc, "ps.hlsl", "ps_6_0").is_err());
        assert!(shader.load_alt(&dxc, "ps.hlsl", "ps_5_0").is_err());
        assert!(shader.load_alt(&dxc, "ps.hlsl", "pixel").is_err());
        assert!(fxc.calls.borrow().is_empty());
        assert!(dxc.calls.borrow().is_empty());
    }

    #[test]
    fn test_extended_profiles_reach_compiler() {
        let fxc = MockCompiler::legacy();
        let dxc = MockCompiler::modern();
        let mut shader = TestShader::new();

        for profile in ["ms_6_5", "as_6_5", "lib_6_3"] {
            shader.load_alt(&dxc, "mesh.hlsl", profile).unwrap();
        }
        shader.load(&fxc, "vs.hlsl", "vs_4_0_level_9_3").unwrap();

        let modern: Vec<String> = dxc.calls.borrow().iter().map(|c| c.2.clone()).collect();
        assert_eq!(modern, ["ms_6_5", "as_6_5", "lib_6_3"]);
        assert_eq!(fxc.calls.borrow()[0].2, "vs_4_0_level_9_3");
        assert_eq!(shader.bytecode(), Some(&b"MockFXC:vs_4_0_level_9_3"[..]));
    }

    #[test]
    fn test_nonempty_diagnostics_fail_load_alt() {
        let dxc = MockCompiler::modern();
        *dxc.diagnostics.borrow_mut() = Some("ps.hlsl:4:1: warning: unused".to_string());
        let mut shader = TestShader::new();

        let err = shader.load_alt(&dxc, "ps.hlsl", "ps_6_0").unwrap_err();
        assert!(err.as_graphics().map(GraphicsError::is_diagnostic).unwrap_or(false));
        assert!(shader.alt_blob().is_none());
        assert!(shader.bytecode().is_none());
    }

    #[test]
    fn test_compile_failure_leaves_shader_empty() {
        let fxc = MockCompiler::legacy();
        fxc.fail.set(true);
        let mut shader = TestShader::new();

        let err = shader.load(&fxc, "vs.hlsl", "vs_5_0").unwrap_err();
        assert!(matches!(err.as_graphics(), Some(GraphicsError::ShaderCompilation { .. })));
        assert!(shader.blob().is_none());
    }
}
