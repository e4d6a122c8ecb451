//! FXC / DXC 着色器编译器后端
//!
//! 两者都以 `main` 为入口、带调试信息且关闭优化编译。
//! DXC 的工具链（工具对象、编译器、默认 include 处理器）由 [`DxcToolchain::new`]
//! 创建一次，之后每次加载只借用它。

use std::ffi::CString;
use std::mem::ManuallyDrop;
use std::path::Path;

use tracing::{debug, info};
use windows::core::{HSTRING, PCSTR, PCWSTR};
use windows::Win32::Graphics::Direct3D::Dxc::*;
use windows::Win32::Graphics::Direct3D::Fxc::*;
use windows::Win32::Graphics::Direct3D::{ID3DBlob, ID3DInclude};

use super::{blob_text, win_error};
use crate::core::error::{GraphicsError, Result};
use crate::core::log;
use crate::gfx::compile::{check_diagnostics, dxc_arguments, TargetProfile};
use crate::gfx::device::{Bytecode, ShaderCompiler};

impl Bytecode for IDxcBlob {
    fn as_bytes(&self) -> &[u8] {
        unsafe {
            std::slice::from_raw_parts(self.GetBufferPointer() as *const u8, self.GetBufferSize())
        }
    }
}

fn compilation_failed(path: &Path, message: String) -> GraphicsError {
    GraphicsError::ShaderCompilation { path: path.to_path_buf(), message }
}

fn c_string(path: &Path, text: &str) -> Result<CString> {
    CString::new(text).map_err(|e| compilation_failed(path, e.to_string()).into())
}

/// `D3D_COMPILE_STANDARD_FILE_INCLUDE`
///
/// d3dcompiler 把指针值 1 识别为内置的文件 include 处理器：`#include` 相对于
/// 包含它的文件所在目录解析。它不是真实对象，所以永远不能被释放。
fn standard_file_include() -> ManuallyDrop<ID3DInclude> {
    ManuallyDrop::new(unsafe { std::mem::transmute::<usize, ID3DInclude>(1) })
}

/// 旧版编译器（d3dcompiler），只接受 6.0 以下的目标配置
#[derive(Debug, Default, Clone, Copy)]
pub struct FxcCompiler;

impl ShaderCompiler for FxcCompiler {
    type Blob = ID3DBlob;

    fn backend_name(&self) -> &'static str {
        "FXC"
    }

    fn supports(&self, profile: &TargetProfile) -> bool {
        !profile.requires_dxc()
    }

    fn compile_file(&self, path: &Path, entry_point: &str, profile: &TargetProfile) -> Result<ID3DBlob> {
        let file_name = HSTRING::from(path);
        let entry_point = c_string(path, entry_point)?;
        let target = c_string(path, &profile.to_string())?;

        let include = standard_file_include();

        let mut code: Option<ID3DBlob> = None;
        let mut errors: Option<ID3DBlob> = None;
        let result = unsafe {
            D3DCompileFromFile(
                &file_name,
                None,
                Some(&*include),
                PCSTR(entry_point.as_ptr() as *const u8),
                PCSTR(target.as_ptr() as *const u8),
                D3DCOMPILE_DEBUG | D3DCOMPILE_SKIP_OPTIMIZATION,
                0,
                &mut code,
                Some(&mut errors),
            )
        };

        if let Err(e) = result {
            let message = errors
                .as_ref()
                .map(|blob| blob_text(blob.as_bytes()))
                .unwrap_or_else(|| e.to_string());
            return Err(compilation_failed(path, message).into());
        }
        code.ok_or_else(|| compilation_failed(path, "compiler returned no bytecode".to_string()).into())
    }
}

/// 新版编译器的工具链
pub struct DxcToolchain {
    utils: IDxcUtils,
    compiler: IDxcCompiler3,
    include_handler: IDxcIncludeHandler,
}

impl DxcToolchain {
    pub fn new() -> Result<Self> {
        Self::create().map_err(log::report)
    }

    fn create() -> Result<Self> {
        let utils: IDxcUtils = unsafe { DxcCreateInstance(&CLSID_DxcUtils) }
            .map_err(win_error(GraphicsError::DeviceCreation, "Failed to create DxcUtils"))?;
        let compiler: IDxcCompiler3 = unsafe { DxcCreateInstance(&CLSID_DxcCompiler) }
            .map_err(win_error(GraphicsError::DeviceCreation, "Failed to create DxcCompiler"))?;
        let include_handler = unsafe { utils.CreateDefaultIncludeHandler() }.map_err(win_error(
            GraphicsError::DeviceCreation,
            "Failed to create default include handler",
        ))?;

        info!("DXC toolchain initialized");
        Ok(Self { utils, compiler, include_handler })
    }
}

impl ShaderCompiler for DxcToolchain {
    type Blob = IDxcBlob;

    fn backend_name(&self) -> &'static str {
        "DXC"
    }

    fn supports(&self, profile: &TargetProfile) -> bool {
        profile.requires_dxc()
    }

    fn compile_file(&self, path: &Path, entry_point: &str, profile: &TargetProfile) -> Result<IDxcBlob> {
        let source = unsafe { self.utils.LoadFile(&HSTRING::from(path), None) }
            .map_err(|e| compilation_failed(path, format!("Failed to load source: {}", e)))?;

        let buffer = DxcBuffer {
            Ptr: unsafe { source.GetBufferPointer() },
            Size: unsafe { source.GetBufferSize() },
            Encoding: DXC_CP_UTF8.0,
        };

        let arguments: Vec<HSTRING> = dxc_arguments(&path.to_string_lossy(), entry_point, profile)
            .iter()
            .map(|arg| HSTRING::from(arg.as_str()))
            .collect();
        let argument_ptrs: Vec<PCWSTR> = arguments.iter().map(|arg| PCWSTR(arg.as_ptr())).collect();

        let result: IDxcResult = unsafe {
            self.compiler
                .Compile(&buffer, Some(argument_ptrs.as_slice()), &self.include_handler)
        }
        .map_err(|e| compilation_failed(path, e.to_string()))?;

        let status = unsafe { result.GetStatus() }.map_err(|e| compilation_failed(path, e.to_string()))?;
        let diagnostics = unsafe { result.GetErrorBuffer() }
            .map(|blob| unsafe {
                blob_text(std::slice::from_raw_parts(
                    blob.GetBufferPointer() as *const u8,
                    blob.GetBufferSize(),
                ))
            })
            .unwrap_or_default();

        if status.is_err() {
            let message = if diagnostics.is_empty() { status.message() } else { diagnostics };
            return Err(compilation_failed(path, message).into());
        }
        check_diagnostics(path, &diagnostics)?;

        let blob = unsafe { result.GetResult() }.map_err(|e| compilation_failed(path, e.to_string()))?;
        debug!(path = %path.display(), bytes = blob.as_bytes().len(), "DXC output received");
        Ok(blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::compile::SHADER_ENTRY_POINT;
    use std::path::PathBuf;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("shaders/fixtures").join(name)
    }

    #[test]
    fn test_fxc_resolves_relative_include() {
        let profile = TargetProfile::parse("ps_5_0").unwrap();
        let blob = FxcCompiler
            .compile_file(&fixture("include_ps.hlsl"), SHADER_ENTRY_POINT, &profile)
            .unwrap();
        assert!(!blob.as_bytes().is_empty());
    }

    #[test]
    fn test_dxc_resolves_relative_include() {
        let dxc = DxcToolchain::new().unwrap();
        let profile = TargetProfile::parse("ps_6_0").unwrap();
        let blob = dxc
            .compile_file(&fixture("include_ps.hlsl"), SHADER_ENTRY_POINT, &profile)
            .unwrap();
        assert!(!blob.as_bytes().is_empty());
    }

    #[test]
    fn test_fxc_reports_missing_include() {
        let profile = TargetProfile::parse("ps_5_0").unwrap();
        let err = FxcCompiler
            .compile_file(&fixture("missing_include_ps.hlsl"), SHADER_ENTRY_POINT, &profile)
            .unwrap_err();
        assert!(matches!(err.as_graphics(), Some(GraphicsError::ShaderCompilation { .. })));
        assert!(err.to_string().contains("missing_color.hlsli"));
    }
}
