/// Build script for DxTriangle
///
/// # Shader Compilation Strategy:
/// - HLSL sources are compiled at runtime, either by FXC (D3DCompile, SM 5.x)
///   or by DXC (IDxcCompiler3, SM 6.x), selected in config.toml
fn main() {
    // Trigger rebuild if shader files change
    println!("cargo:rerun-if-changed=shaders/triangle_vs.hlsl");
    println!("cargo:rerun-if-changed=shaders/triangle_ps.hlsl");
    println!("cargo:rerun-if-changed=shaders/fixtures");
    println!("cargo:rerun-if-changed=config.toml");
}
