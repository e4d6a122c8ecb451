//! DxTriangle - Direct3D 12 三角形启动程序
//!
//! 加载配置、初始化日志、创建窗口和 D3D12 上下文，
//! 编译两个着色器，创建根签名、管线和顶点缓冲区，然后每帧绘制一个三角形。
//!
//! # 使用方法
//!
//! ```bash
//! # 使用配置文件（默认 DXC，vs_6_0 / ps_6_0）
//! cargo run
//!
//! # 使用旧版编译器（目标配置降为 5.0）
//! cargo run -- --fxc
//!
//! # 覆盖窗口大小
//! cargo run -- --width 800 --height 600
//! ```
//!
//! 资源创建或着色器编译失败被视为致命错误：诊断文本写入调试输出后终止程序。

use dx_triangle::core::{log, Config};
use dx_triangle::{app_error, app_info};

/// 应用程序入口点
///
/// # 初始化流程
///
/// 1. 加载配置文件（config.toml）
/// 2. 应用命令行参数覆盖
/// 3. 验证配置
/// 4. 初始化日志系统
/// 5. 创建窗口、上下文和场景，进入主循环
fn main() {
    let mut config = Config::from_file_or_default("config.toml");
    config.apply_args(std::env::args());

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    let log_file = config
        .logging
        .file_output
        .then_some(config.logging.log_file.as_str());
    log::init_logger(config.logging.level, config.logging.file_output, log_file);

    app_info!("DxTriangle starting...");
    app_info!(
        version = env!("CARGO_PKG_VERSION"),
        compiler = config.shaders.compiler.name(),
        width = config.window.width,
        height = config.window.height,
        "Application initialized"
    );

    if let Err(e) = run(config) {
        app_error!("{:#}", e);
        eprintln!("DxTriangle failed: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(target_os = "windows")]
fn run(config: Config) -> anyhow::Result<()> {
    app::run(config)
}

#[cfg(not(target_os = "windows"))]
fn run(_config: Config) -> anyhow::Result<()> {
    anyhow::bail!("Direct3D 12 is only available on Windows")
}

#[cfg(target_os = "windows")]
mod app {
    use anyhow::Context;
    use tracing::{debug, error, info};
    use winit::event::{Event, WindowEvent};
    use winit::event_loop::EventLoop;

    use dx_triangle::core::config::{ShaderCompilerKind, ShaderConfig};
    use dx_triangle::core::{Config, OrFatal};
    use dx_triangle::gfx::dx12::{Dx12Context, Dx12Device, DxcToolchain, FxcCompiler};
    use dx_triangle::renderer::{Shader, TriangleScene};

    type HostShader = Shader<FxcCompiler, DxcToolchain>;

    /// 按配置选择编译器编译顶点和像素着色器
    ///
    /// 编译失败是致命的。
    fn compile_shaders(config: &ShaderConfig) -> (HostShader, HostShader) {
        let mut vs = HostShader::new();
        let mut ps = HostShader::new();

        match config.compiler {
            ShaderCompilerKind::Fxc => {
                let fxc = FxcCompiler;
                vs.load(&fxc, &config.vertex.path, &config.vertex.profile)
                    .or_fatal("Failed to compile vertex shader");
                ps.load(&fxc, &config.pixel.path, &config.pixel.profile)
                    .or_fatal("Failed to compile pixel shader");
            }
            ShaderCompilerKind::Dxc => {
                let dxc = DxcToolchain::new().or_fatal("Failed to initialize DXC");
                vs.load_alt(&dxc, &config.vertex.path, &config.vertex.profile)
                    .or_fatal("Failed to compile vertex shader");
                ps.load_alt(&dxc, &config.pixel.path, &config.pixel.profile)
                    .or_fatal("Failed to compile pixel shader");
            }
        }

        info!(compiler = config.compiler.name(), "Shaders compiled");
        (vs, ps)
    }

    fn draw_frame(
        context: &mut Dx12Context,
        scene: &TriangleScene<Dx12Device>,
    ) -> dx_triangle::core::Result<()> {
        let (width, height) = (context.width, context.height);
        {
            let mut recorder = context.begin_frame()?;
            scene.record(&mut recorder, width, height)?;
        }
        context.end_frame()
    }

    pub fn run(config: Config) -> anyhow::Result<()> {
        let event_loop = EventLoop::new().context("Failed to create event loop")?;
        let mut context = Dx12Context::new(&event_loop, &config).context("Failed to initialize DX12")?;

        let (vs, ps) = compile_shaders(&config.shaders);
        let vs_bytecode = vs.bytecode().context("vertex shader produced no bytecode")?;
        let ps_bytecode = ps.bytecode().context("pixel shader produced no bytecode")?;

        let scene = TriangleScene::new(&context.device, vs_bytecode, ps_bytecode)
            .or_fatal("Failed to create triangle scene");

        info!("Entering main loop...");

        event_loop.run(move |event, elwt| match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    info!("Close requested, shutting down...");
                    elwt.exit();
                }
                WindowEvent::Resized(new_size) => {
                    debug!(width = new_size.width, height = new_size.height, "Window resized");
                    if let Err(e) = context.resize(new_size.width, new_size.height) {
                        error!("Resize failed: {}", e);
                        elwt.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    if let Err(e) = draw_frame(&mut context, &scene) {
                        error!("Draw failed: {}", e);
                        elwt.exit();
                    }
                }
                _ => (),
            },
            Event::AboutToWait => context.window().request_redraw(),
            _ => (),
        })?;

        Ok(())
    }
}
