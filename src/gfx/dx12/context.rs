//! DirectX 12 上下文
//!
//! 持有窗口和整个帧循环需要的基础设施，同时作为设备提供者交给资源组件。
//!
//! # 初始化流程
//!
//! 1. 启用调试层（Debug 模式）
//! 2. 创建 DXGI 工厂和 D3D12 设备
//! 3. 创建命令队列、命令分配器、命令列表
//! 4. 创建交换链（双缓冲）
//! 5. 创建 RTV 描述符堆和渲染目标视图（sRGB）
//! 6. 创建同步对象（Fence）

use std::mem::ManuallyDrop;
use std::sync::Arc;

use tracing::{debug, info, trace, warn};
use windows::core::Interface;
use windows::Win32::Foundation::{CloseHandle, HANDLE, HWND};
use windows::Win32::Graphics::Direct3D::D3D_FEATURE_LEVEL_11_0;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::Win32::Graphics::Dxgi::*;
use windows::Win32::System::Threading::{CreateEventA, WaitForSingleObject, INFINITE};
use winit::dpi::LogicalSize;
use winit::event_loop::EventLoop;
use winit::raw_window_handle::{HasWindowHandle, RawWindowHandle};
use winit::window::{Window, WindowBuilder};

use super::device::{dxgi_format, Dx12Device};
use super::recorder::Dx12Recorder;
use super::win_error;
use crate::core::error::{BootstrapError, GraphicsError, Result};
use crate::core::Config;
use crate::gfx::types::Format;

/// 交换链缓冲区数量
pub const FRAME_COUNT: u32 = 2;

/// 交换链本身的格式，渲染目标视图使用对应的 sRGB 格式
const SWAP_CHAIN_FORMAT: Format = Format::R8G8B8A8Unorm;

/// 清屏颜色
pub const CLEAR_COLOR: [f32; 4] = [0.1, 0.25, 0.5, 1.0];

pub struct Dx12Context {
    pub device: Dx12Device,
    pub command_queue: ID3D12CommandQueue,
    pub swap_chain: IDXGISwapChain3,
    render_targets: Vec<ID3D12Resource>,
    rtv_heap: ID3D12DescriptorHeap,
    rtv_descriptor_size: usize,
    command_allocator: ID3D12CommandAllocator,
    command_list: ID3D12GraphicsCommandList,
    frame_index: usize,
    fence: ID3D12Fence,
    fence_value: u64,
    fence_event: HANDLE,
    sync_interval: u32,
    pub window: Arc<Window>,
    pub width: u32,
    pub height: u32,
}

fn device_error(what: &'static str) -> impl FnOnce(windows::core::Error) -> BootstrapError {
    win_error(GraphicsError::DeviceCreation, what)
}

fn command_error(what: &'static str) -> impl FnOnce(windows::core::Error) -> BootstrapError {
    win_error(GraphicsError::CommandExecution, what)
}

fn transition_barrier(
    resource: &ID3D12Resource,
    before: D3D12_RESOURCE_STATES,
    after: D3D12_RESOURCE_STATES,
) -> D3D12_RESOURCE_BARRIER {
    D3D12_RESOURCE_BARRIER {
        Type: D3D12_RESOURCE_BARRIER_TYPE_TRANSITION,
        Flags: D3D12_RESOURCE_BARRIER_FLAG_NONE,
        Anonymous: D3D12_RESOURCE_BARRIER_0 {
            Transition: ManuallyDrop::new(D3D12_RESOURCE_TRANSITION_BARRIER {
                pResource: unsafe { std::mem::transmute_copy(resource) },
                Subresource: D3D12_RESOURCE_BARRIER_ALL_SUBRESOURCES,
                StateBefore: before,
                StateAfter: after,
            }),
        },
    }
}

impl Dx12Context {
    /// 创建窗口和 DirectX 12 基础设施
    ///
    /// # 参数
    ///
    /// * `event_loop` - Winit 事件循环，用于创建窗口
    /// * `config` - 窗口大小、标题、垂直同步等设置
    pub fn new(event_loop: &EventLoop<()>, config: &Config) -> Result<Self> {
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(format!(
                    "{} [{}]",
                    config.window.title,
                    config.shaders.compiler.name()
                ))
                .with_inner_size(LogicalSize::new(config.window.width, config.window.height))
                .with_resizable(config.window.resizable)
                .build(event_loop)
                .map_err(|e| BootstrapError::Initialization(format!("Failed to create window: {}", e)))?,
        );
        let size = window.inner_size();
        let (width, height) = (size.width.max(1), size.height.max(1));

        let window_handle = window
            .window_handle()
            .map_err(|e| BootstrapError::Initialization(format!("Failed to get window handle: {}", e)))?;
        let hwnd = match window_handle.as_raw() {
            RawWindowHandle::Win32(win32_handle) => HWND(win32_handle.hwnd.get() as *mut std::ffi::c_void),
            _ => {
                return Err(BootstrapError::Initialization(
                    "Expected Win32 window handle on Windows platform".to_string(),
                ))
            }
        };

        unsafe {
            // 1. 启用调试层
            #[cfg(debug_assertions)]
            {
                let mut debug: Option<ID3D12Debug> = None;
                match D3D12GetDebugInterface(&mut debug) {
                    Ok(()) => {
                        if let Some(debug) = debug {
                            debug.EnableDebugLayer();
                            debug!("DX12 Debug Layer enabled");
                        }
                    }
                    Err(_) => warn!("Failed to enable DX12 Debug Layer"),
                }
            }

            // 2. DXGI 工厂和设备
            let factory_flags = if cfg!(debug_assertions) {
                DXGI_CREATE_FACTORY_DEBUG
            } else {
                DXGI_CREATE_FACTORY_FLAGS(0)
            };
            let factory: IDXGIFactory4 =
                CreateDXGIFactory2(factory_flags).map_err(device_error("Failed to create DXGI factory"))?;

            let mut device: Option<ID3D12Device> = None;
            D3D12CreateDevice(None, D3D_FEATURE_LEVEL_11_0, &mut device)
                .map_err(device_error("Failed to create D3D12 device"))?;
            let device = device.ok_or_else(|| {
                GraphicsError::DeviceCreation("D3D12CreateDevice returned no device".to_string())
            })?;
            debug!("D3D12 Device created successfully");

            // 3. 命令队列与命令列表
            let queue_desc = D3D12_COMMAND_QUEUE_DESC {
                Type: D3D12_COMMAND_LIST_TYPE_DIRECT,
                Flags: D3D12_COMMAND_QUEUE_FLAG_NONE,
                ..Default::default()
            };
            let command_queue: ID3D12CommandQueue = device
                .CreateCommandQueue(&queue_desc)
                .map_err(device_error("Failed to create command queue"))?;
            let command_allocator: ID3D12CommandAllocator = device
                .CreateCommandAllocator(D3D12_COMMAND_LIST_TYPE_DIRECT)
                .map_err(device_error("Failed to create command allocator"))?;
            let command_list: ID3D12GraphicsCommandList = device
                .CreateCommandList(
                    0,
                    D3D12_COMMAND_LIST_TYPE_DIRECT,
                    &command_allocator,
                    None::<&ID3D12PipelineState>,
                )
                .map_err(device_error("Failed to create command list"))?;
            // 创建后处于记录状态，先关闭，每帧开始时再重置
            command_list.Close().map_err(device_error("Failed to close command list"))?;

            // 4. 交换链
            let swap_chain_desc = DXGI_SWAP_CHAIN_DESC1 {
                Width: width,
                Height: height,
                Format: dxgi_format(SWAP_CHAIN_FORMAT),
                SampleDesc: DXGI_SAMPLE_DESC { Count: 1, ..Default::default() },
                BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
                BufferCount: FRAME_COUNT,
                SwapEffect: DXGI_SWAP_EFFECT_FLIP_DISCARD,
                ..Default::default()
            };
            let swap_chain: IDXGISwapChain1 = factory
                .CreateSwapChainForHwnd(&command_queue, hwnd, &swap_chain_desc, None, None)
                .map_err(device_error("Failed to create swap chain"))?;
            let swap_chain: IDXGISwapChain3 = swap_chain
                .cast()
                .map_err(device_error("Failed to cast swap chain to IDXGISwapChain3"))?;
            info!(width, height, buffers = FRAME_COUNT, "Swap chain created");

            // 5. RTV 堆
            let rtv_heap_desc = D3D12_DESCRIPTOR_HEAP_DESC {
                NumDescriptors: FRAME_COUNT,
                Type: D3D12_DESCRIPTOR_HEAP_TYPE_RTV,
                Flags: D3D12_DESCRIPTOR_HEAP_FLAG_NONE,
                NodeMask: 0,
            };
            let rtv_heap: ID3D12DescriptorHeap = device
                .CreateDescriptorHeap(&rtv_heap_desc)
                .map_err(device_error("Failed to create RTV heap"))?;
            let rtv_descriptor_size =
                device.GetDescriptorHandleIncrementSize(D3D12_DESCRIPTOR_HEAP_TYPE_RTV) as usize;

            // 6. 同步对象
            let fence: ID3D12Fence = device
                .CreateFence(0, D3D12_FENCE_FLAG_NONE)
                .map_err(device_error("Failed to create fence"))?;
            let fence_event =
                CreateEventA(None, false, false, None).map_err(device_error("Failed to create fence event"))?;
            debug!("Synchronization objects created");

            let mut context = Self {
                device: Dx12Device::new(device),
                command_queue,
                swap_chain,
                render_targets: Vec::with_capacity(FRAME_COUNT as usize),
                rtv_heap,
                rtv_descriptor_size,
                command_allocator,
                command_list,
                frame_index: 0,
                fence,
                fence_value: 1,
                fence_event,
                sync_interval: u32::from(config.window.vsync),
                window,
                width,
                height,
            };
            context.create_render_targets()?;

            crate::engine_info!("DX12 context initialization complete");
            Ok(context)
        }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// 为交换链的每个缓冲区创建 sRGB 渲染目标视图
    fn create_render_targets(&mut self) -> Result<()> {
        self.render_targets.clear();
        let rtv_desc = D3D12_RENDER_TARGET_VIEW_DESC {
            Format: dxgi_format(Format::R8G8B8A8UnormSrgb),
            ViewDimension: D3D12_RTV_DIMENSION_TEXTURE2D,
            ..Default::default()
        };

        unsafe {
            let heap_start = self.rtv_heap.GetCPUDescriptorHandleForHeapStart();
            for i in 0..FRAME_COUNT {
                let surface: ID3D12Resource = self
                    .swap_chain
                    .GetBuffer(i)
                    .map_err(device_error("Failed to get swap chain buffer"))?;
                let handle = D3D12_CPU_DESCRIPTOR_HANDLE {
                    ptr: heap_start.ptr + i as usize * self.rtv_descriptor_size,
                };
                self.device.raw().CreateRenderTargetView(&surface, Some(&rtv_desc), handle);
                self.render_targets.push(surface);
            }
            self.frame_index = self.swap_chain.GetCurrentBackBufferIndex() as usize;
        }
        Ok(())
    }

    fn current_rtv(&self) -> D3D12_CPU_DESCRIPTOR_HANDLE {
        let heap_start = unsafe { self.rtv_heap.GetCPUDescriptorHandleForHeapStart() };
        D3D12_CPU_DESCRIPTOR_HANDLE {
            ptr: heap_start.ptr + self.frame_index * self.rtv_descriptor_size,
        }
    }

    fn current_render_target(&self) -> Result<&ID3D12Resource> {
        self.render_targets
            .get(self.frame_index)
            .ok_or_else(|| BootstrapError::Runtime(format!("Invalid frame index {}", self.frame_index)))
    }

    /// 开始一帧
    ///
    /// 重置命令列表，把当前后台缓冲区转换为渲染目标，绑定并清屏。
    /// 返回的记录器借用命令列表，必须在 [`end_frame`](Self::end_frame) 之前释放。
    pub fn begin_frame(&mut self) -> Result<Dx12Recorder<'_>> {
        unsafe {
            self.command_allocator
                .Reset()
                .map_err(command_error("Failed to reset command allocator"))?;
            self.command_list
                .Reset(&self.command_allocator, None::<&ID3D12PipelineState>)
                .map_err(command_error("Failed to reset command list"))?;

            let render_target = self.current_render_target()?;
            let barrier = transition_barrier(
                render_target,
                D3D12_RESOURCE_STATE_PRESENT,
                D3D12_RESOURCE_STATE_RENDER_TARGET,
            );
            self.command_list.ResourceBarrier(&[barrier]);

            let rtv_handle = self.current_rtv();
            self.command_list.OMSetRenderTargets(1, Some(&rtv_handle), false, None);
            self.command_list.ClearRenderTargetView(rtv_handle, &CLEAR_COLOR, None);
        }
        trace!(frame_index = self.frame_index, "Frame begun");
        Ok(Dx12Recorder::new(&self.command_list))
    }

    /// 结束一帧：转换回呈现状态、提交、呈现并等待 GPU
    pub fn end_frame(&mut self) -> Result<()> {
        unsafe {
            let render_target = self.current_render_target()?;
            let barrier = transition_barrier(
                render_target,
                D3D12_RESOURCE_STATE_RENDER_TARGET,
                D3D12_RESOURCE_STATE_PRESENT,
            );
            self.command_list.ResourceBarrier(&[barrier]);
            self.command_list
                .Close()
                .map_err(command_error("Failed to close command list"))?;

            let command_lists = [Some(self.command_list.cast::<ID3D12CommandList>().map_err(
                command_error("Failed to cast command list"),
            )?)];
            self.command_queue.ExecuteCommandLists(&command_lists);

            self.swap_chain
                .Present(self.sync_interval, DXGI_PRESENT(0))
                .ok()
                .map_err(command_error("Failed to present"))?;
        }

        self.wait_for_gpu()?;
        self.frame_index = unsafe { self.swap_chain.GetCurrentBackBufferIndex() } as usize;
        trace!(frame_index = self.frame_index, "Frame presented");
        Ok(())
    }

    /// 发出围栏信号并阻塞直到 GPU 完成所有已提交的工作
    pub fn wait_for_gpu(&mut self) -> Result<()> {
        let fence_value = self.fence_value;
        unsafe {
            self.command_queue
                .Signal(&self.fence, fence_value)
                .map_err(command_error("Failed to signal fence"))?;
            self.fence_value += 1;

            if self.fence.GetCompletedValue() < fence_value {
                self.fence
                    .SetEventOnCompletion(fence_value, self.fence_event)
                    .map_err(command_error("Failed to set fence event"))?;
                WaitForSingleObject(self.fence_event, INFINITE);
            }
        }
        Ok(())
    }

    /// 调整交换链大小
    ///
    /// 宽或高为 0（窗口最小化）时忽略。
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 || (width == self.width && height == self.height) {
            return Ok(());
        }

        self.wait_for_gpu()?;
        // 交换链缓冲区的所有引用都必须在 ResizeBuffers 之前释放
        self.render_targets.clear();

        unsafe {
            self.swap_chain
                .ResizeBuffers(FRAME_COUNT, width, height, dxgi_format(SWAP_CHAIN_FORMAT), DXGI_SWAP_CHAIN_FLAG(0))
                .map_err(device_error("Failed to resize swap chain buffers"))?;
        }
        self.width = width;
        self.height = height;
        self.create_render_targets()?;

        crate::engine_debug!(width, height, "Resize completed");
        Ok(())
    }
}

impl Drop for Dx12Context {
    fn drop(&mut self) {
        if let Err(e) = self.wait_for_gpu() {
            warn!("Failed to wait for GPU on shutdown: {}", e);
        }
        unsafe {
            if let Err(e) = CloseHandle(self.fence_event) {
                warn!("Failed to close fence event: {}", e);
            }
        }
        debug!("DX12 context dropped");
    }
}
