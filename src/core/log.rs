//! 日志系统模块
//!
//! 基于 `tracing` 提供结构化的日志记录功能，另外提供一个“调试输出通道”
//! [`debug_output`]，用于在资源创建失败时输出诊断文本。
//!
//! # 使用示例
//!
//! ```no_run
//! use dx_triangle::core::log::{self, LogLevel};
//!
//! // 初始化日志系统
//! log::init_logger(LogLevel::Info, false, None);
//!
//! tracing::info!(width = 1280, height = 720, "Window created");
//! ```

use std::fmt::Display;
use std::path::Path;

use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

pub use super::config::LogLevel;

/// 初始化日志系统
///
/// 必须在程序开始时调用一次。
///
/// # 参数
///
/// * `level` - 日志级别
/// * `file_output` - 是否输出到文件
/// * `log_file_path` - 日志文件路径（可选，默认为 "dx_triangle.log"）
pub fn init_logger(level: LogLevel, file_output: bool, log_file_path: Option<&str>) {
    let filter = EnvFilter::new(level.as_filter());

    if file_output {
        let log_path = log_file_path.unwrap_or("dx_triangle.log");
        let path = Path::new(log_path);
        let directory = path.parent().unwrap_or(Path::new("."));
        let filename = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("dx_triangle.log");

        // 每天滚动
        let file_appender = RollingFileAppender::new(Rotation::DAILY, directory, filename);

        let console_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_ansi(true);

        let file_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_ansi(false) // 文件不需要 ANSI 颜色
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(filter)
            .with(console_layer)
            .with(file_layer)
            .init();
    } else {
        let fmt_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

/// 调试输出通道
///
/// 单一通道，没有级别之分。消息以 error 级别写入 `tracing`，
/// 在 Windows 上同时送往调试器（`OutputDebugStringA`）。
pub fn debug_output(message: &str) {
    tracing::error!(target: "dx_triangle::debug", "{}", message);
    #[cfg(test)]
    DEBUG_OUTPUT_COUNT.with(|count| count.set(count.get() + 1));

    #[cfg(target_os = "windows")]
    {
        use windows::core::PCSTR;
        use windows::Win32::System::Diagnostics::Debug::OutputDebugStringA;

        let mut text = message.replace('\0', " ");
        text.push('\n');
        if let Ok(text) = std::ffi::CString::new(text) {
            unsafe { OutputDebugStringA(PCSTR(text.as_ptr() as *const u8)) };
        }
    }
}

#[cfg(test)]
thread_local! {
    static DEBUG_OUTPUT_COUNT: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// 当前线程写入调试输出通道的消息数
#[cfg(test)]
pub(crate) fn debug_output_count() -> usize {
    DEBUG_OUTPUT_COUNT.with(|count| count.get())
}

/// 把错误写入调试输出通道后原样返回，便于 `map_err(log::report)?`
pub fn report<E: Display>(err: E) -> E {
    debug_output(&err.to_string());
    err
}

/// 引擎核心日志 - Info 级别
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {
        tracing::info!(target: "dx_triangle::engine", $($arg)*)
    };
}

/// 引擎核心日志 - Debug 级别
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "dx_triangle::engine", $($arg)*)
    };
}

/// 应用层日志 - Info 级别
#[macro_export]
macro_rules! app_info {
    ($($arg:tt)*) => {
        tracing::info!(target: "dx_triangle::app", $($arg)*)
    };
}

/// 应用层日志 - Error 级别
#[macro_export]
macro_rules! app_error {
    ($($arg:tt)*) => {
        tracing::error!(target: "dx_triangle::app", $($arg)*)
    };
}

impl LogLevel {
    /// `EnvFilter` 使用的过滤字符串
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// 日志级别转换
impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(Level::from(LogLevel::Info), Level::INFO);
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
        assert_eq!(LogLevel::Warn.as_filter(), "warn");
    }

    #[test]
    fn test_report_returns_error_unchanged() {
        let err = report(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        assert_eq!(err.to_string(), "boom");
    }
}
