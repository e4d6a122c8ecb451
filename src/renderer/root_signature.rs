//! 根签名
//!
//! 持有一个根签名句柄。`create` 使用固定的描述（只允许输入布局），
//! 再次调用时先释放旧句柄再创建新句柄，而不是叠加。

use tracing::debug;

use crate::core::error::Result;
use crate::core::log;
use crate::gfx::device::{Bytecode, GraphicsDevice};
use crate::gfx::types::RootSignatureDesc;

/// 根签名资源
///
/// 两种状态：未初始化（`None`）和已初始化（`Some`）。
/// 句柄由本实例独占，drop 时释放一次。
pub struct RootSignature<D: GraphicsDevice> {
    root_signature: Option<D::RootSignature>,
}

impl<D: GraphicsDevice> RootSignature<D> {
    pub fn new() -> Self {
        Self { root_signature: None }
    }

    /// 创建（或重新创建）根签名
    ///
    /// 1. 释放已有句柄
    /// 2. 序列化固定描述
    /// 3. 由序列化数据创建根签名
    /// 4. 丢弃序列化数据
    ///
    /// 失败时句柄保持为空，错误文本已写入调试输出通道。
    pub fn create(&mut self, device: &D) -> Result<()> {
        if self.root_signature.take().is_some() {
            debug!("Released previous root signature");
        }

        let desc = RootSignatureDesc::input_assembler();
        let serialized = device.serialize_root_signature(&desc).map_err(log::report)?;
        let root_signature = device
            .create_root_signature(serialized.as_bytes())
            .map_err(log::report)?;
        drop(serialized);

        self.root_signature = Some(root_signature);
        debug!("Root signature created");
        Ok(())
    }

    /// 获取根签名句柄，未创建时为 `None`
    pub fn get(&self) -> Option<&D::RootSignature> {
        self.root_signature.as_ref()
    }

    pub fn is_created(&self) -> bool {
        self.root_signature.is_some()
    }
}

impl<D: GraphicsDevice> Default for RootSignature<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{GraphicsError, OrFatal};
    use crate::gfx::mock::MockDevice;

    #[test]
    fn test_create_sets_handle() {
        let device = MockDevice::new();
        let mut root_signature = RootSignature::<MockDevice>::new();
        assert!(root_signature.get().is_none());

        root_signature.create(&device).unwrap();
        assert!(root_signature.get().is_some());
        assert_eq!(
            device.serialized_descs.borrow().as_slice(),
            &[RootSignatureDesc::input_assembler()]
        );
    }

    #[test]
    fn test_serialized_blob_released_after_create() {
        let device = MockDevice::new();
        let mut root_signature = RootSignature::<MockDevice>::new();
        root_signature.create(&device).unwrap();

        assert_eq!(device.blobs.created(), 1);
        assert_eq!(device.blobs.live(), 0);
    }

    #[test]
    fn test_recreate_releases_previous_handle_once() {
        let device = MockDevice::new();
        let mut root_signature = RootSignature::<MockDevice>::new();

        root_signature.create(&device).unwrap();
        assert_eq!(device.root_signatures.released(), 0);

        for expected_released in 1..=3 {
            root_signature.create(&device).unwrap();
            assert_eq!(device.root_signatures.released(), expected_released);
            assert_eq!(device.root_signatures.live(), 1);
        }
        assert_eq!(device.root_signatures.max_live(), 1);
        assert_eq!(root_signature.get().map(|h| h.id), Some(4));
    }

    #[test]
    fn test_drop_releases_exactly_once() {
        let device = MockDevice::new();
        {
            let mut root_signature = RootSignature::<MockDevice>::new();
            root_signature.create(&device).unwrap();
        }
        assert_eq!(device.root_signatures.created(), 1);
        assert_eq!(device.root_signatures.released(), 1);
    }

    #[test]
    fn test_drop_without_create_releases_nothing() {
        let device = MockDevice::new();
        drop(RootSignature::<MockDevice>::new());
        assert_eq!(device.root_signatures.released(), 0);
    }

    #[test]
    fn test_failed_build_leaves_handle_empty() {
        let device = MockDevice::new();
        let mut root_signature = RootSignature::<MockDevice>::new();
        root_signature.create(&device).unwrap();

        device.fail_root_signature.set(true);
        let err = root_signature.create(&device).unwrap_err();
        assert!(matches!(err.as_graphics(), Some(GraphicsError::RootSignatureCreation(_))));
        assert!(root_signature.get().is_none());
        assert_eq!(device.root_signatures.live(), 0);
        assert_eq!(device.blobs.live(), 0);
    }

    #[test]
    fn test_failed_serialize_never_builds() {
        let device = MockDevice::new();
        device.fail_serialize.set(true);
        let mut root_signature = RootSignature::<MockDevice>::new();
        assert!(root_signature.create(&device).is_err());
        assert_eq!(device.root_signatures.created(), 0);
    }

    #[test]
    #[should_panic(expected = "Failed to create root signature")]
    fn test_failed_build_takes_fatal_path() {
        let device = MockDevice::new();
        device.fail_root_signature.set(true);
        let mut root_signature = RootSignature::<MockDevice>::new();
        let result = root_signature.create(&device);
        assert!(root_signature.get().is_none());
        result.or_fatal("Failed to create root signature");
    }

    #[test]
    fn test_fatal_path_emits_diagnostic_once() {
        let device = MockDevice::new();
        device.fail_root_signature.set(true);
        let mut root_signature = RootSignature::<MockDevice>::new();

        let before = log::debug_output_count();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            root_signature.create(&device).or_fatal("Failed to create root signature")
        }));

        assert!(outcome.is_err());
        assert_eq!(log::debug_output_count() - before, 1);
    }
}
