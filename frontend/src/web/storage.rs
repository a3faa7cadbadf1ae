//! 浏览器存储
//!
//! 持久层对应 localStorage（跨标签页、跨重启），
//! 标签页层对应 sessionStorage（随标签页关闭而清除）。

use carbonmart_shared::error::StorageError;
use carbonmart_shared::session::{KeyValueStore, Tier};

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn storage(tier: Tier) -> Result<web_sys::Storage, StorageError> {
        let window =
            web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".to_string()))?;
        let storage = match tier {
            Tier::Durable => window.local_storage(),
            Tier::Ephemeral => window.session_storage(),
        };
        // 隐私模式下访问存储可能直接抛出异常
        storage
            .map_err(|e| StorageError::Unavailable(format!("{:?}", e)))?
            .ok_or_else(|| StorageError::Unavailable(format!("{:?} storage disabled", tier)))
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, tier: Tier, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage(tier)?
            .get_item(key)
            .map_err(|e| StorageError::Unavailable(format!("{:?}", e)))
    }

    fn set(&self, tier: Tier, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage(tier)?
            .set_item(key, value)
            .map_err(|e| StorageError::WriteRejected(format!("{:?}", e)))
    }

    fn remove(&self, tier: Tier, key: &str) -> Result<(), StorageError> {
        Self::storage(tier)?
            .remove_item(key)
            .map_err(|e| StorageError::WriteRejected(format!("{:?}", e)))
    }
}
