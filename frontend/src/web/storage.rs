//! 浏览器存储封装模块
//!
//! 使用 `web_sys::Storage` 提供 LocalStorage / SessionStorage 两种持久化后端，
//! 测试与非浏览器环境使用内存实现。

use std::collections::HashMap;
use std::sync::Mutex;

/// 键值存储后端
pub trait StorageBackend: Send + Sync {
    /// 获取存储的字符串值
    ///
    /// # 返回
    /// - `Some(String)` 如果键存在且有值
    /// - `None` 如果键不存在或发生错误
    fn get(&self, key: &str) -> Option<String>;

    /// 设置存储值，成功返回 `true`
    fn set(&self, key: &str, value: &str) -> bool;

    /// 删除存储的键值对，成功返回 `true`
    fn delete(&self, key: &str) -> bool;
}

/// 浏览器 LocalStorage（跨会话保留）
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

/// 浏览器 SessionStorage（关闭标签页即清除）
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionStorage;

fn local() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

fn session() -> Option<web_sys::Storage> {
    web_sys::window()?.session_storage().ok()?
}

macro_rules! web_storage_backend {
    ($name:ident, $open:ident) => {
        impl StorageBackend for $name {
            fn get(&self, key: &str) -> Option<String> {
                $open()?.get_item(key).ok()?
            }

            fn set(&self, key: &str, value: &str) -> bool {
                $open().and_then(|s| s.set_item(key, value).ok()).is_some()
            }

            fn delete(&self, key: &str) -> bool {
                $open().and_then(|s| s.remove_item(key).ok()).is_some()
            }
        }
    };
}

web_storage_backend!(LocalStorage, local);
web_storage_backend!(SessionStorage, session);

/// 内存存储
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        true
    }

    fn delete(&self, key: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        true
    }
}
