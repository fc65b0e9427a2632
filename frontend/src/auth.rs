//! 认证令牌模块
//!
//! 令牌以 `{"token": "...", "expiresAt": <毫秒>}` 的形式保存在一个存储键下：
//! 勾选"记住我"时写入 LocalStorage，否则写入 SessionStorage。
//! 读取时自动检查过期，过期或损坏的条目会被清除。

use crate::web::storage::{LocalStorage, MemoryStorage, SessionStorage, StorageBackend};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use yun_shared::Timestamp;

/// 存储中的令牌条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TokenEntry {
    token: String,
    #[serde(rename = "expiresAt")]
    expires_at: Timestamp,
}

/// 令牌存储
#[derive(Clone)]
pub struct TokenStore {
    key: String,
    persistent: Arc<dyn StorageBackend>,
    session: Arc<dyn StorageBackend>,
}

impl TokenStore {
    pub fn new(
        key: impl Into<String>,
        persistent: Arc<dyn StorageBackend>,
        session: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            key: key.into(),
            persistent,
            session,
        }
    }

    /// 浏览器存储（LocalStorage + SessionStorage）
    pub fn browser(key: impl Into<String>) -> Self {
        Self::new(key, Arc::new(LocalStorage), Arc::new(SessionStorage))
    }

    /// 纯内存存储
    pub fn memory(key: impl Into<String>) -> Self {
        Self::new(key, Arc::new(MemoryStorage::new()), Arc::new(MemoryStorage::new()))
    }

    /// 读取有效令牌，过期即清除
    pub fn get(&self) -> Option<String> {
        self.get_at(Timestamp::now())
    }

    pub(crate) fn get_at(&self, now: Timestamp) -> Option<String> {
        // LocalStorage 优先
        let raw = self
            .persistent
            .get(&self.key)
            .or_else(|| self.session.get(&self.key))?;

        let entry = match serde_json::from_str::<TokenEntry>(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("[Token] 存储的令牌无法解析，已清除: {}", e);
                self.remove();
                return None;
            }
        };

        if entry.token.is_empty() || entry.expires_at.as_millis() == 0 {
            log::warn!("[Token] 存储的令牌不完整，已清除");
            self.remove();
            return None;
        }

        if now > entry.expires_at {
            log::info!("[Token] 令牌已过期，已清除");
            self.remove();
            return None;
        }

        Some(entry.token)
    }

    /// 保存令牌
    ///
    /// # 参数
    /// - `token`: 访问令牌
    /// - `ttl`: 有效期
    /// - `remember`: `true` 写入 LocalStorage，否则写入 SessionStorage
    pub fn set(&self, token: &str, ttl: Duration, remember: bool) {
        self.set_at(token, ttl, remember, Timestamp::now());
    }

    pub(crate) fn set_at(&self, token: &str, ttl: Duration, remember: bool, now: Timestamp) {
        let entry = TokenEntry {
            token: token.to_string(),
            expires_at: now + ttl,
        };
        let payload = match serde_json::to_string(&entry) {
            Ok(payload) => payload,
            Err(e) => {
                log::error!("[Token] 序列化令牌失败: {}", e);
                return;
            }
        };

        let backend = if remember { &self.persistent } else { &self.session };
        if !backend.set(&self.key, &payload) {
            log::warn!("[Token] 写入存储失败");
        }
    }

    /// 从两种存储中同时删除
    pub fn remove(&self) {
        self.persistent.delete(&self.key);
        self.session.delete(&self.key);
    }

    pub fn has_token(&self) -> bool {
        self.get().is_some()
    }
}

// =========================================================
// JWT 过期检测
// =========================================================

/// 读取 JWT 载荷中的 `exp`（秒）
pub fn jwt_expiry(token: &str) -> Option<Timestamp> {
    let payload = token.split('.').nth(1)?;
    let trimmed = payload.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(trimmed)
        .or_else(|_| STANDARD_NO_PAD.decode(trimmed))
        .ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.get("exp")?.as_f64()?;
    Some(Timestamp::new((exp * 1000.0) as i64))
}

/// 令牌是否已过期
///
/// 载荷无法解码的令牌一律视为过期。
pub fn token_expired(token: &str, now: Timestamp) -> bool {
    match jwt_expiry(token) {
        Some(exp) => now > exp,
        None => true,
    }
}
