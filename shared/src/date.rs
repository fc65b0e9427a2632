//! 时间类型模块
//!
//! - `Timestamp`: 可序列化的毫秒时间戳，用于令牌过期时间和资料缓存
//! - `format_display`: 把后端返回的时间字符串格式化为 `YYYY-MM-DD HH:MM:SS`

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};
use std::time::Duration;

// =========================================================
// Timestamp - 可传输的时间戳类型
// =========================================================

/// 毫秒时间戳
///
/// 内部存储为 `i64`，表示自 Unix 纪元以来的毫秒数
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    #[inline]
    pub const fn new(ms: i64) -> Self {
        Self(ms)
    }

    /// 从秒值创建（JWT 的 `exp` 字段以秒为单位）
    #[inline]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs * 1000)
    }

    #[inline]
    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn as_secs(&self) -> i64 {
        self.0 / 1000
    }

    /// 当前时间
    ///
    /// WASM 环境下读取 `Date.now()`，其他环境使用系统时钟。
    #[cfg(target_arch = "wasm32")]
    pub fn now() -> Self {
        Self(js_sys::Date::now() as i64)
    }

    /// 当前时间
    ///
    /// WASM 环境下读取 `Date.now()`，其他环境使用系统时钟。
    #[cfg(not(target_arch = "wasm32"))]
    pub fn now() -> Self {
        let ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or_default();
        Self(ms)
    }

    /// 距 `earlier` 已经过去的时长（时钟回拨时为零）
    pub fn since(&self, earlier: Timestamp) -> Duration {
        *self - earlier
    }
}

impl From<i64> for Timestamp {
    fn from(ms: i64) -> Self {
        Self(ms)
    }
}

impl From<Timestamp> for i64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl Add<Duration> for Timestamp {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self(self.0 + rhs.as_millis() as i64)
    }
}

impl Sub<Duration> for Timestamp {
    type Output = Self;

    fn sub(self, rhs: Duration) -> Self::Output {
        Self(self.0 - rhs.as_millis() as i64)
    }
}

impl Sub<Timestamp> for Timestamp {
    type Output = Duration;

    /// 计算两个时间戳之间的差值（返回 Duration）
    fn sub(self, rhs: Timestamp) -> Self::Output {
        let diff_ms = (self.0 - rhs.0).max(0);
        Duration::from_millis(diff_ms as u64)
    }
}

// =========================================================
// 展示格式
// =========================================================

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 后端可能返回的无时区时间格式
const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"];

/// 把时间字符串格式化为 `YYYY-MM-DD HH:MM:SS`
///
/// 带时区的 RFC 3339 字符串按其自身偏移展示；无法解析时返回空字符串。
pub fn format_display(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(DISPLAY_FORMAT).to_string();
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_default()
}
