//! 类型化标识符
//!
//! 后端不同接口返回的 ID 既可能是数字也可能是数字字符串（例如 `7` 与 `"7"`）。
//! 这里统一解码为 `u64` 新类型，比较时不再需要宽松相等。

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 解码时接受的原始 ID 形态
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseId {
    Int(u64),
    Float(f64),
    Text(String),
}

impl LooseId {
    fn into_u64(self) -> Result<u64, String> {
        match self {
            LooseId::Int(v) => Ok(v),
            LooseId::Float(v) if v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 => {
                Ok(v as u64)
            }
            LooseId::Float(v) => Err(format!("invalid id: {}", v)),
            LooseId::Text(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| format!("invalid id: {:?}", s)),
        }
    }
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            #[inline]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            #[inline]
            pub const fn get(&self) -> u64 {
                self.0
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                LooseId::deserialize(deserializer)?
                    .into_u64()
                    .map($name)
                    .map_err(de::Error::custom)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<u64>().map($name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// 评论 ID
    CommentId
);
define_id!(
    /// 用户 ID
    UserId
);
define_id!(
    /// 视频 ID
    VideoId
);

// =========================================================
// 宽松数值解码
// =========================================================

/// 把 `null` 当作类型默认值解码（缺失字段需配合 `#[serde(default)]`）
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_accepts_number_and_numeric_string() {
        let a: CommentId = serde_json::from_value(json!(7)).unwrap();
        let b: CommentId = serde_json::from_value(json!("7")).unwrap();
        let c: CommentId = serde_json::from_value(json!(7.0)).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn id_rejects_garbage() {
        assert!(serde_json::from_value::<VideoId>(json!("abc")).is_err());
        assert!(serde_json::from_value::<VideoId>(json!(1.5)).is_err());
        assert!(serde_json::from_value::<VideoId>(json!(-3)).is_err());
    }

    #[test]
    fn id_serializes_as_number() {
        assert_eq!(serde_json::to_value(UserId(42)).unwrap(), json!(42));
    }

    #[test]
    fn null_counter_becomes_zero() {
        #[derive(Deserialize)]
        struct Counters {
            #[serde(default, deserialize_with = "null_as_default")]
            like_count: u64,
            #[serde(default, deserialize_with = "null_as_default")]
            reply_count: u64,
        }

        let c: Counters = serde_json::from_value(json!({ "like_count": null })).unwrap();
        assert_eq!(c.like_count, 0);
        assert_eq!(c.reply_count, 0);
    }
}
