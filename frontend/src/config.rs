//! 运行配置
//!
//! 构建时通过环境变量注入（Trunk 构建时设置），读不到就使用默认值。

use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_APP_TITLE: &str = "YUN 社交媒体平台";
const DEFAULT_APP_DESCRIPTION: &str = "YUN 短视频社区：发现、分享、互动。";
const DEFAULT_APP_KEYWORDS: &str = "YUN, 短视频, 社交平台";
const DEFAULT_TOKEN_KEY: &str = "yun_token";

/// 默认令牌有效期（秒）
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;
/// 用户资料缓存时长
pub const PROFILE_CACHE_WINDOW: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_COMMENT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_FEED_PAGE_SIZE: u32 = 12;

/// 应用配置
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// API 根地址（不带结尾斜杠）
    pub api_base_url: String,
    pub app_title: String,
    pub app_description: String,
    pub app_keywords: String,
    /// 令牌在浏览器存储中的键名
    pub token_key: String,
    pub token_ttl_secs: u64,
    pub profile_cache_window: Duration,
    pub comment_page_size: u32,
    pub feed_page_size: u32,
}

impl AppConfig {
    /// 读取构建时环境变量
    pub fn from_env() -> Self {
        Self::with_base_url(option_env!("YUN_API_BASE_URL").unwrap_or(DEFAULT_API_BASE_URL))
            .with_meta(
                option_env!("YUN_APP_TITLE").unwrap_or(DEFAULT_APP_TITLE),
                option_env!("YUN_APP_DESCRIPTION").unwrap_or(DEFAULT_APP_DESCRIPTION),
                option_env!("YUN_APP_KEYWORDS").unwrap_or(DEFAULT_APP_KEYWORDS),
            )
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            api_base_url: base_url.trim_end_matches('/').to_string(),
            app_title: DEFAULT_APP_TITLE.to_string(),
            app_description: DEFAULT_APP_DESCRIPTION.to_string(),
            app_keywords: DEFAULT_APP_KEYWORDS.to_string(),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            profile_cache_window: PROFILE_CACHE_WINDOW,
            comment_page_size: DEFAULT_COMMENT_PAGE_SIZE,
            feed_page_size: DEFAULT_FEED_PAGE_SIZE,
        }
    }

    fn with_meta(mut self, title: &str, description: &str, keywords: &str) -> Self {
        self.app_title = title.to_string();
        self.app_description = description.to_string();
        self.app_keywords = keywords.to_string();
        self
    }

    /// 拼接 API 地址
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.api_base_url, path)
        } else {
            format!("{}/{}", self.api_base_url, path)
        }
    }

    /// 把后端返回的相对资源路径（头像、封面、视频文件）解析为完整地址
    ///
    /// 已经是 `http(s)://` 的地址原样返回，空路径返回空串。
    pub fn resolve_asset(&self, path: Option<&str>) -> String {
        let Some(path) = path.map(str::trim).filter(|p| !p.is_empty()) else {
            return String::new();
        };
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
