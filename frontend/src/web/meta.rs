//! 页面元信息（标题、description、keywords）

use super::route::RouteMeta;
use crate::config::AppConfig;

/// 补齐默认值后的元信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub keywords: String,
}

impl PageMeta {
    /// 路由未声明（或为空）的字段取应用配置中的默认值
    pub fn resolve(meta: RouteMeta, config: &AppConfig) -> Self {
        Self {
            title: pick(meta.title, &config.app_title),
            description: pick(meta.description, &config.app_description),
            keywords: pick(meta.keywords, &config.app_keywords),
        }
    }
}

fn pick(value: Option<&str>, fallback: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// 写入 `document.title` 与 `<meta name=...>`（不存在时创建）
pub fn apply_meta(meta: &PageMeta) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    document.set_title(&meta.title);

    for (name, content) in [
        ("description", meta.description.as_str()),
        ("keywords", meta.keywords.as_str()),
    ] {
        if let Err(e) = set_meta_tag(&document, name, content) {
            log::warn!("[Meta] failed to set {}: {:?}", name, e);
        }
    }
}

fn set_meta_tag(
    document: &web_sys::Document,
    name: &str,
    content: &str,
) -> Result<(), wasm_bindgen::JsValue> {
    let selector = format!("meta[name=\"{}\"]", name);
    let element = match document.query_selector(&selector)? {
        Some(element) => element,
        None => {
            let element = document.create_element("meta")?;
            element.set_attribute("name", name)?;
            if let Some(head) = document.head() {
                head.append_child(&element)?;
            }
            element
        }
    };
    element.set_attribute("content", content)
}
