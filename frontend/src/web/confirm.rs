//! 确认对话框

/// 需要用户二次确认的操作（删除评论、取消关注）通过此接口询问
pub trait Confirm: Send + Sync {
    /// 返回用户是否确认
    fn confirm(&self, message: &str) -> bool;
}

/// 基于 `window.confirm` 的实现
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserConfirm;

impl Confirm for BrowserConfirm {
    fn confirm(&self, message: &str) -> bool {
        web_sys::window()
            .and_then(|w| w.confirm_with_message(message).ok())
            .unwrap_or(false)
    }
}

/// 固定应答（测试用），并记录被询问的消息
#[cfg(test)]
pub struct FixedConfirm {
    pub answer: bool,
    pub asked: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl FixedConfirm {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            asked: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Confirm for FixedConfirm {
    fn confirm(&self, message: &str) -> bool {
        self.asked.lock().unwrap().push(message.to_string());
        self.answer
    }
}
