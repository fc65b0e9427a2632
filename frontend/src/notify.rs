//! 用户提示通道
//!
//! 所有面向用户的提示（成功 / 信息 / 警告 / 错误）都写入同一个信号，
//! 界面层订阅 `current()` 渲染并在超时后清除。

use leptos::prelude::*;

/// 提示级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// 一条提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// 自增序号，用于只清除自己那条提示
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
}

/// 提示服务
#[derive(Clone, Copy)]
pub struct Notifier {
    current: RwSignal<Option<Notice>>,
    next_id: RwSignal<u64>,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            current: RwSignal::new(None),
            next_id: RwSignal::new(1),
        }
    }

    /// 当前提示（响应式读取）
    pub fn current(&self) -> Option<Notice> {
        self.current.get()
    }

    pub fn current_untracked(&self) -> Option<Notice> {
        self.current.get_untracked()
    }

    pub fn signal(&self) -> RwSignal<Option<Notice>> {
        self.current
    }

    pub fn notify(&self, level: NoticeLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            NoticeLevel::Error => log::error!("[Notice] {}", message),
            NoticeLevel::Warning => log::warn!("[Notice] {}", message),
            _ => log::info!("[Notice] {}", message),
        }

        let id = self.next_id.get_untracked();
        self.next_id.set(id + 1);
        self.current.set(Some(Notice { id, level, message }));
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(NoticeLevel::Success, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(NoticeLevel::Info, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.notify(NoticeLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(NoticeLevel::Error, message);
    }

    /// 清除指定提示（已被更新的提示覆盖时不做任何事）
    pub fn dismiss(&self, id: u64) {
        if self.current.with_untracked(|n| n.as_ref().is_some_and(|n| n.id == id)) {
            self.current.set(None);
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

/// 从 Context 获取提示服务
pub fn use_notifier() -> Notifier {
    use_context::<Notifier>().expect("Notifier should be provided")
}
