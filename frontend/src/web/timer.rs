//! 定时器封装模块
//!
//! 使用 `web_sys` 的原生 `setTimeout`。

use wasm_bindgen::prelude::*;

/// 一次性定时器
///
/// 当 `Timeout` 被 drop 时，未触发的回调会被取消。
pub struct Timeout {
    handle: i32,
    #[allow(dead_code)]
    closure: Closure<dyn FnMut()>,
}

impl Timeout {
    /// 创建一次性定时器
    ///
    /// # 参数
    /// - `millis`: 延迟时间（毫秒）
    /// - `callback`: 到期后调用的回调
    ///
    /// 无法获取 window 或设置失败时返回 `None`。
    pub fn new<F>(millis: u32, callback: F) -> Option<Self>
    where
        F: FnMut() + 'static,
    {
        let closure = Closure::<dyn FnMut()>::new(callback);
        let window = web_sys::window()?;

        let handle = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                millis as i32,
            )
            .ok()?;

        Some(Self { handle, closure })
    }

    /// 取消定时器
    pub fn cancel(&self) {
        if let Some(window) = web_sys::window() {
            window.clear_timeout_with_handle(self.handle);
        }
    }
}

impl Drop for Timeout {
    fn drop(&mut self) {
        self.cancel();
    }
}
