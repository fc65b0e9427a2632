//! 全局提示条

use crate::notify::{NoticeLevel, use_notifier};
use crate::web::timer::Timeout;
use leptos::prelude::*;

/// 提示停留时长（毫秒）
const NOTICE_TTL_MS: u32 = 3000;

fn alert_class(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Success => "alert alert-success",
        NoticeLevel::Info => "alert alert-info",
        NoticeLevel::Warning => "alert alert-warning",
        NoticeLevel::Error => "alert alert-error",
    }
}

#[component]
pub fn NoticeBar() -> impl IntoView {
    let notifier = use_notifier();
    // 新提示替换旧定时器，旧定时器 drop 时自动取消
    let timer = StoredValue::new_local(None::<Timeout>);

    Effect::new(move |_| {
        let Some(notice) = notifier.current() else {
            return;
        };
        let id = notice.id;
        timer.set_value(Timeout::new(NOTICE_TTL_MS, move || notifier.dismiss(id)));
    });

    move || {
        notifier.current().map(|notice| {
            view! {
                <div class="toast toast-top toast-center z-50">
                    <div role="alert" class=alert_class(notice.level)>
                        <span>{notice.message}</span>
                    </div>
                </div>
            }
        })
    }
}
