use crate::use_services;
use crate::web::router::use_router;
use leptos::prelude::*;
use leptos::task::spawn_local;
use yun_shared::protocol::LoginRequest;

#[component]
pub fn LoginPage() -> impl IntoView {
    let services = use_services();
    let router = use_router();

    let (username, set_username) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (captcha_text, set_captcha_text) = signal(String::new());
    let (remember, set_remember) = signal(false);
    let (captcha_id, set_captcha_id) = signal(String::new());
    let (captcha_src, set_captcha_src) = signal(Option::<String>::None);
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let refresh_captcha = {
        let session = services.session.clone();
        move || {
            let session = session.clone();
            spawn_local(async move {
                match session.captcha().await {
                    Ok(captcha) => {
                        set_captcha_src.set(captcha.image_src());
                        set_captcha_id.set(captcha.captcha_id);
                    }
                    Err(e) => log::warn!("[Login] captcha unavailable: {}", e),
                }
            });
        }
    };
    refresh_captcha();

    let on_submit = {
        let session = services.session.clone();
        let refresh_captcha = refresh_captcha.clone();
        move |ev: leptos::ev::SubmitEvent| {
            ev.prevent_default();
            if username.get().trim().is_empty() || password.get().is_empty() {
                set_error_msg.set(Some("请输入用户名和密码".to_string()));
                return;
            }

            set_is_submitting.set(true);
            set_error_msg.set(None);

            let form = LoginRequest {
                username: Some(username.get().trim().to_string()),
                password: password.get(),
                captcha_id: captcha_id.get(),
                captcha_text: captcha_text.get(),
                remember: Some(remember.get()),
                ..Default::default()
            };
            let session = session.clone();
            let refresh_captcha = refresh_captcha.clone();
            spawn_local(async move {
                match session.login(form).await {
                    Ok(_) => router.navigate(&router.take_login_redirect()),
                    Err(e) => {
                        set_error_msg.set(Some(e.message().to_string()));
                        refresh_captcha();
                    }
                }
                set_is_submitting.set(false);
            });
        }
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <h1 class="text-3xl font-bold">"YUN"</h1>
                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Show when=move || error_msg.get().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{move || error_msg.get().unwrap_or_default()}</span>
                            </div>
                        </Show>
                        <input
                            type="text"
                            placeholder="用户名"
                            class="input input-bordered"
                            on:input=move |ev| set_username.set(event_target_value(&ev))
                            prop:value=username
                        />
                        <input
                            type="password"
                            placeholder="密码"
                            class="input input-bordered"
                            on:input=move |ev| set_password.set(event_target_value(&ev))
                            prop:value=password
                        />
                        <div class="flex gap-2">
                            <input
                                type="text"
                                placeholder="验证码"
                                class="input input-bordered flex-1"
                                on:input=move |ev| set_captcha_text.set(event_target_value(&ev))
                                prop:value=captcha_text
                            />
                            <img
                                class="h-12 cursor-pointer"
                                src=move || captcha_src.get().unwrap_or_default()
                                on:click={
                                    let refresh_captcha = refresh_captcha.clone();
                                    move |_| refresh_captcha()
                                }
                            />
                        </div>
                        <label class="label cursor-pointer">
                            <span class="label-text">"记住我"</span>
                            <input
                                type="checkbox"
                                class="checkbox"
                                on:change=move |ev| set_remember.set(event_target_checked(&ev))
                                prop:checked=remember
                            />
                        </label>
                        <button class="btn btn-primary" disabled=move || is_submitting.get()>
                            {move || if is_submitting.get() { "登录中..." } else { "登录" }}
                        </button>
                    </form>
                </div>
            </div>
        </div>
    }
}
