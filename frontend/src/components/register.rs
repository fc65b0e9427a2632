use crate::use_services;
use crate::web::router::use_router;
use leptos::prelude::*;
use leptos::task::spawn_local;
use yun_shared::protocol::RegisterRequest;

#[component]
pub fn RegisterPage() -> impl IntoView {
    let services = use_services();
    let router = use_router();
    let notifier = services.api.notifier();

    let (username, set_username) = signal(String::new());
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (code, set_code) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);

    let send_code = {
        let session = services.session.clone();
        move |_: leptos::ev::MouseEvent| {
            let session = session.clone();
            spawn_local(async move {
                match session.send_email_code(&email.get_untracked()).await {
                    Ok(()) => notifier.success("验证码已发送"),
                    Err(e) => notifier.error(e.message().to_string()),
                }
            });
        }
    };

    let on_submit = {
        let session = services.session.clone();
        move |ev: leptos::ev::SubmitEvent| {
            ev.prevent_default();
            let form = RegisterRequest {
                username: username.get().trim().to_string(),
                email: email.get().trim().to_string(),
                password: password.get(),
                verification_code: Some(code.get()).filter(|c| !c.is_empty()),
            };
            if form.username.is_empty() || form.email.is_empty() || form.password.is_empty() {
                notifier.warning("请完整填写注册信息");
                return;
            }

            set_is_submitting.set(true);
            let session = session.clone();
            spawn_local(async move {
                match session.register(&form).await {
                    Ok(()) => {
                        notifier.success("注册成功，请登录");
                        router.navigate("/login");
                    }
                    Err(e) => notifier.error(e.message().to_string()),
                }
                set_is_submitting.set(false);
            });
        }
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="card w-full max-w-md shadow-2xl bg-base-100">
                <form class="card-body" on:submit=on_submit>
                    <h1 class="text-2xl font-bold">"注册"</h1>
                    <input
                        type="text"
                        placeholder="用户名"
                        class="input input-bordered"
                        on:input=move |ev| set_username.set(event_target_value(&ev))
                        prop:value=username
                    />
                    <div class="flex gap-2">
                        <input
                            type="email"
                            placeholder="邮箱"
                            class="input input-bordered flex-1"
                            on:input=move |ev| set_email.set(event_target_value(&ev))
                            prop:value=email
                        />
                        <button type="button" class="btn" on:click=send_code>"发送验证码"</button>
                    </div>
                    <input
                        type="text"
                        placeholder="邮箱验证码"
                        class="input input-bordered"
                        on:input=move |ev| set_code.set(event_target_value(&ev))
                        prop:value=code
                    />
                    <input
                        type="password"
                        placeholder="密码"
                        class="input input-bordered"
                        on:input=move |ev| set_password.set(event_target_value(&ev))
                        prop:value=password
                    />
                    <button class="btn btn-primary" disabled=move || is_submitting.get()>"注册"</button>
                    <a class="link" href="/login" on:click=move |ev| {
                        ev.prevent_default();
                        router.navigate("/login");
                    }>"已有账号？去登录"</a>
                </form>
            </div>
        </div>
    }
}
