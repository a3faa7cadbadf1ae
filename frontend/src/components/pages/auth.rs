//! 登录、注册、OTP 与密码相关页面
//!
//! 表单先在本地校验，校验失败不发送请求；服务器返回的错误通过提示框展示。

use carbonmart_shared::client::encode_component;
use carbonmart_shared::error::{ClientError, FieldErrors};
use carbonmart_shared::protocol::{Portal, ResendOtpRequest};
use carbonmart_shared::route::AppRoute;
use carbonmart_shared::session::Role;
use carbonmart_shared::validation::{
    ChangePasswordForm, ForgotPasswordForm, LoginForm, OtpForm, RegisterForm,
};
use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_auth;
use crate::components::form::{Checkbox, FormAlert, SubmitButton, TextField};
use crate::components::toast::use_toaster;
use crate::web::router::{Link, use_router};

fn portal_title(portal: Portal) -> &'static str {
    match portal {
        Portal::Public => "Sign in to CarbonMart",
        Portal::Admin => "Administrator sign in",
        Portal::Cva => "Verifier (CVA) sign in",
    }
}

fn forgot_route(portal: Portal) -> AppRoute {
    match portal {
        Portal::Public => AppRoute::ForgotPassword,
        Portal::Admin => AppRoute::AdminForgotPassword,
        Portal::Cva => AppRoute::CvaForgotPassword,
    }
}

fn login_route(portal: Portal) -> AppRoute {
    match portal {
        Portal::Public => AppRoute::Login,
        Portal::Admin => AppRoute::AdminLogin,
        Portal::Cva => AppRoute::CvaLogin,
    }
}

/// 服务器返回的字段错误回填到表单，其余错误显示在顶部
fn apply_error(e: &ClientError, errors: RwSignal<FieldErrors>, alert: RwSignal<Option<String>>) {
    match e {
        ClientError::Validation(fields) => errors.set(fields.clone()),
        other => alert.set(Some(other.user_message())),
    }
}

#[component]
fn Card(#[prop(into)] title: String, children: Children) -> impl IntoView {
    view! {
        <div class="text-center mb-4">
            <h1 class="text-3xl font-bold">{title}</h1>
        </div>
        <div class="card shrink-0 w-full shadow-2xl bg-base-100">{children()}</div>
    }
}

#[component]
pub fn LoginPage(portal: Portal) -> impl IntoView {
    let auth = use_auth();
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let remember = RwSignal::new(false);
    let errors = RwSignal::new(FieldErrors::new());
    let alert = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);

    let form = move || LoginForm {
        email: email.get_untracked(),
        password: password.get_untracked(),
        remember: remember.get_untracked(),
    };
    let check = Callback::new(move |name: &'static str| {
        LoginForm::schema().validate_field(name, &form().values())
    });

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        alert.set(None);
        let valid = match form().validate() {
            Ok(valid) => valid,
            Err(e) => {
                errors.set(e);
                return;
            }
        };

        busy.set(true);
        let auth = auth.clone();
        spawn_local(async move {
            let remember = valid.remember;
            match auth.call(&valid.into_request(portal)).await {
                // 路由服务监听会话信号，登录后自动跳转到角色主页
                Ok(response) => {
                    auth.sign_in(response, remember);
                }
                Err(e) => apply_error(&e, errors, alert),
            }
            busy.set(false);
        });
    };

    view! {
        <Card title=portal_title(portal)>
            <form class="card-body" on:submit=on_submit novalidate>
                <FormAlert message=alert />
                <TextField
                    label="Email"
                    name="email"
                    input_type="email"
                    placeholder="you@example.com"
                    value=email
                    errors=errors
                    check=check
                />
                <TextField
                    label="Password"
                    name="password"
                    input_type="password"
                    value=password
                    errors=errors
                    check=check
                />
                <Checkbox label="Remember me" checked=remember />
                <SubmitButton label="Sign in" busy=busy />
                <div class="flex justify-between text-sm mt-2">
                    <Link to=forgot_route(portal) class="link">"Forgot password?"</Link>
                    <Show when=move || portal == Portal::Public>
                        <Link to=AppRoute::Register class="link">"Create an account"</Link>
                    </Show>
                </div>
            </form>
        </Card>
    }
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let toaster = use_toaster();
    let full_name = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let phone = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let is_company = RwSignal::new(false);
    let accept_terms = RwSignal::new(false);
    let errors = RwSignal::new(FieldErrors::new());
    let alert = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);

    let form = move || RegisterForm {
        full_name: full_name.get_untracked(),
        email: email.get_untracked(),
        phone: phone.get_untracked(),
        password: password.get_untracked(),
        confirm_password: confirm.get_untracked(),
        role: if is_company.get_untracked() {
            Role::Company
        } else {
            Role::EvOwner
        },
        accept_terms: accept_terms.get_untracked(),
    };
    let check = Callback::new(move |name: &'static str| {
        RegisterForm::schema().validate_field(name, &form().values())
    });

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        alert.set(None);
        let request = match form().validate() {
            Ok(request) => request,
            Err(e) => {
                errors.set(e);
                return;
            }
        };

        busy.set(true);
        let auth = auth.clone();
        spawn_local(async move {
            let email = request.email.clone();
            match auth.call(&request).await {
                Ok(_) => {
                    toaster.success("Account created. Check your email for the code.");
                    router.navigate(&format!("{}?email={}", AppRoute::Otp, encode_component(&email)));
                }
                Err(e) => apply_error(&e, errors, alert),
            }
            busy.set(false);
        });
    };

    view! {
        <Card title="Create your account">
            <form class="card-body" on:submit=on_submit novalidate>
                <FormAlert message=alert />
                <TextField label="Full name" name="fullName" value=full_name errors=errors check=check />
                <TextField
                    label="Email"
                    name="email"
                    input_type="email"
                    value=email
                    errors=errors
                    check=check
                />
                <TextField
                    label="Phone"
                    name="phone"
                    input_type="tel"
                    placeholder="+254 700 000 000"
                    value=phone
                    errors=errors
                    check=check
                />
                <TextField
                    label="Password"
                    name="password"
                    input_type="password"
                    value=password
                    errors=errors
                    check=check
                />
                <TextField
                    label="Confirm password"
                    name="confirmPassword"
                    input_type="password"
                    value=confirm
                    errors=errors
                    check=check
                />
                <Checkbox label="I am registering a company" checked=is_company />
                <Checkbox label="I accept the terms of service" checked=accept_terms />
                <Show when=move || errors.with(|e| e.get("acceptTerms").is_some())>
                    <span class="text-error text-sm">
                        {move || errors.with(|e| e.get("acceptTerms").unwrap_or_default().to_string())}
                    </span>
                </Show>
                <SubmitButton label="Register" busy=busy />
                <Link to=AppRoute::Login class="link text-sm mt-2">"Already registered? Sign in"</Link>
            </form>
        </Card>
    }
}

/// 从地址栏查询串中取出预填的邮箱
fn email_from_query() -> String {
    web_sys::window()
        .and_then(|w| w.location().search().ok())
        .and_then(|search| {
            search
                .trim_start_matches('?')
                .split('&')
                .find_map(|pair| pair.strip_prefix("email=").map(str::to_string))
        })
        .map(|raw| {
            js_sys::decode_uri_component(&raw)
                .map(String::from)
                .unwrap_or(raw)
        })
        .unwrap_or_default()
}

#[component]
pub fn OtpPage() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let toaster = use_toaster();
    let email = RwSignal::new(email_from_query());
    let code = RwSignal::new(String::new());
    let errors = RwSignal::new(FieldErrors::new());
    let alert = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);

    let on_submit = {
        let auth = auth.clone();
        move |ev: SubmitEvent| {
            ev.prevent_default();
            alert.set(None);
            let form = OtpForm {
                email: email.get_untracked(),
                code: code.get_untracked(),
            };
            let request = match form.validate() {
                Ok(request) => request,
                Err(e) => {
                    errors.set(e);
                    return;
                }
            };

            busy.set(true);
            let auth = auth.clone();
            spawn_local(async move {
                match auth.call(&request).await {
                    Ok(_) => {
                        toaster.success("Email verified. You can sign in now.");
                        router.navigate_to(&AppRoute::Login);
                    }
                    Err(e) => apply_error(&e, errors, alert),
                }
                busy.set(false);
            });
        }
    };

    let on_resend = move |_| {
        let request = ResendOtpRequest {
            email: email.get_untracked().trim().to_string(),
        };
        if request.email.is_empty() {
            errors.update(|e| e.insert("email", "Email is required"));
            return;
        }
        let auth = auth.clone();
        spawn_local(async move {
            match auth.call(&request).await {
                Ok(_) => toaster.success("A new code is on its way."),
                Err(e) => toaster.error(&e),
            }
        });
    };

    view! {
        <Card title="Verify your email">
            <form class="card-body" on:submit=on_submit novalidate>
                <FormAlert message=alert />
                <TextField label="Email" name="email" input_type="email" value=email errors=errors />
                <TextField
                    label="Verification code"
                    name="otp"
                    placeholder="123456"
                    value=code
                    errors=errors
                />
                <SubmitButton label="Verify" busy=busy />
                <button type="button" class="btn btn-ghost btn-sm mt-2" on:click=on_resend>
                    "Resend code"
                </button>
            </form>
        </Card>
    }
}

#[component]
pub fn ForgotPasswordPage(portal: Portal) -> impl IntoView {
    let auth = use_auth();
    let toaster = use_toaster();
    let email = RwSignal::new(String::new());
    let errors = RwSignal::new(FieldErrors::new());
    let alert = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        alert.set(None);
        let form = ForgotPasswordForm {
            email: email.get_untracked(),
        };
        let request = match form.validate(portal) {
            Ok(request) => request,
            Err(e) => {
                errors.set(e);
                return;
            }
        };

        busy.set(true);
        let auth = auth.clone();
        spawn_local(async move {
            match auth.call(&request).await {
                Ok(_) => toaster.success("If the account exists, a reset link has been sent."),
                Err(e) => apply_error(&e, errors, alert),
            }
            busy.set(false);
        });
    };

    view! {
        <Card title="Reset your password">
            <form class="card-body" on:submit=on_submit novalidate>
                <FormAlert message=alert />
                <TextField label="Email" name="email" input_type="email" value=email errors=errors />
                <SubmitButton label="Send reset link" busy=busy />
                <Link to=login_route(portal) class="link text-sm mt-2">"Back to sign in"</Link>
            </form>
        </Card>
    }
}

#[component]
pub fn ChangePasswordPage(portal: Portal) -> impl IntoView {
    let auth = use_auth();
    let toaster = use_toaster();
    let current = RwSignal::new(String::new());
    let next = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let errors = RwSignal::new(FieldErrors::new());
    let alert = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);

    let form = move || ChangePasswordForm {
        current_password: current.get_untracked(),
        new_password: next.get_untracked(),
        confirm_password: confirm.get_untracked(),
    };
    let check = Callback::new(move |name: &'static str| {
        ChangePasswordForm::schema().validate_field(name, &form().values())
    });

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        alert.set(None);
        let request = match form().validate(portal) {
            Ok(request) => request,
            Err(e) => {
                errors.set(e);
                return;
            }
        };

        busy.set(true);
        let auth = auth.clone();
        spawn_local(async move {
            match auth.call(&request).await {
                Ok(_) => {
                    toaster.success("Password updated.");
                    current.set(String::new());
                    next.set(String::new());
                    confirm.set(String::new());
                }
                Err(e) => apply_error(&e, errors, alert),
            }
            busy.set(false);
        });
    };

    view! {
        <div class="card bg-base-100 shadow-xl max-w-lg">
            <form class="card-body" on:submit=on_submit novalidate>
                <h2 class="card-title">"Change password"</h2>
                <FormAlert message=alert />
                <TextField
                    label="Current password"
                    name="currentPassword"
                    input_type="password"
                    value=current
                    errors=errors
                    check=check
                />
                <TextField
                    label="New password"
                    name="newPassword"
                    input_type="password"
                    value=next
                    errors=errors
                    check=check
                />
                <TextField
                    label="Confirm new password"
                    name="confirmPassword"
                    input_type="password"
                    value=confirm
                    errors=errors
                    check=check
                />
                <SubmitButton label="Update password" busy=busy />
            </form>
        </div>
    }
}
