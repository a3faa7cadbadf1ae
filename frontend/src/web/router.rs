//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，所有对 window.history 的操作都集中在此模块。
//! 每次导航（主动跳转、前进/后退、会话变化）都用 **当时** 的会话重新执行守卫。

use carbonmart_shared::guard::{self, Navigation};
use carbonmart_shared::route::AppRoute;
use carbonmart_shared::session::Session;
use leptos::prelude::*;
use log::debug;
use wasm_bindgen::prelude::*;

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 推送 History 状态（内部工具函数）
fn push_history_state(path: &str) {
    if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
        let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
    }
}

/// 替换 History 状态（内部工具函数，用于重定向）
fn replace_history_state(path: &str) {
    if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
        let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
    }
}

/// 路由器服务
///
/// 通过注入的会话信号和会话读取函数实现与认证系统的解耦。
/// 守卫判定总是调用 `resolve_session` 读取存储，信号只用于感知变化。
#[derive(Clone, Copy)]
pub struct RouterService {
    current_route: ReadSignal<AppRoute>,
    set_route: WriteSignal<AppRoute>,
    session: Signal<Option<Session>>,
    resolve_session: Callback<(), Option<Session>>,
}

impl RouterService {
    fn new(session: Signal<Option<Session>>, resolve_session: Callback<(), Option<Session>>) -> Self {
        // 首屏同样经过守卫，重定向用 replaceState 不留历史
        let path = current_path();
        let nav = guard::navigate(&path, resolve_session.run(()).as_ref());
        if nav.redirected {
            replace_history_state(&nav.route.to_path());
        }
        let (current_route, set_route) = signal(nav.route);

        Self {
            current_route,
            set_route,
            session,
            resolve_session,
        }
    }

    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// **核心方法：导航与守卫**
    pub fn navigate(&self, path: &str) {
        let nav = guard::navigate(path, self.resolve_session.run(()).as_ref());
        debug!("[Router] navigate {} -> {}", path, nav.route);
        if nav.redirected {
            self.commit(nav, true);
        } else {
            // 未重定向时保留调用方给出的查询串
            push_history_state(path);
            self.set_route.set(nav.route);
        }
    }

    pub fn navigate_to(&self, route: &AppRoute) {
        self.navigate(&route.to_path());
    }

    fn commit(&self, nav: Navigation, use_push: bool) {
        let path = nav.route.to_path();
        if use_push {
            push_history_state(&path);
        } else {
            replace_history_state(&path);
        }
        self.set_route.set(nav.route);
    }

    /// 浏览器后退/前进：同样执行守卫
    fn init_popstate_listener(&self) {
        let router = *self;
        let closure = Closure::<dyn Fn()>::new(move || {
            let nav = guard::navigate(&current_path(), router.resolve_session.run(()).as_ref());
            if nav.redirected {
                router.commit(nav, false);
            } else {
                router.set_route.set(nav.route);
            }
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 会话变化（登录、注销、其他标签页修改）后重新检查当前路由
    fn setup_session_guard(&self) {
        let router = *self;
        Effect::new(move |_| {
            let session = router.session.get();
            let route = router.current_route.get_untracked();
            let nav = guard::navigate(&route.to_path(), session.as_ref());
            if nav.route != route {
                debug!("[Router] session changed, {} -> {}", route, nav.route);
                router.commit(nav, true);
            }
        });
    }
}

fn provide_router(
    session: Signal<Option<Session>>,
    resolve_session: Callback<(), Option<Session>>,
) -> RouterService {
    let router = RouterService::new(session, resolve_session);
    router.init_popstate_listener();
    router.setup_session_guard();
    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
#[component]
pub fn Router(
    /// 会话信号
    session: Signal<Option<Session>>,
    /// 导航时读取当前会话（会清除已过期的会话）
    resolve_session: Callback<(), Option<Session>>,
    children: Children,
) -> impl IntoView {
    provide_router(session, resolve_session);
    children()
}

/// 路由出口组件
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();
    move || matcher(router.current_route().get())
}

/// 站内链接，点击时走路由服务而不是整页刷新
#[component]
pub fn Link(
    to: AppRoute,
    #[prop(optional, into)] class: String,
    children: Children,
) -> impl IntoView {
    let router = use_router();
    let href = to.to_path();
    let on_click = move |ev: web_sys::MouseEvent| {
        if ev.ctrl_key() || ev.meta_key() || ev.shift_key() {
            return;
        }
        ev.prevent_default();
        router.navigate_to(&to);
    };

    view! {
        <a href=href class=class on:click=on_click>
            {children()}
        </a>
    }
}
