//! 认证模块
//!
//! 管理用户会话，与路由系统解耦：
//! 路由服务只读取 `session` 信号，登录、注销或其他标签页修改存储时信号随之变化。

use carbonmart_shared::client::ApiClient;
use carbonmart_shared::config::ClientConfig;
use carbonmart_shared::error::ClientResult;
use carbonmart_shared::protocol::{ApiRequest, LoginResponse};
use carbonmart_shared::session::{Session, SessionStore};
use leptos::prelude::*;
use log::debug;
use wasm_bindgen::prelude::*;

use crate::web::{BrowserStorage, WebFetch};

pub type Api = ApiClient<WebFetch, BrowserStorage>;

/// 认证上下文
///
/// 会话存储和请求客户端共享同一个 `SessionStore`，通过 Context 在组件间共享。
#[derive(Clone)]
pub struct AuthContext {
    session: RwSignal<Option<Session>>,
    store: SessionStore<BrowserStorage>,
    api: Api,
}

impl AuthContext {
    pub fn new(config: ClientConfig) -> Self {
        let store = SessionStore::new(BrowserStorage, config.session_key.clone());
        let session = RwSignal::new(store.current_user());
        let api = ApiClient::new(WebFetch, config, store.clone());
        Self {
            session,
            store,
            api,
        }
    }

    /// 会话信号（用于路由服务注入）
    pub fn session_signal(&self) -> Signal<Option<Session>> {
        self.session.into()
    }

    pub fn session(&self) -> Option<Session> {
        self.session.get()
    }

    /// 从存储读取当前会话（过期令牌在此被清除），并同步会话信号
    pub fn current(&self) -> Option<Session> {
        let current = self.store.current_user();
        self.sync(current.clone());
        current
    }

    fn sync(&self, current: Option<Session>) {
        if self.session.with_untracked(|s| *s != current) {
            self.session.set(current);
        }
    }

    /// 保存登录结果，凭据已由服务器验证
    pub fn sign_in(&self, response: LoginResponse, remember: bool) -> Session {
        let session = self.store.login(response.user, response.token, remember);
        self.session.set(Some(session.clone()));
        session
    }

    /// 注销；导航由路由服务监听会话信号自动处理
    pub fn sign_out(&self) {
        self.store.logout();
        self.session.set(None);
    }

    /// 从存储重新读取会话（其他标签页修改过存储）
    pub fn refresh(&self) {
        self.store.reload();
        self.current();
    }

    /// 发送类型化请求
    ///
    /// 请求期间存储可能被清空（401 或令牌过期），返回后同步会话信号。
    pub async fn call<A: ApiRequest>(&self, req: &A) -> ClientResult<A::Response> {
        let result = self.api.call(req).await;
        self.current();
        result
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 监听其他标签页对会话键的修改
pub fn init_cross_tab_sync(ctx: &AuthContext, key: String) {
    let ctx = ctx.clone();
    let closure = Closure::<dyn Fn(web_sys::StorageEvent)>::new(move |ev: web_sys::StorageEvent| {
        // key 为 None 表示整个存储被 clear()
        let relevant = ev.key().is_none_or(|k| k == key);
        if relevant {
            debug!("[Auth] session changed in another tab");
            ctx.refresh();
        }
    });

    if let Some(window) = web_sys::window() {
        let _ =
            window.add_event_listener_with_callback("storage", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}
