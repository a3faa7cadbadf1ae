//! CarbonMart 前端应用
//!
//! 采用 Context-Driven 的架构：
//! - `carbonmart_shared`: 路由表、守卫、会话、请求层（与浏览器无关）
//! - `web`: 浏览器 API 的轻量封装（fetch、存储、History、控制台）
//! - `auth`: 会话信号与请求客户端
//! - `components`: UI 组件层，按子应用组织页面

mod auth;
mod components {
    pub mod form;
    pub mod layout;
    pub mod paginated_list;
    pub mod remote;
    pub mod toast;
    pub mod pages {
        pub mod admin;
        pub mod auth;
        pub mod company;
        pub mod cva;
        pub mod public;
    }
}

use carbonmart_shared::config::ClientConfig;
use carbonmart_shared::protocol::Portal;
use carbonmart_shared::route::{AppRoute, SubApp};
use leptos::prelude::*;

use crate::auth::{AuthContext, init_cross_tab_sync};
use crate::components::layout::{Bare, Shell};
use crate::components::pages::admin::{AdminDashboardPage, AdminKycPage, AdminUsersPage};
use crate::components::pages::auth::{
    ChangePasswordPage, ForgotPasswordPage, LoginPage, OtpPage, RegisterPage,
};
use crate::components::pages::company::{
    CompanyDashboardPage, CreditRequestsPage, ProjectDetailPage, ProjectsPage, ReportsPage,
};
use crate::components::pages::cva::{
    CvaCreditIssuancePage, CvaDashboardPage, CvaReportDetailPage, CvaReportsPage,
};
use crate::components::pages::public::{
    HomePage, KycPage, ListingDetailPage, MarketplacePage, PrivacyPage, ProfilePage, TermsPage,
    WalletPage,
};
use crate::components::toast::provide_toaster;

// 原生 Web API 封装模块
// 此模块提供对浏览器原生 API 的轻量级封装，替代 gloo-* 系列 crate，
// 以减小 WASM 二进制体积。
pub(crate) mod web {
    pub mod console;
    mod http;
    pub mod router;
    mod storage;

    pub use http::WebFetch;
    pub use storage::BrowserStorage;
}

use web::router::{Router, RouterOutlet};

fn page(route: AppRoute) -> AnyView {
    use AppRoute::*;
    match route {
        Terms => view! { <TermsPage /> }.into_any(),
        Privacy => view! { <PrivacyPage /> }.into_any(),

        Home => view! { <HomePage /> }.into_any(),
        Login => view! { <LoginPage portal=Portal::Public /> }.into_any(),
        Register => view! { <RegisterPage /> }.into_any(),
        Otp => view! { <OtpPage /> }.into_any(),
        ForgotPassword => {
            view! { <ForgotPasswordPage portal=Portal::Public /> }.into_any()
        }
        Marketplace => view! { <MarketplacePage /> }.into_any(),
        ListingDetail { id } => view! { <ListingDetailPage id=id /> }.into_any(),
        Wallet => view! { <WalletPage /> }.into_any(),
        Kyc => view! { <KycPage /> }.into_any(),
        Profile => view! { <ProfilePage /> }.into_any(),

        CompanyDashboard => view! { <CompanyDashboardPage /> }.into_any(),
        Projects => view! { <ProjectsPage /> }.into_any(),
        ProjectDetail { id } => view! { <ProjectDetailPage id=id /> }.into_any(),
        Reports => view! { <ReportsPage /> }.into_any(),
        CreditRequests => view! { <CreditRequestsPage /> }.into_any(),

        AdminLogin => view! { <LoginPage portal=Portal::Admin /> }.into_any(),
        AdminForgotPassword => {
            view! { <ForgotPasswordPage portal=Portal::Admin /> }.into_any()
        }
        AdminChangePassword => {
            view! { <ChangePasswordPage portal=Portal::Admin /> }.into_any()
        }
        AdminDashboard => view! { <AdminDashboardPage /> }.into_any(),
        AdminUsers => view! { <AdminUsersPage /> }.into_any(),
        AdminKyc => view! { <AdminKycPage /> }.into_any(),

        CvaLogin => view! { <LoginPage portal=Portal::Cva /> }.into_any(),
        CvaForgotPassword => {
            view! { <ForgotPasswordPage portal=Portal::Cva /> }.into_any()
        }
        CvaChangePassword => {
            view! { <ChangePasswordPage portal=Portal::Cva /> }.into_any()
        }
        CvaDashboard => view! { <CvaDashboardPage /> }.into_any(),
        CvaReports => view! { <CvaReportsPage /> }.into_any(),
        CvaReportDetail { id } => view! { <CvaReportDetailPage id=id /> }.into_any(),
        CvaCreditIssuance => view! { <CvaCreditIssuancePage /> }.into_any(),
    }
}

/// 登录类页面不套用导航外壳
fn is_bare(route: &AppRoute) -> bool {
    matches!(
        route,
        AppRoute::Login
            | AppRoute::Register
            | AppRoute::Otp
            | AppRoute::ForgotPassword
            | AppRoute::AdminLogin
            | AppRoute::AdminForgotPassword
            | AppRoute::CvaLogin
            | AppRoute::CvaForgotPassword
    )
}

/// 路由匹配函数
///
/// 根据路由所属子应用选择外壳，再渲染对应页面。
fn route_matcher(route: AppRoute) -> AnyView {
    let sub_app: SubApp = route.sub_app();
    if is_bare(&route) {
        let content = page(route);
        return view! { <Bare>{content}</Bare> }.into_any();
    }
    let content = page(route);
    view! { <Shell sub_app=sub_app>{content}</Shell> }.into_any()
}

#[component]
pub fn App() -> impl IntoView {
    let config = ClientConfig::from_build_env();
    web::console::init(config.log_level_filter());
    log::info!("[App] API base {}", config.base_url);

    // 1. 全局提示
    provide_toaster();

    // 2. 认证上下文：会话存储与请求客户端共享同一份状态
    let session_key = config.session_key.clone();
    let auth_ctx = AuthContext::new(config);
    init_cross_tab_sync(&auth_ctx, session_key);
    let session = auth_ctx.session_signal();
    let resolve_session = {
        let auth_ctx = auth_ctx.clone();
        Callback::new(move |()| auth_ctx.current())
    };
    provide_context(auth_ctx);

    view! {
        // 3. 路由器组件：注入会话信号与会话读取函数实现守卫
        <Router session=session resolve_session=resolve_session>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carbonmart_shared::route::route_trees;

    #[test]
    fn bare_pages_are_unrestricted() {
        for descriptor in route_trees().iter().flat_map(|tree| tree.iter()) {
            let path = descriptor.pattern.replace(":id", "1");
            let route = match AppRoute::from_path(&path) {
                carbonmart_shared::route::Resolution::Matched { route, .. } => route,
                carbonmart_shared::route::Resolution::Fallback(route) => route,
            };
            if is_bare(&route) {
                assert!(route.allowed_roles().is_none(), "{}", route);
            }
        }
    }
}
