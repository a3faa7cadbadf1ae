//! 路由定义模块 - 领域模型
//!
//! 纯粹的路由表，不依赖于 DOM 或 web_sys。
//! 应用由三棵相互独立的路由树组成（公共/EV 车主、企业、管理员/CVA），
//! 外加少量共享的免认证页面（条款、隐私）。每棵树末尾都有兜底重定向。

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::client::{decode_component, encode_component};
use crate::session::Role;

// =========================================================
// 子应用
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubApp {
    /// 公共门户与 EV 车主
    Public,
    /// 企业控制台（无统一前缀，共用公共登录）
    Company,
    Admin,
    Cva,
    /// 条款、隐私等共享页面
    Shared,
}

impl SubApp {
    /// 未认证时的重定向目标
    pub fn login_route(&self) -> AppRoute {
        match self {
            SubApp::Admin => AppRoute::AdminLogin,
            SubApp::Cva => AppRoute::CvaLogin,
            SubApp::Public | SubApp::Company | SubApp::Shared => AppRoute::Login,
        }
    }

    /// 兜底路由
    pub fn default_route(&self) -> AppRoute {
        match self {
            SubApp::Admin => AppRoute::AdminDashboard,
            SubApp::Cva => AppRoute::CvaDashboard,
            SubApp::Company => AppRoute::CompanyDashboard,
            SubApp::Public | SubApp::Shared => AppRoute::Home,
        }
    }

    /// 根据路径前缀判断未匹配路径所属的路由树
    fn for_unmatched(path: &str) -> SubApp {
        if path == "/admin" || path.starts_with("/admin/") {
            SubApp::Admin
        } else if path == "/cva" || path.starts_with("/cva/") {
            SubApp::Cva
        } else {
            SubApp::Public
        }
    }
}

impl Role {
    /// 角色主页（权限不足时的静默重定向目标）
    pub fn home_route(&self) -> AppRoute {
        match self {
            Role::EvOwner => AppRoute::Wallet,
            Role::User => AppRoute::Marketplace,
            Role::Company => AppRoute::CompanyDashboard,
            Role::Admin => AppRoute::AdminDashboard,
            Role::Cva => AppRoute::CvaDashboard,
        }
    }
}

// =========================================================
// 路由枚举
// =========================================================

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    // --- 共享 ---
    Terms,
    Privacy,

    // --- 公共 / EV 车主 ---
    #[default]
    Home,
    Login,
    Register,
    Otp,
    ForgotPassword,
    Marketplace,
    ListingDetail { id: String },
    Wallet,
    Kyc,
    Profile,

    // --- 企业 ---
    CompanyDashboard,
    Projects,
    ProjectDetail { id: String },
    Reports,
    CreditRequests,

    // --- 管理员 ---
    AdminLogin,
    AdminForgotPassword,
    AdminChangePassword,
    AdminDashboard,
    AdminUsers,
    AdminKyc,

    // --- CVA ---
    CvaLogin,
    CvaForgotPassword,
    CvaChangePassword,
    CvaDashboard,
    CvaReports,
    CvaReportDetail { id: String },
    CvaCreditIssuance,
}

/// 路由描述符：路径模式、所属子应用、允许的角色（`None` 表示不限制）
#[derive(Clone, Copy)]
pub struct RouteDescriptor {
    pub pattern: &'static str,
    pub sub_app: SubApp,
    pub allowed_roles: Option<&'static [Role]>,
    build: fn(&Params) -> Option<AppRoute>,
}

// 模式在路由表中唯一，比较模式即可
impl PartialEq for RouteDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for RouteDescriptor {}

impl std::fmt::Debug for RouteDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteDescriptor")
            .field("pattern", &self.pattern)
            .field("sub_app", &self.sub_app)
            .field("allowed_roles", &self.allowed_roles)
            .finish()
    }
}

type Params = BTreeMap<&'static str, String>;

const MEMBERS: &[Role] = &[Role::EvOwner, Role::User, Role::Company];
const COMPANIES: &[Role] = &[Role::Company];
const ADMINS: &[Role] = &[Role::Admin];
const CVAS: &[Role] = &[Role::Cva];

macro_rules! route {
    ($pattern:literal, $app:expr, $roles:expr, $variant:ident) => {
        RouteDescriptor {
            pattern: $pattern,
            sub_app: $app,
            allowed_roles: $roles,
            build: |_| Some(AppRoute::$variant),
        }
    };
    ($pattern:literal, $app:expr, $roles:expr, $variant:ident { $field:ident }) => {
        RouteDescriptor {
            pattern: $pattern,
            sub_app: $app,
            allowed_roles: $roles,
            build: |params| {
                Some(AppRoute::$variant {
                    $field: params.get(stringify!($field))?.clone(),
                })
            },
        }
    };
}

// =========================================================
// 路由表
// =========================================================

pub static SHARED_ROUTES: &[RouteDescriptor] = &[
    route!("/terms", SubApp::Shared, None, Terms),
    route!("/privacy", SubApp::Shared, None, Privacy),
];

pub static PUBLIC_ROUTES: &[RouteDescriptor] = &[
    route!("/", SubApp::Public, None, Home),
    route!("/login", SubApp::Public, None, Login),
    route!("/register", SubApp::Public, None, Register),
    route!("/otp", SubApp::Public, None, Otp),
    route!("/forgot-password", SubApp::Public, None, ForgotPassword),
    route!("/marketplace", SubApp::Public, None, Marketplace),
    route!("/marketplace/:id", SubApp::Public, None, ListingDetail { id }),
    route!("/wallet", SubApp::Public, Some(MEMBERS), Wallet),
    route!("/kyc", SubApp::Public, Some(MEMBERS), Kyc),
    route!("/profile", SubApp::Public, Some(MEMBERS), Profile),
];

pub static COMPANY_ROUTES: &[RouteDescriptor] = &[
    route!("/dashboard", SubApp::Company, Some(COMPANIES), CompanyDashboard),
    route!("/projects", SubApp::Company, Some(COMPANIES), Projects),
    route!("/projects/:id", SubApp::Company, Some(COMPANIES), ProjectDetail { id }),
    route!("/reports", SubApp::Company, Some(COMPANIES), Reports),
    route!("/credit-requests", SubApp::Company, Some(COMPANIES), CreditRequests),
];

pub static ADMIN_ROUTES: &[RouteDescriptor] = &[
    route!("/admin/login", SubApp::Admin, None, AdminLogin),
    route!("/admin/forgot-password", SubApp::Admin, None, AdminForgotPassword),
    route!("/admin/change-password", SubApp::Admin, Some(ADMINS), AdminChangePassword),
    route!("/admin/dashboard", SubApp::Admin, Some(ADMINS), AdminDashboard),
    route!("/admin/users", SubApp::Admin, Some(ADMINS), AdminUsers),
    route!("/admin/kyc", SubApp::Admin, Some(ADMINS), AdminKyc),
];

pub static CVA_ROUTES: &[RouteDescriptor] = &[
    route!("/cva/login", SubApp::Cva, None, CvaLogin),
    route!("/cva/forgot-password", SubApp::Cva, None, CvaForgotPassword),
    route!("/cva/change-password", SubApp::Cva, Some(CVAS), CvaChangePassword),
    route!("/cva/dashboard", SubApp::Cva, Some(CVAS), CvaDashboard),
    route!("/cva/reports", SubApp::Cva, Some(CVAS), CvaReports),
    route!("/cva/reports/:id", SubApp::Cva, Some(CVAS), CvaReportDetail { id }),
    route!("/cva/credits", SubApp::Cva, Some(CVAS), CvaCreditIssuance),
];

/// 全部路由树（匹配顺序）
pub fn route_trees() -> [&'static [RouteDescriptor]; 5] {
    [
        SHARED_ROUTES,
        PUBLIC_ROUTES,
        COMPANY_ROUTES,
        ADMIN_ROUTES,
        CVA_ROUTES,
    ]
}

// =========================================================
// 路径匹配
// =========================================================

/// 去掉查询串、片段和尾部 `/`
pub fn normalize_path(raw: &str) -> &str {
    let end = raw.find(['?', '#']).unwrap_or(raw.len());
    let path = raw[..end].trim();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

fn match_pattern(pattern: &'static str, path: &str) -> Option<Params> {
    if pattern == "/" || path == "/" {
        return (pattern == path).then(Params::new);
    }

    let mut pattern_segments = pattern.trim_start_matches('/').split('/');
    let mut path_segments = path.trim_start_matches('/').split('/');
    let mut params = Params::new();

    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return Some(params),
            (Some(expected), Some(actual)) => {
                if let Some(name) = expected.strip_prefix(':') {
                    if actual.is_empty() {
                        return None;
                    }
                    params.insert(name, decode_component(actual)?);
                } else if expected != actual {
                    return None;
                }
            }
            _ => return None,
        }
    }
}

/// 路径解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// 命中路由表
    Matched {
        route: AppRoute,
        descriptor: RouteDescriptor,
    },
    /// 未命中，由所属路由树的兜底规则重定向
    Fallback(AppRoute),
}

impl AppRoute {
    /// 将 URL path 解析为路由
    pub fn from_path(path: &str) -> Resolution {
        let path = normalize_path(path);
        for tree in route_trees() {
            for descriptor in tree {
                if let Some(params) = match_pattern(descriptor.pattern, path) {
                    if let Some(route) = (descriptor.build)(&params) {
                        return Resolution::Matched {
                            route,
                            descriptor: *descriptor,
                        };
                    }
                }
            }
        }
        Resolution::Fallback(SubApp::for_unmatched(path).default_route())
    }

    /// 路由在路由表中的路径模式
    pub fn pattern(&self) -> &'static str {
        match self {
            Self::Terms => "/terms",
            Self::Privacy => "/privacy",
            Self::Home => "/",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Otp => "/otp",
            Self::ForgotPassword => "/forgot-password",
            Self::Marketplace => "/marketplace",
            Self::ListingDetail { .. } => "/marketplace/:id",
            Self::Wallet => "/wallet",
            Self::Kyc => "/kyc",
            Self::Profile => "/profile",
            Self::CompanyDashboard => "/dashboard",
            Self::Projects => "/projects",
            Self::ProjectDetail { .. } => "/projects/:id",
            Self::Reports => "/reports",
            Self::CreditRequests => "/credit-requests",
            Self::AdminLogin => "/admin/login",
            Self::AdminForgotPassword => "/admin/forgot-password",
            Self::AdminChangePassword => "/admin/change-password",
            Self::AdminDashboard => "/admin/dashboard",
            Self::AdminUsers => "/admin/users",
            Self::AdminKyc => "/admin/kyc",
            Self::CvaLogin => "/cva/login",
            Self::CvaForgotPassword => "/cva/forgot-password",
            Self::CvaChangePassword => "/cva/change-password",
            Self::CvaDashboard => "/cva/dashboard",
            Self::CvaReports => "/cva/reports",
            Self::CvaReportDetail { .. } => "/cva/reports/:id",
            Self::CvaCreditIssuance => "/cva/credits",
        }
    }

    /// 获取路由对应的 URL path，路径参数做百分号编码
    pub fn to_path(&self) -> String {
        match self {
            Self::ListingDetail { id } | Self::ProjectDetail { id } | Self::CvaReportDetail { id } => {
                self.pattern().replace(":id", &encode_component(id))
            }
            _ => self.pattern().to_string(),
        }
    }

    /// 路由对应的描述符，按变体的模式查表，不经过路径解析
    pub fn descriptor(&self) -> Option<RouteDescriptor> {
        let pattern = self.pattern();
        route_trees()
            .into_iter()
            .flatten()
            .find(|d| d.pattern == pattern)
            .copied()
    }

    pub fn sub_app(&self) -> SubApp {
        self.descriptor()
            .map(|d| d.sub_app)
            .unwrap_or(SubApp::Public)
    }

    /// 允许访问的角色；`None` 表示不限制
    pub fn allowed_roles(&self) -> Option<&'static [Role]> {
        self.descriptor().and_then(|d| d.allowed_roles)
    }

    /// 已认证用户访问此路由时应离开（如登录页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(
            self,
            Self::Login | Self::Register | Self::Otp | Self::AdminLogin | Self::CvaLogin
        )
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matched(path: &str) -> AppRoute {
        match AppRoute::from_path(path) {
            Resolution::Matched { route, .. } => route,
            Resolution::Fallback(r) => panic!("{} fell back to {}", path, r),
        }
    }

    #[test]
    fn every_descriptor_round_trips() {
        for tree in route_trees() {
            for descriptor in tree {
                let path = descriptor.pattern.replace(":id", "abc-1");
                let route = matched(&path);
                assert_eq!(route.to_path(), path);
                assert_eq!(route.descriptor(), Some(*descriptor));
            }
        }
    }

    #[test]
    fn path_params_are_captured() {
        assert_eq!(
            matched("/cva/reports/r-77"),
            AppRoute::CvaReportDetail { id: "r-77".into() }
        );
        assert_eq!(
            matched("/marketplace/42?tab=history"),
            AppRoute::ListingDetail { id: "42".into() }
        );
    }

    #[test]
    fn path_params_are_percent_encoded() {
        let route = AppRoute::ProjectDetail { id: "a/b c".into() };
        assert_eq!(route.to_path(), "/projects/a%2Fb%20c");
        assert_eq!(matched(&route.to_path()), route);
        assert_eq!(
            matched("/marketplace/a%20b"),
            AppRoute::ListingDetail { id: "a b".into() }
        );
    }

    #[test]
    fn descriptor_does_not_depend_on_param_value() {
        for id in ["a/b", "", "x?y#z", "%zz"] {
            let route = AppRoute::ProjectDetail { id: id.into() };
            assert_eq!(route.allowed_roles(), Some(COMPANIES));
            assert_eq!(route.sub_app(), SubApp::Company);
        }
        let detail = AppRoute::CvaReportDetail { id: "r/1".into() };
        assert_eq!(detail.allowed_roles(), Some(CVAS));
    }

    #[test]
    fn malformed_escapes_fall_back() {
        assert_eq!(
            AppRoute::from_path("/projects/%zz"),
            Resolution::Fallback(AppRoute::Home)
        );
    }

    #[test]
    fn normalization() {
        assert_eq!(normalize_path("/wallet/"), "/wallet");
        assert_eq!(normalize_path("/wallet?x=1#top"), "/wallet");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(matched("/"), AppRoute::Home);
    }

    #[test]
    fn unmatched_paths_fall_back_per_tree() {
        assert_eq!(
            AppRoute::from_path("/admin/nope"),
            Resolution::Fallback(AppRoute::AdminDashboard)
        );
        assert_eq!(
            AppRoute::from_path("/cva/reports/1/extra"),
            Resolution::Fallback(AppRoute::CvaDashboard)
        );
        assert_eq!(
            AppRoute::from_path("/does-not-exist"),
            Resolution::Fallback(AppRoute::Home)
        );
        assert_eq!(
            AppRoute::from_path("/administrator"),
            Resolution::Fallback(AppRoute::Home)
        );
    }

    #[test]
    fn sub_apps_have_distinct_logins() {
        assert_eq!(SubApp::Public.login_route(), AppRoute::Login);
        assert_eq!(SubApp::Company.login_route(), AppRoute::Login);
        assert_eq!(SubApp::Admin.login_route(), AppRoute::AdminLogin);
        assert_eq!(SubApp::Cva.login_route(), AppRoute::CvaLogin);
    }

    #[test]
    fn restrictions() {
        assert_eq!(AppRoute::Terms.allowed_roles(), None);
        assert_eq!(AppRoute::Marketplace.allowed_roles(), None);
        assert_eq!(AppRoute::AdminUsers.allowed_roles(), Some(ADMINS));
        assert_eq!(
            AppRoute::ProjectDetail { id: "1".into() }.sub_app(),
            SubApp::Company
        );
    }

    #[test]
    fn role_homes_are_routes() {
        for role in [Role::EvOwner, Role::User, Role::Company, Role::Admin, Role::Cva] {
            let home = role.home_route();
            let allowed = home.allowed_roles().unwrap_or(&[]);
            assert!(allowed.contains(&role) || home.allowed_roles().is_none());
        }
    }
}
