//! 路由守卫
//!
//! 每次导航都根据目标路由和 **当时** 的会话重新计算，不做缓存。
//! 流程：解析路径 -> 兜底重定向 -> 认证检查 -> 角色检查 -> 渲染。

use log::debug;

use crate::route::{AppRoute, Resolution};
use crate::session::Session;

/// 单次导航的访问状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessState {
    Unauthenticated,
    Unauthorized,
    Authorized,
}

/// 守卫决定
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Render(AppRoute),
    Redirect(AppRoute),
}

impl GuardDecision {
    pub fn route(&self) -> &AppRoute {
        match self {
            GuardDecision::Render(route) | GuardDecision::Redirect(route) => route,
        }
    }

    pub fn into_route(self) -> AppRoute {
        match self {
            GuardDecision::Render(route) | GuardDecision::Redirect(route) => route,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, GuardDecision::Redirect(_))
    }
}

/// 计算访问状态；未声明角色限制的路由对任何人开放
pub fn access_state(route: &AppRoute, session: Option<&Session>) -> AccessState {
    let Some(allowed) = route.allowed_roles() else {
        return AccessState::Authorized;
    };
    match session {
        None => AccessState::Unauthenticated,
        Some(session) if allowed.contains(&session.role()) => AccessState::Authorized,
        Some(_) => AccessState::Unauthorized,
    }
}

/// **核心守卫逻辑**
pub fn evaluate(route: &AppRoute, session: Option<&Session>) -> GuardDecision {
    match access_state(route, session) {
        AccessState::Unauthenticated => {
            GuardDecision::Redirect(route.sub_app().login_route())
        }
        AccessState::Unauthorized => {
            // 静默重定向到角色主页，而不是 403 页面
            let role = session.map(Session::role);
            GuardDecision::Redirect(role.map(|r| r.home_route()).unwrap_or_default())
        }
        AccessState::Authorized => match session {
            Some(session) if route.should_redirect_when_authenticated() => {
                GuardDecision::Redirect(session.role().home_route())
            }
            _ => GuardDecision::Render(route.clone()),
        },
    }
}

const MAX_REDIRECTS: usize = 3;

/// 一次导航的最终结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// 最终渲染的路由
    pub route: AppRoute,
    /// 地址栏是否需要替换为 `route` 的路径
    pub redirected: bool,
}

/// 将路径导航到最终可渲染的路由
///
/// 重定向目标同样经过守卫检查（例如兜底到受保护的管理面板）。
pub fn navigate(path: &str, session: Option<&Session>) -> Navigation {
    let (target, mut redirected) = match AppRoute::from_path(path) {
        Resolution::Matched { route, .. } => (route, false),
        Resolution::Fallback(route) => (route, true),
    };

    let mut decision = evaluate(&target, session);
    let mut hops = 0;
    while let GuardDecision::Redirect(next) = &decision {
        redirected = true;
        hops += 1;
        debug!("[Guard] {} -> {}", path, next);
        if hops > MAX_REDIRECTS {
            decision = GuardDecision::Render(next.clone());
            break;
        }
        decision = evaluate(next, session);
    }

    Navigation {
        route: decision.into_route(),
        redirected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{SubApp, route_trees};
    use crate::session::{BearerToken, Persistence, Role, User};

    fn session(role: Role) -> Session {
        Session {
            token: BearerToken::new("t"),
            user: User {
                id: "1".into(),
                email: "x@example.com".into(),
                role,
            },
            persistence: Persistence::Durable,
        }
    }

    fn restricted_routes() -> Vec<AppRoute> {
        route_trees()
            .iter()
            .flat_map(|tree| tree.iter())
            .filter(|d| d.allowed_roles.is_some())
            .map(|d| match AppRoute::from_path(&d.pattern.replace(":id", "9")) {
                Resolution::Matched { route, .. } => route,
                Resolution::Fallback(r) => r,
            })
            .collect()
    }

    #[test]
    fn anonymous_is_sent_to_its_tree_login() {
        for route in restricted_routes() {
            let decision = evaluate(&route, None);
            let expected = route.sub_app().login_route();
            assert_eq!(decision, GuardDecision::Redirect(expected), "{}", route);
            assert_ne!(decision.route(), &route);
        }
        assert_eq!(
            evaluate(&AppRoute::AdminUsers, None),
            GuardDecision::Redirect(AppRoute::AdminLogin)
        );
        assert_eq!(
            evaluate(&AppRoute::CvaReports, None),
            GuardDecision::Redirect(AppRoute::CvaLogin)
        );
        assert_eq!(
            evaluate(&AppRoute::Projects, None),
            GuardDecision::Redirect(AppRoute::Login)
        );
    }

    #[test]
    fn wrong_role_goes_home_not_to_error_page() {
        let roles = [Role::EvOwner, Role::User, Role::Company, Role::Admin, Role::Cva];
        for route in restricted_routes() {
            let allowed = route.allowed_roles().unwrap();
            for role in roles.iter().filter(|r| !allowed.contains(*r)) {
                let decision = evaluate(&route, Some(&session(*role)));
                assert_eq!(decision, GuardDecision::Redirect(role.home_route()));
            }
        }
    }

    #[test]
    fn allowed_role_renders() {
        let s = session(Role::Company);
        assert_eq!(
            evaluate(&AppRoute::Reports, Some(&s)),
            GuardDecision::Render(AppRoute::Reports)
        );
        assert_eq!(
            evaluate(&AppRoute::Terms, Some(&s)),
            GuardDecision::Render(AppRoute::Terms)
        );
        assert_eq!(
            evaluate(&AppRoute::Marketplace, None),
            GuardDecision::Render(AppRoute::Marketplace)
        );
    }

    #[test]
    fn authenticated_user_leaves_login_pages() {
        let s = session(Role::Cva);
        assert_eq!(
            evaluate(&AppRoute::CvaLogin, Some(&s)),
            GuardDecision::Redirect(AppRoute::CvaDashboard)
        );
        assert_eq!(
            evaluate(&AppRoute::Login, None),
            GuardDecision::Render(AppRoute::Login)
        );
    }

    #[test]
    fn access_states() {
        assert_eq!(
            access_state(&AppRoute::Wallet, None),
            AccessState::Unauthenticated
        );
        assert_eq!(
            access_state(&AppRoute::Wallet, Some(&session(Role::Admin))),
            AccessState::Unauthorized
        );
        assert_eq!(
            access_state(&AppRoute::Wallet, Some(&session(Role::EvOwner))),
            AccessState::Authorized
        );
    }

    #[test]
    fn navigate_follows_fallback_then_guard() {
        let nav = navigate("/admin/unknown", None);
        assert_eq!(nav.route, AppRoute::AdminLogin);
        assert!(nav.redirected);

        let admin = session(Role::Admin);
        let nav = navigate("/admin/unknown", Some(&admin));
        assert_eq!(nav.route, AppRoute::AdminDashboard);
        assert!(nav.redirected);

        let nav = navigate("/admin/users/", Some(&admin));
        assert_eq!(nav.route, AppRoute::AdminUsers);
        assert!(!nav.redirected);
    }

    #[test]
    fn navigate_wrong_role_lands_on_renderable_home() {
        let ev = session(Role::EvOwner);
        let nav = navigate("/cva/reports/5", Some(&ev));
        assert_eq!(nav.route, AppRoute::Wallet);
        assert!(nav.redirected);
        assert_eq!(nav.route.sub_app(), SubApp::Public);
    }

    #[test]
    fn logout_then_navigate_goes_to_login() {
        let nav = navigate("/dashboard", None);
        assert_eq!(nav.route, AppRoute::Login);
    }

    #[test]
    fn expired_session_read_at_navigation_goes_to_login() {
        use crate::session::SessionStore;
        use crate::session::tests::{KEY, MemoryStorage, jwt_with_exp, user};

        let storage = MemoryStorage::new();
        let store = SessionStore::new(storage, KEY);
        let past = chrono::Utc::now().timestamp() - 60;
        store.login(user(Role::EvOwner), jwt_with_exp(past), true);

        let nav = navigate("/wallet", store.current_user().as_ref());
        assert_eq!(nav.route, AppRoute::Login);
        assert!(nav.redirected);
        assert!(store.current_user().is_none());
    }

    #[test]
    fn odd_path_params_never_bypass_the_guard() {
        for id in ["a/b", "x?y", "%zz"] {
            let route = AppRoute::ProjectDetail { id: id.into() };
            assert_eq!(access_state(&route, None), AccessState::Unauthenticated);
            assert_eq!(
                evaluate(&route, None),
                GuardDecision::Redirect(AppRoute::Login)
            );
        }
    }
}
