//! 各子应用的页面外壳
//!
//! 公共站点、企业、管理员、CVA 各自一套导航栏，共享页面（条款、隐私）沿用公共外壳。

use carbonmart_shared::route::{AppRoute, SubApp};
use carbonmart_shared::session::Role;
use leptos::prelude::*;

use crate::auth::use_auth;
use crate::components::toast::ToastHost;
use crate::web::router::Link;

fn nav_links(sub_app: SubApp, role: Option<Role>) -> Vec<(AppRoute, &'static str)> {
    match sub_app {
        SubApp::Company => vec![
            (AppRoute::CompanyDashboard, "Dashboard"),
            (AppRoute::Projects, "Projects"),
            (AppRoute::Reports, "Reports"),
            (AppRoute::CreditRequests, "Credit requests"),
            (AppRoute::Marketplace, "Marketplace"),
        ],
        SubApp::Admin => vec![
            (AppRoute::AdminDashboard, "Dashboard"),
            (AppRoute::AdminUsers, "Users"),
            (AppRoute::AdminKyc, "KYC queue"),
            (AppRoute::AdminChangePassword, "Password"),
        ],
        SubApp::Cva => vec![
            (AppRoute::CvaDashboard, "Dashboard"),
            (AppRoute::CvaReports, "Reports"),
            (AppRoute::CvaCreditIssuance, "Credits"),
            (AppRoute::CvaChangePassword, "Password"),
        ],
        SubApp::Public | SubApp::Shared => {
            let mut links = vec![(AppRoute::Marketplace, "Marketplace")];
            match role {
                Some(Role::EvOwner | Role::User) => links.extend([
                    (AppRoute::Wallet, "Wallet"),
                    (AppRoute::Kyc, "KYC"),
                    (AppRoute::Profile, "Profile"),
                ]),
                Some(Role::Company) => links.push((AppRoute::CompanyDashboard, "Company")),
                Some(Role::Admin) => links.push((AppRoute::AdminDashboard, "Admin")),
                Some(Role::Cva) => links.push((AppRoute::CvaDashboard, "CVA")),
                None => {}
            }
            links
        }
    }
}

fn title(sub_app: SubApp) -> &'static str {
    match sub_app {
        SubApp::Public | SubApp::Shared => "CarbonMart",
        SubApp::Company => "CarbonMart Company",
        SubApp::Admin => "CarbonMart Admin",
        SubApp::Cva => "CarbonMart CVA",
    }
}

#[component]
pub fn Shell(sub_app: SubApp, children: Children) -> impl IntoView {
    let auth = use_auth();
    let session = auth.session_signal();

    let links = move || {
        let role = session.with(|s| s.as_ref().map(|s| s.role()));
        nav_links(sub_app, role)
            .into_iter()
            .map(|(route, label)| {
                view! {
                    <li>
                        <Link to=route>{label}</Link>
                    </li>
                }
            })
            .collect_view()
    };

    let account = move || match session.get() {
        Some(s) => {
            let auth = auth.clone();
            view! {
                <span class="text-sm opacity-70 hidden md:inline">{s.user.email}</span>
                <button class="btn btn-outline btn-sm" on:click=move |_| auth.sign_out()>
                    "Sign out"
                </button>
            }
            .into_any()
        }
        None => view! {
            <Link to=sub_app.login_route() class="btn btn-primary btn-sm">"Sign in"</Link>
        }
        .into_any(),
    };

    view! {
        <div class="min-h-screen bg-base-200 font-sans">
            <ToastHost />
            <div class="navbar bg-base-100 shadow">
                <div class="flex-1">
                    <Link to=sub_app.default_route() class="btn btn-ghost text-xl">
                        {title(sub_app)}
                    </Link>
                    <ul class="menu menu-horizontal px-1 hidden md:flex">{links}</ul>
                </div>
                <div class="flex-none gap-2">{account}</div>
            </div>
            <main class="max-w-7xl mx-auto p-4 md:p-8 space-y-8">{children()}</main>
            <footer class="footer footer-center p-4 text-base-content/60">
                <div class="flex gap-4">
                    <Link to=AppRoute::Terms>"Terms"</Link>
                    <Link to=AppRoute::Privacy>"Privacy"</Link>
                </div>
            </footer>
        </div>
    }
}

/// 登录类页面不显示导航栏
#[component]
pub fn Bare(children: Children) -> impl IntoView {
    view! {
        <div class="hero min-h-screen bg-base-200">
            <ToastHost />
            <div class="hero-content flex-col w-full max-w-md">{children()}</div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_links_follow_role() {
        let anonymous = nav_links(SubApp::Public, None);
        assert_eq!(anonymous.len(), 1);
        let owner = nav_links(SubApp::Public, Some(Role::EvOwner));
        assert!(owner.iter().any(|(r, _)| *r == AppRoute::Wallet));
        let company = nav_links(SubApp::Public, Some(Role::Company));
        assert!(!company.iter().any(|(r, _)| *r == AppRoute::Wallet));
    }

    #[test]
    fn tree_links_stay_in_tree() {
        for sub_app in [SubApp::Admin, SubApp::Cva] {
            for (route, _) in nav_links(sub_app, None) {
                assert_eq!(route.sub_app(), sub_app);
            }
        }
    }
}
