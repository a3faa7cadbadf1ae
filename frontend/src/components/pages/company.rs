//! 企业子应用页面

use carbonmart_shared::pagination::{Page, PageRequest};
use carbonmart_shared::protocol::{
    CompanyDashboard, CompanyDashboardRequest, CompanyReportsRequest, CreditRequest,
    CreditRequestsRequest, Project, ProjectDetailRequest, ProjectStatus, ProjectsRequest, Report,
    ReportStatus,
};
use carbonmart_shared::route::AppRoute;
use leptos::prelude::*;

use crate::auth::use_auth;
use crate::components::paginated_list::PaginatedList;
use crate::components::remote::{RemoteView, use_remote};
use crate::web::router::Link;

fn project_badge(status: ProjectStatus) -> impl IntoView {
    let (class, label) = match status {
        ProjectStatus::Draft => ("badge badge-ghost", "Draft"),
        ProjectStatus::Active => ("badge badge-success", "Active"),
        ProjectStatus::Suspended => ("badge badge-warning", "Suspended"),
        ProjectStatus::Completed => ("badge badge-info", "Completed"),
        ProjectStatus::Unknown => ("badge", "Unknown"),
    };
    view! { <span class=class>{label}</span> }
}

pub(crate) fn report_badge(status: ReportStatus) -> impl IntoView {
    let (class, label) = match status {
        ReportStatus::Submitted => ("badge badge-info", "Submitted"),
        ReportStatus::UnderReview => ("badge badge-warning", "Under review"),
        ReportStatus::Approved => ("badge badge-success", "Approved"),
        ReportStatus::Rejected => ("badge badge-error", "Rejected"),
        ReportStatus::Unknown => ("badge", "Unknown"),
    };
    view! { <span class=class>{label}</span> }
}

pub(crate) fn stat(title: &'static str, value: String) -> impl IntoView {
    view! {
        <div class="stat">
            <div class="stat-title">{title}</div>
            <div class="stat-value text-primary">{value}</div>
        </div>
    }
}

#[component]
pub fn CompanyDashboardPage() -> impl IntoView {
    let auth = use_auth();
    let dashboard = use_remote(move || {
        let auth = auth.clone();
        async move { auth.call(&CompanyDashboardRequest).await }
    });

    view! {
        <RemoteView
            remote=dashboard
            render=|d: CompanyDashboard| {
                view! {
                    <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                        {stat("Projects", d.total_projects.to_string())}
                        {stat("Active", d.active_projects.to_string())}
                        {stat("Credits issued", format!("{:.0}", d.credits_issued))}
                        {stat("Pending reports", d.pending_reports.to_string())}
                    </div>
                }
            }
        />
        <div class="flex gap-4">
            <Link to=AppRoute::Projects class="btn btn-primary">"Manage projects"</Link>
            <Link to=AppRoute::CreditRequests class="btn btn-outline">"Credit requests"</Link>
        </div>
    }
}

#[component]
pub fn ProjectsPage() -> impl IntoView {
    let auth = use_auth();
    let fetch = move |page: PageRequest| {
        let auth = auth.clone();
        async move { auth.call(&ProjectsRequest { page }).await }
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <h2 class="card-title">"Projects"</h2>
                <PaginatedList
                    fetch=fetch
                    render=|p: Project| {
                        let to = AppRoute::ProjectDetail { id: p.id.clone() };
                        view! {
                            <tr>
                                <td>
                                    <Link to=to class="link link-hover font-semibold">{p.name}</Link>
                                </td>
                                <td>{p.location}</td>
                                <td>{format!("{:.0}", p.estimated_credits)}</td>
                                <td>{project_badge(p.status)}</td>
                            </tr>
                        }
                    }
                    headers=vec!["Project", "Location", "Estimated credits", "Status"]
                    empty_text="No projects registered yet."
                />
            </div>
        </div>
    }
}

#[component]
pub fn ProjectDetailPage(id: String) -> impl IntoView {
    let auth = use_auth();
    let project = use_remote(move || {
        let auth = auth.clone();
        let request = ProjectDetailRequest { id: id.clone() };
        async move { auth.call(&request).await }
    });

    view! {
        <RemoteView
            remote=project
            render=|p: Project| {
                view! {
                    <div class="card bg-base-100 shadow-xl">
                        <div class="card-body">
                            <div class="flex items-center gap-2">
                                <h2 class="card-title">{p.name}</h2>
                                {project_badge(p.status)}
                            </div>
                            <p class="opacity-70">{p.location}</p>
                            <p>{p.description.unwrap_or_default()}</p>
                            <div class="stats shadow">
                                {stat("Estimated credits", format!("{:.0}", p.estimated_credits))}
                            </div>
                        </div>
                    </div>
                }
            }
        />
        <Link to=AppRoute::Projects class="link">"← All projects"</Link>
    }
}

#[component]
pub fn ReportsPage() -> impl IntoView {
    let auth = use_auth();
    // 该端点返回完整列表，在本地分页
    let fetch = move |page: PageRequest| {
        let auth = auth.clone();
        async move {
            auth.call(&CompanyReportsRequest)
                .await
                .map(|all| Page::from_slice(&all, page))
        }
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <h2 class="card-title">"Emission reports"</h2>
                <PaginatedList
                    fetch=fetch
                    render=|r: Report| {
                        view! {
                            <tr>
                                <td>{r.project_name}</td>
                                <td>{r.period}</td>
                                <td>{format!("{:.2} tCO₂e", r.emissions_reduced)}</td>
                                <td>{report_badge(r.status)}</td>
                                <td class="opacity-70">{r.reviewer_comment.unwrap_or_default()}</td>
                            </tr>
                        }
                    }
                    headers=vec!["Project", "Period", "Reduced", "Status", "Reviewer note"]
                    empty_text="No reports submitted yet."
                />
            </div>
        </div>
    }
}

#[component]
pub fn CreditRequestsPage() -> impl IntoView {
    let auth = use_auth();
    let fetch = move |page: PageRequest| {
        let auth = auth.clone();
        async move { auth.call(&CreditRequestsRequest { page }).await }
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <h2 class="card-title">"Credit requests"</h2>
                <PaginatedList
                    fetch=fetch
                    render=|c: CreditRequest| {
                        view! {
                            <tr>
                                <td>{c.project_name}</td>
                                <td>{format!("{:.0}", c.quantity)}</td>
                                <td>{report_badge(c.status)}</td>
                                <td class="opacity-70">
                                    {c.created_at.map(|t| t.format("%Y-%m-%d").to_string())}
                                </td>
                            </tr>
                        }
                    }
                    headers=vec!["Project", "Quantity", "Status", "Requested"]
                    empty_text="No credit requests yet."
                />
            </div>
        </div>
    }
}
