//! 管理员子应用页面

use carbonmart_shared::pagination::PageRequest;
use carbonmart_shared::protocol::{
    AccountSummary, AdminDashboard, AdminDashboardRequest, AdminUsersRequest, Decision,
    KycApplication, KycDecisionRequest, KycQueueRequest, KycStatus,
};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_auth;
use crate::components::pages::company::stat;
use crate::components::pages::public::kyc_badge;
use crate::components::paginated_list::PaginatedList;
use crate::components::remote::{RemoteView, use_remote};
use crate::components::toast::use_toaster;

#[component]
pub fn AdminDashboardPage() -> impl IntoView {
    let auth = use_auth();
    let dashboard = use_remote(move || {
        let auth = auth.clone();
        async move { auth.call(&AdminDashboardRequest).await }
    });

    view! {
        <RemoteView
            remote=dashboard
            render=|d: AdminDashboard| {
                view! {
                    <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                        {stat("Users", d.total_users.to_string())}
                        {stat("Pending KYC", d.pending_kyc.to_string())}
                        {stat("Active listings", d.active_listings.to_string())}
                    </div>
                }
            }
        />
    }
}

#[component]
pub fn AdminUsersPage() -> impl IntoView {
    let auth = use_auth();
    let fetch = move |page: PageRequest| {
        let auth = auth.clone();
        async move { auth.call(&AdminUsersRequest { page }).await }
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <h2 class="card-title">"Users"</h2>
                <PaginatedList
                    fetch=fetch
                    render=|u: AccountSummary| {
                        let (class, label) = if u.active {
                            ("badge badge-success", "Active")
                        } else {
                            ("badge badge-ghost", "Disabled")
                        };
                        view! {
                            <tr>
                                <td>{u.full_name}</td>
                                <td>{u.email}</td>
                                <td>
                                    <span class="badge badge-outline">{u.role.to_string()}</span>
                                </td>
                                <td>
                                    <span class=class>{label}</span>
                                </td>
                            </tr>
                        }
                    }
                    headers=vec!["Name", "Email", "Role", "Status"]
                    page_size=20
                />
            </div>
        </div>
    }
}

#[component]
pub fn AdminKycPage() -> impl IntoView {
    let auth = use_auth();
    let toaster = use_toaster();
    let generation = RwSignal::new(0u64);

    let fetch = {
        let auth = auth.clone();
        move |page: PageRequest| {
            let auth = auth.clone();
            async move { auth.call(&KycQueueRequest { page }).await }
        }
    };

    let decide = Callback::new(move |(id, decision): (String, Decision)| {
        let auth = auth.clone();
        let request = KycDecisionRequest {
            id,
            decision,
            reason: None,
        };
        spawn_local(async move {
            match auth.call(&request).await {
                Ok(_) => {
                    toaster.success("Decision recorded.");
                    generation.update(|g| *g += 1);
                }
                Err(e) => toaster.error(&e),
            }
        });
    });

    let render = move |k: KycApplication| {
        let pending = k.status == KycStatus::Pending;
        let approve_id = k.id.clone();
        let reject_id = k.id.clone();
        view! {
            <tr>
                <td>{k.full_name}</td>
                <td>{k.email}</td>
                <td>{k.document_type}</td>
                <td>{kyc_badge(k.status)}</td>
                <td class="flex gap-2">
                    <button
                        class="btn btn-success btn-xs"
                        disabled=!pending
                        on:click=move |_| decide.run((approve_id.clone(), Decision::Approved))
                    >
                        "Approve"
                    </button>
                    <button
                        class="btn btn-error btn-xs"
                        disabled=!pending
                        on:click=move |_| decide.run((reject_id.clone(), Decision::Rejected))
                    >
                        "Reject"
                    </button>
                </td>
            </tr>
        }
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <h2 class="card-title">"KYC queue"</h2>
                <PaginatedList
                    fetch=fetch
                    render=render
                    headers=vec!["Applicant", "Email", "Document", "Status", ""]
                    deps=generation
                    empty_text="The queue is empty."
                />
            </div>
        </div>
    }
}
