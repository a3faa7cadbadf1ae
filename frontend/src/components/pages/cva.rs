//! CVA（核证机构）子应用页面

use carbonmart_shared::error::FieldErrors;
use carbonmart_shared::pagination::PageRequest;
use carbonmart_shared::protocol::{
    CreditIssuance, CreditIssuancesRequest, CvaDashboard, CvaDashboardRequest,
    CvaReportDetailRequest, CvaReportsRequest, Decision, IssueCreditsRequest, Report,
    ReportStatus, ReviewReportRequest,
};
use carbonmart_shared::route::AppRoute;
use carbonmart_shared::validation::{FormSchema, FormValues, Rule};
use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_auth;
use crate::components::form::{SubmitButton, TextField};
use crate::components::pages::company::{report_badge, stat};
use crate::components::paginated_list::PaginatedList;
use crate::components::remote::{RemoteView, use_remote};
use crate::components::toast::use_toaster;
use crate::web::router::Link;

#[component]
pub fn CvaDashboardPage() -> impl IntoView {
    let auth = use_auth();
    let dashboard = use_remote(move || {
        let auth = auth.clone();
        async move { auth.call(&CvaDashboardRequest).await }
    });

    view! {
        <RemoteView
            remote=dashboard
            render=|d: CvaDashboard| {
                view! {
                    <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                        {stat("Awaiting review", d.pending_reports.to_string())}
                        {stat("Reviewed", d.reviewed_reports.to_string())}
                        {stat("Credits issued", format!("{:.0}", d.credits_issued))}
                    </div>
                }
            }
        />
        <Link to=AppRoute::CvaReports class="btn btn-primary">"Review reports"</Link>
    }
}

#[component]
pub fn CvaReportsPage() -> impl IntoView {
    let auth = use_auth();
    let fetch = move |page: PageRequest| {
        let auth = auth.clone();
        async move { auth.call(&CvaReportsRequest { page }).await }
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <h2 class="card-title">"Reports"</h2>
                <PaginatedList
                    fetch=fetch
                    render=|r: Report| {
                        let to = AppRoute::CvaReportDetail { id: r.id.clone() };
                        view! {
                            <tr>
                                <td>
                                    <Link to=to class="link link-hover font-semibold">{r.project_name}</Link>
                                </td>
                                <td>{r.company_name}</td>
                                <td>{r.period}</td>
                                <td>{report_badge(r.status)}</td>
                            </tr>
                        }
                    }
                    headers=vec!["Project", "Company", "Period", "Status"]
                    empty_text="No reports awaiting review."
                />
            </div>
        </div>
    }
}

#[component]
pub fn CvaReportDetailPage(id: String) -> impl IntoView {
    let auth = use_auth();
    let toaster = use_toaster();
    let report = use_remote({
        let auth = auth.clone();
        let id = id.clone();
        move || {
            let auth = auth.clone();
            let request = CvaReportDetailRequest { id: id.clone() };
            async move { auth.call(&request).await }
        }
    });
    let comment = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let review = Callback::new(move |decision: Decision| {
        let comment = comment.get_untracked().trim().to_string();
        let request = ReviewReportRequest {
            id: id.clone(),
            decision,
            comment: (!comment.is_empty()).then_some(comment),
        };
        busy.set(true);
        let auth = auth.clone();
        spawn_local(async move {
            match auth.call(&request).await {
                Ok(_) => {
                    toaster.success("Review submitted.");
                    report.reload.run(());
                }
                Err(e) => toaster.error(&e),
            }
            busy.set(false);
        });
    });

    view! {
        <RemoteView
            remote=report
            render=move |r: Report| {
                let reviewable = matches!(r.status, ReportStatus::Submitted | ReportStatus::UnderReview);
                view! {
                    <div class="card bg-base-100 shadow-xl">
                        <div class="card-body space-y-2">
                            <div class="flex items-center gap-2">
                                <h2 class="card-title">{r.project_name}</h2>
                                {report_badge(r.status)}
                            </div>
                            <p class="opacity-70">{r.company_name} " · " {r.period}</p>
                            <div class="stats shadow">
                                {stat("Emissions reduced", format!("{:.2} tCO₂e", r.emissions_reduced))}
                            </div>
                            <textarea
                                class="textarea textarea-bordered"
                                placeholder="Reviewer comment (optional)"
                                prop:value=comment
                                on:input=move |ev| comment.set(event_target_value(&ev))
                            ></textarea>
                            <div class="card-actions justify-end">
                                <button
                                    class="btn btn-success"
                                    disabled=move || !reviewable || busy.get()
                                    on:click=move |_| review.run(Decision::Approved)
                                >
                                    "Approve"
                                </button>
                                <button
                                    class="btn btn-error"
                                    disabled=move || !reviewable || busy.get()
                                    on:click=move |_| review.run(Decision::Rejected)
                                >
                                    "Reject"
                                </button>
                            </div>
                        </div>
                    </div>
                }
            }
        />
        <Link to=AppRoute::CvaReports class="link">"← All reports"</Link>
    }
}

#[component]
pub fn CvaCreditIssuancePage() -> impl IntoView {
    let auth = use_auth();
    let toaster = use_toaster();
    let report_id = RwSignal::new(String::new());
    let quantity = RwSignal::new(String::new());
    let errors = RwSignal::new(FieldErrors::new());
    let busy = RwSignal::new(false);
    let generation = RwSignal::new(0u64);

    let fetch = {
        let auth = auth.clone();
        move |page: PageRequest| {
            let auth = auth.clone();
            async move { auth.call(&CreditIssuancesRequest { page }).await }
        }
    };

    let schema = FormSchema::new()
        .field("reportId", "Report", [Rule::Required])
        .field("quantity", "Quantity", [Rule::Required]);

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let values: FormValues = [
            ("reportId".to_string(), report_id.get_untracked()),
            ("quantity".to_string(), quantity.get_untracked()),
        ]
        .into_iter()
        .collect();
        let mut found = schema.validate(&values).err().unwrap_or_default();
        let amount = quantity.get_untracked().trim().parse::<f64>().ok().filter(|n| *n > 0.0);
        if amount.is_none() {
            found.insert("quantity", "Enter a positive number");
        }
        let Some(amount) = amount.filter(|_| found.is_empty()) else {
            errors.set(found);
            return;
        };

        let request = IssueCreditsRequest {
            report_id: report_id.get_untracked().trim().to_string(),
            quantity: amount,
        };
        busy.set(true);
        let auth = auth.clone();
        spawn_local(async move {
            match auth.call(&request).await {
                Ok(issued) => {
                    toaster.success(format!("Issued {:.0} credits.", issued.quantity));
                    report_id.set(String::new());
                    quantity.set(String::new());
                    generation.update(|g| *g += 1);
                }
                Err(e) => toaster.error(&e),
            }
            busy.set(false);
        });
    };

    view! {
        <div class="card bg-base-100 shadow-xl max-w-lg">
            <form class="card-body" on:submit=on_submit novalidate>
                <h2 class="card-title">"Issue credits"</h2>
                <TextField label="Approved report ID" name="reportId" value=report_id errors=errors />
                <TextField
                    label="Quantity"
                    name="quantity"
                    input_type="number"
                    value=quantity
                    errors=errors
                />
                <SubmitButton label="Issue" busy=busy />
            </form>
        </div>
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <h2 class="card-title">"Issued batches"</h2>
                <PaginatedList
                    fetch=fetch
                    render=|c: CreditIssuance| {
                        view! {
                            <tr>
                                <td>{c.project_name}</td>
                                <td>{c.report_id}</td>
                                <td>{format!("{:.0}", c.quantity)}</td>
                                <td class="opacity-70">
                                    {c.issued_at.map(|t| t.format("%Y-%m-%d").to_string())}
                                </td>
                            </tr>
                        }
                    }
                    headers=vec!["Project", "Report", "Quantity", "Issued"]
                    deps=generation
                    empty_text="No credits issued yet."
                />
            </div>
        </div>
    }
}
