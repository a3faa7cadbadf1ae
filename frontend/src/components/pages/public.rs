//! 公共站点页面：首页、市场、钱包、KYC、个人资料，以及共享的条款和隐私页

use carbonmart_shared::error::FieldErrors;
use carbonmart_shared::pagination::PageRequest;
use carbonmart_shared::protocol::{
    KycStatus, KycSubmission, Listing, ListingDetailRequest, ListingStatus, ListingsRequest,
    ProfileRequest, PurchaseRequest, UserProfile, Wallet, WalletRequest,
};
use carbonmart_shared::route::AppRoute;
use carbonmart_shared::validation::{FormSchema, FormValues, Rule};
use js_sys::Uint8Array;
use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen_futures::JsFuture;

use crate::auth::use_auth;
use crate::components::form::{SubmitButton, TextField};
use crate::components::paginated_list::PaginatedList;
use crate::components::remote::{RemoteView, use_remote};
use crate::components::toast::use_toaster;
use crate::web::router::Link;

pub(crate) fn kyc_badge(status: KycStatus) -> impl IntoView {
    let (class, label) = match status {
        KycStatus::Approved => ("badge badge-success", "Approved"),
        KycStatus::Pending => ("badge badge-warning", "Pending"),
        KycStatus::Rejected => ("badge badge-error", "Rejected"),
        KycStatus::NotSubmitted => ("badge badge-ghost", "Not submitted"),
        KycStatus::Unknown => ("badge", "Unknown"),
    };
    view! { <span class=class>{label}</span> }
}

fn listing_badge(status: ListingStatus) -> impl IntoView {
    let (class, label) = match status {
        ListingStatus::Active => ("badge badge-success", "Active"),
        ListingStatus::SoldOut => ("badge badge-warning", "Sold out"),
        ListingStatus::Closed => ("badge badge-ghost", "Closed"),
        ListingStatus::Unknown => ("badge", "Unknown"),
    };
    view! { <span class=class>{label}</span> }
}

#[component]
pub fn HomePage() -> impl IntoView {
    let auth = use_auth();
    let session = auth.session_signal();

    view! {
        <div class="hero bg-base-100 rounded-box shadow-xl py-16">
            <div class="hero-content text-center">
                <div class="max-w-xl space-y-6">
                    <h1 class="text-5xl font-bold">"Trade verified carbon credits"</h1>
                    <p class="text-base-content/70">
                        "EV owners earn credits for every clean kilometre. Companies offset with credits verified by independent auditors."
                    </p>
                    <div class="flex justify-center gap-4">
                        <Link to=AppRoute::Marketplace class="btn btn-primary">"Browse marketplace"</Link>
                        {move || {
                            session
                                .with(|s| s.is_none())
                                .then(|| view! { <Link to=AppRoute::Register class="btn btn-outline">"Join now"</Link> })
                        }}
                    </div>
                </div>
            </div>
        </div>
    }
}

/// 市场搜索框：输入中的草稿与已提交的查询分开保存
///
/// 翻页始终使用最近一次提交的查询。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SearchBox {
    draft: String,
    submitted: Option<String>,
}

impl SearchBox {
    fn edit(&mut self, value: String) {
        self.draft = value;
    }

    fn submit(&mut self) {
        let query = self.draft.trim();
        self.submitted = (!query.is_empty()).then(|| query.to_string());
    }

    fn request(&self, page: PageRequest) -> ListingsRequest {
        ListingsRequest {
            page,
            search: self.submitted.clone(),
        }
    }
}

#[component]
pub fn MarketplacePage() -> impl IntoView {
    let auth = use_auth();
    let search = RwSignal::new(SearchBox::default());
    // 提交搜索时递增，分页列表据此回到第一页
    let generation = RwSignal::new(0u64);

    let fetch = move |page: PageRequest| {
        let auth = auth.clone();
        let request = search.with_untracked(|s| s.request(page));
        async move { auth.call(&request).await }
    };

    let render = |listing: Listing| {
        let to = AppRoute::ListingDetail {
            id: listing.id.clone(),
        };
        view! {
            <tr>
                <td>
                    <Link to=to class="link link-hover font-semibold">{listing.title}</Link>
                    <div class="text-xs opacity-60">{listing.project_name}</div>
                </td>
                <td>{listing.seller_name}</td>
                <td>{format!("{:.2}", listing.price_per_credit)}</td>
                <td>{format!("{:.0}", listing.available_credits)}</td>
                <td>{listing_badge(listing.status)}</td>
            </tr>
        }
    };

    let on_search = move |ev: SubmitEvent| {
        ev.prevent_default();
        search.update(SearchBox::submit);
        generation.update(|g| *g += 1);
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <div class="flex flex-col md:flex-row md:items-center justify-between gap-4">
                    <h2 class="card-title">"Marketplace"</h2>
                    <form class="join" on:submit=on_search>
                        <input
                            class="input input-bordered input-sm join-item"
                            placeholder="Search projects"
                            prop:value=move || search.with(|s| s.draft.clone())
                            on:input=move |ev| search.update(|s| s.edit(event_target_value(&ev)))
                        />
                        <button type="submit" class="btn btn-sm join-item">"Search"</button>
                    </form>
                </div>
                <PaginatedList
                    fetch=fetch
                    render=render
                    headers=vec!["Listing", "Seller", "Price / credit", "Available", "Status"]
                    deps=generation
                    empty_text="No listings match your search."
                />
            </div>
        </div>
    }
}

#[component]
pub fn ListingDetailPage(id: String) -> impl IntoView {
    let auth = use_auth();
    let toaster = use_toaster();
    let session = auth.session_signal();
    let listing = use_remote({
        let auth = auth.clone();
        let id = id.clone();
        move || {
            let auth = auth.clone();
            let request = ListingDetailRequest { id: id.clone() };
            async move { auth.call(&request).await }
        }
    });
    let quantity = RwSignal::new(String::from("1"));
    let errors = RwSignal::new(FieldErrors::new());
    let busy = RwSignal::new(false);

    let schema = FormSchema::new().field("quantity", "Quantity", [Rule::Required, Rule::MaxLength(9)]);
    let on_buy = move |ev: SubmitEvent| {
        ev.prevent_default();
        let mut values = FormValues::new();
        values.insert("quantity".into(), quantity.get_untracked());
        if let Err(e) = schema.validate(&values) {
            errors.set(e);
            return;
        }
        let amount = match quantity.get_untracked().trim().parse::<f64>() {
            Ok(n) if n > 0.0 => n,
            _ => {
                errors.update(|e| e.insert("quantity", "Enter a positive number"));
                return;
            }
        };

        busy.set(true);
        let auth = auth.clone();
        let request = PurchaseRequest {
            listing_id: id.clone(),
            quantity: amount,
        };
        spawn_local(async move {
            match auth.call(&request).await {
                Ok(_) => {
                    toaster.success("Purchase submitted.");
                    listing.reload.run(());
                }
                Err(e) => toaster.error(&e),
            }
            busy.set(false);
        });
    };

    view! {
        <RemoteView
            remote=listing
            render=move |listing: Listing| {
                view! {
                    <div class="card bg-base-100 shadow-xl">
                        <div class="card-body space-y-2">
                            <div class="flex items-center gap-2">
                                <h2 class="card-title">{listing.title}</h2>
                                {listing_badge(listing.status)}
                            </div>
                            <p class="opacity-70">{listing.project_name} " · " {listing.seller_name}</p>
                            <p>{listing.description.unwrap_or_default()}</p>
                            <div class="stats shadow">
                                <div class="stat">
                                    <div class="stat-title">"Price per credit"</div>
                                    <div class="stat-value text-primary">{format!("{:.2}", listing.price_per_credit)}</div>
                                </div>
                                <div class="stat">
                                    <div class="stat-title">"Available"</div>
                                    <div class="stat-value">{format!("{:.0}", listing.available_credits)}</div>
                                </div>
                            </div>
                        </div>
                    </div>
                }
            }
        />
        {move || match session.get() {
            Some(_) => view! {
                <form class="card bg-base-100 shadow-xl card-body max-w-md" on:submit=on_buy.clone()>
                    <TextField label="Credits to buy" name="quantity" input_type="number" value=quantity errors=errors />
                    <SubmitButton label="Buy credits" busy=busy />
                </form>
            }
            .into_any(),
            None => view! {
                <div class="alert">
                    <span>"Sign in to purchase credits."</span>
                    <Link to=AppRoute::Login class="btn btn-sm btn-primary">"Sign in"</Link>
                </div>
            }
            .into_any(),
        }}
    }
}

#[component]
pub fn WalletPage() -> impl IntoView {
    let auth = use_auth();
    let wallet = use_remote(move || {
        let auth = auth.clone();
        async move { auth.call(&WalletRequest).await }
    });

    view! {
        <RemoteView
            remote=wallet
            render=|wallet: Wallet| {
                view! {
                    <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                        <div class="stat">
                            <div class="stat-title">"Balance"</div>
                            <div class="stat-value text-primary">
                                {format!("{:.2} {}", wallet.balance, wallet.currency)}
                            </div>
                        </div>
                        <div class="stat">
                            <div class="stat-title">"Carbon credits"</div>
                            <div class="stat-value text-success">{format!("{:.2}", wallet.credit_balance)}</div>
                        </div>
                    </div>
                    <div class="card bg-base-100 shadow-xl">
                        <div class="card-body">
                            <h3 class="card-title">"Recent activity"</h3>
                            <table class="table table-zebra w-full">
                                <tbody>
                                    {wallet
                                        .transactions
                                        .into_iter()
                                        .map(|tx| {
                                            view! {
                                                <tr>
                                                    <td>{tx.description}</td>
                                                    <td>{format!("{:+.2}", tx.credits)}</td>
                                                    <td class="opacity-60">
                                                        {tx.created_at.map(|t| t.format("%Y-%m-%d").to_string())}
                                                    </td>
                                                </tr>
                                            }
                                        })
                                        .collect_view()}
                                </tbody>
                            </table>
                        </div>
                    </div>
                }
            }
        />
    }
}

/// 选中的证件文件
#[derive(Debug, Clone, PartialEq)]
struct Document {
    name: String,
    mime: String,
    bytes: Vec<u8>,
}

#[component]
pub fn KycPage() -> impl IntoView {
    let auth = use_auth();
    let toaster = use_toaster();
    let full_name = RwSignal::new(String::new());
    let document_type = RwSignal::new(String::from("NATIONAL_ID"));
    let document_number = RwSignal::new(String::new());
    let document = RwSignal::new(None::<Document>);
    let errors = RwSignal::new(FieldErrors::new());
    let busy = RwSignal::new(false);

    let on_file = move |ev: leptos::ev::Event| {
        let input: web_sys::HtmlInputElement = event_target(&ev);
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            document.set(None);
            return;
        };
        errors.update(|e| e.remove("document"));
        spawn_local(async move {
            match JsFuture::from(file.array_buffer()).await {
                Ok(buffer) => document.set(Some(Document {
                    name: file.name(),
                    mime: file.type_(),
                    bytes: Uint8Array::new(&buffer).to_vec(),
                })),
                Err(e) => {
                    log::warn!("[Kyc] failed to read file: {:?}", e);
                    errors.update(|err| err.insert("document", "Could not read the file"));
                }
            }
        });
    };

    let schema = FormSchema::new()
        .field("fullName", "Full name", [Rule::Required])
        .field("documentNumber", "Document number", [Rule::Required, Rule::MaxLength(40)]);

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let values: FormValues = [
            ("fullName".to_string(), full_name.get_untracked()),
            ("documentNumber".to_string(), document_number.get_untracked()),
        ]
        .into_iter()
        .collect();
        let mut found = schema.validate(&values).err().unwrap_or_default();
        let Some(doc) = document.get_untracked() else {
            found.insert("document", "Attach a photo or scan of your document");
            errors.set(found);
            return;
        };
        if !found.is_empty() {
            errors.set(found);
            return;
        }

        let request = KycSubmission {
            full_name: full_name.get_untracked().trim().to_string(),
            document_type: document_type.get_untracked(),
            document_number: document_number.get_untracked().trim().to_string(),
            file_name: doc.name,
            mime: doc.mime,
            document: doc.bytes,
        };
        busy.set(true);
        let auth = auth.clone();
        spawn_local(async move {
            match auth.call(&request).await {
                Ok(_) => toaster.success("KYC submitted. We will review it shortly."),
                Err(e) => toaster.error(&e),
            }
            busy.set(false);
        });
    };

    view! {
        <div class="card bg-base-100 shadow-xl max-w-lg">
            <form class="card-body" on:submit=on_submit novalidate>
                <h2 class="card-title">"Identity verification"</h2>
                <TextField label="Full name" name="fullName" value=full_name errors=errors />
                <div class="form-control">
                    <label class="label" for="documentType">
                        <span class="label-text">"Document type"</span>
                    </label>
                    <select
                        id="documentType"
                        class="select select-bordered"
                        on:change=move |ev| document_type.set(event_target_value(&ev))
                    >
                        <option value="NATIONAL_ID">"National ID"</option>
                        <option value="PASSPORT">"Passport"</option>
                        <option value="DRIVER_LICENSE">"Driver licence"</option>
                    </select>
                </div>
                <TextField label="Document number" name="documentNumber" value=document_number errors=errors />
                <div class="form-control">
                    <label class="label" for="document">
                        <span class="label-text">"Document image"</span>
                    </label>
                    <input
                        id="document"
                        type="file"
                        accept="image/*,application/pdf"
                        class="file-input file-input-bordered"
                        on:change=on_file
                    />
                    <span class="label-text-alt text-error mt-1">
                        {move || errors.with(|e| e.get("document").map(str::to_string))}
                    </span>
                </div>
                <SubmitButton label="Submit for review" busy=busy />
            </form>
        </div>
    }
}

#[component]
pub fn ProfilePage() -> impl IntoView {
    let auth = use_auth();
    let profile = use_remote(move || {
        let auth = auth.clone();
        async move { auth.call(&ProfileRequest).await }
    });

    view! {
        <RemoteView
            remote=profile
            render=|profile: UserProfile| {
                view! {
                    <div class="card bg-base-100 shadow-xl max-w-lg">
                        <div class="card-body">
                            <h2 class="card-title">{profile.full_name}</h2>
                            <p>{profile.email}</p>
                            <p class="opacity-70">{profile.phone.unwrap_or_default()}</p>
                            <div class="flex gap-2 items-center">
                                <span class="badge badge-outline">{profile.role.to_string()}</span>
                                {kyc_badge(profile.kyc_status)}
                            </div>
                            <div class="card-actions justify-end">
                                <Link to=AppRoute::Kyc class="btn btn-sm">"Update KYC"</Link>
                            </div>
                        </div>
                    </div>
                }
            }
        />
    }
}

#[component]
pub fn TermsPage() -> impl IntoView {
    view! {
        <article class="prose bg-base-100 rounded-box shadow p-8 max-w-3xl">
            <h1>"Terms of service"</h1>
            <p>
                "Credits listed on CarbonMart are issued only after an accredited verifier (CVA) approves the underlying emissions report."
            </p>
            <p>"Purchases are final once the credits have been transferred to your wallet."</p>
        </article>
    }
}

#[component]
pub fn PrivacyPage() -> impl IntoView {
    view! {
        <article class="prose bg-base-100 rounded-box shadow p-8 max-w-3xl">
            <h1>"Privacy policy"</h1>
            <p>"KYC documents are used solely for identity verification and are never shared with buyers."</p>
            <p>"Your session is kept in this browser only; signing out removes it."</p>
        </article>
    }
}
