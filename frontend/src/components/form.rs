//! 表单控件

use carbonmart_shared::error::FieldErrors;
use leptos::prelude::*;

/// 带字段错误提示的输入框
///
/// 输入时清除该字段的错误；失焦时调用 `check` 做单字段校验。
#[component]
pub fn TextField(
    #[prop(into)] label: String,
    name: &'static str,
    value: RwSignal<String>,
    errors: RwSignal<FieldErrors>,
    #[prop(optional)] input_type: Option<&'static str>,
    #[prop(optional, into)] placeholder: String,
    #[prop(optional)] check: Option<Callback<&'static str, Option<String>>>,
) -> impl IntoView {
    let error = move || errors.with(|e| e.get(name).map(str::to_string));
    let on_blur = move |_: leptos::ev::FocusEvent| {
        if let Some(message) = check.and_then(|check| check.run(name)) {
            errors.update(|e| e.insert(name, message));
        }
    };

    view! {
        <div class="form-control">
            <label class="label" for=name>
                <span class="label-text">{label}</span>
            </label>
            <input
                id=name
                name=name
                type=input_type.unwrap_or("text")
                placeholder=placeholder
                class=move || {
                    if error().is_some() { "input input-bordered input-error" } else { "input input-bordered" }
                }
                prop:value=value
                on:input=move |ev| {
                    value.set(event_target_value(&ev));
                    errors.update(|e| e.remove(name));
                }
                on:blur=on_blur
            />
            <Show when=move || error().is_some()>
                <label class="label">
                    <span class="label-text-alt text-error">{move || error().unwrap_or_default()}</span>
                </label>
            </Show>
        </div>
    }
}

#[component]
pub fn Checkbox(#[prop(into)] label: String, checked: RwSignal<bool>) -> impl IntoView {
    view! {
        <label class="label cursor-pointer justify-start gap-2">
            <input
                type="checkbox"
                class="checkbox checkbox-sm"
                prop:checked=checked
                on:change=move |ev| checked.set(event_target_checked(&ev))
            />
            <span class="label-text">{label}</span>
        </label>
    }
}

#[component]
pub fn SubmitButton(
    #[prop(into)] label: String,
    busy: RwSignal<bool>,
) -> impl IntoView {
    view! {
        <div class="form-control mt-6">
            <button type="submit" class="btn btn-primary" disabled=move || busy.get()>
                {move || {
                    if busy.get() {
                        view! { <span class="loading loading-spinner"></span> "Please wait..." }
                            .into_any()
                    } else {
                        label.clone().into_any()
                    }
                }}
            </button>
        </div>
    }
}

/// 表单顶部的通用错误
#[component]
pub fn FormAlert(message: RwSignal<Option<String>>) -> impl IntoView {
    view! {
        <Show when=move || message.get().is_some()>
            <div role="alert" class="alert alert-error text-sm py-2">
                <span>{move || message.get().unwrap_or_default()}</span>
            </div>
        </Show>
    }
}
