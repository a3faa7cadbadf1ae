//! 通用分页列表
//!
//! 状态由共享层的 `Paginator` 驱动，请求通过 `RequestScope` 发出：
//! 翻页会中止上一页的请求，组件卸载时中止全部请求。

use std::future::Future;

use carbonmart_shared::error::{ClientError, ClientResult};
use carbonmart_shared::pagination::{DEFAULT_PAGE_SIZE, Page, PageRequest, Paginator};
use carbonmart_shared::task::RequestScope;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::toast::use_toaster;

/// 分页导航中最多显示的页码按钮数
const PAGE_WINDOW: u32 = 5;

fn page_window(current: u32, total: u32) -> std::ops::Range<u32> {
    let start = current.saturating_sub(PAGE_WINDOW / 2);
    let end = (start + PAGE_WINDOW).min(total);
    end.saturating_sub(PAGE_WINDOW)..end
}

#[component]
pub fn PaginatedList<T, F, Fut, R, V>(
    /// 拉取指定页
    fetch: F,
    /// 渲染单个条目
    render: R,
    /// 表头；为空时不渲染 thead
    #[prop(optional)]
    headers: Vec<&'static str>,
    #[prop(optional)] page_size: Option<u32>,
    /// 依赖变化时回到第一页
    #[prop(optional, into)]
    deps: Option<Signal<u64>>,
    #[prop(optional, into)] empty_text: Option<String>,
) -> impl IntoView
where
    T: Clone + Send + Sync + 'static,
    F: Fn(PageRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ClientResult<Page<T>>> + 'static,
    R: Fn(T) -> V + Send + Sync + 'static,
    V: IntoView + 'static,
{
    let state = RwSignal::new(Paginator::<T>::new(page_size.unwrap_or(DEFAULT_PAGE_SIZE)));
    let scope = RequestScope::new();
    let toaster = use_toaster();

    let load = Callback::new({
        let scope = scope.clone();
        move |index: u32| {
            let Some(ticket) = state.try_update(|p| p.begin(index)) else {
                return;
            };
            let pending = scope.run(fetch(ticket.request));
            spawn_local(async move {
                // None：已被新请求取代或组件已卸载
                let Some(result) = pending.await else {
                    return;
                };
                if let Err(e) = &result {
                    toaster.error(e);
                }
                state.update(|p| {
                    p.complete(ticket, result);
                });
            });
        }
    });

    Effect::new({
        let scope = scope.clone();
        move |_| {
            if let Some(deps) = deps {
                deps.track();
            }
            scope.cancel();
            state.update(Paginator::reset);
            load.run(0);
        }
    });

    on_cleanup(move || scope.close());

    let empty_text = empty_text.unwrap_or_else(|| "Nothing here yet.".to_string());
    let columns = headers.len().max(1).to_string();

    let rows = move || {
        let columns = columns.clone();
        state.with(|p| {
            if p.is_loading() {
                return view! {
                    <tr>
                        <td colspan=columns class="text-center py-8 text-base-content/50">
                            <span class="loading loading-spinner loading-md"></span>
                            " Loading..."
                        </td>
                    </tr>
                }
                .into_any();
            }
            if let Some(message) = p.error().map(ClientError::user_message) {
                return view! {
                    <tr>
                        <td colspan=columns class="text-center py-8 text-error">{message}</td>
                    </tr>
                }
                .into_any();
            }
            if p.items().is_empty() {
                return view! {
                    <tr>
                        <td colspan=columns class="text-center py-8 text-base-content/50">
                            {empty_text.clone()}
                        </td>
                    </tr>
                }
                .into_any();
            }
            p.items()
                .iter()
                .cloned()
                .map(&render)
                .collect_view()
                .into_any()
        })
    };

    let summary = move || {
        state.with(|p| {
            let cursor = p.cursor();
            if cursor.maybe_more {
                format!(
                    "Page {} ({} items so far, more available)",
                    cursor.page_index + 1,
                    cursor.total_items
                )
            } else {
                format!(
                    "Page {} of {} ({} items)",
                    cursor.page_index + 1,
                    cursor.total_pages().max(1),
                    cursor.total_items
                )
            }
        })
    };

    let page_buttons = move || {
        let (current, total) = state.with(|p| (p.cursor().page_index, p.cursor().total_pages()));
        page_window(current, total)
            .map(|index| {
                let class = if index == current {
                    "join-item btn btn-sm btn-active"
                } else {
                    "join-item btn btn-sm"
                };
                view! {
                    <button
                        class=class
                        disabled=move || !state.with(|p| p.can_jump(index))
                        on:click=move |_| load.run(index)
                    >
                        {index + 1}
                    </button>
                }
            })
            .collect_view()
    };

    view! {
        <div class="space-y-4">
            <div class="overflow-x-auto w-full">
                <table class="table table-zebra w-full">
                    {(!headers.is_empty())
                        .then(|| {
                            view! {
                                <thead>
                                    <tr>
                                        {headers.iter().map(|h| view! { <th>{*h}</th> }).collect_view()}
                                    </tr>
                                </thead>
                            }
                        })}
                    <tbody>{rows}</tbody>
                </table>
            </div>
            <div class="flex items-center justify-between">
                <span class="text-sm text-base-content/70">{summary}</span>
                <div class="join">
                    <button
                        class="join-item btn btn-sm"
                        disabled=move || !state.with(|p| p.can_previous())
                        on:click=move |_| {
                            if let Some(index) = state.with_untracked(|p| p.previous_index()) {
                                load.run(index);
                            }
                        }
                    >
                        "«"
                    </button>
                    {page_buttons}
                    <button
                        class="join-item btn btn-sm"
                        disabled=move || !state.with(|p| p.can_next())
                        on:click=move |_| {
                            if let Some(index) = state.with_untracked(|p| p.next_index()) {
                                load.run(index);
                            }
                        }
                    >
                        "»"
                    </button>
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::page_window;

    #[test]
    fn window_is_centered_and_clamped() {
        assert_eq!(page_window(0, 3), 0..3);
        assert_eq!(page_window(0, 10), 0..5);
        assert_eq!(page_window(5, 10), 3..8);
        assert_eq!(page_window(9, 10), 5..10);
        assert_eq!(page_window(0, 0), 0..0);
    }
}
