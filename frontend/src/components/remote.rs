//! 单个资源的加载状态
//!
//! 组件卸载时关闭作用域，迟到的响应不会再写入信号。

use std::future::Future;

use carbonmart_shared::error::ClientResult;
use carbonmart_shared::task::RequestScope;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::toast::use_toaster;

pub struct Remote<T: 'static> {
    pub data: RwSignal<Option<T>>,
    pub error: RwSignal<Option<String>>,
    pub loading: RwSignal<bool>,
    pub reload: Callback<()>,
}

impl<T: 'static> Clone for Remote<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> Copy for Remote<T> {}

/// 挂载时加载一次，`reload` 可手动重新加载
pub fn use_remote<T, F, Fut>(fetch: F) -> Remote<T>
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ClientResult<T>> + 'static,
{
    let data = RwSignal::new(None);
    let error = RwSignal::new(None);
    let loading = RwSignal::new(false);
    let toaster = use_toaster();
    let scope = RequestScope::new();

    let reload = Callback::new({
        let scope = scope.clone();
        move |()| {
            loading.set(true);
            error.set(None);
            let pending = scope.run(fetch());
            spawn_local(async move {
                let Some(result) = pending.await else {
                    return;
                };
                match result {
                    Ok(value) => data.set(Some(value)),
                    Err(e) => {
                        toaster.error(&e);
                        error.set(Some(e.user_message()));
                    }
                }
                loading.set(false);
            });
        }
    });

    on_cleanup(move || scope.close());
    reload.run(());

    Remote {
        data,
        error,
        loading,
        reload,
    }
}

/// 加载中、失败和成功三种状态的统一展示
#[component]
pub fn RemoteView<T, V, R>(remote: Remote<T>, render: R) -> impl IntoView
where
    T: Clone + Send + Sync + 'static,
    V: IntoView + 'static,
    R: Fn(T) -> V + Send + Sync + 'static,
{
    move || {
        if remote.loading.get() {
            return view! {
                <div class="flex justify-center py-12">
                    <span class="loading loading-spinner loading-lg text-primary"></span>
                </div>
            }
            .into_any();
        }
        if let Some(message) = remote.error.get() {
            return view! {
                <div role="alert" class="alert alert-error">
                    <span>{message}</span>
                    <button class="btn btn-sm" on:click=move |_| remote.reload.run(())>
                        "Retry"
                    </button>
                </div>
            }
            .into_any();
        }
        remote.data.get().map(&render).into_any()
    }
}
