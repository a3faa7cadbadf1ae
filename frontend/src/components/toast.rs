//! 全局提示
//!
//! 请求失败时显示 `ClientError::user_message`，3 秒后自动消失。

use std::time::Duration;

use carbonmart_shared::error::ClientError;
use leptos::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub is_error: bool,
}

#[derive(Clone, Copy)]
pub struct Toaster {
    notice: RwSignal<Option<Notice>>,
}

impl Toaster {
    fn new() -> Self {
        Self {
            notice: RwSignal::new(None),
        }
    }

    fn show(&self, message: String, is_error: bool) {
        let notice = self.notice;
        let shown = Notice { message, is_error };
        notice.set(Some(shown.clone()));
        set_timeout(
            move || {
                // 期间出现了新提示则保留
                if notice.get_untracked().as_ref() == Some(&shown) {
                    notice.set(None);
                }
            },
            Duration::from_secs(3),
        );
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(message.into(), false);
    }

    pub fn error(&self, error: &ClientError) {
        self.show(error.user_message(), true);
    }
}

pub fn provide_toaster() -> Toaster {
    let toaster = Toaster::new();
    provide_context(toaster);
    toaster
}

pub fn use_toaster() -> Toaster {
    use_context::<Toaster>().expect("Toaster should be provided")
}

#[component]
pub fn ToastHost() -> impl IntoView {
    let toaster = use_toaster();
    let notice = toaster.notice;

    move || {
        notice.get().map(|n| {
            let class = if n.is_error {
                "alert alert-error shadow-lg"
            } else {
                "alert alert-success shadow-lg"
            };
            view! {
                <div class="toast toast-top toast-end z-50">
                    <div role="alert" class=class>
                        <span>{n.message}</span>
                    </div>
                </div>
            }
        })
    }
}
