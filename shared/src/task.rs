//! 可取消的请求作用域
//!
//! 每个页面/组件持有一个 `RequestScope`：
//! - 新请求会中止同一作用域内尚未完成的旧请求（最后签发者胜出）
//! - 组件卸载时调用 `close()`，中止所有请求并拒绝后续请求
//!
//! 被中止或过期的请求解析为 `None`，调用方据此跳过状态更新。

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{AbortHandle, Abortable};

#[derive(Debug, Default)]
struct ScopeState {
    closed: bool,
    generation: u64,
    in_flight: Option<AbortHandle>,
}

#[derive(Debug, Clone, Default)]
pub struct RequestScope {
    state: Arc<Mutex<ScopeState>>,
}

impl RequestScope {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ScopeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 在作用域内运行 future
    ///
    /// 仅当该请求仍是最新请求且作用域未关闭时返回 `Some`。
    pub fn run<F>(&self, fut: F) -> impl Future<Output = Option<F::Output>> + use<F>
    where
        F: Future,
    {
        let (handle, registration) = AbortHandle::new_pair();
        let generation = {
            let mut state = self.lock();
            if state.closed {
                handle.abort();
            }
            if let Some(previous) = state.in_flight.replace(handle) {
                previous.abort();
            }
            state.generation += 1;
            state.generation
        };

        let state = self.state.clone();
        async move {
            let output = Abortable::new(fut, registration).await.ok()?;
            let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.closed || state.generation != generation {
                return None;
            }
            state.in_flight = None;
            Some(output)
        }
    }

    /// 作废进行中的请求，但作用域仍可继续使用
    pub fn cancel(&self) {
        let mut state = self.lock();
        state.generation += 1;
        if let Some(handle) = state.in_flight.take() {
            handle.abort();
        }
    }

    /// 关闭作用域（组件卸载）
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        if let Some(handle) = state.in_flight.take() {
            handle.abort();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::oneshot;

    #[tokio::test]
    async fn single_request_completes() {
        let scope = RequestScope::new();
        assert_eq!(scope.run(async { 7 }).await, Some(7));
    }

    #[tokio::test]
    async fn newer_request_wins() {
        let scope = RequestScope::new();
        let (tx_old, rx_old) = oneshot::channel::<u32>();
        let (tx_new, rx_new) = oneshot::channel::<u32>();

        let old = scope.run(async move { rx_old.await.unwrap() });
        let new = scope.run(async move { rx_new.await.unwrap() });

        tx_new.send(2).unwrap();
        // The old future was aborted; its receiver may already be gone.
        let _ = tx_old.send(1);

        let (old, new) = futures::join!(old, new);
        assert_eq!(old, None);
        assert_eq!(new, Some(2));
    }

    #[tokio::test]
    async fn closed_scope_rejects_everything() {
        let scope = RequestScope::new();
        let (tx, rx) = oneshot::channel::<u32>();
        let pending = scope.run(async move { rx.await.unwrap_or(0) });

        scope.close();
        let _ = tx.send(5);
        assert_eq!(pending.await, None);
        assert!(scope.is_closed());
        assert_eq!(scope.run(async { 1 }).await, None);
    }

    #[tokio::test]
    async fn cancel_keeps_scope_usable() {
        let scope = RequestScope::new();
        let first = scope.run(async { 1 });
        scope.cancel();
        assert_eq!(first.await, None);
        assert_eq!(scope.run(async { 2 }).await, Some(2));
    }
}
