//! Generic request/state container shared by every remote operation.
//!
//! Each mutable workflow owns its own [`AsyncOperation`] instances; none
//! are shared across components. The container enforces two rules the
//! rest of the crate relies on:
//!
//! - exactly one in-flight invocation is tracked at a time; a newer
//!   invocation supersedes any pending one, whose completion is then
//!   discarded instead of applied;
//! - once the owning scope retires the operation, every pending
//!   completion is permanently stale. No network-level abort is needed.

use std::future::Future;
use std::sync::Arc;

use shared::error::ErrorInfo;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpState<T> {
    Idle,
    Loading,
    Success(T),
    Error(ErrorInfo),
}

impl<T> OpState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, OpState::Loading)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OpState::Success(_) | OpState::Error(_))
    }
}

/// Pure transition core. Holds the epoch/staleness rules without any
/// runtime coupling so the laws stay unit-testable.
#[derive(Debug)]
pub struct OpCell<T> {
    state: OpState<T>,
    epoch: u64,
    retired: bool,
}

impl<T> Default for OpCell<T> {
    fn default() -> Self {
        Self {
            state: OpState::Idle,
            epoch: 0,
            retired: false,
        }
    }
}

impl<T> OpCell<T> {
    /// Starts a new invocation: clears any prior payload or error and
    /// returns the token the eventual completion must present.
    pub fn begin(&mut self) -> u64 {
        self.epoch += 1;
        self.state = OpState::Loading;
        self.epoch
    }

    /// Applies a completion if it is still the most recent invocation
    /// and the cell has not been retired. Returns whether the outcome
    /// was applied; stale completions leave the state untouched.
    pub fn settle(&mut self, token: u64, outcome: Result<T, ErrorInfo>) -> bool {
        if self.retired || token != self.epoch {
            return false;
        }
        self.state = match outcome {
            Ok(value) => OpState::Success(value),
            Err(err) => OpState::Error(err),
        };
        true
    }

    /// Marks the owning scope as torn down. All in-flight completions
    /// become permanently stale.
    pub fn retire(&mut self) {
        self.retired = true;
    }

    pub fn state(&self) -> &OpState<T> {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }
}

/// Shared handle around an [`OpCell`] driving futures on the runtime.
#[derive(Debug)]
pub struct AsyncOperation<T> {
    cell: Arc<Mutex<OpCell<T>>>,
}

impl<T> Clone for AsyncOperation<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T> Default for AsyncOperation<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AsyncOperation<T> {
    pub fn new() -> Self {
        Self {
            cell: Arc::new(Mutex::new(OpCell::default())),
        }
    }

    pub async fn is_loading(&self) -> bool {
        self.cell.lock().await.is_loading()
    }

    pub async fn retire(&self) {
        self.cell.lock().await.retire();
    }
}

impl<T: Clone> AsyncOperation<T> {
    pub async fn snapshot(&self) -> OpState<T> {
        self.cell.lock().await.state().clone()
    }

    /// Drives `future` in place. Returns the outcome only if it was
    /// applied; a completion superseded by a newer invocation or
    /// resolving after retirement yields `None` and callers must not
    /// act on it.
    pub async fn run<F>(&self, future: F) -> Option<Result<T, ErrorInfo>>
    where
        F: Future<Output = Result<T, ErrorInfo>>,
    {
        let token = self.cell.lock().await.begin();
        let outcome = future.await;
        if !self.cell.lock().await.settle(token, outcome.clone()) {
            tracing::debug!(token, "discarding superseded completion");
            return None;
        }
        Some(outcome)
    }
}

impl<T: Clone + Send + 'static> AsyncOperation<T> {
    /// Fire-and-forget invocation. The loading transition happens
    /// before this returns; the completion is applied (or discarded as
    /// stale) by a background task.
    pub async fn invoke<F>(&self, future: F) -> JoinHandle<()>
    where
        F: Future<Output = Result<T, ErrorInfo>> + Send + 'static,
    {
        let token = self.cell.lock().await.begin();
        let cell = Arc::clone(&self.cell);
        tokio::spawn(async move {
            let outcome = future.await;
            if !cell.lock().await.settle(token, outcome) {
                tracing::debug!(token, "discarding superseded completion");
            }
        })
    }
}
