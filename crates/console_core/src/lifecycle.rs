//! Optimistic start/stop lifecycle control for one instance.

use std::sync::Arc;

use shared::domain::{InstanceId, InstanceRecord, InstanceStatus};
use tokio::sync::{mpsc, Mutex};

use crate::{
    async_op::AsyncOperation,
    gateway::InstanceGateway,
    notify::NotificationSink,
};

/// Owns the displayed copy of one instance record. The toggle flips the
/// displayed status before the network call resolves and guarantees a
/// full revert on failure; no intermediate status is ever observable.
pub struct InstanceLifecycleController {
    gateway: Arc<dyn InstanceGateway>,
    notifier: Arc<dyn NotificationSink>,
    refresh_tx: mpsc::UnboundedSender<InstanceId>,
    record: Mutex<InstanceRecord>,
    start_op: AsyncOperation<()>,
    stop_op: AsyncOperation<()>,
}

impl InstanceLifecycleController {
    pub fn new(
        record: InstanceRecord,
        gateway: Arc<dyn InstanceGateway>,
        notifier: Arc<dyn NotificationSink>,
        refresh_tx: mpsc::UnboundedSender<InstanceId>,
    ) -> Self {
        Self {
            gateway,
            notifier,
            refresh_tx,
            record: Mutex::new(record),
            start_op: AsyncOperation::new(),
            stop_op: AsyncOperation::new(),
        }
    }

    pub async fn record(&self) -> InstanceRecord {
        self.record.lock().await.clone()
    }

    pub async fn displayed_status(&self) -> InstanceStatus {
        self.record.lock().await.status
    }

    /// Replaces the local copy with server truth after a list refresh.
    pub async fn apply_refetched(&self, record: InstanceRecord) {
        *self.record.lock().await = record;
    }

    /// Flips the displayed status optimistically and issues the
    /// matching start/stop call. Ignored while a lifecycle request for
    /// this instance is already in flight.
    pub async fn toggle(&self) {
        if self.start_op.is_loading().await || self.stop_op.is_loading().await {
            let id = self.record.lock().await.id;
            tracing::debug!(instance_id = id.0, "toggle ignored; request already in flight");
            return;
        }

        let (id, name, previous, target) = {
            let mut record = self.record.lock().await;
            let previous = record.status;
            record.status = previous.toggled();
            (record.id, record.instance_name.clone(), previous, record.status)
        };

        let op = match target {
            InstanceStatus::Running => &self.start_op,
            InstanceStatus::Stopped => &self.stop_op,
        };
        let gateway = Arc::clone(&self.gateway);
        let outcome = op
            .run(async move {
                match target {
                    InstanceStatus::Running => gateway.start_instance(id).await,
                    InstanceStatus::Stopped => gateway.stop_instance(id).await,
                }
            })
            .await;

        match outcome {
            // Superseded or retired while in flight; the completion was
            // discarded and must not touch displayed state.
            None => {
                tracing::debug!(instance_id = id.0, "stale toggle completion discarded");
            }
            Some(Ok(())) => {
                tracing::info!(instance_id = id.0, status = target.as_str(), "instance toggled");
                self.notifier.notify_success(&format!(
                    "Instance \"{name}\" is now {}",
                    target.as_str()
                ));
                // Server may have changed fields like pid; ask the
                // parent collection to refetch.
                if self.refresh_tx.send(id).is_err() {
                    tracing::warn!(instance_id = id.0, "refresh requested but no collection is listening");
                }
            }
            Some(Err(err)) => {
                {
                    let mut record = self.record.lock().await;
                    record.status = previous;
                }
                tracing::warn!(instance_id = id.0, error = %err, "toggle failed; status reverted");
                self.notifier.notify_error(&format!(
                    "Failed to {} instance \"{name}\": {err}",
                    match target {
                        InstanceStatus::Running => "start",
                        InstanceStatus::Stopped => "stop",
                    }
                ));
            }
        }
    }

    /// Tears the controller down; pending completions become stale.
    pub async fn retire(&self) {
        self.start_op.retire().await;
        self.stop_op.retire().await;
    }
}
