//! Top-level instance collection: fetch, create, and refresh.

use std::sync::Arc;

use shared::{
    domain::{InstanceId, InstanceRecord},
    error::ErrorInfo,
    protocol::CreateInstanceRequest,
};
use tokio::sync::{mpsc, Mutex};

use crate::{async_op::AsyncOperation, gateway::InstanceGateway, notify::NotificationSink};

#[derive(Debug, Default)]
struct DirectoryState {
    instances: Vec<InstanceRecord>,
    create_dialog_open: bool,
}

/// Owns the instance list. Every refresh replaces the whole list from
/// the server response; the last fetch to complete wins and nothing is
/// field-merged locally.
pub struct InstanceDirectory {
    gateway: Arc<dyn InstanceGateway>,
    notifier: Arc<dyn NotificationSink>,
    state: Mutex<DirectoryState>,
    list_op: AsyncOperation<Vec<InstanceRecord>>,
    create_op: AsyncOperation<InstanceRecord>,
    refresh_tx: mpsc::UnboundedSender<InstanceId>,
    refresh_rx: Mutex<mpsc::UnboundedReceiver<InstanceId>>,
}

impl InstanceDirectory {
    pub fn new(gateway: Arc<dyn InstanceGateway>, notifier: Arc<dyn NotificationSink>) -> Self {
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
        Self {
            gateway,
            notifier,
            state: Mutex::new(DirectoryState::default()),
            list_op: AsyncOperation::new(),
            create_op: AsyncOperation::new(),
            refresh_tx,
            refresh_rx: Mutex::new(refresh_rx),
        }
    }

    /// Handle lifecycle controllers use to request a list refresh.
    pub fn refresh_handle(&self) -> mpsc::UnboundedSender<InstanceId> {
        self.refresh_tx.clone()
    }

    pub async fn instances(&self) -> Vec<InstanceRecord> {
        self.state.lock().await.instances.clone()
    }

    pub async fn is_create_dialog_open(&self) -> bool {
        self.state.lock().await.create_dialog_open
    }

    pub async fn open_create_dialog(&self) {
        self.state.lock().await.create_dialog_open = true;
    }

    pub async fn close_create_dialog(&self) {
        self.state.lock().await.create_dialog_open = false;
    }

    /// Replaces the entire list from the server. Failures are reported
    /// and the previous list stays on display. `None` means the fetch
    /// was superseded or the directory retired; nothing was applied.
    pub async fn refresh(&self) -> Option<Result<Vec<InstanceRecord>, ErrorInfo>> {
        let gateway = Arc::clone(&self.gateway);
        let outcome = self
            .list_op
            .run(async move { gateway.list_instances().await })
            .await?;
        match &outcome {
            Ok(instances) => {
                self.state.lock().await.instances = instances.clone();
            }
            Err(err) => {
                self.notifier
                    .notify_error(&format!("Failed to fetch instances: {err}"));
            }
        }
        Some(outcome)
    }

    /// Serves refresh requests from lifecycle controllers. Runs until
    /// the owning task is dropped or aborted.
    pub async fn serve_refresh_requests(&self) {
        loop {
            let request = self.refresh_rx.lock().await.recv().await;
            match request {
                Some(id) => {
                    tracing::debug!(instance_id = id.0, "refreshing instance list on request");
                    let _ = self.refresh().await;
                }
                None => break,
            }
        }
    }

    /// Creates an instance, then refetches the list so server-assigned
    /// fields (id, pid) land. The dialog closes only on success.
    pub async fn create(
        &self,
        spec: CreateInstanceRequest,
    ) -> Option<Result<InstanceRecord, ErrorInfo>> {
        if spec.instance_name.trim().is_empty() {
            let err = ErrorInfo::validation("instance name must not be empty");
            self.notifier.notify_error(&err.message);
            return Some(Err(err));
        }
        if spec.port == 0 {
            let err = ErrorInfo::validation("instance port must be non-zero");
            self.notifier.notify_error(&err.message);
            return Some(Err(err));
        }

        let gateway = Arc::clone(&self.gateway);
        let outcome = self
            .create_op
            .run(async move { gateway.create_instance(spec).await })
            .await?;
        match &outcome {
            Ok(record) => {
                self.notifier.notify_success(&format!(
                    "Instance \"{}\" created successfully",
                    record.instance_name
                ));
                self.close_create_dialog().await;
                let _ = self.refresh().await;
            }
            Err(err) => {
                self.notifier
                    .notify_error(&format!("Failed to create instance: {err}"));
            }
        }
        Some(outcome)
    }

    pub async fn retire(&self) {
        self.list_op.retire().await;
        self.create_op.retire().await;
    }
}
