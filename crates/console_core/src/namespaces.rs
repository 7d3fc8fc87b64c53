//! Namespace listing and creation for one instance.

use std::sync::Arc;

use shared::{
    domain::{InstanceId, NamespaceSummary},
    error::ErrorInfo,
};
use tokio::sync::Mutex;

use crate::{async_op::AsyncOperation, gateway::InstanceGateway, notify::NotificationSink};

#[derive(Debug, Default)]
struct NamespaceState {
    names: Vec<String>,
    create_dialog_open: bool,
}

pub struct NamespaceDirectory {
    instance_id: InstanceId,
    gateway: Arc<dyn InstanceGateway>,
    notifier: Arc<dyn NotificationSink>,
    state: Mutex<NamespaceState>,
    list_op: AsyncOperation<Vec<String>>,
    create_op: AsyncOperation<String>,
}

impl NamespaceDirectory {
    pub fn new(
        instance_id: InstanceId,
        gateway: Arc<dyn InstanceGateway>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            instance_id,
            gateway,
            notifier,
            state: Mutex::new(NamespaceState::default()),
            list_op: AsyncOperation::new(),
            create_op: AsyncOperation::new(),
        }
    }

    pub fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    pub async fn names(&self) -> Vec<String> {
        self.state.lock().await.names.clone()
    }

    pub async fn summaries(&self) -> Vec<NamespaceSummary> {
        let state = self.state.lock().await;
        state
            .names
            .iter()
            .map(|name| NamespaceSummary {
                instance_id: self.instance_id,
                name: name.clone(),
            })
            .collect()
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

    /// Replaces the local name list from the server. `None` means the
    /// fetch was superseded or the directory retired.
    pub async fn load(&self) -> Option<Result<Vec<String>, ErrorInfo>> {
        let gateway = Arc::clone(&self.gateway);
        let id = self.instance_id;
        let outcome = self
            .list_op
            .run(async move { gateway.list_namespaces(id).await })
            .await?;
        match &outcome {
            Ok(names) => {
                self.state.lock().await.names = names.clone();
            }
            Err(err) => {
                self.notifier
                    .notify_error(&format!("Failed to fetch namespaces: {err}"));
            }
        }
        Some(outcome)
    }

    /// Validates the name client-side (the server stays authoritative),
    /// creates the namespace, and appends the returned name to the
    /// local list. Append-only; the server enforces uniqueness if it
    /// cares to. The dialog closes only on success.
    pub async fn create(&self, name: &str) -> Option<Result<String, ErrorInfo>> {
        let name = name.trim();
        if name.is_empty() {
            let err = ErrorInfo::validation("namespace name must not be empty");
            self.notifier.notify_error(&err.message);
            return Some(Err(err));
        }

        let gateway = Arc::clone(&self.gateway);
        let id = self.instance_id;
        let requested = name.to_string();
        let outcome = self
            .create_op
            .run(async move { gateway.create_namespace(id, &requested).await })
            .await?;
        match &outcome {
            Ok(created) => {
                let mut state = self.state.lock().await;
                state.names.push(created.clone());
                state.create_dialog_open = false;
                self.notifier.notify_success(&format!(
                    "Namespace \"{created}\" created successfully"
                ));
            }
            Err(err) => {
                self.notifier
                    .notify_error(&format!("Failed to create namespace: {err}"));
            }
        }
        Some(outcome)
    }

    pub async fn retire(&self) {
        self.list_op.retire().await;
        self.create_op.retire().await;
    }
}
