//! Query/upload workflow for one namespace session.

use std::sync::Arc;

use shared::domain::{InstanceId, TtlFile};
use tokio::sync::Mutex;

use crate::{
    async_op::AsyncOperation,
    gateway::InstanceGateway,
    notify::NotificationSink,
    results::{parse_query_results, QueryRow},
};

/// Session machine: `Closed -> QueryInput -> {DisplayingResults | QueryInput}`.
/// The upload path never passes through result display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    QueryInput,
    DisplayingResults(Vec<QueryRow>),
}

#[derive(Debug, Default)]
struct ConsoleState {
    session: SessionStateSlot,
    staged_file: Option<TtlFile>,
}

#[derive(Debug, Default)]
enum SessionStateSlot {
    #[default]
    Closed,
    QueryInput,
    DisplayingResults(Vec<QueryRow>),
}

impl SessionStateSlot {
    fn as_public(&self) -> SessionState {
        match self {
            SessionStateSlot::Closed => SessionState::Closed,
            SessionStateSlot::QueryInput => SessionState::QueryInput,
            SessionStateSlot::DisplayingResults(rows) => {
                SessionState::DisplayingResults(rows.clone())
            }
        }
    }
}

pub struct NamespaceQueryConsole {
    instance_id: InstanceId,
    namespace: String,
    gateway: Arc<dyn InstanceGateway>,
    notifier: Arc<dyn NotificationSink>,
    state: Mutex<ConsoleState>,
    query_op: AsyncOperation<Vec<QueryRow>>,
    upload_op: AsyncOperation<()>,
}

impl NamespaceQueryConsole {
    pub fn new(
        instance_id: InstanceId,
        namespace: impl Into<String>,
        gateway: Arc<dyn InstanceGateway>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            instance_id,
            namespace: namespace.into(),
            gateway,
            notifier,
            state: Mutex::new(ConsoleState::default()),
            query_op: AsyncOperation::new(),
            upload_op: AsyncOperation::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub async fn session(&self) -> SessionState {
        self.state.lock().await.session.as_public()
    }

    /// Opens a fresh session with empty staging.
    pub async fn open(&self) {
        let mut state = self.state.lock().await;
        state.session = SessionStateSlot::QueryInput;
        state.staged_file = None;
    }

    /// Explicit close or backdrop dismissal: results are discarded and
    /// staging resets. Nothing is cached across sessions.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        state.session = SessionStateSlot::Closed;
        state.staged_file = None;
    }

    pub async fn stage_file(&self, file: TtlFile) {
        self.state.lock().await.staged_file = Some(file);
    }

    pub async fn staged_file(&self) -> Option<TtlFile> {
        self.state.lock().await.staged_file.clone()
    }

    /// Runs the query and replaces any displayed results. Empty text is
    /// a no-op; a zero-row response keeps the session on the input form
    /// with an informational notification; failures are always reported
    /// and never change the session state.
    pub async fn submit_query(&self, text: &str) {
        let query = text.trim();
        if query.is_empty() {
            tracing::debug!(namespace = %self.namespace, "empty query ignored");
            return;
        }
        {
            let mut state = self.state.lock().await;
            match state.session {
                SessionStateSlot::Closed => {
                    tracing::debug!(namespace = %self.namespace, "query submitted on a closed session");
                    return;
                }
                // A resubmission discards whatever was on display.
                SessionStateSlot::DisplayingResults(_) => {
                    state.session = SessionStateSlot::QueryInput;
                }
                SessionStateSlot::QueryInput => {}
            }
        }

        let gateway = Arc::clone(&self.gateway);
        let id = self.instance_id;
        let namespace = self.namespace.clone();
        let query = query.to_string();
        let outcome = self
            .query_op
            .run(async move {
                let xml = gateway.run_query(id, &namespace, &query).await?;
                parse_query_results(&xml)
            })
            .await;

        match outcome {
            // A newer submission or a teardown superseded this query;
            // its rows must never reach the display.
            None => {
                tracing::debug!(namespace = %self.namespace, "stale query completion discarded");
            }
            Some(Ok(rows)) if rows.is_empty() => {
                self.notifier.notify_info("Query returned no data");
            }
            Some(Ok(rows)) => {
                let mut state = self.state.lock().await;
                state.session = SessionStateSlot::DisplayingResults(rows);
                self.notifier.notify_success("Query executed successfully");
            }
            Some(Err(err)) => {
                self.notifier.notify_error(&format!("Error running query: {err}"));
            }
        }
    }

    /// Uploads the staged TTL file. Success clears the staging and
    /// closes the session; failure leaves both in place for a retry.
    pub async fn submit_upload(&self) {
        let Some(file) = self.state.lock().await.staged_file.take() else {
            tracing::debug!(namespace = %self.namespace, "upload submitted with no staged file");
            return;
        };

        let gateway = Arc::clone(&self.gateway);
        let id = self.instance_id;
        let namespace = self.namespace.clone();
        let retry_copy = file.clone();
        let outcome = self
            .upload_op
            .run(async move { gateway.upload_ttl(id, &namespace, file).await })
            .await;

        match outcome {
            None => {
                tracing::debug!(namespace = %self.namespace, "stale upload completion discarded");
            }
            Some(Ok(())) => {
                let mut state = self.state.lock().await;
                state.session = SessionStateSlot::Closed;
                state.staged_file = None;
                self.notifier.notify_success("File uploaded successfully");
            }
            Some(Err(err)) => {
                self.state.lock().await.staged_file = Some(retry_copy);
                self.notifier.notify_error(&format!("Error uploading file: {err}"));
            }
        }
    }

    pub async fn retire(&self) {
        self.query_op.retire().await;
        self.upload_op.retire().await;
    }
}
