//! Operation orchestration layer for the graph-database console.
//!
//! Thin client logic over the remote control plane: lifecycle toggling
//! with optimistic rollback, namespace query/upload workflows with
//! XML-to-table parsing, and the async request/state substrate both are
//! built on. All durable state lives server-side; everything here is an
//! ephemeral, possibly-stale copy.

pub mod async_op;
pub mod gateway;
pub mod instances;
pub mod lifecycle;
pub mod namespaces;
pub mod navigation;
pub mod notify;
pub mod query_console;
pub mod results;

pub use async_op::{AsyncOperation, OpCell, OpState};
pub use gateway::{HttpInstanceGateway, InstanceGateway};
pub use instances::InstanceDirectory;
pub use lifecycle::InstanceLifecycleController;
pub use namespaces::NamespaceDirectory;
pub use navigation::{Navigator, NullNavigator};
pub use notify::{BroadcastNotifier, Notification, NotificationSink, NullNotifier};
pub use query_console::{NamespaceQueryConsole, SessionState};
pub use results::{parse_query_results, QueryRow};

#[cfg(test)]
#[path = "tests/core_tests.rs"]
mod tests;
