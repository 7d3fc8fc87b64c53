use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(InstanceId);

/// Lifecycle status of a managed service instance as displayed to the
/// operator. The wire format is the lowercase string the control plane
/// reports ("running" / "stopped").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    Running,
    Stopped,
}

impl InstanceStatus {
    pub fn toggled(self) -> Self {
        match self {
            InstanceStatus::Running => InstanceStatus::Stopped,
            InstanceStatus::Stopped => InstanceStatus::Running,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InstanceStatus::Running => "running",
            InstanceStatus::Stopped => "stopped",
        }
    }
}

/// One managed graph-database service process, as reported by the
/// control plane. The client holds an ephemeral, possibly-stale copy;
/// the server remains the source of truth for every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub id: InstanceId,
    pub instance_name: String,
    pub ip_address: String,
    pub port: u16,
    pub pid: i64,
    pub folder: String,
    pub min_memory: String,
    pub max_memory: String,
    pub status: InstanceStatus,
}

/// A named logical data partition scoped to exactly one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceSummary {
    pub instance_id: InstanceId,
    pub name: String,
}

/// An RDF file staged for ingestion into a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtlFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}
