use serde::{Deserialize, Serialize};

use crate::domain::InstanceId;

/// Body of `POST /create_instance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInstanceRequest {
    pub instance_name: String,
    pub port: u16,
    pub install_path: String,
    pub min_memory: String,
    pub max_memory: String,
    pub ip_address: String,
}

/// Body of `POST /start_instance` and `POST /stop_instance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceActionRequest {
    pub id: InstanceId,
}

/// Body of `GET /get_namespaces/{id}` responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceListResponse {
    pub namespaces: Vec<String>,
}

/// Body of `POST /create_namespace`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNamespaceRequest {
    pub id: InstanceId,
    pub namespace_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNamespaceResponse {
    pub namespace_name: String,
}

/// Body of `POST /run_query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunQueryRequest {
    pub id: InstanceId,
    pub namespace_name: String,
    pub query: String,
}

/// Query responses wrap the SPARQL results XML document as a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunQueryResponse {
    pub result: String,
}
