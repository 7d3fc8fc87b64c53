//! Typed transport over the control-plane HTTP API. Pure functions over
//! a [`reqwest::Client`]; no business state, no retries. Retry policy
//! belongs to callers.

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{InstanceId, InstanceRecord, TtlFile},
    error::{ApiErrorBody, ErrorInfo},
    protocol::{
        CreateInstanceRequest, CreateNamespaceRequest, CreateNamespaceResponse,
        InstanceActionRequest, NamespaceListResponse, RunQueryRequest, RunQueryResponse,
    },
};

/// Seam controllers depend on, so workflows can run against fakes.
#[async_trait]
pub trait InstanceGateway: Send + Sync {
    async fn list_instances(&self) -> Result<Vec<InstanceRecord>, ErrorInfo>;
    async fn fetch_instance(&self, id: InstanceId) -> Result<InstanceRecord, ErrorInfo>;
    async fn create_instance(
        &self,
        spec: CreateInstanceRequest,
    ) -> Result<InstanceRecord, ErrorInfo>;
    async fn start_instance(&self, id: InstanceId) -> Result<(), ErrorInfo>;
    async fn stop_instance(&self, id: InstanceId) -> Result<(), ErrorInfo>;
    async fn list_namespaces(&self, id: InstanceId) -> Result<Vec<String>, ErrorInfo>;
    async fn create_namespace(&self, id: InstanceId, name: &str) -> Result<String, ErrorInfo>;
    async fn run_query(
        &self,
        id: InstanceId,
        namespace: &str,
        query: &str,
    ) -> Result<String, ErrorInfo>;
    async fn upload_ttl(
        &self,
        id: InstanceId,
        namespace: &str,
        file: TtlFile,
    ) -> Result<(), ErrorInfo>;
}

pub struct HttpInstanceGateway {
    http: Client,
    base_url: String,
}

impl HttpInstanceGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

fn transport_error(err: reqwest::Error) -> ErrorInfo {
    ErrorInfo::transport("control plane unreachable").with_cause(err.to_string())
}

/// 2xx passes through. A structured `{"error"}` body is the control
/// plane speaking and becomes an API error; anything else (proxy pages,
/// empty bodies) counts as a transport failure built from the status
/// line and raw body text.
async fn check_status(response: Response) -> Result<Response, ErrorInfo> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(parsed) => Err(ErrorInfo::api(parsed.error)),
        Err(_) if body.trim().is_empty() => {
            Err(ErrorInfo::transport(format!("control plane returned {status}")))
        }
        Err(_) => Err(ErrorInfo::transport(format!(
            "control plane returned {status}: {}",
            body.trim()
        ))),
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ErrorInfo> {
    check_status(response)
        .await?
        .json::<T>()
        .await
        .map_err(|err| ErrorInfo::api("control plane returned an unreadable body").with_cause(err.to_string()))
}

#[async_trait]
impl InstanceGateway for HttpInstanceGateway {
    async fn list_instances(&self) -> Result<Vec<InstanceRecord>, ErrorInfo> {
        let response = self
            .http
            .get(self.url("/get_all_instances"))
            .send()
            .await
            .map_err(transport_error)?;
        decode_json(response).await
    }

    async fn fetch_instance(&self, id: InstanceId) -> Result<InstanceRecord, ErrorInfo> {
        let response = self
            .http
            .get(self.url(&format!("/get_instance/{}", id.0)))
            .send()
            .await
            .map_err(transport_error)?;
        decode_json(response).await
    }

    async fn create_instance(
        &self,
        spec: CreateInstanceRequest,
    ) -> Result<InstanceRecord, ErrorInfo> {
        let response = self
            .http
            .post(self.url("/create_instance"))
            .json(&spec)
            .send()
            .await
            .map_err(transport_error)?;
        decode_json(response).await
    }

    async fn start_instance(&self, id: InstanceId) -> Result<(), ErrorInfo> {
        let response = self
            .http
            .post(self.url("/start_instance"))
            .json(&InstanceActionRequest { id })
            .send()
            .await
            .map_err(transport_error)?;
        // Status payload shape is not contractual; any 2xx is success.
        check_status(response).await.map(|_| ())
    }

    async fn stop_instance(&self, id: InstanceId) -> Result<(), ErrorInfo> {
        let response = self
            .http
            .post(self.url("/stop_instance"))
            .json(&InstanceActionRequest { id })
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response).await.map(|_| ())
    }

    async fn list_namespaces(&self, id: InstanceId) -> Result<Vec<String>, ErrorInfo> {
        let response = self
            .http
            .get(self.url(&format!("/get_namespaces/{}", id.0)))
            .send()
            .await
            .map_err(transport_error)?;
        let body: NamespaceListResponse = decode_json(response).await?;
        Ok(body.namespaces)
    }

    async fn create_namespace(&self, id: InstanceId, name: &str) -> Result<String, ErrorInfo> {
        let response = self
            .http
            .post(self.url("/create_namespace"))
            .json(&CreateNamespaceRequest {
                id,
                namespace_name: name.to_string(),
            })
            .send()
            .await
            .map_err(transport_error)?;
        let body: CreateNamespaceResponse = decode_json(response).await?;
        Ok(body.namespace_name)
    }

    async fn run_query(
        &self,
        id: InstanceId,
        namespace: &str,
        query: &str,
    ) -> Result<String, ErrorInfo> {
        let response = self
            .http
            .post(self.url("/run_query"))
            .json(&RunQueryRequest {
                id,
                namespace_name: namespace.to_string(),
                query: query.to_string(),
            })
            .send()
            .await
            .map_err(transport_error)?;
        let body: RunQueryResponse = decode_json(response).await?;
        Ok(body.result)
    }

    async fn upload_ttl(
        &self,
        id: InstanceId,
        namespace: &str,
        file: TtlFile,
    ) -> Result<(), ErrorInfo> {
        let TtlFile { filename, bytes } = file;
        let form = multipart::Form::new()
            .text("id", id.0.to_string())
            .text("namespace_name", namespace.to_string())
            .part("ttl_file", multipart::Part::bytes(bytes).file_name(filename));
        let response = self
            .http
            .post(self.url("/upload_ttl"))
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response).await.map(|_| ())
    }
}
