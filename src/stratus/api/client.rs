/*
 * Copyright (C) 2025 The Stratus Authors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 * http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::time::Duration;

use reqwest::tls::Certificate;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::stratus::config::Config;
use crate::stratus::k8s::deployment::Deployment;
use crate::stratus::k8s::deploymentconfig::DeploymentConfig;
use crate::stratus::k8s::pod::{Pod, PodList};
use crate::stratus::k8s::replicaset::ReplicaSetList;
use crate::stratus::k8s::replicationcontroller::ReplicationControllerList;
use crate::stratus::k8s::statefulset::StatefulSet;
use crate::stratus::util::new_error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Non-2xx response from the cluster API, carrying the status code the
/// workload layer classifies errors by.
#[derive(Debug)]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

impl HttpError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        HttpError {
            status,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl Error for HttpError {}

/// Subset of the Kubernetes `Status` body returned with error responses.
#[derive(Debug, Deserialize)]
struct StatusBody {
    #[serde(default)]
    message: Option<String>,
}

/// Read-mostly cluster API client. Requests are single-shot: the readiness
/// poller is the only retry boundary, so transport failures surface to the
/// caller unretried.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    /// Builds a client from the `STRATUS_*` environment: endpoint, optional
    /// CA bundle, optional bearer token (inline or from a file).
    pub fn from_env() -> Result<Self, Box<dyn Error + Send + Sync>> {
        let endpoint = Config::Server
            .get()
            .ok_or_else(|| new_error("cluster API endpoint is not configured"))?;
        let base_url = Url::parse(&endpoint)?;

        let mut builder = Client::builder().timeout(REQUEST_TIMEOUT).http1_only();
        if let Some(path) = Config::CaBundle.get() {
            let pem = fs::read(&path).map_err(|err| {
                io::Error::new(
                    err.kind(),
                    format!("failed to read CA bundle {path}: {err}"),
                )
            })?;
            builder = builder.add_root_certificate(Certificate::from_pem(&pem)?);
        }
        let client = builder.build().map_err(|err| {
            io::Error::other(format!("failed to construct Stratus HTTP client: {err}"))
        })?;

        let token = match Config::Token.get() {
            Some(token) => Some(token),
            None => match Config::TokenFile.get() {
                Some(path) => {
                    let raw = fs::read_to_string(&path).map_err(|err| {
                        io::Error::new(
                            err.kind(),
                            format!("failed to read token file {path}: {err}"),
                        )
                    })?;
                    let trimmed = raw.trim();
                    if trimmed.is_empty() {
                        return Err(new_error(format!("token file {path} is empty")));
                    }
                    Some(trimmed.to_string())
                }
                None => None,
            },
        };

        Ok(ApiClient {
            client,
            base_url,
            token,
        })
    }

    pub fn url_from_segments(&self, segments: &[&str]) -> Result<Url, Box<dyn Error + Send + Sync>> {
        let mut url = self.base_url.clone();
        {
            let mut parts = url
                .path_segments_mut()
                .map_err(|_| "base URL cannot be base for segments")?;
            parts.clear();
            for segment in segments {
                if !segment.is_empty() {
                    parts.push(segment);
                }
            }
        }
        Ok(url)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn handle_json<T>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, Box<dyn Error + Send + Sync>>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if status.is_success() {
            let body = response.json::<T>().await?;
            return Ok(body);
        }

        let text = response.text().await.unwrap_or_default();
        if let Ok(parsed) = serde_json::from_str::<StatusBody>(&text) {
            if let Some(message) = parsed.message.filter(|m| !m.is_empty()) {
                return Err(Box::new(HttpError::new(status, message)));
            }
        }

        let message = if text.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            text
        };

        Err(Box::new(HttpError::new(status, message)))
    }

    async fn send_json<T>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, Box<dyn Error + Send + Sync>>
    where
        T: DeserializeOwned,
    {
        let response = self.apply_auth(request).send().await?;
        self.handle_json(response).await
    }

    pub async fn get_deployment(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Deployment, Box<dyn Error + Send + Sync>> {
        let url = self.url_from_segments(&[
            "apis",
            "apps",
            "v1",
            "namespaces",
            namespace,
            "deployments",
            name,
        ])?;
        self.send_json(self.client.get(url)).await
    }

    pub async fn get_stateful_set(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<StatefulSet, Box<dyn Error + Send + Sync>> {
        let url = self.url_from_segments(&[
            "apis",
            "apps",
            "v1",
            "namespaces",
            namespace,
            "statefulsets",
            name,
        ])?;
        self.send_json(self.client.get(url)).await
    }

    pub async fn get_deployment_config(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<DeploymentConfig, Box<dyn Error + Send + Sync>> {
        let url = self.url_from_segments(&[
            "apis",
            "apps.openshift.io",
            "v1",
            "namespaces",
            namespace,
            "deploymentconfigs",
            name,
        ])?;
        self.send_json(self.client.get(url)).await
    }

    pub async fn get_pod(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Pod, Box<dyn Error + Send + Sync>> {
        let url = self.url_from_segments(&["api", "v1", "namespaces", namespace, "pods", name])?;
        self.send_json(self.client.get(url)).await
    }

    pub async fn list_replica_sets(
        &self,
        namespace: &str,
    ) -> Result<ReplicaSetList, Box<dyn Error + Send + Sync>> {
        let url = self.url_from_segments(&[
            "apis",
            "apps",
            "v1",
            "namespaces",
            namespace,
            "replicasets",
        ])?;
        self.send_json(self.client.get(url)).await
    }

    pub async fn list_replication_controllers(
        &self,
        namespace: &str,
    ) -> Result<ReplicationControllerList, Box<dyn Error + Send + Sync>> {
        let url = self.url_from_segments(&[
            "api",
            "v1",
            "namespaces",
            namespace,
            "replicationcontrollers",
        ])?;
        self.send_json(self.client.get(url)).await
    }

    pub async fn list_pods(
        &self,
        namespace: &str,
    ) -> Result<PodList, Box<dyn Error + Send + Sync>> {
        let url = self.url_from_segments(&["api", "v1", "namespaces", namespace, "pods"])?;
        self.send_json(self.client.get(url)).await
    }

    /// Replaces a Deployment object; used to write back an updated replica
    /// count. Namespace and name are taken from the object's metadata.
    pub async fn update_deployment(
        &self,
        deployment: &Deployment,
    ) -> Result<Deployment, Box<dyn Error + Send + Sync>> {
        let (namespace, name) = object_path(&deployment.metadata)?;
        let url = self.url_from_segments(&[
            "apis",
            "apps",
            "v1",
            "namespaces",
            namespace,
            "deployments",
            name,
        ])?;
        self.send_json(self.client.put(url).json(deployment)).await
    }

    /// Replaces a StatefulSet object; used to write back an updated replica
    /// count.
    pub async fn update_stateful_set(
        &self,
        set: &StatefulSet,
    ) -> Result<StatefulSet, Box<dyn Error + Send + Sync>> {
        let (namespace, name) = object_path(&set.metadata)?;
        let url = self.url_from_segments(&[
            "apis",
            "apps",
            "v1",
            "namespaces",
            namespace,
            "statefulsets",
            name,
        ])?;
        self.send_json(self.client.put(url).json(set)).await
    }
}

fn object_path(
    metadata: &crate::stratus::k8s::pod::ObjectMeta,
) -> Result<(&str, &str), Box<dyn Error + Send + Sync>> {
    let namespace = metadata
        .namespace
        .as_deref()
        .filter(|ns| !ns.is_empty())
        .ok_or_else(|| new_error("object metadata is missing a namespace"))?;
    let name = metadata
        .name
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| new_error("object metadata is missing a name"))?;
    Ok((namespace, name))
}
