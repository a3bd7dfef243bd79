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

use super::pod::ObjectMeta;
use super::statefulset::PodTemplateSpec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// DeploymentConfig specification, the OpenShift analogue of a Deployment.
/// Its rollout generations are ReplicationControllers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentConfigSpec {
    pub replicas: i32,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub selector: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<PodTemplateSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentConfigStatus {
    #[serde(rename = "replicas", skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    #[serde(rename = "updatedReplicas", skip_serializing_if = "Option::is_none")]
    pub updated_replicas: Option<i32>,
    #[serde(rename = "readyReplicas", skip_serializing_if = "Option::is_none")]
    pub ready_replicas: Option<i32>,
    #[serde(rename = "availableReplicas", skip_serializing_if = "Option::is_none")]
    pub available_replicas: Option<i32>,
    #[serde(rename = "observedGeneration", skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentConfig {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: DeploymentConfigSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DeploymentConfigStatus>,
}

impl DeploymentConfig {
    pub fn new(metadata: ObjectMeta, spec: DeploymentConfigSpec) -> Self {
        Self {
            api_version: "apps.openshift.io/v1".to_string(),
            kind: "DeploymentConfig".to_string(),
            metadata,
            spec,
            status: None,
        }
    }
}

