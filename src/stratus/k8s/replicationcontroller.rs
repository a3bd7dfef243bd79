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

use super::pod::{ListMeta, ObjectMeta};
use super::statefulset::PodTemplateSpec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationControllerSpec {
    pub replicas: i32,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub selector: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<PodTemplateSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplicationControllerStatus {
    #[serde(rename = "replicas", skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    #[serde(rename = "readyReplicas", skip_serializing_if = "Option::is_none")]
    pub ready_replicas: Option<i32>,
    #[serde(rename = "availableReplicas", skip_serializing_if = "Option::is_none")]
    pub available_replicas: Option<i32>,
}

/// One rollout generation of a DeploymentConfig.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationController {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: ReplicationControllerSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReplicationControllerStatus>,
}

impl ReplicationController {
    pub fn new(metadata: ObjectMeta, spec: ReplicationControllerSpec) -> Self {
        Self {
            api_version: "v1".to_string(),
            kind: "ReplicationController".to_string(),
            metadata,
            spec,
            status: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationControllerList {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: ListMeta,
    pub items: Vec<ReplicationController>,
}

impl ReplicationControllerList {
    pub fn from_items(items: Vec<ReplicationController>) -> Self {
        Self {
            api_version: "v1".to_string(),
            kind: "ReplicationControllerList".to_string(),
            metadata: ListMeta::default(),
            items,
        }
    }
}
