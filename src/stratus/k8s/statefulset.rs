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

use super::persistentvolumeclaim::PersistentVolumeClaim;
use super::pod::{ObjectMeta, PodSpec};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Minimal label selector supporting exact-match labels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelSelector {
    #[serde(
        rename = "matchLabels",
        default,
        skip_serializing_if = "HashMap::is_empty"
    )]
    pub match_labels: HashMap<String, String>,
}

/// Template describing the pods managed by a controller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PodTemplateSpec {
    #[serde(default)]
    pub metadata: ObjectMeta,
    pub spec: PodSpec,
}

/// Minimal StatefulSet specification for the data Stratus reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatefulSetSpec {
    #[serde(rename = "serviceName")]
    pub service_name: String,
    pub replicas: i32,
    #[serde(default)]
    pub selector: LabelSelector,
    pub template: PodTemplateSpec,
    #[serde(
        rename = "volumeClaimTemplates",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub volume_claim_templates: Vec<PersistentVolumeClaim>,
}

/// Replica counters reported by the StatefulSet controller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatefulSetStatus {
    #[serde(rename = "replicas", skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    #[serde(rename = "readyReplicas", skip_serializing_if = "Option::is_none")]
    pub ready_replicas: Option<i32>,
    #[serde(rename = "currentReplicas", skip_serializing_if = "Option::is_none")]
    pub current_replicas: Option<i32>,
    #[serde(rename = "observedGeneration", skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// StatefulSet object description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatefulSet {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: StatefulSetSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatefulSetStatus>,
}

impl StatefulSet {
    pub fn new(metadata: ObjectMeta, spec: StatefulSetSpec) -> Self {
        Self {
            api_version: "apps/v1".to_string(),
            kind: "StatefulSet".to_string(),
            metadata,
            spec,
            status: None,
        }
    }
}

