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

pub mod deployment;
pub mod deploymentconfig;
pub mod persistentvolumeclaim;
pub mod pod;
pub mod replicaset;
pub mod replicationcontroller;
pub mod statefulset;

/// Annotation recording the rollout sequence number on a controller and on
/// the child generation resources it owns. The same key is written by the
/// Deployment and DeploymentConfig controllers.
pub const REVISION_ANNOTATION: &str = "deployment.kubernetes.io/revision";
