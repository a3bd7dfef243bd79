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

pub mod owner;
pub mod pods;
pub mod readiness;
pub mod volumes;

use crate::stratus::api::HttpError;
use crate::stratus::util::error::with_context;
use crate::stratus::util::poll::WaitError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors raised while resolving workload topology or waiting on readiness.
///
/// Absence is recoverable while polling; transport failures are not, and a
/// cancellation is never retried. Ambiguous ownership is not an error kind:
/// candidates with zero or multiple owner references are excluded from
/// matching, and an ambiguous match surfaces as `NotFound`.
#[derive(Debug)]
pub enum WorkloadError {
    /// A controller, child generation, or pod collection is absent.
    NotFound(String),
    /// The cluster API failed for a reason other than absence.
    Transport(Box<dyn Error + Send + Sync>),
    /// The caller's deadline passed or its token fired.
    Cancelled(String),
}

impl WorkloadError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, WorkloadError::NotFound(_))
    }

    /// Classifies a cluster API failure: HTTP 404 is absence, everything
    /// else is a transport fault that aborts polling.
    pub(crate) fn from_api(
        err: Box<dyn Error + Send + Sync>,
        context: impl Into<String>,
    ) -> Self {
        let context = context.into();
        match err.downcast::<HttpError>() {
            Ok(http) if http.is_not_found() => {
                WorkloadError::NotFound(format!("{}: {}", context, http.message))
            }
            Ok(http) => WorkloadError::Transport(with_context(*http, context)),
            Err(other) => WorkloadError::Transport(with_context(other, context)),
        }
    }
}

impl Display for WorkloadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkloadError::NotFound(message) => write!(f, "{}", message),
            WorkloadError::Transport(err) => write!(f, "{}", err),
            WorkloadError::Cancelled(message) => write!(f, "{}", message),
        }
    }
}

impl Error for WorkloadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WorkloadError::Transport(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<WaitError<WorkloadError>> for WorkloadError {
    fn from(err: WaitError<WorkloadError>) -> Self {
        match err {
            WaitError::Cancelled(reason) => WorkloadError::Cancelled(reason),
            WaitError::Aborted(inner) => inner,
        }
    }
}
