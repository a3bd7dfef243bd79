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

use crate::stratus::logger::log_warn;
use std::env;
use std::time::Duration;

/// Enum for supported configuration parameters.
#[derive(Debug, Clone, Copy)]
pub enum Config {
    /// Cluster API endpoint.
    Server,
    /// PEM bundle with additional root certificates for the API endpoint.
    CaBundle,
    /// Bearer token presented to the API server.
    Token,
    /// File containing the bearer token, read when `Token` is unset.
    TokenFile,
    /// Sleep between readiness poll attempts.
    PollInterval,
    /// Overall deadline for a readiness poll.
    PollTimeout,
}

impl Config {
    /// Returns the associated environment variable for the config parameter.
    pub fn env_var(&self) -> &'static str {
        match self {
            Config::Server => "STRATUS_SERVER",
            Config::CaBundle => "STRATUS_CA_BUNDLE",
            Config::Token => "STRATUS_TOKEN",
            Config::TokenFile => "STRATUS_TOKEN_FILE",
            Config::PollInterval => "STRATUS_POLL_INTERVAL",
            Config::PollTimeout => "STRATUS_POLL_TIMEOUT",
        }
    }

    /// Returns the built-in default, empty for parameters without one.
    pub fn default_value(&self) -> &'static str {
        match self {
            Config::Server => "https://127.0.0.1:6443",
            Config::CaBundle => "",
            Config::Token => "",
            Config::TokenFile => "",
            Config::PollInterval => "1s",
            Config::PollTimeout => "10m",
        }
    }

    /// Resolved value: the environment variable when set and non-empty,
    /// otherwise the default. `None` when neither yields a value.
    pub fn get(&self) -> Option<String> {
        match env::var(self.env_var()) {
            Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
            _ => {
                let default = self.default_value();
                if default.is_empty() {
                    None
                } else {
                    Some(default.to_string())
                }
            }
        }
    }

    /// Resolved duration for the poll tuning parameters. Unparseable values
    /// fall back to the built-in default.
    pub fn get_duration(&self) -> Duration {
        let fallback = humantime::parse_duration(self.default_value())
            .unwrap_or(Duration::from_secs(1));
        let Some(value) = self.get() else {
            return fallback;
        };
        match humantime::parse_duration(&value) {
            Ok(duration) => duration,
            Err(err) => {
                let error_text = err.to_string();
                log_warn(
                    "config",
                    "ignoring unparseable duration",
                    &[
                        ("var", self.env_var()),
                        ("value", value.as_str()),
                        ("error", error_text.as_str()),
                    ],
                );
                fallback
            }
        }
    }
}
