/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

//! Runtime configuration loaded from XDG-compliant locations.

use std::path::Path;
use std::time::Duration;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Runtime configuration for callhub.
///
/// Loaded from `$XDG_CONFIG_HOME/callhub/config.toml`. Every section and field is optional
/// in the file; anything left out takes its default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CallhubConfig {
    /// Timeout configuration
    pub timeouts: TimeoutConfig,
    /// Limits and capacity configuration
    pub limits: LimitsConfig,
    /// Default names for spawned processes
    pub defaults: DefaultsConfig,
    /// Behavioral switches
    pub behavior: BehaviorConfig,
}

/// Timeout-related configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// How long a single process may take to drain after END, in milliseconds
    pub process_shutdown_ms: u64,
    /// How long `shutdown_all` waits for every process, in milliseconds
    pub system_shutdown_ms: u64,
}

/// Limits and capacity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Bounded inbox size of every spawned process
    pub inbox_capacity: usize,
}

/// Default names used when the caller does not supply one
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Name for a process spawned with an empty name
    pub process_name: String,
    /// Name for a hub spawned through `spawn_hub`
    pub hub_name: String,
    /// Name for a mailbox opened through `open_mailbox`
    pub mailbox_name: String,
}

/// Behavioral configuration switches
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Catch and log panics raised while processing a packet
    pub catch_task_panics: bool,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            process_shutdown_ms: 10_000,
            system_shutdown_ms: 30_000,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            inbox_capacity: 255,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            process_name: "process".to_string(),
            hub_name: "hub".to_string(),
            mailbox_name: "mailbox".to_string(),
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            catch_task_panics: true,
        }
    }
}

impl CallhubConfig {
    /// Per-process shutdown timeout as a `Duration`
    #[must_use]
    pub const fn process_shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.process_shutdown_ms)
    }

    /// System-wide shutdown timeout as a `Duration`
    #[must_use]
    pub const fn system_shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.system_shutdown_ms)
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns the parse error if `source` is not valid TOML for this structure.
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Reads a configuration file, falling back to defaults if it cannot be read or parsed.
    pub fn load_from(path: &Path) -> Self {
        info!("Loading configuration from: {}", path.display());
        match std::fs::read_to_string(path) {
            Ok(source) => match Self::from_toml_str(&source) {
                Ok(config) => {
                    info!("Successfully loaded configuration");
                    config
                }
                Err(e) => {
                    error!("Failed to parse configuration file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                error!("Failed to read configuration file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Loads configuration from XDG-compliant locations.
    ///
    /// Looks for `callhub/config.toml` under the XDG config directories. If no file is
    /// found the defaults are returned. A file that exists but is malformed is logged and
    /// ignored.
    pub fn load() -> Self {
        let xdg_dirs = match xdg::BaseDirectories::with_prefix("callhub") {
            Ok(dirs) => dirs,
            Err(e) => {
                error!("Failed to initialize XDG directories: {}", e);
                return Self::default();
            }
        };

        match xdg_dirs.find_config_file("config.toml") {
            Some(path) => Self::load_from(&path),
            None => {
                info!("No configuration file found, using defaults");
                Self::default()
            }
        }
    }
}

lazy_static! {
    /// Global configuration instance loaded from XDG-compliant locations
    pub static ref CONFIG: CallhubConfig = CallhubConfig::load();
}
