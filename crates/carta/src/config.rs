// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// The eight-colour series palette carried in every compiled chart spec.
/// Renderers are free to ignore it.
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#ef4444", "#f97316", "#eab308", "#22c55e", "#3b82f6", "#8b5cf6", "#ec4899", "#6b7280",
];
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub sample_size_for_numeric_classification: usize,
    pub numeric_fraction: f64,
    pub dispatcher_delay_ms: u64,
    pub palette: Vec<String>,
}
impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_size_for_numeric_classification: 10,
            numeric_fraction: 0.5,
            dispatcher_delay_ms: 1500,
            palette: DEFAULT_PALETTE.iter().map(|c| (*c).to_string()).collect(),
        }
    }
}
impl EngineConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.sample_size_for_numeric_classification == 0 {
            return Err(ConfigError::OutOfRange {
                field: "sample_size_for_numeric_classification".to_string(),
            });
        }
        if !(0.0..1.0).contains(&self.numeric_fraction) {
            return Err(ConfigError::OutOfRange {
                field: "numeric_fraction".to_string(),
            });
        }
        if self.palette.is_empty() {
            return Err(ConfigError::Empty {
                field: "palette".to_string(),
            });
        }
        Ok(())
    }
    pub fn for_tests() -> Self {
        Self {
            dispatcher_delay_ms: 0,
            ..Default::default()
        }
    }
    pub fn for_large_datasets() -> Self {
        Self {
            sample_size_for_numeric_classification: 25,
            ..Default::default()
        }
    }
    pub fn palette_colour(&self, index: usize) -> &str {
        &self.palette[index % self.palette.len()]
    }
}
