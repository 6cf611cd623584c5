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

use crate::config::EngineConfig;
use crate::csv_parser::Record;
use serde::{Deserialize, Serialize};

/// The partition of a table's column names into the full ordered list and
/// the numeric subset. `numeric` is always a subset of `all`, both in
/// header order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnClassification {
    pub all: Vec<String>,
    pub numeric: Vec<String>,
}
impl ColumnClassification {
    pub fn is_numeric(&self, column: &str) -> bool {
        self.numeric.iter().any(|c| c == column)
    }
    pub fn summary(&self) -> ColumnSummary {
        ColumnSummary {
            total_columns: self.all.len(),
            numeric_count: self.numeric.len(),
            text_count: self.all.len() - self.numeric.len(),
        }
    }
}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub total_columns: usize,
    pub numeric_count: usize,
    pub text_count: usize,
}
impl std::fmt::Display for ColumnSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} columns ({} numeric, {} text)",
            self.total_columns, self.numeric_count, self.text_count
        )
    }
}
pub struct ColumnProfiler {
    sample_size: usize,
    numeric_fraction: f64,
}
impl ColumnProfiler {
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }
    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            sample_size: config.sample_size_for_numeric_classification,
            numeric_fraction: config.numeric_fraction,
        }
    }
    /// Classifies columns by sampling the first `sample_size` rows. A
    /// column is numeric iff strictly more than `numeric_fraction` of its
    /// sampled cells coerce to a finite number; an exact tie is
    /// non-numeric. An empty row sequence classifies to nothing, whatever
    /// the header list says.
    pub fn classify(&self, headers: &[String], rows: &[Record]) -> ColumnClassification {
        if rows.is_empty() {
            return ColumnClassification::default();
        }
        let sample = &rows[..rows.len().min(self.sample_size)];
        let numeric = headers
            .iter()
            .filter(|header| {
                let numeric_count = sample
                    .iter()
                    .filter(|row| {
                        row.get(header.as_str())
                            .and_then(|cell| cell.coerce_number())
                            .is_some()
                    })
                    .count();
                numeric_count as f64 / sample.len() as f64 > self.numeric_fraction
            })
            .cloned()
            .collect();
        ColumnClassification {
            all: headers.to_vec(),
            numeric,
        }
    }
}
impl Default for ColumnProfiler {
    fn default() -> Self {
        Self::new()
    }
}
