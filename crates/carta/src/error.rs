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

use thiserror::Error;
#[derive(Error, Debug)]
pub enum CartaError {
    #[error("CSV parsing error: {0}")]
    Parse(#[from] ParseError),
    #[error("Chart compilation error: {0}")]
    Chart(#[from] ChartError),
    #[error("Insight error: {0}")]
    Insight(#[from] InsightError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("failed to parse CSV: {0}")]
    Failure(String),
    #[error("unsupported file extension, expected .csv")]
    UnsupportedExtension,
}
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChartError {
    #[error("invalid chart request: {reason}")]
    InvalidRequest { reason: String },
    #[error("pie chart aggregation produced no positive values")]
    NoPositiveValues,
    #[error("scatter chart has no valid numeric pairs")]
    NoValidNumeric,
    #[error("unsupported chart type: '{0}'")]
    UnsupportedChartType(String),
}
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InsightError {
    #[error("no active dataset selected")]
    NoActiveDataset,
    #[error("a question is already outstanding for this session")]
    QuestionOutstanding,
}
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid configuration: {field} is out of range")]
    OutOfRange { field: String },
    #[error("invalid configuration: {field} must not be empty")]
    Empty { field: String },
}
pub type Result<T> = std::result::Result<T, CartaError>;
pub type ParseResult<T> = std::result::Result<T, ParseError>;
pub type ChartResult<T> = std::result::Result<T, ChartError>;
pub type InsightResult<T> = std::result::Result<T, InsightError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
impl CartaError {
    pub fn kind(&self) -> &'static str {
        match self {
            CartaError::Parse(ParseError::Failure(_)) => "parse-failure",
            CartaError::Parse(ParseError::UnsupportedExtension) => "unsupported-file",
            CartaError::Chart(ChartError::InvalidRequest { .. }) => "invalid-request",
            CartaError::Chart(ChartError::NoPositiveValues) => "no-positive-values",
            CartaError::Chart(ChartError::NoValidNumeric) => "no-valid-numeric",
            CartaError::Chart(ChartError::UnsupportedChartType(_)) => "unsupported-chart-type",
            CartaError::Insight(InsightError::NoActiveDataset) => "no-active-dataset",
            CartaError::Insight(InsightError::QuestionOutstanding) => "question-outstanding",
            CartaError::Config(_) => "invalid-config",
        }
    }
    pub fn user_message(&self) -> String {
        match self {
            CartaError::Parse(ParseError::Failure(_)) => "Failed to parse CSV file".to_string(),
            CartaError::Parse(ParseError::UnsupportedExtension) => {
                "Please upload a CSV file".to_string()
            }
            CartaError::Chart(ChartError::InvalidRequest { reason }) => {
                format!("Unable to generate chart: {reason}")
            }
            CartaError::Chart(ChartError::NoPositiveValues) => {
                "Pie charts need at least one positive value to aggregate".to_string()
            }
            CartaError::Chart(ChartError::NoValidNumeric) => {
                "Scatter charts need numeric values on both axes".to_string()
            }
            CartaError::Chart(ChartError::UnsupportedChartType(t)) => {
                format!("Unsupported chart type: {t}")
            }
            CartaError::Insight(InsightError::NoActiveDataset) => {
                "Please select a dataset first".to_string()
            }
            CartaError::Insight(InsightError::QuestionOutstanding) => {
                "Please wait for the current question to be answered".to_string()
            }
            CartaError::Config(e) => e.to_string(),
        }
    }
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CartaError::Chart(_) | CartaError::Insight(_) | CartaError::Parse(_)
        )
    }
}
