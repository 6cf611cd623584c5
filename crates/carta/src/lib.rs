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

pub mod chart_compiler;
pub mod chart_templates;
pub mod config;
pub mod csv_parser;
pub mod data_profiler;
pub mod error;
pub mod insight_dispatcher;
pub mod metrics;
pub mod sample_data;
pub mod store;

pub use chart_compiler::{ChartCompiler, ChartRequest, ChartSpec, ChartType, Series};
pub use chart_templates::{
    builtin_templates, match_template, suggest_axes, AxisSuggestion, ChartTemplate,
    MatchConfidence, TemplateCategory, TemplateMatch,
};
pub use config::EngineConfig;
pub use csv_parser::{parse, Cell, ParsedTable, Record};
pub use data_profiler::{ColumnClassification, ColumnProfiler};
pub use error::{CartaError, ChartError, InsightError, ParseError, Result};
pub use insight_dispatcher::{
    EntropyRandom, FixedRandom, InsightDispatcher, InsightRequest, InsightResponse, RandomSource,
};
pub use metrics::DashboardMetrics;
pub use store::{ChartEntry, Dataset, Message, MessageMetadata, Role, SessionStore};

use store::DatasetsState;
use tracing::warn;
use uuid::Uuid;

/// The engine behind a single analytics session: parsing, classification,
/// metrics, chart compilation and canned insights, all hanging off one
/// mutable session store. Every failure path leaves a user-readable string
/// on the store's error field; the next successful mutation clears it.
pub struct AnalyticsEngine {
    config: EngineConfig,
    profiler: ColumnProfiler,
    compiler: ChartCompiler,
    dispatcher: InsightDispatcher,
    store: SessionStore,
}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::assemble(EngineConfig::default(), None)
    }

    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate().map_err(CartaError::from)?;
        Ok(Self::assemble(config, None))
    }

    pub fn with_random_source(
        config: EngineConfig,
        random: Box<dyn RandomSource>,
    ) -> Result<Self> {
        config.validate().map_err(CartaError::from)?;
        Ok(Self::assemble(config, Some(random)))
    }

    fn assemble(config: EngineConfig, random: Option<Box<dyn RandomSource>>) -> Self {
        let dispatcher = match random {
            Some(random) => InsightDispatcher::with_random(&config, random),
            None => InsightDispatcher::new(&config),
        };
        Self {
            profiler: ColumnProfiler::with_config(&config),
            compiler: ChartCompiler::with_config(&config),
            dispatcher,
            store: SessionStore::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Parses CSV text into a new session dataset. The upload bar moves
    /// monotonically from 0 to 100; any failure resets it to 0 and leaves
    /// a message on the store's error field.
    pub fn upload_csv(&mut self, name: &str, text: &str) -> Result<Uuid> {
        self.store.datasets.start_upload();
        if !name.to_ascii_lowercase().ends_with(".csv") {
            return Err(Self::fail_upload(
                &mut self.store.datasets,
                ParseError::UnsupportedExtension,
            ));
        }
        self.store.datasets.update_progress(50.0);
        match csv_parser::parse(text) {
            Ok(table) => {
                let dataset = Dataset::new(name, text.len() as u64, table);
                let id = dataset.id;
                self.store.datasets.upload_success(dataset);
                Ok(id)
            }
            Err(err) => Err(Self::fail_upload(&mut self.store.datasets, err)),
        }
    }

    fn fail_upload(datasets: &mut DatasetsState, err: ParseError) -> CartaError {
        let err = CartaError::from(err);
        warn!(kind = err.kind(), "upload rejected");
        datasets.upload_error(err.user_message());
        err
    }

    pub fn set_active_file(&mut self, id: Uuid) {
        self.store.dashboard.set_active_file(id);
    }

    pub fn remove_file(&mut self, id: Uuid) {
        self.store.remove_file(id);
    }

    /// Compiles a chart against the active dataset and adds it to the
    /// dashboard, returning the new chart's id.
    pub fn generate_chart(
        &mut self,
        chart_type: ChartType,
        x_axis: &str,
        y_axis: &str,
    ) -> Result<Uuid> {
        self.store.dashboard.set_loading(true);
        let compiled = match self.store.active_file() {
            Some(dataset) => {
                let request = ChartRequest {
                    dataset_id: dataset.id,
                    chart_type,
                    x_axis: x_axis.to_string(),
                    y_axis: y_axis.to_string(),
                    filters: None,
                };
                self.compiler
                    .compile(&dataset.rows, &request)
                    .map_err(CartaError::from)
            }
            None => Err(ChartError::InvalidRequest {
                reason: "no active dataset selected".to_string(),
            }
            .into()),
        };
        self.store.dashboard.set_loading(false);
        match compiled {
            Ok(spec) => Ok(self.store.dashboard.add_chart(spec)),
            Err(err) => {
                warn!(kind = err.kind(), "chart generation failed");
                self.store.dashboard.set_error(Some(err.user_message()));
                Err(err)
            }
        }
    }

    /// Routes a free-text question through the dispatcher, recording both
    /// sides of the exchange in the insights transcript. Fails when no
    /// dataset is active or a question is already outstanding.
    pub async fn ask(&mut self, question: &str) -> Result<InsightResponse> {
        let dataset_id = match self.store.active_file() {
            Some(dataset) => dataset.id,
            None => {
                let err = CartaError::from(InsightError::NoActiveDataset);
                self.store.insights.set_error(Some(err.user_message()));
                return Err(err);
            }
        };
        self.store.insights.push_user_message(question);
        self.store.insights.set_loading(true);
        self.store.insights.set_error(None);
        let request = InsightRequest {
            question: question.to_string(),
            dataset_id,
        };
        let result = self.dispatcher.ask(&request).await;
        self.store.insights.set_loading(false);
        match result {
            Ok(response) => {
                self.store.insights.push_ai_message(
                    &response.answer,
                    MessageMetadata {
                        confidence: response.confidence,
                        chart_suggestions: response.chart_suggestions.clone(),
                        chart_spec: response.chart_spec.clone(),
                    },
                );
                Ok(response)
            }
            Err(err) => {
                let err = CartaError::from(err);
                self.store.insights.set_error(Some(err.user_message()));
                Err(err)
            }
        }
    }

    pub fn metrics(&self) -> DashboardMetrics {
        self.store
            .active_file()
            .map(|dataset| metrics::compute(&dataset.rows))
            .unwrap_or_default()
    }

    pub fn available_columns(&self) -> ColumnClassification {
        self.store
            .active_file()
            .map(|dataset| self.profiler.classify(&dataset.headers, &dataset.rows))
            .unwrap_or_default()
    }

    pub fn template_matches(&self) -> Vec<(ChartTemplate, Option<TemplateMatch>)> {
        let columns = self.available_columns();
        builtin_templates()
            .into_iter()
            .map(|template| {
                let matched = match_template(&template, &columns);
                (template, matched)
            })
            .collect()
    }

    pub fn suggested_axes(&self) -> Option<AxisSuggestion> {
        suggest_axes(&self.available_columns())
    }
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample_data::{SAMPLE_CSV, SAMPLE_NAME};

    #[test]
    fn uploads_without_a_csv_extension_are_rejected_with_a_user_message() {
        let mut engine = AnalyticsEngine::new();
        let err = engine.upload_csv("notes.txt", SAMPLE_CSV).unwrap_err();
        assert_eq!(err.kind(), "unsupported-file");
        assert_eq!(engine.store().error(), Some("Please upload a CSV file"));
        assert_eq!(engine.store().datasets.upload_progress, 0.0);
    }

    #[test]
    fn a_successful_upload_clears_the_previous_error() {
        let mut engine = AnalyticsEngine::new();
        engine.upload_csv("notes.txt", SAMPLE_CSV).unwrap_err();
        engine.upload_csv(SAMPLE_NAME, SAMPLE_CSV).unwrap();
        assert!(engine.store().error().is_none());
        assert_eq!(engine.store().datasets.upload_progress, 100.0);
    }

    #[test]
    fn metrics_without_an_active_dataset_are_all_zero() {
        let engine = AnalyticsEngine::new();
        assert_eq!(engine.metrics(), DashboardMetrics::default());
        assert_eq!(engine.available_columns(), ColumnClassification::default());
    }

    #[tokio::test]
    async fn asking_without_an_active_dataset_fails_and_surfaces_the_error() {
        let mut engine = AnalyticsEngine::with_config(EngineConfig::for_tests()).unwrap();
        let err = engine.ask("show me revenue").await.unwrap_err();
        assert_eq!(err.kind(), "no-active-dataset");
        assert_eq!(engine.store().error(), Some("Please select a dataset first"));
        assert!(engine.store().insights.messages.is_empty());
    }

    #[test]
    fn failed_chart_generation_surfaces_the_error_and_adds_nothing() {
        let mut engine = AnalyticsEngine::new();
        let id = engine.upload_csv(SAMPLE_NAME, SAMPLE_CSV).unwrap();
        engine.set_active_file(id);
        let err = engine
            .generate_chart(ChartType::Bar, "region", "nonexistent")
            .unwrap_err();
        assert_eq!(err.kind(), "invalid-request");
        assert!(engine.store().error().is_some());
        assert!(engine.store().charts().is_empty());
        assert!(!engine.store().is_generating_chart());
    }
}
