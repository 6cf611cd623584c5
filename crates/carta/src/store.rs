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

use crate::chart_compiler::ChartSpec;
use crate::csv_parser::{ParsedTable, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

/// An immutable, identified dataset parsed from one uploaded CSV. Removal
/// from the session is the only mutation it ever sees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub id: Uuid,
    pub name: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
    pub headers: Vec<String>,
    pub rows: Vec<Record>,
}

impl Dataset {
    pub fn new(name: &str, size: u64, table: ParsedTable) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            size,
            uploaded_at: Utc::now(),
            headers: table.headers,
            rows: table.rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartEntry {
    pub id: Uuid,
    pub spec: ChartSpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageMetadata {
    pub confidence: f64,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub chart_suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_spec: Option<ChartSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
}

impl Message {
    fn new(role: Role, content: &str, metadata: Option<MessageMetadata>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.to_string(),
            timestamp: Utc::now(),
            metadata,
        }
    }
}

/// Upload-side state: the session's datasets plus upload progress.
#[derive(Debug, Default)]
pub struct DatasetsState {
    pub files: Vec<Dataset>,
    pub is_uploading: bool,
    pub upload_progress: f64,
    pub error: Option<String>,
}

impl DatasetsState {
    pub fn start_upload(&mut self) {
        self.is_uploading = true;
        self.upload_progress = 0.0;
        self.error = None;
    }

    /// Progress is reported monotonically while an upload is in flight; a
    /// stale lower value never winds the bar backwards.
    pub fn update_progress(&mut self, progress: f64) {
        if self.is_uploading {
            self.upload_progress = self.upload_progress.max(progress.clamp(0.0, 100.0));
        }
    }

    pub fn add(&mut self, dataset: Dataset) {
        info!(name = %dataset.name, rows = dataset.row_count(), "dataset added to session");
        self.files.push(dataset);
    }

    pub fn upload_success(&mut self, dataset: Dataset) {
        self.is_uploading = false;
        self.upload_progress = 100.0;
        self.error = None;
        self.add(dataset);
    }

    pub fn upload_error(&mut self, message: String) {
        self.is_uploading = false;
        self.upload_progress = 0.0;
        self.error = Some(message);
    }

    pub fn remove_file(&mut self, id: Uuid) {
        self.files.retain(|file| file.id != id);
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn get(&self, id: Uuid) -> Option<&Dataset> {
        self.files.iter().find(|file| file.id == id)
    }
}

/// Dashboard-side state: the active selection and the assembled charts.
#[derive(Debug, Default)]
pub struct DashboardState {
    pub active_file_id: Option<Uuid>,
    pub charts: Vec<ChartEntry>,
    pub filters: HashMap<String, String>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl DashboardState {
    /// Records the selection unconditionally. An id that names no dataset
    /// is not rejected; the session-level selector simply resolves to
    /// nothing until a matching dataset exists.
    pub fn set_active_file(&mut self, id: Uuid) {
        self.active_file_id = Some(id);
        self.error = None;
    }

    pub fn clear_active_file(&mut self) {
        self.active_file_id = None;
    }

    pub fn add_chart(&mut self, spec: ChartSpec) -> Uuid {
        let entry = ChartEntry {
            id: Uuid::new_v4(),
            spec,
        };
        debug!(chart = %entry.id, "chart added to dashboard");
        let id = entry.id;
        self.charts.push(entry);
        self.error = None;
        id
    }

    pub fn remove_chart(&mut self, index: usize) {
        if index < self.charts.len() {
            self.charts.remove(index);
            self.error = None;
        }
    }

    pub fn update_chart(&mut self, index: usize, spec: ChartSpec) {
        if let Some(entry) = self.charts.get_mut(index) {
            entry.spec = spec;
            self.error = None;
        }
    }

    pub fn update_filters(&mut self, filters: HashMap<String, String>) {
        self.filters.extend(filters);
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub fn clear_charts(&mut self) {
        self.charts.clear();
        self.error = None;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Insight-side state: the chat transcript and prompt suggestions.
#[derive(Debug)]
pub struct InsightsState {
    pub messages: Vec<Message>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub suggestions: Vec<String>,
}

impl Default for InsightsState {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            is_loading: false,
            error: None,
            suggestions: vec![
                "What are the top revenue drivers?".to_string(),
                "Show me expense trends over time".to_string(),
                "Compare performance by region".to_string(),
                "What's the average customer lifetime value?".to_string(),
            ],
        }
    }
}

impl InsightsState {
    pub fn push_user_message(&mut self, content: &str) -> Uuid {
        let message = Message::new(Role::User, content, None);
        let id = message.id;
        self.messages.push(message);
        id
    }

    pub fn push_ai_message(&mut self, content: &str, metadata: MessageMetadata) -> Uuid {
        let message = Message::new(Role::Ai, content, Some(metadata));
        let id = message.id;
        self.messages.push(message);
        id
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub fn clear_messages(&mut self) {
        self.messages.clear();
    }

    pub fn update_suggestions(&mut self, suggestions: Vec<String>) {
        self.suggestions = suggestions;
    }
}

/// The single mutable hub of a session. All operations are synchronous and
/// free of I/O; consumers snapshot what they need through the selectors.
#[derive(Debug, Default)]
pub struct SessionStore {
    pub datasets: DatasetsState,
    pub dashboard: DashboardState,
    pub insights: InsightsState,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[Dataset] {
        &self.datasets.files
    }

    pub fn active_file_id(&self) -> Option<Uuid> {
        self.dashboard.active_file_id
    }

    /// Resolves the active selection against the registry: a selection
    /// pointing at a removed or never-added dataset yields nothing.
    pub fn active_file(&self) -> Option<&Dataset> {
        self.dashboard
            .active_file_id
            .and_then(|id| self.datasets.get(id))
    }

    pub fn charts(&self) -> &[ChartEntry] {
        &self.dashboard.charts
    }

    pub fn is_generating_chart(&self) -> bool {
        self.dashboard.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.datasets
            .error
            .as_deref()
            .or(self.dashboard.error.as_deref())
            .or(self.insights.error.as_deref())
    }

    /// Removes a dataset; removing the active one clears the selection.
    pub fn remove_file(&mut self, id: Uuid) {
        self.datasets.remove_file(id);
        if self.dashboard.active_file_id == Some(id) {
            debug!(dataset = %id, "active dataset removed, clearing selection");
            self.dashboard.clear_active_file();
        }
    }
}
