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

use crate::chart_compiler::{CartesianSeries, ChartSpec, ChartType, LineStyle, Marker, Series};
use crate::config::EngineConfig;
use crate::csv_parser::Cell;
use crate::error::{InsightError, InsightResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Injectable randomness for the fallback branch, so responses are
/// reproducible under test.
pub trait RandomSource: Send {
    fn next_f64(&mut self) -> f64;
}
pub struct EntropyRandom(StdRng);
impl EntropyRandom {
    pub fn new() -> Self {
        Self(StdRng::from_entropy())
    }
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}
impl Default for EntropyRandom {
    fn default() -> Self {
        Self::new()
    }
}
impl RandomSource for EntropyRandom {
    fn next_f64(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}
/// Always yields the same draw. Test fixture, also handy for demos that
/// want a stable transcript.
pub struct FixedRandom(pub f64);
impl RandomSource for FixedRandom {
    fn next_f64(&mut self) -> f64 {
        self.0
    }
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightRequest {
    pub question: String,
    pub dataset_id: Uuid,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightResponse {
    pub answer: String,
    pub confidence: f64,
    pub chart_suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_spec: Option<ChartSpec>,
}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    Idle,
    Awaiting,
}
/// Keyword-routed canned answer engine. Rule-based, not ML: the response
/// is a function of the lower-cased question (and the injected random
/// source for the fallback branch). One question may be outstanding per
/// session at a time.
pub struct InsightDispatcher {
    delay: Duration,
    random: Mutex<Box<dyn RandomSource>>,
    state: Mutex<DispatcherState>,
}
impl InsightDispatcher {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_random(config, Box::new(EntropyRandom::new()))
    }
    pub fn with_random(config: &EngineConfig, random: Box<dyn RandomSource>) -> Self {
        Self {
            delay: Duration::from_millis(config.dispatcher_delay_ms),
            random: Mutex::new(random),
            state: Mutex::new(DispatcherState::Idle),
        }
    }
    pub fn state(&self) -> DispatcherState {
        *self.state.lock().unwrap_or_else(|p| p.into_inner())
    }
    /// Answers a question against the active dataset. Suspends for the
    /// configured delay before resolving, mirroring a remote analysis
    /// round-trip. A second question while one is outstanding is rejected.
    pub async fn ask(&self, request: &InsightRequest) -> InsightResult<InsightResponse> {
        {
            let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
            if *state == DispatcherState::Awaiting {
                return Err(InsightError::QuestionOutstanding);
            }
            *state = DispatcherState::Awaiting;
        }
        tokio::time::sleep(self.delay).await;
        let response = self.route(&request.question);
        debug!(dataset = %request.dataset_id, confidence = response.confidence, "insight question answered");
        *self.state.lock().unwrap_or_else(|p| p.into_inner()) = DispatcherState::Idle;
        Ok(response)
    }
    fn route(&self, question: &str) -> InsightResponse {
        let question = question.to_lowercase();
        let wants_chart = ["chart", "show", "graph", "plot", "visualize"]
            .iter()
            .any(|k| question.contains(k));
        if wants_chart || question.contains("revenue") || question.contains("trend") {
            return revenue_trend_response();
        }
        if question.contains("expense") || question.contains("cost") {
            return expense_breakdown_response();
        }
        if question.contains("region") || question.contains("performance") {
            return regional_performance_response();
        }
        let draw = self
            .random
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .next_f64();
        let index = ((draw * 3.0).floor() as usize).min(2);
        fallback_responses().swap_remove(index)
    }
    /// Canned question prompts offered to the user alongside the chat.
    pub fn suggested_questions() -> Vec<String> {
        [
            "What are the key performance indicators?",
            "Show me the revenue breakdown by category",
            "Which products have the highest profit margins?",
            "What's the customer acquisition cost trend?",
            "Create a chart showing monthly revenue trends",
            "Visualize expense distribution by department",
        ]
        .iter()
        .map(|s| (*s).to_string())
        .collect()
    }
}
fn demo_months() -> Vec<Cell> {
    ["Jan", "Feb", "Mar", "Apr", "May", "Jun"]
        .iter()
        .map(|m| Cell::Text((*m).to_string()))
        .collect()
}
fn revenue_trend_response() -> InsightResponse {
    InsightResponse {
        answer: "Based on your data analysis, here's the revenue trend over time. The chart shows steady growth with some seasonal variations in Q4.".to_string(),
        confidence: 0.92,
        chart_suggestions: vec![
            "revenue_by_month".to_string(),
            "regional_breakdown".to_string(),
        ],
        chart_spec: Some(ChartSpec {
            chart_type: ChartType::Line,
            title: "Revenue Trend Over Time".to_string(),
            x_axis_label: "Month".to_string(),
            y_axis_label: "Revenue ($)".to_string(),
            show_legend: false,
            series: vec![Series::Cartesian(CartesianSeries {
                kind: "scatter".to_string(),
                mode: Some("lines+markers".to_string()),
                name: "Revenue".to_string(),
                x: demo_months(),
                y: vec![125000.0, 132000.0, 145000.0, 138000.0, 156000.0, 162000.0],
                line: Some(LineStyle {
                    color: "#3b82f6".to_string(),
                    width: 3,
                }),
                marker: Marker {
                    size: Some(8),
                    ..Default::default()
                },
            })],
        }),
    }
}
fn expense_breakdown_response() -> InsightResponse {
    InsightResponse {
        answer: "Your expense breakdown shows that operational costs represent the largest category, followed by marketing and administrative expenses.".to_string(),
        confidence: 0.88,
        chart_suggestions: vec![
            "expense_breakdown".to_string(),
            "cost_trends".to_string(),
        ],
        chart_spec: Some(ChartSpec {
            chart_type: ChartType::Bar,
            title: "Expense Breakdown by Category".to_string(),
            x_axis_label: "Category".to_string(),
            y_axis_label: "Amount ($)".to_string(),
            show_legend: false,
            series: vec![Series::Cartesian(CartesianSeries {
                kind: "bar".to_string(),
                mode: None,
                name: "Expenses".to_string(),
                x: ["Operations", "Marketing", "Admin", "R&D", "Sales"]
                    .iter()
                    .map(|c| Cell::Text((*c).to_string()))
                    .collect(),
                y: vec![45000.0, 25000.0, 18000.0, 15000.0, 12000.0],
                line: None,
                marker: Marker {
                    colors: Some(
                        ["#ef4444", "#f97316", "#eab308", "#22c55e", "#3b82f6"]
                            .iter()
                            .map(|c| (*c).to_string())
                            .collect(),
                    ),
                    ..Default::default()
                },
            })],
        }),
    }
}
fn regional_performance_response() -> InsightResponse {
    InsightResponse {
        answer: "Regional performance analysis shows North America leading in revenue, followed by Europe and Asia Pacific. The growth rates vary significantly across regions.".to_string(),
        confidence: 0.85,
        chart_suggestions: vec![
            "regional_revenue".to_string(),
            "growth_comparison".to_string(),
        ],
        chart_spec: Some(ChartSpec {
            chart_type: ChartType::Bar,
            title: "Revenue by Region".to_string(),
            x_axis_label: "Region".to_string(),
            y_axis_label: "Revenue ($)".to_string(),
            show_legend: false,
            series: vec![Series::Cartesian(CartesianSeries {
                kind: "bar".to_string(),
                mode: None,
                name: "Revenue".to_string(),
                x: ["North America", "Europe", "Asia Pacific"]
                    .iter()
                    .map(|c| Cell::Text((*c).to_string()))
                    .collect(),
                y: vec![450000.0, 320000.0, 230000.0],
                line: None,
                marker: Marker {
                    color: Some("#22c55e".to_string()),
                    ..Default::default()
                },
            })],
        }),
    }
}
fn fallback_responses() -> Vec<InsightResponse> {
    let canned = [
        (
            "Based on your data analysis, I can see that Q4 revenue shows a 23% increase compared to Q3, with the strongest growth in the Technology and Healthcare sectors. The main drivers appear to be increased customer acquisition and higher average order values.",
            0.89,
            vec!["revenue_by_quarter", "sector_performance"],
        ),
        (
            "The data indicates a 15% reduction in operational costs over the past 6 months, primarily due to automation initiatives and vendor renegotiations. Marketing spend has increased by 8% but shows strong ROI.",
            0.92,
            vec!["expense_trends", "cost_breakdown"],
        ),
        (
            "Customer lifetime value has improved to $2,340 on average, with premium tier customers showing the highest retention rates at 94%. The data suggests focusing on upselling strategies for mid-tier customers.",
            0.85,
            vec!["clv_by_tier", "retention_rates"],
        ),
    ];
    canned
        .into_iter()
        .map(|(answer, confidence, suggestions)| InsightResponse {
            answer: answer.to_string(),
            confidence,
            chart_suggestions: suggestions.into_iter().map(String::from).collect(),
            chart_spec: None,
        })
        .collect()
}
