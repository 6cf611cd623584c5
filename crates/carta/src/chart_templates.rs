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

use crate::chart_compiler::ChartType;
use crate::data_profiler::ColumnClassification;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateCategory {
    Financial,
    Performance,
    Trend,
}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub chart_type: ChartType,
    pub suggested_x: Vec<String>,
    pub suggested_y: Vec<String>,
    pub category: TemplateCategory,
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchConfidence {
    High,
    Low,
}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateMatch {
    pub x: String,
    pub y: String,
    pub confidence: MatchConfidence,
}
/// Matches a template's keyword lists against the available columns.
/// Deterministic and ordering-sensitive: the first keyword with a hit
/// wins, and within a keyword the first column wins. When either keyword
/// search misses, both axes fall back to the first available columns at
/// low confidence; an unavailable fallback slot means no match at all.
pub fn match_template(
    template: &ChartTemplate,
    columns: &ColumnClassification,
) -> Option<TemplateMatch> {
    let y_pool: &[String] = if template.chart_type == ChartType::Pie {
        &columns.all
    } else {
        &columns.numeric
    };
    let x_hit = first_keyword_hit(&template.suggested_x, &columns.all);
    let y_hit = first_keyword_hit(&template.suggested_y, y_pool);
    if let (Some(x), Some(y)) = (x_hit, y_hit) {
        return Some(TemplateMatch {
            x,
            y,
            confidence: MatchConfidence::High,
        });
    }
    let x = columns.all.first()?.clone();
    let y = y_pool.first()?.clone();
    Some(TemplateMatch {
        x,
        y,
        confidence: MatchConfidence::Low,
    })
}
fn first_keyword_hit(keywords: &[String], pool: &[String]) -> Option<String> {
    keywords.iter().find_map(|keyword| {
        let keyword = keyword.to_lowercase();
        pool.iter()
            .find(|column| column.to_lowercase().contains(&keyword))
            .cloned()
    })
}
/// The built-in template catalogue for common business scenarios.
pub fn builtin_templates() -> Vec<ChartTemplate> {
    fn template(
        id: &str,
        name: &str,
        description: &str,
        chart_type: ChartType,
        suggested_x: &[&str],
        suggested_y: &[&str],
        category: TemplateCategory,
    ) -> ChartTemplate {
        ChartTemplate {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            chart_type,
            suggested_x: suggested_x.iter().map(|s| (*s).to_string()).collect(),
            suggested_y: suggested_y.iter().map(|s| (*s).to_string()).collect(),
            category,
        }
    }
    vec![
        template(
            "revenue-trend",
            "Revenue Trend",
            "Track revenue changes over time",
            ChartType::Line,
            &["date", "month", "quarter", "year", "period"],
            &["revenue", "sales", "income"],
            TemplateCategory::Financial,
        ),
        template(
            "expense-breakdown",
            "Expense Breakdown",
            "Visualize expense distribution",
            ChartType::Pie,
            &["category", "department", "type", "region"],
            &["expenses", "cost", "amount"],
            TemplateCategory::Financial,
        ),
        template(
            "regional-performance",
            "Regional Performance",
            "Compare performance across regions",
            ChartType::Bar,
            &["region", "location", "country", "state"],
            &["revenue", "sales", "profit", "performance"],
            TemplateCategory::Performance,
        ),
        template(
            "monthly-comparison",
            "Monthly Comparison",
            "Compare metrics month by month",
            ChartType::Bar,
            &["month", "date", "period"],
            &["revenue", "sales", "customers", "orders"],
            TemplateCategory::Trend,
        ),
        template(
            "customer-growth",
            "Customer Growth",
            "Track customer acquisition over time",
            ChartType::Line,
            &["date", "month", "quarter"],
            &["customers", "users", "customer_count"],
            TemplateCategory::Performance,
        ),
        template(
            "profit-analysis",
            "Profit Analysis",
            "Analyze profit margins and trends",
            ChartType::Line,
            &["date", "month", "product"],
            &["profit", "margin", "net_profit"],
            TemplateCategory::Financial,
        ),
    ]
}
pub fn templates_in_category(category: TemplateCategory) -> Vec<ChartTemplate> {
    builtin_templates()
        .into_iter()
        .filter(|t| t.category == category)
        .collect()
}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisSuggestion {
    pub x: String,
    pub y: String,
    pub reason: String,
}
/// Suggests a default axis pairing from the classification alone: a
/// date/time column over the first numeric column when both exist,
/// otherwise the top two numeric columns.
pub fn suggest_axes(columns: &ColumnClassification) -> Option<AxisSuggestion> {
    if columns.all.is_empty() {
        return None;
    }
    let date_column = columns.all.iter().find(|column| {
        let lower = column.to_lowercase();
        lower.contains("date") || lower.contains("time")
    });
    if let (Some(date), Some(numeric)) = (date_column, columns.numeric.first()) {
        return Some(AxisSuggestion {
            x: date.clone(),
            y: numeric.clone(),
            reason: "Time series data detected".to_string(),
        });
    }
    if columns.numeric.len() >= 2 {
        return Some(AxisSuggestion {
            x: columns.numeric[1].clone(),
            y: columns.numeric[0].clone(),
            reason: "Numeric comparison suggested".to_string(),
        });
    }
    None
}
