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
use crate::csv_parser::{Cell, Record};
use crate::error::{ChartError, ChartResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Line,
    Bar,
    Pie,
    Scatter,
}
impl ChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Line => "line",
            ChartType::Bar => "bar",
            ChartType::Pie => "pie",
            ChartType::Scatter => "scatter",
        }
    }
}
impl std::str::FromStr for ChartType {
    type Err = ChartError;
    fn from_str(s: &str) -> ChartResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "line" => Ok(ChartType::Line),
            "bar" => Ok(ChartType::Bar),
            "pie" => Ok(ChartType::Pie),
            "scatter" => Ok(ChartType::Scatter),
            other => Err(ChartError::UnsupportedChartType(other.to_string())),
        }
    }
}
impl std::fmt::Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRequest {
    pub dataset_id: Uuid,
    pub chart_type: ChartType,
    pub x_axis: String,
    pub y_axis: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<HashMap<String, String>>,
}
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStyle {
    pub color: String,
    pub width: u32,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartesianSeries {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    pub name: String,
    pub x: Vec<Cell>,
    pub y: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
    pub marker: Marker,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieSeries {
    pub kind: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub marker: Marker,
    pub text_info: String,
    pub text_position: String,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Series {
    Cartesian(CartesianSeries),
    Pie(PieSeries),
}
impl Series {
    pub fn point_count(&self) -> usize {
        match self {
            Series::Cartesian(s) => s.x.len(),
            Series::Pie(s) => s.labels.len(),
        }
    }
}
/// A renderer-agnostic chart description: data plus structural hints only,
/// no draw calls and no DOM. Successful compilation always yields at least
/// one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub title: String,
    pub x_axis_label: String,
    pub y_axis_label: String,
    pub show_legend: bool,
    pub series: Vec<Series>,
}
impl ChartSpec {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
/// Formats a column name for titles and axis labels: underscores become
/// spaces, the whole label is upper-cased.
pub fn format_axis_label(column: &str) -> String {
    column.replace('_', " ").to_uppercase()
}
pub struct ChartCompiler {
    palette: Vec<String>,
}
impl ChartCompiler {
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }
    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            palette: config.palette.clone(),
        }
    }
    /// Compiles a chart request against a row sequence. Pure: the same
    /// rows and request always produce a structurally equal spec.
    pub fn compile(&self, rows: &[Record], request: &ChartRequest) -> ChartResult<ChartSpec> {
        if rows.is_empty() {
            return Err(ChartError::InvalidRequest {
                reason: "no data available for chart generation".to_string(),
            });
        }
        let x_axis = request.x_axis.as_str();
        let y_axis = request.y_axis.as_str();
        let first = &rows[0];
        if !first.contains_key(x_axis) || !first.contains_key(y_axis) {
            return Err(ChartError::InvalidRequest {
                reason: format!("invalid data for axes: {x_axis}, {y_axis}"),
            });
        }
        let usable: Vec<&Record> = rows
            .iter()
            .filter(|row| {
                let present = |axis: &str| row.get(axis).is_some_and(|cell| !cell.is_empty());
                present(x_axis) && present(y_axis)
            })
            .collect();
        if usable.is_empty() {
            return Err(ChartError::InvalidRequest {
                reason: format!("no usable rows for axes: {x_axis}, {y_axis}"),
            });
        }
        if request.chart_type != ChartType::Pie {
            let any_numeric = usable
                .iter()
                .any(|row| row[y_axis].coerce_number().is_some());
            if !any_numeric {
                return Err(ChartError::InvalidRequest {
                    reason: format!("column '{y_axis}' has no numeric values"),
                });
            }
        }
        match request.chart_type {
            ChartType::Line => Ok(self.compile_line(&usable, x_axis, y_axis)),
            ChartType::Bar => Ok(self.compile_bar(&usable, x_axis, y_axis)),
            ChartType::Pie => self.compile_pie(&usable, x_axis, y_axis),
            ChartType::Scatter => self.compile_scatter(&usable, x_axis, y_axis),
        }
    }
    fn compile_line(&self, rows: &[&Record], x_axis: &str, y_axis: &str) -> ChartSpec {
        let colour = self.palette_colour(4);
        let (x, y) = cartesian_values(rows, x_axis, y_axis);
        ChartSpec {
            chart_type: ChartType::Line,
            title: format!(
                "{} over {}",
                format_axis_label(y_axis),
                format_axis_label(x_axis)
            ),
            x_axis_label: format_axis_label(x_axis),
            y_axis_label: format_axis_label(y_axis),
            show_legend: false,
            series: vec![Series::Cartesian(CartesianSeries {
                kind: "scatter".to_string(),
                mode: Some("lines+markers".to_string()),
                name: format_axis_label(y_axis),
                x,
                y,
                line: Some(LineStyle {
                    color: colour.clone(),
                    width: 3,
                }),
                marker: Marker {
                    color: Some(colour),
                    size: Some(6),
                    ..Default::default()
                },
            })],
        }
    }
    fn compile_bar(&self, rows: &[&Record], x_axis: &str, y_axis: &str) -> ChartSpec {
        let (x, y) = cartesian_values(rows, x_axis, y_axis);
        ChartSpec {
            chart_type: ChartType::Bar,
            title: format!(
                "{} by {}",
                format_axis_label(y_axis),
                format_axis_label(x_axis)
            ),
            x_axis_label: format_axis_label(x_axis),
            y_axis_label: format_axis_label(y_axis),
            show_legend: false,
            series: vec![Series::Cartesian(CartesianSeries {
                kind: "bar".to_string(),
                mode: None,
                name: format_axis_label(y_axis),
                x,
                y,
                line: None,
                marker: Marker {
                    color: Some(self.palette_colour(3)),
                    ..Default::default()
                },
            })],
        }
    }
    fn compile_pie(&self, rows: &[&Record], x_axis: &str, y_axis: &str) -> ChartResult<ChartSpec> {
        // Aggregate contributions per label, first-occurrence order.
        let mut order: Vec<String> = Vec::new();
        let mut totals: HashMap<String, f64> = HashMap::new();
        for row in rows {
            let label = row[x_axis].to_string();
            let contribution = row[y_axis].coerce_number().unwrap_or(0.0);
            if !totals.contains_key(&label) {
                order.push(label.clone());
            }
            *totals.entry(label).or_insert(0.0) += contribution;
        }
        let mut labels = Vec::new();
        let mut values = Vec::new();
        for label in order {
            let total = totals[&label];
            if total > 0.0 {
                labels.push(label);
                values.push(total);
            }
        }
        if labels.is_empty() {
            return Err(ChartError::NoPositiveValues);
        }
        Ok(ChartSpec {
            chart_type: ChartType::Pie,
            title: format!(
                "{} by {}",
                format_axis_label(y_axis),
                format_axis_label(x_axis)
            ),
            x_axis_label: format_axis_label(x_axis),
            y_axis_label: format_axis_label(y_axis),
            show_legend: true,
            series: vec![Series::Pie(PieSeries {
                kind: "pie".to_string(),
                labels,
                values,
                marker: Marker {
                    colors: Some(self.palette.clone()),
                    ..Default::default()
                },
                text_info: "label+percent".to_string(),
                text_position: "outside".to_string(),
            })],
        })
    }
    fn compile_scatter(
        &self,
        rows: &[&Record],
        x_axis: &str,
        y_axis: &str,
    ) -> ChartResult<ChartSpec> {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for row in rows {
            let xn = row[x_axis].coerce_number();
            let yn = row[y_axis].coerce_number();
            if xn.is_none() && yn.is_none() {
                continue;
            }
            let (xv, yv) = (xn.unwrap_or(0.0), yn.unwrap_or(0.0));
            // Placeholder-origin filter: (0, 0) points carry no signal.
            if xv == 0.0 && yv == 0.0 {
                continue;
            }
            x.push(Cell::Number(xv));
            y.push(yv);
        }
        if x.is_empty() {
            return Err(ChartError::NoValidNumeric);
        }
        Ok(ChartSpec {
            chart_type: ChartType::Scatter,
            title: format!(
                "{} vs {}",
                format_axis_label(y_axis),
                format_axis_label(x_axis)
            ),
            x_axis_label: format_axis_label(x_axis),
            y_axis_label: format_axis_label(y_axis),
            show_legend: false,
            series: vec![Series::Cartesian(CartesianSeries {
                kind: "scatter".to_string(),
                mode: Some("markers".to_string()),
                name: format!("{y_axis} vs {x_axis}"),
                x,
                y,
                line: None,
                marker: Marker {
                    color: Some(self.palette_colour(5)),
                    size: Some(8),
                    opacity: Some(0.7),
                    ..Default::default()
                },
            })],
        })
    }
    fn palette_colour(&self, index: usize) -> String {
        self.palette[index % self.palette.len()].clone()
    }
}
impl Default for ChartCompiler {
    fn default() -> Self {
        Self::new()
    }
}
fn cartesian_values(rows: &[&Record], x_axis: &str, y_axis: &str) -> (Vec<Cell>, Vec<f64>) {
    let x = rows.iter().map(|row| row[x_axis].clone()).collect();
    let y = rows
        .iter()
        .map(|row| row[y_axis].coerce_number().unwrap_or(0.0))
        .collect();
    (x, y)
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_parser::parse;
    fn request(chart_type: ChartType, x: &str, y: &str) -> ChartRequest {
        ChartRequest {
            dataset_id: Uuid::nil(),
            chart_type,
            x_axis: x.to_string(),
            y_axis: y.to_string(),
            filters: None,
        }
    }
    fn rows(text: &str) -> Vec<Record> {
        parse(text).unwrap().rows
    }
    #[test]
    fn empty_rows_are_an_invalid_request() {
        let err = ChartCompiler::new()
            .compile(&[], &request(ChartType::Bar, "a", "b"))
            .unwrap_err();
        assert!(matches!(err, ChartError::InvalidRequest { .. }));
    }
    #[test]
    fn unknown_axes_are_an_invalid_request() {
        let rows = rows("a,b\n1,2");
        let err = ChartCompiler::new()
            .compile(&rows, &request(ChartType::Bar, "a", "missing"))
            .unwrap_err();
        assert!(matches!(err, ChartError::InvalidRequest { .. }));
    }
    #[test]
    fn a_text_only_y_axis_fails_for_non_pie_charts() {
        let rows = rows("region,label\nNorth,alpha\nSouth,beta");
        let err = ChartCompiler::new()
            .compile(&rows, &request(ChartType::Bar, "region", "label"))
            .unwrap_err();
        assert!(matches!(err, ChartError::InvalidRequest { .. }));
    }
    #[test]
    fn rows_with_empty_cells_on_either_axis_are_dropped() {
        let rows = rows("month,sales\nJan,10\n,20\nMar,");
        let spec = ChartCompiler::new()
            .compile(&rows, &request(ChartType::Bar, "month", "sales"))
            .unwrap();
        assert_eq!(spec.series[0].point_count(), 1);
    }
    #[test]
    fn line_titles_read_over_and_bar_titles_read_by() {
        let rows = rows("order_date,net_sales\n2024-01-01,5\n2024-02-01,6");
        let compiler = ChartCompiler::new();
        let line = compiler
            .compile(&rows, &request(ChartType::Line, "order_date", "net_sales"))
            .unwrap();
        assert_eq!(line.title, "NET SALES over ORDER DATE");
        let bar = compiler
            .compile(&rows, &request(ChartType::Bar, "order_date", "net_sales"))
            .unwrap();
        assert_eq!(bar.title, "NET SALES by ORDER DATE");
    }
    #[test]
    fn non_numeric_y_cells_contribute_zero_in_bar_series() {
        let rows = rows("k,v\na,10\nb,oops\nc,30");
        let spec = ChartCompiler::new()
            .compile(&rows, &request(ChartType::Bar, "k", "v"))
            .unwrap();
        match &spec.series[0] {
            Series::Cartesian(s) => assert_eq!(s.y, vec![10.0, 0.0, 30.0]),
            Series::Pie(_) => panic!("expected a cartesian series"),
        }
    }
    #[test]
    fn pie_aggregates_by_label_in_first_occurrence_order() {
        let rows = rows("region,amount\nEast,10\nWest,5\nEast,7");
        let spec = ChartCompiler::new()
            .compile(&rows, &request(ChartType::Pie, "region", "amount"))
            .unwrap();
        match &spec.series[0] {
            Series::Pie(s) => {
                assert_eq!(s.labels, vec!["East", "West"]);
                assert_eq!(s.values, vec![17.0, 5.0]);
            }
            Series::Cartesian(_) => panic!("expected a pie series"),
        }
    }
    #[test]
    fn pie_drops_non_positive_totals_and_fails_when_none_remain() {
        let rows = rows("region,amount\nEast,-3\nWest,0\nEast,3");
        // East sums to zero, West is zero: nothing positive survives.
        let err = ChartCompiler::new()
            .compile(&rows, &request(ChartType::Pie, "region", "amount"))
            .unwrap_err();
        assert_eq!(err, ChartError::NoPositiveValues);
    }
    #[test]
    fn pie_accepts_a_non_numeric_value_column() {
        // Pie skips the numeric pre-check; text contributions count as zero
        // and fall out of the aggregation.
        let rows = rows("region,amount\nEast,high\nWest,4");
        let spec = ChartCompiler::new()
            .compile(&rows, &request(ChartType::Pie, "region", "amount"))
            .unwrap();
        match &spec.series[0] {
            Series::Pie(s) => assert_eq!(s.labels, vec!["West"]),
            Series::Cartesian(_) => panic!("expected a pie series"),
        }
    }
    #[test]
    fn scatter_drops_origin_points_and_textual_pairs() {
        let rows = rows("x,y\n0,0\nfoo,bar\n1,2\nbaz,5");
        let spec = ChartCompiler::new()
            .compile(&rows, &request(ChartType::Scatter, "x", "y"))
            .unwrap();
        match &spec.series[0] {
            Series::Cartesian(s) => {
                assert_eq!(s.x, vec![Cell::Number(1.0), Cell::Number(0.0)]);
                assert_eq!(s.y, vec![2.0, 5.0]);
            }
            Series::Pie(_) => panic!("expected a cartesian series"),
        }
    }
    #[test]
    fn scatter_with_no_finite_pairs_fails() {
        let rows = rows("x,y\nfoo,bar\n0,0");
        let err = ChartCompiler::new()
            .compile(&rows, &request(ChartType::Scatter, "x", "y"))
            .unwrap_err();
        assert_eq!(err, ChartError::NoValidNumeric);
    }
    #[test]
    fn compilation_is_deterministic() {
        let rows = rows("region,amount\nEast,10\nWest,5\nEast,7");
        let compiler = ChartCompiler::new();
        let req = request(ChartType::Pie, "region", "amount");
        assert_eq!(
            compiler.compile(&rows, &req).unwrap(),
            compiler.compile(&rows, &req).unwrap()
        );
    }
    #[test]
    fn chart_type_parsing_rejects_unknown_kinds() {
        assert_eq!("BAR".parse::<ChartType>().unwrap(), ChartType::Bar);
        let err = "sankey".parse::<ChartType>().unwrap_err();
        assert_eq!(err, ChartError::UnsupportedChartType("sankey".to_string()));
    }
    #[test]
    fn spec_serialises_with_renderer_facing_keys() {
        let rows = rows("k,v\na,1");
        let spec = ChartCompiler::new()
            .compile(&rows, &request(ChartType::Bar, "k", "v"))
            .unwrap();
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["type"], "bar");
        assert!(json["xAxisLabel"].is_string());
        assert_eq!(json["series"][0]["marker"]["color"], "#22c55e");
    }
}
