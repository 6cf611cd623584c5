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

use carta::csv_parser::{coerce_str, parse, Cell};
use carta::{ChartCompiler, ChartRequest, ChartType, ColumnProfiler, EngineConfig, Series};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::HashMap;
use uuid::Uuid;

fn encode(headers: &[String], matrix: &[Vec<String>]) -> String {
    let mut text = headers.join(",");
    for row in matrix {
        text.push('\n');
        text.push_str(&row.join(","));
    }
    text
}

prop_compose! {
    // Alphabetic cell content: free of commas, quotes and digits, so the
    // parsed cell is always the trimmed text unchanged.
    fn word_cell()(s in "[a-zA-Z][a-zA-Z ]{0,6}") -> String { s }
}

prop_compose! {
    fn word_matrix()(
        width in 1usize..5,
        height in 1usize..8,
    )(
        headers in prop::collection::vec("[a-z]{1,6}", width..=width),
        matrix in prop::collection::vec(
            prop::collection::vec(word_cell(), width..=width),
            height..=height,
        ),
    ) -> (Vec<String>, Vec<Vec<String>>) {
        // Duplicate headers overwrite; disambiguate by position instead of
        // discarding the case entirely.
        let headers = headers
            .into_iter()
            .enumerate()
            .map(|(i, h)| format!("{h}{i}"))
            .collect();
        (headers, matrix)
    }
}

proptest! {
    #[test]
    fn parser_round_trips_comma_free_text((headers, matrix) in word_matrix()) {
        let table = parse(&encode(&headers, &matrix)).unwrap();
        prop_assert_eq!(&table.headers, &headers);
        prop_assert_eq!(table.rows.len(), matrix.len());
        for (row, source) in table.rows.iter().zip(&matrix) {
            prop_assert_eq!(row.len(), headers.len());
            for (header, value) in headers.iter().zip(source) {
                prop_assert_eq!(&row[header.as_str()], &Cell::Text(value.trim().to_string()));
            }
        }
    }

    #[test]
    fn finite_numbers_survive_a_coercion_round_trip(n in prop::num::f64::NORMAL) {
        prop_assert_eq!(coerce_str(&n.to_string()), Some(n));
    }

    #[test]
    fn alphabetic_text_never_coerces(s in "[a-zA-Z ]*") {
        prop_assert_eq!(coerce_str(&s), None);
    }

    #[test]
    fn classifier_threshold_is_a_strict_majority(cells in prop::collection::vec(any::<bool>(), 1..30)) {
        let headers = vec!["v".to_string()];
        let rows: Vec<HashMap<String, Cell>> = cells
            .iter()
            .map(|&numeric| {
                let cell = if numeric { Cell::Number(1.0) } else { Cell::Text("x".to_string()) };
                HashMap::from([("v".to_string(), cell)])
            })
            .collect();
        let examined = cells.len().min(10);
        let k = cells[..examined].iter().filter(|&&b| b).count();
        let classification = ColumnProfiler::new().classify(&headers, &rows);
        let expected = k as f64 / examined as f64 > 0.5;
        prop_assert_eq!(classification.is_numeric("v"), expected);
    }

    #[test]
    fn pie_values_sum_to_the_positive_group_totals(
        entries in prop::collection::vec(("[abc]", -100i64..100), 1..20)
    ) {
        let mut text = String::from("label,amount");
        for (label, amount) in &entries {
            text.push_str(&format!("\n{label},{amount}"));
        }
        let rows = parse(&text).unwrap().rows;
        let request = ChartRequest {
            dataset_id: Uuid::nil(),
            chart_type: ChartType::Pie,
            x_axis: "label".to_string(),
            y_axis: "amount".to_string(),
            filters: None,
        };
        let mut totals: HashMap<&str, f64> = HashMap::new();
        for (label, amount) in &entries {
            *totals.entry(label.as_str()).or_insert(0.0) += *amount as f64;
        }
        let expected_sum: f64 = totals.values().filter(|t| **t > 0.0).sum();
        match ChartCompiler::new().compile(&rows, &request) {
            Ok(spec) => {
                let Series::Pie(series) = &spec.series[0] else {
                    return Err(TestCaseError::fail("expected a pie series"));
                };
                let actual: f64 = series.values.iter().sum();
                prop_assert!((actual - expected_sum).abs() < 1e-6);
                prop_assert!(series.values.iter().all(|v| *v > 0.0));
            }
            Err(_) => prop_assert_eq!(expected_sum, 0.0),
        }
    }

    #[test]
    fn compilation_is_a_pure_function(
        seed_rows in prop::collection::vec(("[a-d]", 0i64..50), 1..12),
        chart in prop::sample::select(vec![ChartType::Line, ChartType::Bar, ChartType::Pie, ChartType::Scatter]),
    ) {
        let mut text = String::from("k,v");
        for (k, v) in &seed_rows {
            text.push_str(&format!("\n{k},{v}"));
        }
        let rows = parse(&text).unwrap().rows;
        let request = ChartRequest {
            dataset_id: Uuid::nil(),
            chart_type: chart,
            x_axis: "k".to_string(),
            y_axis: "v".to_string(),
            filters: None,
        };
        let compiler = ChartCompiler::with_config(&EngineConfig::default());
        let first = compiler.compile(&rows, &request);
        let second = compiler.compile(&rows, &request);
        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(a), Err(b)) => prop_assert_eq!(a, b),
            _ => return Err(TestCaseError::fail("compile was not deterministic")),
        }
    }

    #[test]
    fn metrics_depend_only_on_sums_and_endpoints(values in prop::collection::vec(0.0f64..1e6, 2..20)) {
        let mut text = String::from("revenue");
        for v in &values {
            text.push_str(&format!("\n{v}"));
        }
        let rows = parse(&text).unwrap().rows;
        let metrics = carta::metrics::compute(&rows);
        let expected_total: f64 = values.iter().sum();
        prop_assert!((metrics.total_revenue - expected_total).abs() < 1e-3);
        let (r0, rn) = (values[0], values[values.len() - 1]);
        let expected_growth = if r0 > 0.0 { (rn - r0) / r0 * 100.0 } else { 0.0 };
        prop_assert!((metrics.growth_rate - expected_growth).abs() < 1e-6);
    }
}
