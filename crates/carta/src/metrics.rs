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

use crate::csv_parser::Record;
use serde::{Deserialize, Serialize};

const REVENUE_COLUMN: &str = "revenue";
const EXPENSES_COLUMN: &str = "expenses";
/// Headline aggregates computed by name-convention over the `revenue` and
/// `expenses` columns. Missing columns contribute zeros, never an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub profit: f64,
    pub growth_rate: f64,
}
impl DashboardMetrics {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
/// Folds the row sequence into dashboard metrics. The growth rate is a
/// deliberate two-point estimator over the first and last rows' revenue,
/// with no sorting; fewer than two rows, or a non-positive starting
/// revenue, pin it to zero.
pub fn compute(rows: &[Record]) -> DashboardMetrics {
    let total_revenue = column_sum(rows, REVENUE_COLUMN);
    let total_expenses = column_sum(rows, EXPENSES_COLUMN);
    let growth_rate = match (rows.first(), rows.last()) {
        (Some(first), Some(last)) if rows.len() > 1 => {
            let r0 = cell_value(first, REVENUE_COLUMN);
            let rn = cell_value(last, REVENUE_COLUMN);
            if r0 > 0.0 {
                (rn - r0) / r0 * 100.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    };
    DashboardMetrics {
        total_revenue,
        total_expenses,
        profit: total_revenue - total_expenses,
        growth_rate,
    }
}
fn column_sum(rows: &[Record], column: &str) -> f64 {
    rows.iter().map(|row| cell_value(row, column)).sum()
}
fn cell_value(row: &Record, column: &str) -> f64 {
    row.get(column)
        .and_then(|cell| cell.coerce_number())
        .unwrap_or(0.0)
}
/// en-US style currency formatting, e.g. `$858,000.00`.
pub fn format_currency(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;
    let formatted = format!("${}.{fraction:02}", group_thousands(whole));
    if negative {
        format!("-{formatted}")
    } else {
        formatted
    }
}
/// en-US style grouped integer formatting, e.g. `1,234`.
pub fn format_number(value: f64) -> String {
    let negative = value < 0.0;
    let rounded = value.abs().round() as u64;
    let formatted = group_thousands(rounded);
    if negative {
        format!("-{formatted}")
    } else {
        formatted
    }
}
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_parser::parse;
    fn metrics_for(text: &str) -> DashboardMetrics {
        compute(&parse(text).unwrap().rows)
    }
    #[test]
    fn totals_and_profit_sum_the_named_columns() {
        let metrics = metrics_for("revenue,expenses\n100,40\n200,60");
        assert_eq!(metrics.total_revenue, 300.0);
        assert_eq!(metrics.total_expenses, 100.0);
        assert_eq!(metrics.profit, 200.0);
    }
    #[test]
    fn missing_columns_yield_zeros_not_errors() {
        let metrics = metrics_for("date,amount\n2024-01-01,5");
        assert_eq!(metrics, DashboardMetrics::default());
    }
    #[test]
    fn non_numeric_stragglers_contribute_zero() {
        let metrics = metrics_for("revenue\n100\nunknown\n50");
        assert_eq!(metrics.total_revenue, 150.0);
    }
    #[test]
    fn growth_needs_at_least_two_rows() {
        let metrics = metrics_for("revenue\n100");
        assert_eq!(metrics.growth_rate, 0.0);
    }
    #[test]
    fn growth_is_a_first_versus_last_estimator() {
        // The middle rows never matter.
        let metrics = metrics_for("revenue\n100\n9999\n1\n150");
        assert_eq!(metrics.growth_rate, 50.0);
    }
    #[test]
    fn non_positive_starting_revenue_pins_growth_to_zero() {
        assert_eq!(metrics_for("revenue\n0\n150").growth_rate, 0.0);
        assert_eq!(metrics_for("revenue\n-5\n150").growth_rate, 0.0);
    }
    #[test]
    fn currency_formatting_groups_and_keeps_cents() {
        assert_eq!(format_currency(858000.0), "$858,000.00");
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(-42.0), "-$42.00");
    }
    #[test]
    fn number_formatting_groups_thousands() {
        assert_eq!(format_number(311000.0), "311,000");
        assert_eq!(format_number(29.6), "30");
    }
}
