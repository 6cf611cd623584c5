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

use crate::error::{ParseError, ParseResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single scalar value in a table: either a finite number or a string.
/// Empty input cells are the empty string, never a numeric zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
}
impl Cell {
    /// The numeric coercion rule shared by every component: a cell holds a
    /// usable number iff it is a finite `Number`, or a `Text` whose trimmed
    /// content is non-empty and parses as a finite float.
    pub fn coerce_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Number(_) => None,
            Cell::Text(t) => coerce_str(t),
        }
    }
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Text(t) if t.is_empty())
    }
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(t) => Some(t),
            Cell::Number(_) => None,
        }
    }
}
impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Text(t) => write!(f, "{t}"),
        }
    }
}
impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}
impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}
pub fn coerce_str(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}
/// One row of a dataset, keyed by header name. Column order lives on the
/// owning table so the map itself can stay unordered.
pub type Record = HashMap<String, Cell>;
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Record>,
}
impl ParsedTable {
    pub fn empty() -> Self {
        Self {
            headers: Vec::new(),
            rows: Vec::new(),
        }
    }
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
/// Parses CSV text into an ordered header list plus row records.
///
/// The format is deliberately shallow: lines split on `\n`, fields split on
/// `,`, each field trimmed and stripped of one surrounding double-quote
/// pair. Quoted commas and newlines are not preserved. Rows shorter than
/// the header are padded with empty-string cells; extra fields are dropped.
/// Duplicate header names overwrite left to right, the last occurrence
/// wins.
pub fn parse(text: &str) -> ParseResult<ParsedTable> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(ParsedTable::empty());
    }
    let mut lines = trimmed.split('\n');
    let header_line = lines
        .next()
        .ok_or_else(|| ParseError::Failure("missing header line".to_string()))?;
    let headers: Vec<String> = header_line
        .split(',')
        .map(|field| clean_field(field).to_string())
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(ParseError::Failure(
            "header row has no named columns".to_string(),
        ));
    }
    let mut rows = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(clean_field).collect();
        let mut record = Record::with_capacity(headers.len());
        for (index, header) in headers.iter().enumerate() {
            let value = fields.get(index).copied().unwrap_or("");
            record.insert(header.clone(), coerce_field(value));
        }
        rows.push(record);
    }
    Ok(ParsedTable { headers, rows })
}
fn clean_field(field: &str) -> &str {
    let trimmed = field.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    }
}
fn coerce_field(value: &str) -> Cell {
    match coerce_str(value) {
        Some(n) => Cell::Number(n),
        None => Cell::Text(value.to_string()),
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn parses_headers_and_typed_cells() {
        let table = parse("name,score\nalice,10\nbob,eleven").unwrap();
        assert_eq!(table.headers, vec!["name", "score"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["score"], Cell::Number(10.0));
        assert_eq!(table.rows[1]["score"], Cell::Text("eleven".to_string()));
    }
    #[test]
    fn empty_input_and_header_only_input_yield_no_rows() {
        assert!(parse("").unwrap().rows.is_empty());
        assert!(parse("   \n  ").unwrap().rows.is_empty());
        let header_only = parse("a,b,c").unwrap();
        assert_eq!(header_only.headers, vec!["a", "b", "c"]);
        assert!(header_only.rows.is_empty());
    }
    #[test]
    fn short_rows_are_padded_with_empty_strings() {
        let table = parse("a,b,c\n1,2").unwrap();
        assert_eq!(table.rows[0]["c"], Cell::Text(String::new()));
    }
    #[test]
    fn extra_fields_beyond_the_header_are_dropped() {
        let table = parse("a,b\n1,2,3,4").unwrap();
        assert_eq!(table.rows[0].len(), 2);
    }
    #[test]
    fn surrounding_quotes_are_stripped_but_not_honoured() {
        let table = parse("\"region\",total\n\"North\",5").unwrap();
        assert_eq!(table.headers[0], "region");
        assert_eq!(table.rows[0]["region"], Cell::Text("North".to_string()));
    }
    #[test]
    fn quoted_commas_split_anyway() {
        // Shallow quoting is contractual: the comma still delimits.
        let table = parse("a,b\n\"x,y\",2").unwrap();
        assert_eq!(table.rows[0]["a"], Cell::Text("\"x".to_string()));
        assert_eq!(table.rows[0]["b"], Cell::Text("y\"".to_string()));
    }
    #[test]
    fn blank_interior_lines_are_skipped() {
        let table = parse("a\n1\n\n2").unwrap();
        assert_eq!(table.rows.len(), 2);
    }
    #[test]
    fn duplicate_headers_keep_the_last_occurrence() {
        let table = parse("a,a\n1,2").unwrap();
        assert_eq!(table.rows[0]["a"], Cell::Number(2.0));
    }
    #[test]
    fn unnamed_header_row_is_a_parse_failure() {
        assert!(matches!(parse(",,\n1,2,3"), Err(ParseError::Failure(_))));
    }
    #[test]
    fn coercion_requires_a_finite_full_string_parse() {
        assert_eq!(coerce_str("162000"), Some(162000.0));
        assert_eq!(coerce_str("  3.5 "), Some(3.5));
        assert_eq!(coerce_str("1e3"), Some(1000.0));
        assert_eq!(coerce_str(""), None);
        assert_eq!(coerce_str("   "), None);
        assert_eq!(coerce_str("2024-01-01"), None);
        assert_eq!(coerce_str("nan"), None);
        assert_eq!(coerce_str("inf"), None);
    }
    #[test]
    fn date_like_values_stay_text() {
        let table = parse("date,revenue\n2024-01-01,125000").unwrap();
        assert_eq!(
            table.rows[0]["date"],
            Cell::Text("2024-01-01".to_string())
        );
        assert_eq!(table.rows[0]["revenue"], Cell::Number(125000.0));
    }
    #[test]
    fn numeric_cell_display_matches_the_source_digits() {
        assert_eq!(Cell::Number(2024.0).to_string(), "2024");
        assert_eq!(Cell::Number(29.6).to_string(), "29.6");
    }
}
