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

use crate::csv_parser::{self, ParsedTable};
use crate::error::ParseResult;

/// Six months of demonstration financials, used by the demo binary and the
/// scenario tests.
pub const SAMPLE_CSV: &str = "\
date,revenue,expenses,profit,region,product,customer_count
2024-01-01,125000,85000,40000,North America,Software Licenses,245
2024-02-01,132000,88000,44000,Europe,Consulting Services,267
2024-03-01,145000,92000,53000,Asia Pacific,Software Licenses,289
2024-04-01,138000,89000,49000,North America,Support Services,301
2024-05-01,156000,95000,61000,Europe,Software Licenses,324
2024-06-01,162000,98000,64000,Asia Pacific,Consulting Services,342";
pub const SAMPLE_NAME: &str = "sample-financials.csv";
pub fn sample_table() -> ParseResult<ParsedTable> {
    csv_parser::parse(SAMPLE_CSV)
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn the_sample_parses_to_six_rows_of_seven_columns() {
        let table = sample_table().unwrap();
        assert_eq!(table.headers.len(), 7);
        assert_eq!(table.rows.len(), 6);
    }
}
