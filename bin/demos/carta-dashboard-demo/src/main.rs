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

use anyhow::{Context, Result};
use carta::metrics::{format_currency, format_number};
use carta::sample_data::{SAMPLE_CSV, SAMPLE_NAME};
use carta::{AnalyticsEngine, ChartType, EngineConfig, InsightDispatcher, MatchConfidence};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};

#[derive(Parser)]
#[command(
    name = "carta-dashboard-demo",
    about = "Walks a CSV through the full carta pipeline: parse, classify, metrics, charts, insights"
)]
struct Args {
    /// CSV file to analyse; the bundled sample dataset is used when omitted.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Dispatcher delay in milliseconds.
    #[arg(long, default_value_t = 400)]
    delay_ms: u64,

    /// Questions to put to the insight dispatcher; defaults to a short tour.
    #[arg(long = "ask", value_name = "QUESTION")]
    questions: Vec<String>,

    /// Print compiled chart specs as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = EngineConfig {
        dispatcher_delay_ms: args.delay_ms,
        ..Default::default()
    };
    let mut engine = AnalyticsEngine::with_config(config)?;

    let (name, text) = match &args.csv {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload.csv".to_string());
            (name, text)
        }
        None => (SAMPLE_NAME.to_string(), SAMPLE_CSV.to_string()),
    };

    let id = engine
        .upload_csv(&name, &text)
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    engine.set_active_file(id);
    info!(dataset = %name, "dataset loaded");

    let metrics = engine.metrics();
    println!("\n== Dashboard metrics ==");
    println!("  Total revenue:  {}", format_currency(metrics.total_revenue));
    println!("  Total expenses: {}", format_currency(metrics.total_expenses));
    println!("  Profit:         {}", format_currency(metrics.profit));
    println!("  Growth rate:    {:.2}%", metrics.growth_rate);

    let columns = engine.available_columns();
    println!("\n== Columns ({}) ==", columns.summary());
    println!("  all:     {}", columns.all.join(", "));
    println!("  numeric: {}", columns.numeric.join(", "));

    println!("\n== Template matches ==");
    for (template, matched) in engine.template_matches() {
        match matched {
            Some(m) => println!(
                "  {:<22} {:<8} x={} y={} ({})",
                template.name,
                template.chart_type,
                m.x,
                m.y,
                if m.confidence == MatchConfidence::High {
                    "perfect match"
                } else {
                    "good fit"
                }
            ),
            None => println!("  {:<22} no suitable columns", template.name),
        }
    }

    if let Some(suggestion) = engine.suggested_axes() {
        println!(
            "\nSuggested chart axes: x={} y={} ({})",
            suggestion.x, suggestion.y, suggestion.reason
        );
        engine
            .generate_chart(ChartType::Line, &suggestion.x, &suggestion.y)
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    }

    if columns.all.iter().any(|c| c == "region") && columns.numeric.iter().any(|c| c == "revenue")
    {
        engine
            .generate_chart(ChartType::Pie, "region", "revenue")
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    }

    println!("\n== Compiled charts ==");
    for entry in engine.store().charts() {
        let spec = &entry.spec;
        println!(
            "  [{}] {} ({} series, {} points)",
            spec.chart_type,
            spec.title,
            spec.series.len(),
            spec.series[0].point_count()
        );
        if args.json {
            println!("{}", spec.to_json_pretty()?);
        }
    }

    let questions = if args.questions.is_empty() {
        vec![
            "show me revenue".to_string(),
            "which cost matters most".to_string(),
            "tell me something about this data".to_string(),
        ]
    } else {
        args.questions.clone()
    };

    println!("\n== Insights ==");
    for question in &questions {
        println!("  you: {question}");
        let response = engine
            .ask(question)
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
        println!(
            "   ai: {} (confidence {:.0}%)",
            response.answer,
            response.confidence * 100.0
        );
        if let Some(spec) = &response.chart_spec {
            println!("       suggested chart: [{}] {}", spec.chart_type, spec.title);
        }
    }

    println!("\nTry asking:");
    for suggestion in InsightDispatcher::suggested_questions() {
        println!("  - {suggestion}");
    }
    println!(
        "\n{} rows analysed.",
        format_number(engine.store().files()[0].row_count() as f64)
    );
    Ok(())
}
