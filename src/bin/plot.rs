// Copyright 2023 Xayn AG
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use latency_report::{
    catalog::ReportConfig,
    duration::ParseMode,
    logging,
    render::render_all,
    report::{build_all, dump_reports},
    results::BenchmarkResults,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(version, about = "Plots latency over request rate, one chart per query")]
struct Cli {
    /// Benchmark results mapping `"<query> on <technology>"` to latencies per request rate
    #[arg(long, env = "LATENCY_REPORT_INPUT", default_value = "benchmark.json")]
    input: PathBuf,

    /// TOML file replacing the built-in query catalog
    #[arg(long, env = "LATENCY_REPORT_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, env = "LATENCY_REPORT_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Only plot the given queries
    #[arg(long = "query", env = "LATENCY_REPORT_QUERIES", value_delimiter = ',')]
    queries: Vec<String>,

    #[arg(long, env = "LATENCY_REPORT_PARSE_MODE", value_enum)]
    parse_mode: Option<ParseMode>,

    /// Also write the plotted numbers to this JSON file
    #[arg(long, env = "LATENCY_REPORT_DATA_OUT")]
    data_out: Option<PathBuf>,
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    logging::init()?;

    let config = ReportConfig::resolve(cli.config.as_deref(), &cli.queries, cli.parse_mode)?;
    let results = BenchmarkResults::load(&cli.input)?;

    // nothing is written unless every chart can be built
    let reports = build_all(&config, &results)
        .with_context(|| format!("extract latencies from {}", cli.input.display()))?;
    for report in &reports {
        for series in &report.series {
            let summary = series.summary();
            info!(
                query = %report.query,
                technology = %series.technology,
                points = summary.count(),
                mean = summary.mean(),
                "extracted series"
            );
        }
    }

    if let Some(data_out) = &cli.data_out {
        dump_reports(data_out, &reports)
            .with_context(|| format!("write {}", data_out.display()))?;
    }
    render_all(&reports, config.chart(), &cli.output_dir)?;

    Ok(())
}
