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
    catalog::ReportConfig, duration::ParseMode, logging, report::build_all,
    results::BenchmarkResults,
};

#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// The benchmark results, usually `./benchmark.json`
    #[arg(index = 1, default_value = "benchmark.json")]
    input: PathBuf,

    #[arg(long, env = "LATENCY_REPORT_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long = "query", value_delimiter = ',')]
    queries: Vec<String>,

    #[arg(long, value_enum)]
    parse_mode: Option<ParseMode>,

    /// Only list the series contained in the results
    #[arg(long)]
    list: bool,
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    logging::init()?;

    let results = BenchmarkResults::load(&cli.input)?;
    if cli.list {
        for (query, technology) in results.series_names() {
            println!("{query} on {technology}");
        }
        return Ok(());
    }

    let config = ReportConfig::resolve(cli.config.as_deref(), &cli.queries, cli.parse_mode)?;
    let reports = build_all(&config, &results).context("build reports")?;

    for report in &reports {
        for series in &report.series {
            let summary = series.summary();
            let query = &report.query;
            let technology = &series.technology;
            println!("{query} on {technology} ({} rates)", summary.count());
            println!(
                "{technology} latency  {mean: >8.4} / {min: >8.4} / {max: >8.4} / {std: >8.4}",
                mean = summary.mean(),
                min = summary.min().unwrap_or(f64::NAN),
                max = summary.max().unwrap_or(f64::NAN),
                std = summary.sample_std(),
            );
            for point in &series.points {
                println!(
                    "{technology} {rate: >6}/s {seconds: >8.4}",
                    rate = point.rate,
                    seconds = point.seconds
                );
            }
            println!("{technology} --");
        }
    }

    Ok(())
}
