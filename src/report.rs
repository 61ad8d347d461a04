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

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::Error;
use serde::Serialize;
use tracing::debug;

use crate::{
    catalog::{QuerySpec, ReportConfig},
    duration::{DurationLiteral, ParseDurationError},
    results::{series_key, BenchmarkResults, ResultsError},
    stats::LatencySummary,
};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Point {
    /// Requests per second.
    pub rate: u64,
    pub seconds: f64,
}

/// One line of a chart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Series {
    pub technology: String,
    pub points: Vec<Point>,
}

impl Series {
    pub fn summary(&self) -> LatencySummary {
        self.points.iter().map(|point| point.seconds).collect()
    }
}

/// The extracted data of one chart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueryReport {
    pub query: String,
    pub file_name: String,
    pub series: Vec<Series>,
}

impl QueryReport {
    /// Extracts one series per configured technology.
    ///
    /// Stops at the first missing or malformed measurement.
    pub fn build(
        config: &ReportConfig,
        results: &BenchmarkResults,
        query: &QuerySpec,
    ) -> Result<Self, ReportError> {
        let mode = config.parse_mode();
        debug!(%query, ?mode, "extract latencies");
        let series = config
            .technologies()
            .iter()
            .map(|technology| -> Result<Series, ReportError> {
                let points = query
                    .rates()
                    .map(|rate| -> Result<Point, ReportError> {
                        let literal = results.latency(&query.name, technology, rate)?;
                        let seconds = DurationLiteral::parse(literal, mode)
                            .map_err(|source| ReportError::Latency {
                                key: series_key(&query.name, technology),
                                rate,
                                source,
                            })?
                            .as_secs_f64();
                        debug!(query = %query.name, %technology, rate, literal, seconds);
                        Ok(Point { rate, seconds })
                    })
                    .collect::<Result<_, _>>()?;
                Ok(Series {
                    technology: technology.clone(),
                    points,
                })
            })
            .collect::<Result<_, ReportError>>()?;

        Ok(Self {
            query: query.name.clone(),
            file_name: query.output_file(),
            series,
        })
    }

    /// Smallest and largest request rate over all series.
    pub fn rate_range(&self) -> Option<(u64, u64)> {
        let mut rates = self.points().map(|point| point.rate);
        let first = rates.next()?;
        Some(rates.fold((first, first), |(min, max), rate| {
            (min.min(rate), max.max(rate))
        }))
    }

    pub fn max_seconds(&self) -> Option<f64> {
        self.points().map(|point| point.seconds).reduce(f64::max)
    }

    fn points(&self) -> impl Iterator<Item = &Point> {
        self.series.iter().flat_map(|series| &series.points)
    }
}

/// Builds the reports of all configured queries, in catalog order.
pub fn build_all(
    config: &ReportConfig,
    results: &BenchmarkResults,
) -> Result<Vec<QueryReport>, ReportError> {
    config
        .queries()
        .iter()
        .map(|query| QueryReport::build(config, results, query))
        .collect()
}

/// Writes the extracted numbers as pretty printed JSON.
pub fn dump_reports(path: &Path, reports: &[QueryReport]) -> Result<(), Error> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, reports)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Missing(#[from] ResultsError),
    #[error("unparsable latency at {rate} requests/second for {key:?}")]
    Latency {
        key: String,
        rate: u64,
        #[source]
        source: ParseDurationError,
    },
}
