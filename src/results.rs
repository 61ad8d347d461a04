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
    collections::BTreeMap,
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use anyhow::{Context, Error};
use derive_more::Deref;
use serde::Deserialize;

/// Separates query and technology in the keys of the results file.
pub const SERIES_SEPARATOR: &str = " on ";

pub fn series_key(query: &str, technology: &str) -> String {
    format!("{query}{SERIES_SEPARATOR}{technology}")
}

/// Latency literals per request rate, as written by the load generator.
#[derive(Debug, Default, Deref, Deserialize)]
#[serde(transparent)]
pub struct Measurements(BTreeMap<String, String>);

/// The contents of a `benchmark.json` file: `"<query> on <technology>" -> rate -> latency`.
#[derive(Debug, Default, Deref, Deserialize)]
#[serde(transparent)]
pub struct BenchmarkResults(BTreeMap<String, Measurements>);

impl BenchmarkResults {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let reader = BufReader::new(file);
        Self::from_reader(reader).with_context(|| format!("parse {}", path.display()))
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, Error> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Looks up the raw latency literal of one measurement.
    pub fn latency(&self, query: &str, technology: &str, rate: u64) -> Result<&str, ResultsError> {
        let key = series_key(query, technology);
        let measurements = self
            .get(&key)
            .ok_or_else(|| ResultsError::MissingSeries(key.clone()))?;
        measurements
            .get(&rate.to_string())
            .map(String::as_str)
            .ok_or(ResultsError::MissingRate { key, rate })
    }

    /// All `(query, technology)` pairs, split at the last separator.
    ///
    /// Keys without a separator are skipped.
    pub fn series_names(&self) -> impl Iterator<Item = (&str, &str)> {
        self.keys()
            .filter_map(|key| key.rsplit_once(SERIES_SEPARATOR))
    }
}

impl FromIterator<(String, Vec<(u64, String)>)> for BenchmarkResults {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = (String, Vec<(u64, String)>)>,
    {
        Self(
            iter.into_iter()
                .map(|(key, points)| {
                    let measurements = points
                        .into_iter()
                        .map(|(rate, latency)| (rate.to_string(), latency))
                        .collect();
                    (key, Measurements(measurements))
                })
                .collect(),
        )
    }
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ResultsError {
    #[error("no measurements for {0:?}")]
    MissingSeries(String),
    #[error("no measurement at {rate} requests/second for {key:?}")]
    MissingRate { key: String, rate: u64 },
}
