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
    collections::HashSet,
    ffi::OsStr,
    fmt::{self, Display},
    fs,
    path::Path,
};

use anyhow::{Context, Error};
use serde::{Deserialize, Serialize};

use crate::duration::ParseMode;

/// Which queries get a chart, which technologies get a line in it and how it looks.
#[derive(Clone, Debug, Deserialize)]
#[serde(try_from = "ReportConfigSerdeProxy")]
pub struct ReportConfig {
    queries: Vec<QuerySpec>,
    technologies: Vec<String>,
    parse_mode: ParseMode,
    chart: ChartStyle,
}

impl ReportConfig {
    pub fn load(file: impl AsRef<Path>) -> Result<Self, Error> {
        let file = file.as_ref();
        let bytes = fs::read(file).with_context(|| format!("read {}", file.display()))?;
        let text = String::from_utf8(bytes)?;
        toml::from_str(&text).with_context(|| format!("parse report config {}", file.display()))
    }

    /// Applies the command line overrides on top of the config file, or the built-in catalog.
    pub fn resolve<S>(
        file: Option<&Path>,
        queries: &[S],
        parse_mode: Option<ParseMode>,
    ) -> Result<Self, Error>
    where
        S: AsRef<str>,
    {
        let mut config = match file {
            Some(file) => Self::load(file)?,
            None => Self::default(),
        };
        config.retain_queries(queries)?;
        if let Some(parse_mode) = parse_mode {
            config = config.with_parse_mode(parse_mode);
        }
        Ok(config)
    }

    pub fn new(
        queries: Vec<QuerySpec>,
        technologies: Vec<String>,
        parse_mode: ParseMode,
        chart: ChartStyle,
    ) -> Result<Self, ConfigError> {
        ReportConfigSerdeProxy {
            queries,
            technologies,
            parse_mode,
            chart,
        }
        .try_into()
    }

    pub fn queries(&self) -> &[QuerySpec] {
        &self.queries
    }

    pub fn query(&self, name: &str) -> Option<&QuerySpec> {
        self.queries.iter().find(|query| query.name == name)
    }

    pub fn technologies(&self) -> &[String] {
        &self.technologies
    }

    pub fn parse_mode(&self) -> ParseMode {
        self.parse_mode
    }

    pub fn chart(&self) -> &ChartStyle {
        &self.chart
    }

    pub fn with_parse_mode(mut self, parse_mode: ParseMode) -> Self {
        self.parse_mode = parse_mode;
        self
    }

    /// Keeps only the named queries, in catalog order.
    pub fn retain_queries<S>(&mut self, names: &[S]) -> Result<(), ConfigError>
    where
        S: AsRef<str>,
    {
        if names.is_empty() {
            return Ok(());
        }
        if let Some(unknown) = names
            .iter()
            .map(AsRef::as_ref)
            .find(|name| self.query(name).is_none())
        {
            return Err(ConfigError::UnknownQuery(unknown.into()));
        }
        self.queries
            .retain(|query| names.iter().any(|name| name.as_ref() == query.name));
        Ok(())
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        let ReportConfigSerdeProxy {
            queries,
            technologies,
            parse_mode,
            chart,
        } = ReportConfigSerdeProxy::default();
        Self {
            queries,
            technologies,
            parse_mode,
            chart,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuerySpec {
    pub name: String,
    /// Step between two sampled request rates.
    pub base_rate: u64,
    /// Exclusive upper bound of the rate multiplier, i.e. `iterations - 1` rates are sampled.
    pub iterations: u64,
    /// Overrides the image name, which defaults to the query name.
    #[serde(default)]
    pub file_name: Option<String>,
}

impl QuerySpec {
    pub fn new(name: impl Into<String>, base_rate: u64, iterations: u64) -> Self {
        Self {
            name: name.into(),
            base_rate,
            iterations,
            file_name: None,
        }
    }

    /// The sampled request rates in ascending order.
    pub fn rates(&self) -> impl Iterator<Item = u64> + '_ {
        (1..self.iterations).map(move |multiplier| self.base_rate * multiplier)
    }

    pub fn output_file(&self) -> String {
        let stem = self.file_name.as_deref().unwrap_or(&self.name);
        if stem.ends_with(".png") {
            stem.into()
        } else {
            format!("{stem}.png")
        }
    }
}

impl Display for QuerySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            name,
            base_rate,
            iterations,
            file_name: _,
        } = self;
        write!(f, "{name}-{base_rate}x{iterations}")
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    pub x_label: String,
    pub y_label: String,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            x_label: "Requests/second".into(),
            y_label: "Mean response latency (seconds)".into(),
        }
    }
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("the report config contains no queries")]
    NoQueries,
    #[error("the report config contains no technologies")]
    NoTechnologies,
    #[error("query and technology names must not be empty")]
    EmptyName,
    #[error("duplicate entry in report config: {0:?}")]
    Duplicate(String),
    #[error("image name {0:?} must be a plain file name inside the output dir")]
    InvalidFileName(String),
    #[error("query {0:?} needs a base_rate > 0")]
    ZeroBaseRate(String),
    #[error("query {0:?} needs iterations >= 2 to sample any request rate")]
    TooFewIterations(String),
    #[error("request rates of query {0:?} overflow")]
    RateOverflow(String),
    #[error("chart width and height must be > 0")]
    EmptyChart,
    #[error("unknown query: {0:?}")]
    UnknownQuery(String),
}

#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ReportConfigSerdeProxy {
    queries: Vec<QuerySpec>,
    technologies: Vec<String>,
    parse_mode: ParseMode,
    chart: ChartStyle,
}

impl Default for ReportConfigSerdeProxy {
    fn default() -> Self {
        Self {
            queries: vec![
                QuerySpec::new("tracks_media_some", 500, 6),
                QuerySpec::new("albums_tracks_genre_some", 500, 6),
                QuerySpec::new("albums_tracks_genre_all", 200, 5),
            ],
            technologies: ["poggers", "hasura", "postgraphile"]
                .map(String::from)
                .into(),
            parse_mode: ParseMode::default(),
            chart: ChartStyle::default(),
        }
    }
}

impl TryFrom<ReportConfigSerdeProxy> for ReportConfig {
    type Error = ConfigError;

    fn try_from(value: ReportConfigSerdeProxy) -> Result<Self, Self::Error> {
        let ReportConfigSerdeProxy {
            queries,
            technologies,
            parse_mode,
            chart,
        } = value;

        if queries.is_empty() {
            return Err(ConfigError::NoQueries);
        }
        if technologies.is_empty() {
            return Err(ConfigError::NoTechnologies);
        }
        if chart.width == 0 || chart.height == 0 {
            return Err(ConfigError::EmptyChart);
        }

        let mut names = HashSet::new();
        let mut images = HashSet::new();
        for query in &queries {
            if query.name.is_empty() {
                return Err(ConfigError::EmptyName);
            }
            if !names.insert(query.name.as_str()) {
                return Err(ConfigError::Duplicate(query.name.clone()));
            }
            if query.base_rate == 0 {
                return Err(ConfigError::ZeroBaseRate(query.name.clone()));
            }
            if query.iterations < 2 {
                return Err(ConfigError::TooFewIterations(query.name.clone()));
            }
            if query.base_rate.checked_mul(query.iterations - 1).is_none() {
                return Err(ConfigError::RateOverflow(query.name.clone()));
            }
            let image = query.output_file();
            if image.contains(['/', '\\'])
                || Path::new(&image).file_name() != Some(OsStr::new(&image))
            {
                return Err(ConfigError::InvalidFileName(image));
            }
            if !images.insert(image) {
                return Err(ConfigError::Duplicate(query.output_file()));
            }
        }

        let mut seen = HashSet::new();
        for technology in &technologies {
            if technology.is_empty() {
                return Err(ConfigError::EmptyName);
            }
            if !seen.insert(technology.as_str()) {
                return Err(ConfigError::Duplicate(technology.clone()));
            }
        }

        Ok(Self {
            queries,
            technologies,
            parse_mode,
            chart,
        })
    }
}
