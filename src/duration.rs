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

//! Parsing of the latency literals found in benchmark results (`"250ms"`, `"1.2s"`, `"2m"`).

use std::{
    fmt::{self, Display},
    num::ParseFloatError,
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A duration literal, tagged with the unit it was written in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DurationLiteral {
    Milliseconds(f64),
    Seconds(f64),
    Minutes(f64),
}

impl DurationLiteral {
    pub fn parse(input: &str, mode: ParseMode) -> Result<Self, ParseDurationError> {
        let input = match mode {
            ParseMode::Strict => input.trim(),
            ParseMode::Legacy => input,
        };
        if input.is_empty() {
            return Err(ParseDurationError::Empty);
        }

        let (magnitude, unit) = match mode {
            ParseMode::Strict => Unit::split(input),
            ParseMode::Legacy => Unit::split_legacy(input),
        }
        .ok_or_else(|| ParseDurationError::UnknownUnit(input.into()))?;

        let magnitude: f64 = magnitude.trim().parse().map_err(|source| {
            ParseDurationError::InvalidNumber {
                literal: input.into(),
                source,
            }
        })?;

        if mode == ParseMode::Strict && !(magnitude.is_finite() && magnitude >= 0.) {
            return Err(ParseDurationError::OutOfRange(input.into()));
        }

        Ok(unit.with_magnitude(magnitude))
    }

    /// The number as written, without unit conversion.
    pub fn magnitude(self) -> f64 {
        match self {
            Self::Milliseconds(n) | Self::Seconds(n) | Self::Minutes(n) => n,
        }
    }

    pub fn unit(self) -> &'static str {
        Unit::of(self).suffix()
    }

    pub fn as_secs_f64(self) -> f64 {
        match self {
            Self::Milliseconds(ms) => ms / 1000.,
            Self::Seconds(s) => s,
            Self::Minutes(m) => m * 60.,
        }
    }
}

impl FromStr for DurationLiteral {
    type Err = ParseDurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, ParseMode::Strict)
    }
}

impl Display for DurationLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude(), self.unit())
    }
}

/// How the unit suffix is removed before the magnitude is parsed.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ParseMode {
    /// Strip exactly the unit suffix.
    #[default]
    Strict,
    /// Always strip two characters, even for the one character `s` and `m` units.
    ///
    /// This is how the historic reports were produced: `"1.25s"` reads as `1.2`
    /// and single digit literals like `"5s"` don't parse at all. Surrounding
    /// whitespace is kept, so `"500ms "` has no known unit.
    Legacy,
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseDurationError {
    #[error("empty duration literal")]
    Empty,
    #[error("unknown unit in duration literal {0:?}, expected `ms`, `s` or `m`")]
    UnknownUnit(String),
    #[error("malformed magnitude in duration literal {literal:?}")]
    InvalidNumber {
        literal: String,
        #[source]
        source: ParseFloatError,
    },
    #[error("duration literal {0:?} is negative or not finite")]
    OutOfRange(String),
}

#[derive(Clone, Copy)]
enum Unit {
    Milliseconds,
    Seconds,
    Minutes,
}

impl Unit {
    /// `ms` has to be checked before `s`.
    fn split(input: &str) -> Option<(&str, Self)> {
        input
            .strip_suffix("ms")
            .map(|s| (s, Self::Milliseconds))
            .or_else(|| input.strip_suffix('s').map(|s| (s, Self::Seconds)))
            .or_else(|| input.strip_suffix('m').map(|s| (s, Self::Minutes)))
    }

    fn split_legacy(input: &str) -> Option<(&str, Self)> {
        let (_, unit) = Self::split(input)?;
        Some((drop_last_chars(input, 2), unit))
    }

    fn of(literal: DurationLiteral) -> Self {
        match literal {
            DurationLiteral::Milliseconds(_) => Self::Milliseconds,
            DurationLiteral::Seconds(_) => Self::Seconds,
            DurationLiteral::Minutes(_) => Self::Minutes,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Self::Milliseconds => "ms",
            Self::Seconds => "s",
            Self::Minutes => "m",
        }
    }

    fn with_magnitude(self, magnitude: f64) -> DurationLiteral {
        match self {
            Self::Milliseconds => DurationLiteral::Milliseconds(magnitude),
            Self::Seconds => DurationLiteral::Seconds(magnitude),
            Self::Minutes => DurationLiteral::Minutes(magnitude),
        }
    }
}

fn drop_last_chars(input: &str, count: usize) -> &str {
    if count == 0 {
        return input;
    }
    input
        .char_indices()
        .rev()
        .nth(count - 1)
        .map_or("", |(idx, _)| &input[..idx])
}
