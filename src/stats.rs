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

use serde::{Deserialize, Serialize};

/// https://en.wikipedia.org/wiki/Algorithms_for_calculating_variance#Welford's_online_algorithm
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WelfordOnlineAlgorithm {
    count: usize,
    mean: f64,
    m2: f64,
}

impl WelfordOnlineAlgorithm {
    pub fn update(&mut self, new_value: f64) {
        self.count += 1;
        let diff1 = new_value - self.mean;
        self.mean += diff1 / self.count as f64;
        let diff2 = new_value - self.mean;
        self.m2 += diff1 * diff2;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn variance(&self) -> f64 {
        self.m2 / self.count as f64
    }

    pub fn sample_variance(&self) -> f64 {
        if self.count < 2 {
            return f64::NAN;
        }
        self.m2 / (self.count as f64 - 1.)
    }
}

/// Latency summary of one plotted line, in seconds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    min: Option<f64>,
    max: Option<f64>,
    dist: WelfordOnlineAlgorithm,
}

impl LatencySummary {
    pub fn update(&mut self, seconds: f64) {
        self.min = Some(self.min.map_or(seconds, |min| min.min(seconds)));
        self.max = Some(self.max.map_or(seconds, |max| max.max(seconds)));
        self.dist.update(seconds);
    }

    pub fn count(&self) -> usize {
        self.dist.count()
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    pub fn mean(&self) -> f64 {
        self.dist.mean()
    }

    pub fn std(&self) -> f64 {
        self.dist.variance().sqrt()
    }

    /// NaN for less than two samples.
    pub fn sample_std(&self) -> f64 {
        self.dist.sample_variance().sqrt()
    }
}

impl FromIterator<f64> for LatencySummary {
    fn from_iter<T: IntoIterator<Item = f64>>(iter: T) -> Self {
        let mut summary = Self::default();
        for seconds in iter {
            summary.update(seconds);
        }
        summary
    }
}
