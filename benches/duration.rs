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

use std::{hint::black_box, time::Duration};

use criterion::{BenchmarkId, Criterion, Throughput};
use latency_report::duration::{DurationLiteral, ParseMode};

const LITERALS: [&str; 4] = ["250ms", "1.234567s", "12.5s", "1.5m"];

fn main() {
    let mut c = Criterion::default()
        .configure_from_args()
        .measurement_time(Duration::from_secs(5));

    let mut group = c.benchmark_group("duration_literal");
    group.throughput(Throughput::Elements(LITERALS.len() as _));
    for mode in [ParseMode::Strict, ParseMode::Legacy] {
        group.bench_with_input(
            BenchmarkId::new("parse", format!("{mode:?}")),
            &mode,
            |b, &mode| {
                b.iter(|| {
                    for literal in LITERALS {
                        black_box(DurationLiteral::parse(black_box(literal), mode).ok());
                    }
                })
            },
        );
    }
    group.finish();

    c.final_summary();
}
